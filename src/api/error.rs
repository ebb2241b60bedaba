//! Mapping from service errors to HTTP responses

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use crate::error::Error;

#[derive(Debug)]
pub enum ApiError {
    /// Anything raised by the service or store.
    Service(Error),
    /// The body was not a JSON object.
    Body(JsonRejection),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Service(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Body(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Service(Error::Validation(errors)) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            ApiError::Body(rejection) => {
                warn!("rejected request body: {}", rejection.body_text());
                let body = json!({
                    "errors": [{
                        "type": "body",
                        "location": "body",
                        "msg": rejection.body_text(),
                    }]
                });
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            // Storage and internal failures: log the cause, keep it off the wire.
            ApiError::Service(err) => {
                error!("request failed: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "Internal Server Error" })),
                )
                    .into_response()
            }
        }
    }
}
