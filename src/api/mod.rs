//! HTTP API over the feedback service
//!
//! Provides:
//! - `GET /` liveness text
//! - `GET /feedbacks` every record in insertion order
//! - `POST /feedbacks` validated create

pub mod error;
pub mod server;

pub use error::ApiError;
pub use server::{router, serve, LIVENESS_MESSAGE};
