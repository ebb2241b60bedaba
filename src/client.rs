use crate::models::{FeedbackRecord, FeedbackSubmission};
use anyhow::{anyhow, bail, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

/// HTTP client for the feedback API.
#[derive(Debug, Clone)]
pub struct FeedbackClient {
    base_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    msg: String,
}

impl FeedbackClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        FeedbackClient {
            base_url,
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn feedbacks_url(&self) -> String {
        format!("{}/feedbacks", self.base_url)
    }

    pub async fn list(&self) -> Result<Vec<FeedbackRecord>> {
        let resp = self.http.get(self.feedbacks_url()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            bail!("listing feedback failed with status {status}");
        }
        Ok(resp.json().await?)
    }

    pub async fn create(&self, submission: &FeedbackSubmission) -> Result<FeedbackRecord> {
        let resp = self
            .http
            .post(self.feedbacks_url())
            .json(submission)
            .send()
            .await?;
        match resp.status() {
            StatusCode::CREATED | StatusCode::OK => Ok(resp.json().await?),
            StatusCode::BAD_REQUEST => {
                let body: ErrorBody = resp.json().await?;
                Err(anyhow!("feedback rejected: {}", describe_errors(&body)))
            }
            status => Err(anyhow!("submitting feedback failed with status {status}")),
        }
    }
}

fn describe_errors(body: &ErrorBody) -> String {
    body.errors
        .iter()
        .map(|e| match &e.path {
            Some(path) => format!("{path}: {}", e.msg),
            None => e.msg.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
