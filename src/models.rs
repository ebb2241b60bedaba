use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// A persisted piece of feedback. Field order matches the on-disk layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(deserialize_with = "stored_rating")]
    pub rating: u8,
    pub created_at: String,
}

/// Older files may hold the rating as an integer string such as `"4"`.
/// It is read as a number and written back as one on the next append.
fn stored_rating<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Stored {
        Number(u8),
        Text(String),
    }

    match Stored::deserialize(deserializer)? {
        Stored::Number(n) => Ok(n),
        Stored::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid stored rating {s:?}"))),
    }
}

/// Raw request body. Nothing here is trusted until it passes validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackInput {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub rating: Option<Value>,
    #[serde(default)]
    pub created_at: Option<Value>,
}

/// A validated submission waiting for the store to assign its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeedback {
    pub name: String,
    pub email: String,
    pub message: String,
    pub rating: Rating,
    pub created_at: Option<String>,
}

impl NewFeedback {
    pub fn into_record(self, id: u64) -> FeedbackRecord {
        FeedbackRecord {
            id,
            name: self.name,
            email: self.email,
            message: self.message,
            rating: self.rating.get(),
            created_at: self.created_at.unwrap_or_else(now_timestamp),
        }
    }
}

/// What the desktop client posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Star rating, always within `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Option<Rating> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Some(Rating(value as u8))
        } else {
            None
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Rating> {
        (Self::MIN..=Self::MAX).map(Rating)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Current UTC time as `2024-05-01T09:30:00.000Z`.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
