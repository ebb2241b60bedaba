//! Field rules for incoming feedback.
//!
//! Every rule runs, so a caller sees all problems with a submission at once
//! rather than fixing them one round-trip at a time.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::models::{FeedbackInput, NewFeedback, Rating};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}$",
    )
    .expect("email pattern compiles")
});

const MAX_EMAIL_LEN: usize = 254;
const MAX_LOCAL_PART_LEN: usize = 64;

/// One failed rule, shaped like the `errors` entries API clients already parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub path: &'static str,
    pub location: &'static str,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl FieldError {
    fn new(path: &'static str, msg: impl Into<String>, value: Option<&Value>) -> Self {
        FieldError {
            kind: "field",
            path,
            location: "body",
            msg: msg.into(),
            value: value.cloned(),
        }
    }
}

/// All rules a submission broke, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Names of the offending fields.
    pub fn fields(&self) -> Vec<&'static str> {
        self.0.iter().map(|e| e.path).collect()
    }

    fn push(&mut self, err: FieldError) {
        self.0.push(err);
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msgs: Vec<&str> = self.0.iter().map(|e| e.msg.as_str()).collect();
        write!(f, "{}", msgs.join("; "))
    }
}

/// Check a raw submission and, if every rule passes, produce the typed record.
pub fn validate(input: &FeedbackInput) -> Result<NewFeedback, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let name = non_empty_text(input.name.as_ref());
    if name.is_none() {
        errors.push(FieldError::new("name", "name must not be empty", input.name.as_ref()));
    }

    let email = coerce_text(input.email.as_ref()).filter(|s| is_valid_email(s));
    if email.is_none() {
        errors.push(FieldError::new(
            "email",
            "email must be a valid email address",
            input.email.as_ref(),
        ));
    }

    let message = non_empty_text(input.message.as_ref());
    if message.is_none() {
        errors.push(FieldError::new(
            "message",
            "message must not be empty",
            input.message.as_ref(),
        ));
    }

    let rating = input.rating.as_ref().and_then(parse_rating);
    if rating.is_none() {
        errors.push(FieldError::new(
            "rating",
            format!("rating must be an integer between {} and {}", Rating::MIN, Rating::MAX),
            input.rating.as_ref(),
        ));
    }

    match (name, email, message, rating) {
        (Some(name), Some(email), Some(message), Some(rating)) => Ok(NewFeedback {
            name,
            email,
            message,
            rating,
            created_at: supplied_timestamp(input.created_at.as_ref()),
        }),
        _ => Err(errors),
    }
}

pub fn is_valid_email(s: &str) -> bool {
    if s.len() > MAX_EMAIL_LEN {
        return false;
    }
    match s.split_once('@') {
        Some((local, _)) if local.len() <= MAX_LOCAL_PART_LEN => EMAIL_RE.is_match(s),
        _ => false,
    }
}

/// Strings pass through; numbers and booleans become their text form.
fn coerce_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn non_empty_text(value: Option<&Value>) -> Option<String> {
    coerce_text(value).filter(|s| !s.is_empty())
}

fn parse_rating(value: &Value) -> Option<Rating> {
    let n = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i,
            None => {
                let f = n.as_f64()?;
                if !f.is_finite() || f.fract() != 0.0 || f.abs() > i64::MAX as f64 {
                    return None;
                }
                f as i64
            }
        },
        Value::String(s) => s.parse::<i64>().ok()?,
        _ => return None,
    };
    Rating::new(n)
}

/// A caller-supplied `createdAt` is kept only if it is a non-empty string.
fn supplied_timestamp(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
