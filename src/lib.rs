//! `feedbackhub` - collect feedback over HTTP, keep it in a JSON file,
//! and browse it from a desktop dashboard.

pub mod analytics;
pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod gui;
pub mod logging;
pub mod models;
pub mod service;
pub mod storage;
pub mod validation;

pub use analytics::Analytics;
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use models::{FeedbackInput, FeedbackRecord, FeedbackSubmission, NewFeedback, Rating};
pub use service::FeedbackService;
pub use storage::{FeedbackStore, JsonFileStore};
