use crate::error::Result;
use crate::models::{FeedbackInput, FeedbackRecord};
use crate::storage::FeedbackStore;
use crate::validation;
use std::sync::Arc;
use tracing::debug;

/// Validates submissions and hands them to the store. Holds no state of its own.
#[derive(Clone)]
pub struct FeedbackService {
    store: Arc<dyn FeedbackStore>,
}

impl FeedbackService {
    pub fn new(store: Arc<dyn FeedbackStore>) -> Self {
        FeedbackService { store }
    }

    /// Every record, in insertion order.
    pub fn list(&self) -> Result<Vec<FeedbackRecord>> {
        self.store.read_all()
    }

    /// Nothing reaches the store unless every field rule passes.
    pub fn create(&self, input: FeedbackInput) -> Result<FeedbackRecord> {
        let feedback = validation::validate(&input).map_err(|errors| {
            debug!(fields = ?errors.fields(), "rejected feedback");
            errors
        })?;
        self.store.append(feedback)
    }
}
