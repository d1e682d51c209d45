// Ports define what the reviews core needs from the outside world, without implementing it.
//
// Purpose
// - Describe the remote Review API as a trait so use cases can run against a fake in tests.
//
// Boundaries
// - No concrete input or output here. Adapters implement this trait in the adapters layer.

use crate::modules::reviews::core::review::{Review, ReviewDraft};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReviewApiError {
    #[error("review api unreachable: {0}")]
    Transport(String),

    #[error("review api timed out")]
    Timeout,

    #[error("review api rejected the request ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("unexpected review api response: {0}")]
    Decode(String),

    /// The API answered 2xx, so the review is stored, but the body could not be read.
    #[error("review stored but the response was unreadable: {0}")]
    Unconfirmed(String),
}

impl ReviewApiError {
    /// Whether the server accepted the review despite the error. Such drafts must not be sent again.
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Unconfirmed(_))
    }
}

#[async_trait]
pub trait ReviewApi: Send + Sync {
    /// `POST /reviews/`; returns the canonical stored review.
    async fn create_review(&self, draft: &ReviewDraft) -> Result<Review, ReviewApiError>;

    /// `GET /reviews/`, newest first as the server orders them.
    async fn list_reviews(&self) -> Result<Vec<Review>, ReviewApiError>;
}
