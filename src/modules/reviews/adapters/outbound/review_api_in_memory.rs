// In memory implementation of the ReviewApi port.
//
// Purpose
// - Stand in for the REST API in use case tests and local development.
//
// Responsibilities
// - Store created reviews newest first and assign increasing server ids.
// - Simulate outages: offline mode, a number of failing calls, stored reviews whose answer is
//   lost, and a gate that holds calls until released so callers can observe state before a
//   response arrives.

use crate::modules::reviews::core::ports::{ReviewApi, ReviewApiError};
use crate::modules::reviews::core::review::{Review, ReviewDraft, ReviewId};
use crate::shared::core::primitives::Clock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use tokio::sync::{RwLock, Semaphore};

pub struct InMemoryReviewApi {
    reviews: RwLock<Vec<Review>>,
    next_id: AtomicI64,
    clock: Arc<dyn Clock>,
    is_offline: AtomicBool,
    failures_remaining: AtomicUsize,
    unconfirmed_remaining: AtomicUsize,
    create_calls: AtomicUsize,
    gate: Option<Semaphore>,
}

impl InMemoryReviewApi {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            reviews: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
            clock,
            is_offline: AtomicBool::new(false),
            failures_remaining: AtomicUsize::new(0),
            unconfirmed_remaining: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    /// Seed existing reviews, newest first. Ids continue after the highest seeded server id.
    pub fn with_reviews(self, reviews: Vec<Review>) -> Self {
        let highest = reviews
            .iter()
            .filter_map(|r| match r.id {
                ReviewId::Server(id) => Some(id),
                ReviewId::Placeholder(_) => None,
            })
            .max()
            .unwrap_or(0);
        self.next_id.store(highest + 1, Ordering::SeqCst);
        Self {
            reviews: RwLock::new(reviews),
            ..self
        }
    }

    /// Hold every create call until `release` hands out a permit.
    pub fn gated(self) -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..self
        }
    }

    pub fn release(&self, calls: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(calls);
        }
    }

    pub fn toggle_offline(&self) {
        self.is_offline.fetch_xor(true, Ordering::SeqCst);
    }

    /// Reject the next `calls` create calls with a 503.
    pub fn fail_next(&self, calls: usize) {
        self.failures_remaining.store(calls, Ordering::SeqCst);
    }

    /// Store the next `calls` reviews but answer as if the response body were unreadable.
    pub fn unconfirm_next(&self, calls: usize) {
        self.unconfirmed_remaining.store(calls, Ordering::SeqCst);
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub async fn stored(&self) -> Vec<Review> {
        self.reviews.read().await.clone()
    }

    fn ensure_online(&self) -> Result<(), ReviewApiError> {
        if self.is_offline.load(Ordering::SeqCst) {
            return Err(ReviewApiError::Transport("Review API offline".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ReviewApi for InMemoryReviewApi {
    async fn create_review(&self, draft: &ReviewDraft) -> Result<Review, ReviewApiError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|_| ReviewApiError::Transport("Review API gate closed".into()))?
                .forget();
        }
        self.ensure_online()?;
        let failing = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ReviewApiError::Rejected {
                status: 503,
                detail: "Service unavailable".into(),
            });
        }
        let review = Review {
            id: ReviewId::Server(self.next_id.fetch_add(1, Ordering::SeqCst)),
            name: draft.name().to_string(),
            rating: draft.rating(),
            message: draft.message().to_string(),
            created_at: self.clock.now(),
        };
        self.reviews.write().await.insert(0, review.clone());
        let unconfirmed = self
            .unconfirmed_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if unconfirmed {
            return Err(ReviewApiError::Unconfirmed(
                "error decoding response body".into(),
            ));
        }
        Ok(review)
    }

    async fn list_reviews(&self) -> Result<Vec<Review>, ReviewApiError> {
        self.ensure_online()?;
        Ok(self.reviews.read().await.clone())
    }
}
