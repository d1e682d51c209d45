// Local draft store: the durable queue of reviews that have not reached the server yet.
//
// Responsibilities
// - Persist the whole queue as one JSON array under a fixed key of a KeyValueStore.
// - Offer append and remove as load-modify-save sequences, serialised within this process.
//
// Boundaries
// - Other processes sharing the same storage are last-writer-wins.

use crate::modules::reviews::core::review::PendingReview;
use crate::shared::infrastructure::key_value_store::{KeyValueStore, KeyValueStoreError};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

pub const UNSYNCED_REVIEWS_KEY: &str = "unsyncedReviews";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error(transparent)]
    Store(#[from] KeyValueStoreError),

    #[error("queued reviews are unreadable: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("queued reviews could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),
}

pub struct LocalDraftStore<TStore>
where
    TStore: KeyValueStore + 'static,
{
    store: Arc<TStore>,
    key: String,
    lock: Mutex<()>,
}

impl<TStore> LocalDraftStore<TStore>
where
    TStore: KeyValueStore + 'static,
{
    pub fn new(store: Arc<TStore>) -> Self {
        Self::with_key(store, UNSYNCED_REVIEWS_KEY)
    }

    pub fn with_key(store: Arc<TStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            lock: Mutex::new(()),
        }
    }

    pub async fn load_all(&self) -> Result<Vec<PendingReview>, PersistenceError> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    pub async fn save_all(&self, drafts: &[PendingReview]) -> Result<(), PersistenceError> {
        let _guard = self.lock.lock().await;
        self.write(drafts).await
    }

    /// Queue a draft unless the same (name, message) is already queued. Returns whether it was added.
    pub async fn append(&self, pending: PendingReview) -> Result<bool, PersistenceError> {
        let _guard = self.lock.lock().await;
        let mut drafts = self.read().await?;
        if drafts
            .iter()
            .any(|d| d.content_key() == pending.content_key())
        {
            return Ok(false);
        }
        drafts.push(pending);
        self.write(&drafts).await?;
        Ok(true)
    }

    /// Drop every queued draft matching `predicate`. Returns how many were dropped.
    pub async fn remove_matching<F>(&self, predicate: F) -> Result<usize, PersistenceError>
    where
        F: Fn(&PendingReview) -> bool + Send,
    {
        let _guard = self.lock.lock().await;
        let mut drafts = self.read().await?;
        let before = drafts.len();
        drafts.retain(|d| !predicate(d));
        let removed = before - drafts.len();
        if removed > 0 {
            self.write(&drafts).await?;
        }
        Ok(removed)
    }

    async fn read(&self) -> Result<Vec<PendingReview>, PersistenceError> {
        match self.store.get(&self.key).await? {
            Some(raw) if !raw.trim().is_empty() => {
                serde_json::from_str(&raw).map_err(PersistenceError::Corrupt)
            }
            _ => Ok(Vec::new()),
        }
    }

    async fn write(&self, drafts: &[PendingReview]) -> Result<(), PersistenceError> {
        let raw = serde_json::to_string(drafts).map_err(PersistenceError::Encode)?;
        self.store.set(&self.key, &raw).await?;
        Ok(())
    }
}
