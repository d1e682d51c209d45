// Browser-style key-value persistence port.
//
// Purpose
// - Durable string storage scoped to the client device (localStorage semantics).
//
// Boundaries
// - Whole values only. Callers that need list semantics serialise on top.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyValueStoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, KeyValueStoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), KeyValueStoreError>;
}

pub mod file;
pub mod in_memory;
