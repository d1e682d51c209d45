use crate::shared::infrastructure::key_value_store::{KeyValueStore, KeyValueStoreError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
    is_offline: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&self) {
        self.is_offline.fetch_xor(true, Ordering::SeqCst);
    }

    /// Number of successful `set` calls so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn ensure_online(&self) -> Result<(), KeyValueStoreError> {
        if self.is_offline.load(Ordering::SeqCst) {
            return Err(KeyValueStoreError::Unavailable(
                "Key-value store offline".into(),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KeyValueStoreError> {
        self.ensure_online()?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KeyValueStoreError> {
        self.ensure_online()?;
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod in_memory_key_value_store_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn it_should_return_none_for_a_missing_key() {
        let store = InMemoryKeyValueStore::new();
        assert_eq!(store.get("unsyncedReviews").await.unwrap(), None);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_overwrite_the_value_on_set() {
        let store = InMemoryKeyValueStore::new();
        store.set("k", "first").await.unwrap();
        store.set("k", "second").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("second".to_string()));
        assert_eq!(store.writes(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fail_while_offline_and_recover_when_toggled_back() {
        let store = InMemoryKeyValueStore::new();
        store.toggle_offline();
        let result = store.set("k", "v").await;
        assert!(matches!(result, Err(KeyValueStoreError::Unavailable(_))));
        assert!(
            store
                .get("k")
                .await
                .unwrap_err()
                .to_string()
                .contains("Key-value store offline")
        );
        store.toggle_offline();
        store.set("k", "v").await.unwrap();
        assert_eq!(store.writes(), 1);
    }
}
