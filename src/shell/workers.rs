use crate::modules::reviews::core::ports::ReviewApi;
use crate::modules::reviews::use_cases::resync_pending_reviews::worker::{ResyncHandle, ResyncWorker};
use crate::shared::infrastructure::key_value_store::KeyValueStore;
use crate::shell::state::AppState;
use std::time::Duration;
use tracing::info;

/// Starts the background resync loop. Keep the handle alive for as long as the loop should run.
pub fn spawn_resync_worker<TApi, TStore>(state: &AppState<TApi, TStore>, interval: Duration) -> ResyncHandle
where
    TApi: ReviewApi + 'static,
    TStore: KeyValueStore + 'static,
{
    info!(interval = ?interval, "starting resync worker");
    ResyncWorker::new(state.resync_handler.clone(), interval).spawn()
}

#[cfg(test)]
mod workers_tests {
    use super::*;
    use crate::modules::reviews::adapters::outbound::review_api_in_memory::InMemoryReviewApi;
    use crate::modules::reviews::core::review::{PendingReview, Rating, ReviewDraft};
    use crate::shared::core::primitives::SystemClock;
    use crate::shared::infrastructure::key_value_store::in_memory::InMemoryKeyValueStore;
    use chrono::Utc;
    use rstest::rstest;
    use std::sync::Arc;

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn it_should_drain_the_queue_on_start() {
        let api = Arc::new(InMemoryReviewApi::new(Arc::new(SystemClock)));
        let state = AppState::new(api.clone(), Arc::new(InMemoryKeyValueStore::new()), Arc::new(SystemClock));
        let draft = ReviewDraft::new("A", Rating::default(), "Great").unwrap();
        state
            .drafts
            .append(PendingReview::from_draft(&draft, Utc::now()))
            .await
            .unwrap();

        let handle = spawn_resync_worker(&state, Duration::from_secs(30));
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(api.create_calls(), 1);
        assert!(state.drafts.load_all().await.unwrap().is_empty());
        handle.stop().await;
    }
}
