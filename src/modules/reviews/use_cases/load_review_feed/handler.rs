// Initial population of the feed: queued drafts first, then the confirmed reviews from the server.

use crate::modules::reviews::adapters::outbound::draft_store::LocalDraftStore;
use crate::modules::reviews::core::feed::ReviewFeed;
use crate::modules::reviews::core::ports::{ReviewApi, ReviewApiError};
use crate::modules::reviews::core::review::{PendingReview, Review};
use crate::shared::infrastructure::key_value_store::KeyValueStore;
use std::sync::Arc;
use tracing::{info, warn};

pub struct LoadReviewFeedHandler<TApi, TStore>
where
    TApi: ReviewApi + 'static,
    TStore: KeyValueStore + 'static,
{
    api: Arc<TApi>,
    drafts: Arc<LocalDraftStore<TStore>>,
    feed: Arc<ReviewFeed>,
}

impl<TApi, TStore> LoadReviewFeedHandler<TApi, TStore>
where
    TApi: ReviewApi + 'static,
    TStore: KeyValueStore + 'static,
{
    pub fn new(api: Arc<TApi>, drafts: Arc<LocalDraftStore<TStore>>, feed: Arc<ReviewFeed>) -> Self {
        Self { api, drafts, feed }
    }

    /// Replaces the feed and returns its new length. On an API failure the feed is left untouched.
    pub async fn handle(&self) -> Result<usize, ReviewApiError> {
        let confirmed = self.api.list_reviews().await?;
        let queued = self.drafts.load_all().await.unwrap_or_else(|e| {
            warn!(error = %e, "could not read queued reviews, showing confirmed reviews only");
            Vec::new()
        });

        let mut merged: Vec<Review> = Vec::with_capacity(queued.len() + confirmed.len());
        let mut seen: Vec<&PendingReview> = Vec::with_capacity(queued.len());
        for pending in &queued {
            if seen.iter().any(|s| s.content_key() == pending.content_key()) {
                continue;
            }
            seen.push(pending);
            merged.push(pending.to_placeholder());
        }
        merged.extend(confirmed);

        let len = merged.len();
        info!(pending = seen.len(), total = len, "review feed loaded");
        self.feed.replace_all(merged).await;
        Ok(len)
    }
}

#[cfg(test)]
mod load_review_feed_handler_tests {
    use super::*;
    use crate::modules::reviews::adapters::outbound::review_api_in_memory::InMemoryReviewApi;
    use crate::modules::reviews::core::review::{Rating, ReviewDraft, ReviewId};
    use crate::shared::core::primitives::FixedClock;
    use crate::shared::infrastructure::key_value_store::in_memory::InMemoryKeyValueStore;
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};

    struct Context {
        api: Arc<InMemoryReviewApi>,
        kv: Arc<InMemoryKeyValueStore>,
        drafts: Arc<LocalDraftStore<InMemoryKeyValueStore>>,
        feed: Arc<ReviewFeed>,
        handler: LoadReviewFeedHandler<InMemoryReviewApi, InMemoryKeyValueStore>,
    }

    fn draft(name: &str, message: &str) -> ReviewDraft {
        ReviewDraft::new(name, Rating::default(), message).unwrap()
    }

    #[fixture]
    fn before_each() -> Context {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ));
        let api = Arc::new(InMemoryReviewApi::new(clock));
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let drafts = Arc::new(LocalDraftStore::new(kv.clone()));
        let feed = Arc::new(ReviewFeed::new());
        let handler = LoadReviewFeedHandler::new(api.clone(), drafts.clone(), feed.clone());
        Context {
            api,
            kv,
            drafts,
            feed,
            handler,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_put_queued_drafts_in_front_of_confirmed_reviews(before_each: Context) {
        let ctx = before_each;
        ctx.api.create_review(&draft("Old", "Confirmed")).await.unwrap();
        let at = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();
        ctx.drafts
            .save_all(&[
                PendingReview::from_draft(&draft("A", "Queued"), at),
                PendingReview::from_draft(&draft("A", "Queued"), at),
            ])
            .await
            .unwrap();

        let len = ctx.handler.handle().await.unwrap();
        let reviews = ctx.feed.snapshot().await;
        assert_eq!(len, 2);
        assert!(reviews[0].is_placeholder());
        assert_eq!(reviews[0].message, "Queued");
        assert_eq!(reviews[0].created_at, at);
        assert_eq!(reviews[1].id, ReviewId::Server(1));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_show_confirmed_reviews_when_the_queue_is_unreadable(before_each: Context) {
        let ctx = before_each;
        ctx.api.create_review(&draft("Old", "Confirmed")).await.unwrap();
        ctx.kv.set("unsyncedReviews", "[{").await.unwrap();
        assert_eq!(ctx.handler.handle().await.unwrap(), 1);
        assert_eq!(ctx.feed.len().await, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_leave_the_feed_untouched_if_the_api_is_offline(before_each: Context) {
        let ctx = before_each;
        let at = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();
        ctx.feed.insert_placeholder(&draft("A", "Visible"), at).await;
        ctx.api.toggle_offline();
        assert!(ctx.handler.handle().await.is_err());
        assert_eq!(ctx.feed.len().await, 1);
    }
}
