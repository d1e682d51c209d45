use crate::modules::reviews::adapters::outbound::draft_store::LocalDraftStore;
use crate::modules::reviews::adapters::outbound::review_api_in_memory::InMemoryReviewApi;
use crate::modules::reviews::core::feed::ReviewFeed;
use crate::modules::reviews::core::review::{PendingReview, Rating, Review, ReviewDraft, ReviewId};
use crate::modules::reviews::use_cases::resync_pending_reviews::handler::ResyncPendingReviewsHandler;
use crate::modules::reviews::use_cases::submit_review::handler::SubmitReviewHandler;
use crate::shared::core::primitives::{Clock, FixedClock};
use crate::shared::infrastructure::key_value_store::in_memory::InMemoryKeyValueStore;
use chrono::{TimeZone, Utc};
use std::sync::Arc;

struct Harness {
    api: Arc<InMemoryReviewApi>,
    kv: Arc<InMemoryKeyValueStore>,
    drafts: Arc<LocalDraftStore<InMemoryKeyValueStore>>,
    feed: Arc<ReviewFeed>,
    submit: Arc<SubmitReviewHandler<InMemoryReviewApi, InMemoryKeyValueStore>>,
    resync: Arc<ResyncPendingReviewsHandler<InMemoryReviewApi, InMemoryKeyValueStore>>,
}

fn harness_with(api: InMemoryReviewApi, clock: Arc<dyn Clock>) -> Harness {
    let api = Arc::new(api);
    let kv = Arc::new(InMemoryKeyValueStore::new());
    let drafts = Arc::new(LocalDraftStore::new(kv.clone()));
    let feed = Arc::new(ReviewFeed::new());
    let submit = Arc::new(SubmitReviewHandler::new(
        api.clone(),
        drafts.clone(),
        feed.clone(),
        clock,
    ));
    let resync = Arc::new(ResyncPendingReviewsHandler::new(
        api.clone(),
        drafts.clone(),
        feed.clone(),
    ));
    Harness {
        api,
        kv,
        drafts,
        feed,
        submit,
        resync,
    }
}

fn clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ))
}

fn great_review() -> ReviewDraft {
    ReviewDraft::new("A", Rating::try_from(5_i64).unwrap(), "Great").unwrap()
}

fn matches_great(review: &Review) -> bool {
    review.name == "A" && review.rating.value() == 5 && review.message == "Great"
}

async fn wait_for_calls(api: &InMemoryReviewApi, calls: usize) {
    while api.create_calls() < calls {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn placeholder_is_visible_before_the_network_call_resolves() {
    let h = harness_with(InMemoryReviewApi::new(clock()).gated(), clock());

    let pending = tokio::spawn({
        let submit = h.submit.clone();
        async move { submit.handle(great_review()).await }
    });
    wait_for_calls(&h.api, 1).await;

    let reviews = h.feed.snapshot().await;
    assert_eq!(reviews.len(), 1);
    assert!(matches_great(&reviews[0]));
    assert!(reviews[0].is_placeholder());
    assert!(!pending.is_finished());

    h.api.release(1);
    assert!(pending.await.unwrap().is_ok());
}

#[tokio::test]
async fn successful_submission_is_reconciled_with_the_server_copy() {
    let seeded = Review {
        id: ReviewId::Server(41),
        name: "Earlier".into(),
        rating: Rating::default(),
        message: "Earlier review".into(),
        created_at: Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap(),
    };
    let h = harness_with(InMemoryReviewApi::new(clock()).with_reviews(vec![seeded]), clock());

    let saved = h.submit.handle(great_review()).await.unwrap();

    assert_eq!(saved.id, ReviewId::Server(42));
    assert_eq!(
        saved.created_at,
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    );
    let reviews = h.feed.snapshot().await;
    let matching: Vec<&Review> = reviews.iter().filter(|r| matches_great(r)).collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].id, ReviewId::Server(42));
    assert!(
        h.drafts
            .load_all()
            .await
            .unwrap()
            .iter()
            .all(|d| d.content_key() != saved.content_key())
    );
}

#[tokio::test]
async fn failed_submission_keeps_the_placeholder_and_queues_one_draft() {
    let h = harness_with(InMemoryReviewApi::new(clock()), clock());
    h.api.toggle_offline();

    assert!(h.submit.handle(great_review()).await.is_err());

    let reviews = h.feed.snapshot().await;
    assert_eq!(reviews.len(), 1);
    assert!(reviews[0].is_placeholder());
    assert!(matches_great(&reviews[0]));
    let queued = h.drafts.load_all().await.unwrap();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].to_draft().unwrap(), great_review());
}

#[tokio::test]
async fn resync_delivers_a_queued_draft_after_a_failed_attempt() {
    let h = harness_with(InMemoryReviewApi::new(clock()), clock());
    let queued = PendingReview::from_draft(&great_review(), clock().now());
    h.drafts.save_all(std::slice::from_ref(&queued)).await.unwrap();
    h.feed.replace_all(vec![queued.to_placeholder()]).await;
    h.api.fail_next(1);

    let first = h.resync.tick().await;
    assert_eq!(first.remaining, 1);
    assert_eq!(h.drafts.load_all().await.unwrap().len(), 1);

    let second = h.resync.tick().await;
    assert_eq!(second.delivered, 1);
    assert!(h.drafts.load_all().await.unwrap().is_empty());
    let reviews = h.feed.snapshot().await;
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].id, ReviewId::Server(1));
    assert!(matches_great(&reviews[0]));
}

#[tokio::test]
async fn identical_pending_submissions_share_one_placeholder_and_one_queue_entry() {
    let h = harness_with(InMemoryReviewApi::new(clock()).gated(), clock());
    h.api.toggle_offline();

    let first = tokio::spawn({
        let submit = h.submit.clone();
        async move { submit.handle(great_review()).await }
    });
    wait_for_calls(&h.api, 1).await;
    let second = tokio::spawn({
        let submit = h.submit.clone();
        async move { submit.handle(great_review()).await }
    });
    wait_for_calls(&h.api, 2).await;

    assert_eq!(h.feed.len().await, 1);

    h.api.release(2);
    let first = first.await.unwrap().unwrap_err();
    let second = second.await.unwrap().unwrap_err();
    assert_eq!(first.placeholder_id, second.placeholder_id);

    let reviews = h.feed.snapshot().await;
    assert_eq!(reviews.iter().filter(|r| r.is_placeholder()).count(), 1);
    assert_eq!(h.drafts.load_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn resync_with_an_empty_queue_makes_no_calls_and_leaves_the_feed_alone() {
    let h = harness_with(InMemoryReviewApi::new(clock()), clock());
    h.submit.handle(great_review()).await.unwrap();
    let before = h.feed.snapshot().await;
    let calls = h.api.create_calls();
    let writes = h.kv.writes();

    let report = h.resync.tick().await;

    assert_eq!(report.attempted, 0);
    assert_eq!(h.api.create_calls(), calls);
    assert_eq!(h.kv.writes(), writes);
    assert_eq!(h.feed.snapshot().await, before);
}

#[tokio::test]
async fn a_draft_queued_during_a_tick_survives_for_the_next_tick() {
    let h = harness_with(InMemoryReviewApi::new(clock()).gated(), clock());
    let at = clock().now();
    h.drafts
        .append(PendingReview::from_draft(&great_review(), at))
        .await
        .unwrap();

    let tick = tokio::spawn({
        let resync = h.resync.clone();
        async move { resync.tick().await }
    });
    wait_for_calls(&h.api, 1).await;
    let late = ReviewDraft::new("B", Rating::default(), "Queued mid-tick").unwrap();
    h.drafts
        .append(PendingReview::from_draft(&late, at))
        .await
        .unwrap();
    h.api.release(1);
    assert_eq!(tick.await.unwrap().delivered, 1);

    let queued = h.drafts.load_all().await.unwrap();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].to_draft().unwrap(), late);

    h.api.release(1);
    assert_eq!(h.resync.tick().await.delivered, 1);
    assert!(h.drafts.load_all().await.unwrap().is_empty());
}
