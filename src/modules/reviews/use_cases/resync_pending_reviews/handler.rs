// Resync handler delivers queued drafts, one pass per tick.
//
// Responsibilities
// - Return immediately when nothing is queued.
// - Attempt every queued draft in order; a failure never stops the pass.
// - Confirm delivered drafts in the feed and drop them from the queue. A draft the server
//   stored without a readable answer is dropped too and its placeholder stays.
// - Never fail: problems are logged and the drafts stay queued for the next tick.

use crate::modules::reviews::adapters::outbound::draft_store::LocalDraftStore;
use crate::modules::reviews::core::feed::ReviewFeed;
use crate::modules::reviews::core::ports::ReviewApi;
use crate::modules::reviews::core::review::PendingReview;
use crate::shared::infrastructure::key_value_store::KeyValueStore;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResyncState {
    #[default]
    Idle,
    Syncing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    pub attempted: usize,
    pub delivered: usize,
    /// Queued drafts that failed this tick.
    pub remaining: usize,
    /// Stored drafts that no longer validate and were dropped.
    pub discarded: usize,
    /// Another tick was already running.
    pub skipped: bool,
}

pub struct ResyncPendingReviewsHandler<TApi, TStore>
where
    TApi: ReviewApi + 'static,
    TStore: KeyValueStore + 'static,
{
    api: Arc<TApi>,
    drafts: Arc<LocalDraftStore<TStore>>,
    feed: Arc<ReviewFeed>,
    state: watch::Sender<ResyncState>,
    running: Mutex<()>,
}

impl<TApi, TStore> ResyncPendingReviewsHandler<TApi, TStore>
where
    TApi: ReviewApi + 'static,
    TStore: KeyValueStore + 'static,
{
    pub fn new(api: Arc<TApi>, drafts: Arc<LocalDraftStore<TStore>>, feed: Arc<ReviewFeed>) -> Self {
        let (state, _) = watch::channel(ResyncState::Idle);
        Self {
            api,
            drafts,
            feed,
            state,
            running: Mutex::new(()),
        }
    }

    pub fn state(&self) -> ResyncState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ResyncState> {
        self.state.subscribe()
    }

    pub async fn tick(&self) -> TickReport {
        let Ok(_running) = self.running.try_lock() else {
            debug!("resync already in progress, skipping tick");
            return TickReport {
                skipped: true,
                ..TickReport::default()
            };
        };

        let queued = match self.drafts.load_all().await {
            Ok(queued) => queued,
            Err(e) => {
                warn!(error = %e, "could not read queued reviews, skipping tick");
                return TickReport::default();
            }
        };
        if queued.is_empty() {
            return TickReport::default();
        }

        self.state.send_replace(ResyncState::Syncing);
        let report = self.deliver(queued).await;
        self.state.send_replace(ResyncState::Idle);

        info!(
            attempted = report.attempted,
            delivered = report.delivered,
            remaining = report.remaining,
            discarded = report.discarded,
            "resync tick finished"
        );
        report
    }

    async fn deliver(&self, queued: Vec<PendingReview>) -> TickReport {
        let mut report = TickReport::default();
        let mut settled: Vec<PendingReview> = Vec::new();

        for pending in queued {
            let draft = match pending.to_draft() {
                Ok(draft) => draft,
                Err(e) => {
                    warn!(error = %e, name = %pending.name, "dropping queued review that no longer validates");
                    report.discarded += 1;
                    settled.push(pending);
                    continue;
                }
            };
            report.attempted += 1;
            match self.api.create_review(&draft).await {
                Ok(review) => {
                    debug!(review_id = %review.id, "queued review delivered");
                    self.feed.confirm(pending.content_key(), review).await;
                    report.delivered += 1;
                    settled.push(pending);
                }
                Err(e) if e.is_delivered() => {
                    warn!(error = %e, "queued review stored without a readable confirmation");
                    report.delivered += 1;
                    settled.push(pending);
                }
                Err(e) => {
                    debug!(error = %e, "queued review still undeliverable");
                    report.remaining += 1;
                }
            }
        }

        // Re-read under the store lock so drafts queued while this tick ran are kept.
        if settled.is_empty() {
            return report;
        }
        if let Err(e) = self
            .drafts
            .remove_matching(|p| settled.contains(p))
            .await
        {
            warn!(error = %e, "could not drop delivered reviews from the queue, they will be sent again");
        }
        report
    }
}
