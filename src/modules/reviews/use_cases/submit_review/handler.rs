// Submission handler orchestrates the optimistic write flow.
//
// Responsibilities
// - Show the review in the feed before any network I/O.
// - Send the draft to the Review API.
// - On success, swap the placeholder for the server copy and clear any queued copy.
// - On failure, keep the placeholder and queue the draft for the resync loop.
// - On a stored but unreadable answer, keep the placeholder and never queue the draft.
//
// Boundaries
// - Storage failures never fail a submission; they are logged and the session keeps the placeholder.

use crate::modules::reviews::adapters::outbound::draft_store::LocalDraftStore;
use crate::modules::reviews::core::feed::ReviewFeed;
use crate::modules::reviews::core::ports::{ReviewApi, ReviewApiError};
use crate::modules::reviews::core::review::{PendingReview, PlaceholderId, Review, ReviewDraft};
use crate::shared::core::primitives::Clock;
use crate::shared::infrastructure::key_value_store::KeyValueStore;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Advisory only: the review stays visible. When `queued` is set it is retried in the background,
/// otherwise the server already stored it and only the confirmation is missing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("review not confirmed yet: {source}")]
pub struct SubmitFailed {
    pub placeholder_id: PlaceholderId,
    pub queued: bool,
    #[source]
    pub source: ReviewApiError,
}

pub struct SubmitReviewHandler<TApi, TStore>
where
    TApi: ReviewApi + 'static,
    TStore: KeyValueStore + 'static,
{
    api: Arc<TApi>,
    drafts: Arc<LocalDraftStore<TStore>>,
    feed: Arc<ReviewFeed>,
    clock: Arc<dyn Clock>,
}

impl<TApi, TStore> SubmitReviewHandler<TApi, TStore>
where
    TApi: ReviewApi + 'static,
    TStore: KeyValueStore + 'static,
{
    pub fn new(
        api: Arc<TApi>,
        drafts: Arc<LocalDraftStore<TStore>>,
        feed: Arc<ReviewFeed>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            api,
            drafts,
            feed,
            clock,
        }
    }

    pub async fn handle(&self, draft: ReviewDraft) -> Result<Review, SubmitFailed> {
        let submitted_at = self.clock.now();
        let placeholder_id = self.feed.insert_placeholder(&draft, submitted_at).await;
        debug!(%placeholder_id, "optimistic review inserted");

        match self.api.create_review(&draft).await {
            Ok(review) => {
                self.feed.confirm(draft.content_key(), review.clone()).await;
                self.clear_queued(&draft).await;
                info!(review_id = %review.id, %placeholder_id, "review confirmed");
                Ok(review)
            }
            Err(source) if source.is_delivered() => {
                warn!(%placeholder_id, error = %source, "review stored without a readable confirmation");
                self.clear_queued(&draft).await;
                Err(SubmitFailed {
                    placeholder_id,
                    queued: false,
                    source,
                })
            }
            Err(source) => {
                warn!(%placeholder_id, error = %source, "review submission failed, queuing for resync");
                let pending = PendingReview::from_draft(&draft, submitted_at);
                match self.drafts.append(pending).await {
                    Ok(true) => {}
                    Ok(false) => debug!(%placeholder_id, "review already queued"),
                    Err(e) => warn!(
                        %placeholder_id,
                        error = %e,
                        "could not persist queued review, it is kept for this session only"
                    ),
                }
                Err(SubmitFailed {
                    placeholder_id,
                    queued: true,
                    source,
                })
            }
        }
    }

    async fn clear_queued(&self, draft: &ReviewDraft) {
        match self
            .drafts
            .remove_matching(|p| p.content_key() == draft.content_key())
            .await
        {
            Ok(0) => {}
            Ok(cleared) => debug!(cleared, "cleared queued copies of delivered review"),
            Err(e) => warn!(error = %e, "could not clear queued copies of delivered review"),
        }
    }
}
