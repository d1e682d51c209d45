use crate::modules::reviews::adapters::outbound::draft_store::LocalDraftStore;
use crate::modules::reviews::adapters::outbound::review_api_http::HttpReviewApi;
use crate::modules::reviews::core::feed::ReviewFeed;
use crate::modules::reviews::core::ports::{ReviewApi, ReviewApiError};
use crate::modules::reviews::use_cases::load_review_feed::handler::LoadReviewFeedHandler;
use crate::modules::reviews::use_cases::resync_pending_reviews::handler::ResyncPendingReviewsHandler;
use crate::modules::reviews::use_cases::submit_review::handler::SubmitReviewHandler;
use crate::shared::core::primitives::{Clock, SystemClock};
use crate::shared::infrastructure::key_value_store::KeyValueStore;
use crate::shared::infrastructure::key_value_store::file::FileKeyValueStore;
use crate::shell::config::Config;
use std::sync::Arc;

pub type LiveAppState = AppState<HttpReviewApi, FileKeyValueStore>;

pub struct AppState<TApi, TStore>
where
    TApi: ReviewApi + 'static,
    TStore: KeyValueStore + 'static,
{
    pub feed: Arc<ReviewFeed>,
    pub drafts: Arc<LocalDraftStore<TStore>>,
    pub submit_handler: Arc<SubmitReviewHandler<TApi, TStore>>,
    pub resync_handler: Arc<ResyncPendingReviewsHandler<TApi, TStore>>,
    pub load_handler: Arc<LoadReviewFeedHandler<TApi, TStore>>,
}

impl<TApi, TStore> Clone for AppState<TApi, TStore>
where
    TApi: ReviewApi + 'static,
    TStore: KeyValueStore + 'static,
{
    fn clone(&self) -> Self {
        Self {
            feed: self.feed.clone(),
            drafts: self.drafts.clone(),
            submit_handler: self.submit_handler.clone(),
            resync_handler: self.resync_handler.clone(),
            load_handler: self.load_handler.clone(),
        }
    }
}

impl<TApi, TStore> AppState<TApi, TStore>
where
    TApi: ReviewApi + 'static,
    TStore: KeyValueStore + 'static,
{
    pub fn new(api: Arc<TApi>, store: Arc<TStore>, clock: Arc<dyn Clock>) -> Self {
        let feed = Arc::new(ReviewFeed::new());
        let drafts = Arc::new(LocalDraftStore::new(store));
        Self {
            submit_handler: Arc::new(SubmitReviewHandler::new(
                api.clone(),
                drafts.clone(),
                feed.clone(),
                clock,
            )),
            resync_handler: Arc::new(ResyncPendingReviewsHandler::new(
                api.clone(),
                drafts.clone(),
                feed.clone(),
            )),
            load_handler: Arc::new(LoadReviewFeedHandler::new(api, drafts.clone(), feed.clone())),
            feed,
            drafts,
        }
    }
}

impl LiveAppState {
    pub fn live(config: &Config) -> Result<Self, ReviewApiError> {
        let api = HttpReviewApi::new(config.api_base_url.clone(), config.http_timeout)?;
        Ok(Self::new(
            Arc::new(api),
            Arc::new(FileKeyValueStore::new(config.store_dir.clone())),
            Arc::new(SystemClock),
        ))
    }
}
