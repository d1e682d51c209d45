// Scheduled runner for the resync handler.
//
// Responsibilities
// - Tick once on start, then on a fixed interval.
// - Stop issuing ticks once the handle is stopped or dropped.

use crate::modules::reviews::core::ports::ReviewApi;
use crate::modules::reviews::use_cases::resync_pending_reviews::handler::ResyncPendingReviewsHandler;
use crate::shared::infrastructure::key_value_store::KeyValueStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

pub const DEFAULT_RESYNC_INTERVAL: Duration = Duration::from_secs(30);

const MIN_RESYNC_INTERVAL: Duration = Duration::from_millis(1);

pub struct ResyncWorker<TApi, TStore>
where
    TApi: ReviewApi + 'static,
    TStore: KeyValueStore + 'static,
{
    handler: Arc<ResyncPendingReviewsHandler<TApi, TStore>>,
    interval: Duration,
}

impl<TApi, TStore> ResyncWorker<TApi, TStore>
where
    TApi: ReviewApi + 'static,
    TStore: KeyValueStore + 'static,
{
    pub fn new(handler: Arc<ResyncPendingReviewsHandler<TApi, TStore>>, interval: Duration) -> Self {
        Self {
            handler,
            interval: interval.max(MIN_RESYNC_INTERVAL),
        }
    }

    pub fn spawn(self) -> ResyncHandle {
        let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            debug!(interval = ?self.interval, "resync worker started");
            loop {
                tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        self.handler.tick().await;
                    }
                }
            }
            debug!("resync worker stopped");
        });
        ResyncHandle {
            shutdown: Some(shutdown),
            task: Some(task),
        }
    }
}

/// Owner of a running worker. Dropping it aborts the worker.
pub struct ResyncHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ResyncHandle {
    /// Lets an in-flight tick finish, then waits for the worker to exit.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "resync worker ended abnormally");
                }
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for ResyncHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
