// Visible review list, newest first.
//
// Purpose
// - Hold confirmed reviews and optimistic placeholders side by side for the view.
//
// Responsibilities
// - At most one placeholder per (name, message) at any time.
// - Replace placeholders with the server copy at the front of the list.
// - Broadcast change notifications for observers that aggregate counts.

use crate::modules::reviews::core::review::{
    ContentKey, PlaceholderId, Review, ReviewDraft, ReviewId,
};
use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, broadcast};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    PlaceholderInserted(PlaceholderId),
    Confirmed { review_id: ReviewId, replaced: usize },
    Reloaded { len: usize },
}

pub struct ReviewFeed {
    reviews: RwLock<Vec<Review>>,
    events: broadcast::Sender<FeedEvent>,
}

impl Default for ReviewFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewFeed {
    pub fn new() -> Self {
        Self::with_reviews(Vec::new())
    }

    pub fn with_reviews(reviews: Vec<Review>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            reviews: RwLock::new(reviews),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> Vec<Review> {
        self.reviews.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.reviews.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.reviews.read().await.is_empty()
    }

    pub async fn replace_all(&self, reviews: Vec<Review>) {
        let len = reviews.len();
        *self.reviews.write().await = reviews;
        self.notify(FeedEvent::Reloaded { len });
    }

    /// Optimistic insert. Reuses the existing placeholder when the same content is already pending.
    pub async fn insert_placeholder(
        &self,
        draft: &ReviewDraft,
        created_at: DateTime<Utc>,
    ) -> PlaceholderId {
        let mut reviews = self.reviews.write().await;
        let existing = reviews.iter().find_map(|r| match &r.id {
            ReviewId::Placeholder(id) if r.content_key() == draft.content_key() => Some(id.clone()),
            _ => None,
        });
        if let Some(id) = existing {
            return id;
        }
        let id = PlaceholderId::generate();
        reviews.insert(0, Review::placeholder(id.clone(), draft, created_at));
        drop(reviews);
        self.notify(FeedEvent::PlaceholderInserted(id.clone()));
        id
    }

    /// Swap the placeholders of the submitted content (and any stale copy of the same server
    /// review) for the server copy. `submitted` is what the user sent, the server may have
    /// normalised the fields it returns. Returns how many entries were replaced.
    pub async fn confirm(&self, submitted: ContentKey<'_>, review: Review) -> usize {
        let mut reviews = self.reviews.write().await;
        let before = reviews.len();
        reviews.retain(|r| {
            let same_placeholder = r.is_placeholder() && r.content_key() == submitted;
            !same_placeholder && r.id != review.id
        });
        let replaced = before - reviews.len();
        let review_id = review.id.clone();
        reviews.insert(0, review);
        drop(reviews);
        self.notify(FeedEvent::Confirmed {
            review_id,
            replaced,
        });
        replaced
    }

    fn notify(&self, event: FeedEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
