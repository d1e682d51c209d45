// Review domain model.
//
// Purpose
// - Validated user input (ReviewDraft), the visible entity (Review), and the record the
//   local draft store persists while a submission is unconfirmed (PendingReview).
//
// Responsibilities
// - Keep local placeholder ids and server ids in disjoint namespaces.
// - Own the "is this a placeholder?" predicate and the content match used for reconciliation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

pub const PLACEHOLDER_PREFIX: &str = "local-";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name is required")]
    EmptyName,

    #[error("message is required")]
    EmptyMessage,

    #[error("rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(i64),

    #[error("rating must be a whole number, got {0:?}")]
    RatingNotANumber(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlaceholderId(String);

impl PlaceholderId {
    /// Fresh id in the local namespace. UUID v7 keeps ids time ordered and never reissued.
    pub fn generate() -> Self {
        Self(format!("{PLACEHOLDER_PREFIX}{}", Uuid::now_v7()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PlaceholderId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.len() > PLACEHOLDER_PREFIX.len() && value.starts_with(PLACEHOLDER_PREFIX) {
            Ok(Self(value))
        } else {
            Err(format!("not a placeholder id: {value:?}"))
        }
    }
}

impl From<PlaceholderId> for String {
    fn from(id: PlaceholderId) -> Self {
        id.0
    }
}

impl fmt::Display for PlaceholderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server ids are JSON numbers, placeholder ids are `local-` strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReviewId {
    Server(i64),
    Placeholder(PlaceholderId),
}

impl ReviewId {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, ReviewId::Placeholder(_))
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewId::Server(id) => write!(f, "{id}"),
            ReviewId::Placeholder(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn value(self) -> u8 {
        self.0
    }

    /// Coerce raw form input such as `"5"` or `" 4 "`.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let value: i64 = raw
            .trim()
            .parse()
            .map_err(|_| ValidationError::RatingNotANumber(raw.to_string()))?;
        Self::try_from(value)
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self(Self::MAX)
    }
}

impl TryFrom<i64> for Rating {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match u8::try_from(value) {
            Ok(v) if (Self::MIN..=Self::MAX).contains(&v) => Ok(Self(v)),
            _ => Err(ValidationError::RatingOutOfRange(value)),
        }
    }
}

impl From<Rating> for i64 {
    fn from(rating: Rating) -> Self {
        i64::from(rating.0)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity used to match a placeholder, a queued draft and the server copy of the same submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentKey<'a> {
    pub name: &'a str,
    pub message: &'a str,
}

/// Validated submission payload. Serialises to the `POST /reviews/` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewDraft {
    name: String,
    rating: Rating,
    message: String,
}

impl ReviewDraft {
    pub fn new(
        name: impl Into<String>,
        rating: Rating,
        message: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_string();
        let message = message.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if message.is_empty() {
            return Err(ValidationError::EmptyMessage);
        }
        Ok(Self {
            name,
            rating,
            message,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rating(&self) -> Rating {
        self.rating
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn content_key(&self) -> ContentKey<'_> {
        ContentKey {
            name: &self.name,
            message: &self.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub name: String,
    pub rating: Rating,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn placeholder(id: PlaceholderId, draft: &ReviewDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ReviewId::Placeholder(id),
            name: draft.name.clone(),
            rating: draft.rating,
            message: draft.message.clone(),
            created_at,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.is_placeholder()
    }

    pub fn content_key(&self) -> ContentKey<'_> {
        ContentKey {
            name: &self.name,
            message: &self.message,
        }
    }
}

/// A submission waiting for delivery. Carries the provisional timestamp, never the placeholder id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReview {
    pub name: String,
    pub rating: Rating,
    pub message: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl PendingReview {
    pub fn from_draft(draft: &ReviewDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            name: draft.name.clone(),
            rating: draft.rating,
            message: draft.message.clone(),
            created_at,
        }
    }

    /// Persisted records are re-validated before they are sent again.
    pub fn to_draft(&self) -> Result<ReviewDraft, ValidationError> {
        ReviewDraft::new(self.name.clone(), self.rating, self.message.clone())
    }

    /// Visible stand-in for a queued draft restored from storage.
    pub fn to_placeholder(&self) -> Review {
        Review {
            id: ReviewId::Placeholder(PlaceholderId::generate()),
            name: self.name.clone(),
            rating: self.rating,
            message: self.message.clone(),
            created_at: self.created_at,
        }
    }

    pub fn content_key(&self) -> ContentKey<'_> {
        ContentKey {
            name: &self.name,
            message: &self.message,
        }
    }
}
