// Shared test fixture for review drafts, seeded from `json/review_draft.json`.

use crate::modules::reviews::core::review::{Rating, ReviewDraft};
use serde::Deserialize;

const REVIEW_DRAFT_JSON: &str = include_str!("json/review_draft.json");

// JSON -> DTO (form shape)
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewDraftDto {
    pub name: String,
    pub rating: i64,
    pub message: String,
}

pub struct ReviewDraftBuilder {
    name: String,
    rating: i64,
    message: String,
}

impl Default for ReviewDraftBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl ReviewDraftBuilder {
    pub fn new() -> Self {
        let dto: ReviewDraftDto = serde_json::from_str(REVIEW_DRAFT_JSON).unwrap();
        Self {
            name: dto.name,
            rating: dto.rating,
            message: dto.message,
        }
    }

    pub fn name(mut self, v: impl Into<String>) -> Self {
        self.name = v.into();
        self
    }

    pub fn rating(mut self, v: i64) -> Self {
        self.rating = v;
        self
    }

    pub fn message(mut self, v: impl Into<String>) -> Self {
        self.message = v.into();
        self
    }

    pub fn build(self) -> ReviewDraft {
        let rating = Rating::try_from(self.rating).expect("fixture rating out of range");
        ReviewDraft::new(self.name, rating, self.message).expect("fixture draft invalid")
    }
}

#[cfg(test)]
mod review_draft_builder_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn default_delegates_to_new_and_parses_json() {
        let built = ReviewDraftBuilder::default().build();
        assert_eq!(built.name(), "Ada Lovelace");
        assert_eq!(built.rating().value(), 5);
        assert_eq!(
            built.message(),
            "Clear communication and the site shipped ahead of schedule."
        );
    }

    #[rstest]
    fn setters_override_all_fields() {
        let custom = ReviewDraftBuilder::new()
            .name("A")
            .rating(3)
            .message("Great")
            .build();
        assert_eq!(custom.name(), "A");
        assert_eq!(custom.rating().value(), 3);
        assert_eq!(custom.message(), "Great");
    }
}
