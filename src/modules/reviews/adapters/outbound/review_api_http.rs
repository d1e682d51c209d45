// HTTP implementation of the ReviewApi port against the site's REST API.
//
// Responsibilities
// - `POST {base}/reviews/` with `{name, rating, message}`, decode the stored review.
// - `GET {base}/reviews/`, accepting a bare array or a paginated `{results: [...]}` body.
//   Rows that do not decode are skipped so one bad row never hides the rest.
// - Map transport failures, timeouts and non-2xx answers onto ReviewApiError. An unreadable
//   2xx answer to a create is Unconfirmed: the server has stored the review.

use crate::modules::reviews::core::ports::{ReviewApi, ReviewApiError};
use crate::modules::reviews::core::review::{Review, ReviewDraft};
use serde::Deserialize;
use serde_json::Value as Json;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct HttpReviewApi {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReviewListBody {
    Plain(Vec<Json>),
    Paginated { results: Vec<Json> },
}

impl HttpReviewApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ReviewApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReviewApiError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn reviews_url(&self) -> String {
        format!("{}/reviews/", self.base_url)
    }
}

fn map_transport(err: reqwest::Error) -> ReviewApiError {
    if err.is_timeout() {
        ReviewApiError::Timeout
    } else if err.is_decode() {
        ReviewApiError::Decode(err.to_string())
    } else {
        ReviewApiError::Transport(err.to_string())
    }
}

async fn rejected(response: reqwest::Response) -> ReviewApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ReviewApiError::Rejected {
        status,
        detail: error_detail(&body),
    }
}

fn decode_rows(rows: Vec<Json>) -> Vec<Review> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value::<Review>(row) {
            Ok(review) => Some(review),
            Err(e) => {
                warn!(error = %e, "skipping review row that does not decode");
                None
            }
        })
        .collect()
}

/// DRF puts the human readable reason in `detail`, some views use `message`.
fn error_detail(body: &str) -> String {
    let from_json = serde_json::from_str::<Json>(body).ok().and_then(|json| {
        ["detail", "message"]
            .iter()
            .find_map(|field| json.get(field).and_then(Json::as_str).map(str::to_string))
    });
    match from_json {
        Some(detail) => detail,
        None if body.trim().is_empty() => "no detail".to_string(),
        None => body.trim().to_string(),
    }
}

#[async_trait::async_trait]
impl ReviewApi for HttpReviewApi {
    async fn create_review(&self, draft: &ReviewDraft) -> Result<Review, ReviewApiError> {
        let url = self.reviews_url();
        debug!(%url, "creating review");
        let response = self
            .client
            .post(&url)
            .json(draft)
            .send()
            .await
            .map_err(map_transport)?;
        if !response.status().is_success() {
            return Err(rejected(response).await);
        }
        response
            .json::<Review>()
            .await
            .map_err(|e| ReviewApiError::Unconfirmed(e.to_string()))
    }

    async fn list_reviews(&self) -> Result<Vec<Review>, ReviewApiError> {
        let url = self.reviews_url();
        debug!(%url, "listing reviews");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_transport)?;
        if !response.status().is_success() {
            return Err(rejected(response).await);
        }
        let body = response
            .json::<ReviewListBody>()
            .await
            .map_err(|e| ReviewApiError::Decode(e.to_string()))?;
        let rows = match body {
            ReviewListBody::Plain(rows) => rows,
            ReviewListBody::Paginated { results } => results,
        };
        Ok(decode_rows(rows))
    }
}
