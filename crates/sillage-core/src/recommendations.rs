//! Event-based perfume recommendations.
//!
//! # Design
//! - Drafts are checked locally against the server's rules before submission.
//! - Reads and writes go through the shared [`ApiClient`].

use chrono::{Days, Local, NaiveDate, NaiveTime};
use serde::Serialize;
use sillage_api_models::{Recommendation, RecommendationRequest, VenueKind};
use tracing::info;

use crate::error::{ClientError, ClientResult};
use crate::http::ApiClient;

/// How many days ahead a recommendation may be requested.
pub const MAX_DAYS_AHEAD: u64 = 5;
/// Default page size for the history listing.
pub const DEFAULT_HISTORY_LIMIT: u32 = 10;

const MAX_TEXT_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 300;

/// Recommendation inputs as collected from the user.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationDraft {
    /// Day of the event.
    pub event_date: NaiveDate,
    /// Start time of the event.
    pub event_time: NaiveTime,
    /// Venue latitude in degrees.
    pub latitude: f64,
    /// Venue longitude in degrees.
    pub longitude: f64,
    /// Venue name.
    pub venue_name: String,
    /// Open-air or indoor.
    pub venue_kind: VenueKind,
    /// Free-text venue description.
    pub venue_description: String,
    /// Occasion being attended.
    pub occasion: String,
    /// What the user wants to convey.
    pub expectation: String,
    /// Planned attire.
    pub attire: String,
}

impl RecommendationDraft {
    /// Check the draft against `today` and build the request body.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] describing the first problem found.
    pub fn validate(&self, today: NaiveDate) -> ClientResult<RecommendationRequest> {
        if self.event_date < today {
            return Err(ClientError::validation("the event date cannot be in the past"));
        }
        let last_day = today
            .checked_add_days(Days::new(MAX_DAYS_AHEAD))
            .unwrap_or(NaiveDate::MAX);
        if self.event_date > last_day {
            return Err(ClientError::validation(format!(
                "recommendations are only available for the next {MAX_DAYS_AHEAD} days"
            )));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ClientError::validation("latitude must be between -90 and 90"));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ClientError::validation(
                "longitude must be between -180 and 180",
            ));
        }

        Ok(RecommendationRequest {
            event_date: self.event_date,
            event_time: self.event_time,
            latitude: self.latitude,
            longitude: self.longitude,
            venue_name: required_text("venue name", &self.venue_name, MAX_TEXT_LEN)?,
            venue_kind: self.venue_kind,
            venue_description: required_text(
                "venue description",
                &self.venue_description,
                MAX_DESCRIPTION_LEN,
            )?,
            occasion: required_text("occasion", &self.occasion, MAX_TEXT_LEN)?,
            expectation: required_text("expectation", &self.expectation, MAX_TEXT_LEN)?,
            attire: required_text("attire", &self.attire, MAX_TEXT_LEN)?,
        })
    }
}

fn required_text(field: &str, value: &str, max: usize) -> ClientResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ClientError::validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > max {
        return Err(ClientError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

#[derive(Serialize)]
struct HistoryQuery {
    limit: u32,
}

/// Remote recommendation operations.
#[derive(Clone)]
pub struct RecommendationRepository {
    api: ApiClient,
}

impl RecommendationRepository {
    /// Repository over the shared client.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Validate against today's date and request a recommendation.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid draft, otherwise the remote failure.
    pub async fn create(&self, draft: &RecommendationDraft) -> ClientResult<Recommendation> {
        let request = draft.validate(Local::now().date_naive())?;
        let recommendation: Recommendation =
            self.api.post_json("recommendations/", &request).await?;
        info!(recommendation_id = recommendation.id, "recommendation created");
        Ok(recommendation)
    }

    /// Most recent recommendations, newest first.
    ///
    /// # Errors
    ///
    /// Propagates remote failures.
    pub async fn history(&self, limit: Option<u32>) -> ClientResult<Vec<Recommendation>> {
        let query = HistoryQuery {
            limit: limit.unwrap_or(DEFAULT_HISTORY_LIMIT),
        };
        self.api.get_query("recommendations/history", &query).await
    }

    /// A single recommendation by id.
    ///
    /// # Errors
    ///
    /// Propagates remote failures (404 when the id does not belong to the user).
    pub async fn get(&self, id: i64) -> ClientResult<Recommendation> {
        self.api.get_json(&format!("recommendations/{id}")).await
    }
}
