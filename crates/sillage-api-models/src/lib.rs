#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(
    missing_docs,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
//! Shared HTTP DTOs for the Sillage public API.
//!
//! The remote service speaks Spanish field names on the wire (`nombre`,
//! `marca`, `notas`, ...). These types keep English names in Rust and map the
//! wire names with serde renames, so the core and the CLI never handle raw
//! JSON keys.
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod timestamp;

/// Error document returned by every endpoint on failure.
///
/// Application errors carry a string `detail`; request validation failures
/// carry a list of `{loc, msg, type}` objects instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    /// Raw `detail` payload as sent by the server.
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    /// Normalise the `detail` payload into a single human-readable message.
    ///
    /// Returns `None` when the server did not provide a usable detail.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::String(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Value::Array(items) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                (!messages.is_empty()).then(|| messages.join("; "))
            }
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// Authenticated user profile as returned by `/users/me` and the auth endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    /// Server-assigned user identifier.
    pub id: i64,
    /// Login email address.
    pub email: String,
    /// Given name, when provided at registration.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name, when provided at registration.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Whether the user holds an active subscription.
    #[serde(rename = "suscrito", default)]
    pub subscribed: bool,
    /// Recommendation queries left in the current subscription period.
    #[serde(rename = "consultas_restantes", default)]
    pub queries_remaining: i64,
    /// Whether the account is enabled.
    #[serde(rename = "is_active", default = "default_true")]
    pub active: bool,
    /// Whether the email address has been verified.
    #[serde(rename = "is_verified", default)]
    pub verified: bool,
}

impl UserProfile {
    /// Display name built from the first and last name, falling back to the email.
    #[must_use]
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            self.email.clone()
        } else {
            parts.join(" ")
        }
    }
}

const fn default_true() -> bool {
    true
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Successful login/registration response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    /// Bearer token to attach to authenticated requests.
    pub access_token: String,
    /// Token scheme reported by the server (always `bearer` today).
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Profile of the authenticated user.
    pub user: UserProfile,
}

/// Form body of `POST /auth/login` (OAuth2 password flow field names).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LoginForm {
    /// Account email; the field is called `username` by the auth contract.
    pub username: String,
    /// Plain-text password.
    pub password: String,
}

/// JSON body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterRequest {
    /// Account email.
    pub email: String,
    /// Plain-text password (server requires at least 6 characters).
    pub password: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

/// Partial profile update for `PUT /users/me`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New given name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// New family name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// New password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ProfileUpdate {
    /// Whether the update carries no field at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.password.is_none()
    }
}

/// Subscription summary returned by `GET /users/me/subscription`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubscriptionStatus {
    /// Whether a subscription is active.
    #[serde(rename = "suscrito")]
    pub subscribed: bool,
    /// Remaining recommendation queries.
    #[serde(rename = "consultas_restantes")]
    pub queries_remaining: i64,
    /// Server-provided summary message.
    #[serde(default)]
    pub message: String,
}

/// Perfume record from the shared catalogue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Perfume {
    /// Catalogue identifier.
    pub id: i64,
    /// Commercial name.
    #[serde(rename = "nombre")]
    pub name: String,
    /// Brand or house.
    #[serde(rename = "marca")]
    pub brand: String,
    /// Perfumer credited for the composition.
    #[serde(rename = "perfumista", default, skip_serializing_if = "Option::is_none")]
    pub perfumer: Option<String>,
    /// Ordered olfactory notes.
    #[serde(rename = "notas", default)]
    pub notes: Vec<String>,
    /// Ordered main accords.
    #[serde(rename = "acordes", default)]
    pub accords: Vec<String>,
    /// Creation timestamp.
    #[serde(
        default,
        with = "timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    #[serde(
        default,
        with = "timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A perfume saved in the current user's collection.
///
/// The server flattens the perfume fields and `added_at` into one object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionEntry {
    /// The saved perfume.
    #[serde(flatten)]
    pub perfume: Perfume,
    /// When the perfume was added to the collection.
    #[serde(with = "timestamp")]
    pub added_at: DateTime<Utc>,
}

/// Creation payload for `POST /perfumes/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PerfumeCreate {
    /// Commercial name (required).
    #[serde(rename = "nombre")]
    pub name: String,
    /// Brand (required).
    #[serde(rename = "marca")]
    pub brand: String,
    /// Optional perfumer.
    #[serde(rename = "perfumista", skip_serializing_if = "Option::is_none")]
    pub perfumer: Option<String>,
    /// Ordered notes.
    #[serde(rename = "notas")]
    pub notes: Vec<String>,
    /// Ordered accords.
    #[serde(rename = "acordes")]
    pub accords: Vec<String>,
}

/// Query parameters for `GET /perfumes/search`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchQuery {
    /// Free text matched against name and brand.
    #[serde(rename = "q", skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Brand filter.
    #[serde(rename = "marca", skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Accord filter (exact accord match).
    #[serde(rename = "acorde", skip_serializing_if = "Option::is_none")]
    pub accord: Option<String>,
    /// Maximum number of results (server caps at 100).
    pub limit: u32,
}

impl SearchQuery {
    /// Free-text query with no filters.
    #[must_use]
    pub fn text(query: impl Into<String>, limit: u32) -> Self {
        Self {
            query: Some(query.into()),
            brand: None,
            accord: None,
            limit,
        }
    }
}

/// Acknowledgement body returned by collection mutations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Acknowledgement {
    /// Server confirmation message.
    #[serde(default)]
    pub message: String,
}

/// Venue setting for a recommendation request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VenueKind {
    /// Open-air venue.
    #[serde(rename = "abierto")]
    Open,
    /// Indoor venue.
    #[serde(rename = "cerrado")]
    Closed,
}

impl VenueKind {
    /// Parse the user-facing spelling (`open`/`closed`) or the wire spelling.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" | "abierto" | "outdoor" => Some(Self::Open),
            "closed" | "cerrado" | "indoor" => Some(Self::Closed),
            _ => None,
        }
    }

    /// User-facing label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// Body of `POST /recommendations/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationRequest {
    /// Event date.
    #[serde(rename = "fecha_evento")]
    pub event_date: NaiveDate,
    /// Event start time.
    #[serde(rename = "hora_evento")]
    pub event_time: NaiveTime,
    /// Venue latitude.
    #[serde(rename = "latitud")]
    pub latitude: f64,
    /// Venue longitude.
    #[serde(rename = "longitud")]
    pub longitude: f64,
    /// Venue name.
    #[serde(rename = "lugar_nombre")]
    pub venue_name: String,
    /// Open-air or indoor venue.
    #[serde(rename = "lugar_tipo")]
    pub venue_kind: VenueKind,
    /// Free-text venue description.
    #[serde(rename = "lugar_descripcion")]
    pub venue_description: String,
    /// Occasion being dressed for.
    #[serde(rename = "ocasion")]
    pub occasion: String,
    /// Impression the user hopes to make.
    #[serde(rename = "expectativa")]
    pub expectation: String,
    /// Planned attire.
    #[serde(rename = "vestimenta")]
    pub attire: String,
}

/// Perfume summary embedded in a recommendation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecommendedPerfume {
    /// Catalogue identifier.
    pub id: i64,
    /// Commercial name.
    #[serde(rename = "nombre")]
    pub name: String,
    /// Brand.
    #[serde(rename = "marca")]
    pub brand: String,
    /// Perfumer, when known.
    #[serde(rename = "perfumista", default)]
    pub perfumer: Option<String>,
    /// Ordered notes.
    #[serde(rename = "notas", default)]
    pub notes: Vec<String>,
    /// Ordered accords.
    #[serde(rename = "acordes", default)]
    pub accords: Vec<String>,
}

/// Recommendation generated for an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    /// Recommendation identifier.
    pub id: i64,
    /// Event date.
    #[serde(rename = "fecha_evento")]
    pub event_date: NaiveDate,
    /// Event start time.
    #[serde(rename = "hora_evento")]
    pub event_time: NaiveTime,
    /// Venue name.
    #[serde(rename = "lugar_nombre")]
    pub venue_name: String,
    /// Occasion.
    #[serde(rename = "ocasion")]
    pub occasion: String,
    /// Expected impression.
    #[serde(rename = "expectativa")]
    pub expectation: String,
    /// Planned attire.
    #[serde(rename = "vestimenta")]
    pub attire: String,
    /// Forecast summary for the event.
    #[serde(rename = "clima_descripcion")]
    pub weather_description: String,
    /// Forecast temperature in Celsius.
    #[serde(rename = "temperatura")]
    pub temperature: f64,
    /// Forecast relative humidity in percent.
    #[serde(rename = "humedad")]
    pub humidity: f64,
    /// Identifier of the recommended perfume, if one was chosen.
    #[serde(rename = "perfume_recomendado_id", default)]
    pub recommended_perfume_id: Option<i64>,
    /// Recommended perfume details, if one was chosen.
    #[serde(rename = "perfume_recomendado", default)]
    pub recommended_perfume: Option<RecommendedPerfume>,
    /// Short explanation of the choice.
    #[serde(rename = "explicacion", default)]
    pub explanation: Option<String>,
    /// Full assistant response.
    #[serde(rename = "respuesta_ia")]
    pub ai_response: String,
    /// Creation timestamp.
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}
