//! Sample data for tests.

use chrono::{DateTime, TimeDelta, Utc};
use sillage_api_models::{CollectionEntry, Perfume, UserProfile};

/// Perfume with the given identity and no notes.
#[must_use]
pub fn perfume(id: i64, name: &str, brand: &str) -> Perfume {
    Perfume {
        id,
        name: name.to_string(),
        brand: brand.to_string(),
        perfumer: None,
        notes: Vec::new(),
        accords: Vec::new(),
        created_at: None,
        updated_at: None,
    }
}

/// Small catalogue with overlapping names, brands and accords.
#[must_use]
pub fn sample_catalogue() -> Vec<Perfume> {
    fn with(id: i64, name: &str, brand: &str, notes: &[&str], accords: &[&str]) -> Perfume {
        Perfume {
            notes: notes.iter().map(ToString::to_string).collect(),
            accords: accords.iter().map(ToString::to_string).collect(),
            ..perfume(id, name, brand)
        }
    }
    vec![
        with(1, "Ambre Nuit", "Maison X", &["Ámbar", "Rosa"], &["Oriental"]),
        with(2, "Rosa Blanca", "Casa Flor", &["Rosa", "Peonía"], &["Floral"]),
        with(3, "Noir Intense", "Maison X", &["Oud", "Cuero"], &["Amaderado"]),
        with(4, "Agua Fresca", "Costa", &["Bergamota"], &["Cítrico"]),
        with(5, "Rosa Noir", "Casa Flor", &["Rosa", "Pachulí"], &["Chipre"]),
    ]
}

/// Deterministic timestamp `offset_secs` after a fixed origin.
#[must_use]
pub fn timestamp(offset_secs: i64) -> DateTime<Utc> {
    DateTime::UNIX_EPOCH + TimeDelta::seconds(1_740_000_000 + offset_secs)
}

/// Collection entry for `perfume` added at `timestamp(offset_secs)`.
#[must_use]
pub fn entry(perfume: Perfume, offset_secs: i64) -> CollectionEntry {
    CollectionEntry {
        perfume,
        added_at: timestamp(offset_secs),
    }
}

/// Signed-in user profile.
#[must_use]
pub fn profile() -> UserProfile {
    UserProfile {
        id: 7,
        email: "ana@example.com".to_string(),
        first_name: Some("Ana".to_string()),
        last_name: Some("Ruiz".to_string()),
        subscribed: false,
        queries_remaining: 0,
        active: true,
        verified: true,
    }
}
