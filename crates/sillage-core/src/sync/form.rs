//! Perfume creation form.
//!
//! # Design
//! - Inputs stay as raw strings for lossless editing.
//! - Conversion to the wire payload happens once, on submit.

use sillage_api_models::PerfumeCreate;

use crate::error::{ClientError, ClientResult};

/// Raw contents of the "create perfume" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerfumeForm {
    /// Perfume name (required).
    pub name: String,
    /// Brand (required).
    pub brand: String,
    /// Perfumer (optional).
    pub perfumer: String,
    /// Comma-separated notes.
    pub notes: String,
    /// Comma-separated accords.
    pub accords: String,
}

impl PerfumeForm {
    /// Validate and convert into the creation payload.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] when the name or brand is blank.
    pub fn to_payload(&self) -> ClientResult<PerfumeCreate> {
        let name = self.name.trim();
        let brand = self.brand.trim();
        if name.is_empty() || brand.is_empty() {
            return Err(ClientError::validation("name and brand are required"));
        }
        let perfumer = self.perfumer.trim();
        Ok(PerfumeCreate {
            name: name.to_string(),
            brand: brand.to_string(),
            perfumer: (!perfumer.is_empty()).then(|| perfumer.to_string()),
            notes: split_list(&self.notes),
            accords: split_list(&self.accords),
        })
    }
}

/// Split a comma-separated list into trimmed, non-empty items, keeping order.
#[must_use]
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
