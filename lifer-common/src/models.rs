//! Domain models shared across the workspace

use serde::{Deserialize, Serialize};

/// A single bird species as curated into a list.
///
/// Produced only by the validated parsing boundary in the lookup client;
/// immutable once added to a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesRecord {
    /// Stable upstream identifier, unique per species across sessions
    pub id: u64,
    /// Preferred common name, when the upstream source has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
    /// Scientific name; canonical display fallback and the media lookup key
    pub scientific_name: String,
    /// Representative photo URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl SpeciesRecord {
    /// Common name if present, else the scientific name
    pub fn display_name(&self) -> &str {
        self.common_name
            .as_deref()
            .unwrap_or(&self.scientific_name)
    }
}

/// A named, persisted snapshot of a species collection with its best streak
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedList {
    /// Unique (case-insensitive) non-empty name
    pub name: String,
    /// Snapshot of the species collection at save time
    pub species: Vec<SpeciesRecord>,
    /// Best correct-answer streak recorded against this list; only increases
    pub high_score: u32,
}
