//! iNaturalist taxa API client
//!
//! Free-text species lookup against the taxa autocomplete endpoint, scoped
//! to the bird taxonomic root. Raw API records are validated and converted
//! to `SpeciesRecord` here; loosely-typed values never travel further
//! inward.

use lifer_common::SpeciesRecord;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::retry;

const INAT_BASE_URL: &str = "https://api.inaturalist.org/v1";
const USER_AGENT: &str = "LiferQuiz/0.1.0 (https://github.com/lifer/lifer-quiz)";

/// iNaturalist taxon id of the class Aves; keeps lookups bird-scoped
const AVES_TAXON_ID: u32 = 3;

/// Taxon rank accepted for list entries
const SPECIES_RANK: &str = "species";

/// Retries after the initial attempt
const MAX_RETRIES: u32 = 3;

/// Base for the linearly increasing retry delay (2s, 4s, 6s)
const RETRY_BASE_DELAY_MS: u64 = 2000;

/// iNaturalist client errors
#[derive(Debug, Error)]
pub enum InatError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Taxa autocomplete response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TaxaResponse {
    pub results: Vec<RawTaxon>,
}

/// One candidate taxon as the API returns it
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawTaxon {
    /// Stable taxon identifier
    pub id: u64,
    /// Taxonomic rank ("species", "genus", ...)
    pub rank: Option<String>,
    /// Scientific name
    pub name: Option<String>,
    /// Preferred common name, when curated
    pub preferred_common_name: Option<String>,
    /// Representative photo
    pub default_photo: Option<RawPhoto>,
}

/// Photo attachment on a taxon record
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawPhoto {
    pub medium_url: Option<String>,
}

impl RawTaxon {
    fn photo_url(&self) -> Option<&str> {
        self.default_photo
            .as_ref()
            .and_then(|p| p.medium_url.as_deref())
    }

    fn is_species_with_photo(&self) -> bool {
        self.rank.as_deref() == Some(SPECIES_RANK) && self.photo_url().is_some()
    }

    /// Validated conversion; rejects records without a scientific name
    fn to_record(&self) -> Option<SpeciesRecord> {
        let scientific_name = self.name.as_ref()?.clone();
        Some(SpeciesRecord {
            id: self.id,
            common_name: self.preferred_common_name.clone(),
            scientific_name,
            photo_url: self.photo_url().map(str::to_string),
        })
    }
}

/// Pick the best candidate for a free-text input.
///
/// Prefers a species-rank record with a photo whose scientific or common
/// name matches the input case-insensitively, falling back to the first
/// species-rank record with a photo.
pub fn select_candidate(input: &str, results: &[RawTaxon]) -> Option<SpeciesRecord> {
    let wanted = input.trim().to_lowercase();

    let name_matches = |taxon: &RawTaxon| {
        taxon
            .name
            .as_deref()
            .map(|n| n.to_lowercase() == wanted)
            .unwrap_or(false)
            || taxon
                .preferred_common_name
                .as_deref()
                .map(|n| n.to_lowercase() == wanted)
                .unwrap_or(false)
    };

    results
        .iter()
        .find(|t| t.is_species_with_photo() && name_matches(t))
        .or_else(|| results.iter().find(|t| t.is_species_with_photo()))
        .and_then(RawTaxon::to_record)
}

/// iNaturalist API client
pub struct InatClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl InatClient {
    pub fn new() -> Result<Self, InatError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| InatError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: INAT_BASE_URL.to_string(),
        })
    }

    /// Resolve one free-text name to a species record.
    ///
    /// Transient failures are retried up to 3 times with linearly increasing
    /// delay before the name degrades to "no match". Failure here never
    /// propagates as an error; the caller sees `None`.
    pub async fn lookup(&self, name: &str) -> Option<SpeciesRecord> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return None;
        }

        let attempt = retry::retry_linear(
            "species lookup",
            MAX_RETRIES,
            Duration::from_millis(RETRY_BASE_DELAY_MS),
            || self.autocomplete(trimmed),
        )
        .await;

        match attempt {
            Ok(results) => {
                let record = select_candidate(trimmed, &results);
                if record.is_none() {
                    tracing::info!(name = trimmed, "No usable species match");
                }
                record
            }
            Err(e) => {
                tracing::warn!(name = trimmed, error = %e, "Species lookup failed");
                None
            }
        }
    }

    /// Query the autocomplete endpoint once
    async fn autocomplete(&self, query: &str) -> Result<Vec<RawTaxon>, InatError> {
        let url = format!("{}/taxa/autocomplete", self.base_url);
        let taxon_id = AVES_TAXON_ID.to_string();

        let response = self
            .http_client
            .get(&url)
            .query(&[("q", query), ("taxon_id", taxon_id.as_str())])
            .send()
            .await
            .map_err(|e| InatError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(InatError::ApiError(status.as_u16(), error_text));
        }

        let parsed: TaxaResponse = response
            .json()
            .await
            .map_err(|e| InatError::ParseError(e.to_string()))?;

        Ok(parsed.results)
    }
}
