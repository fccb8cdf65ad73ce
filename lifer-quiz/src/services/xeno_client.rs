//! xeno-canto sound archive client
//!
//! Resolves a species' scientific name to a recording URL, preferring
//! better-graded recordings, and backs the sounds proxy endpoint with its
//! three-tier quality fallback search.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const XENO_CANTO_BASE_URL: &str = "https://xeno-canto.org/api/2/recordings";
const USER_AGENT: &str = "LiferQuiz/0.1.0 (https://github.com/lifer/lifer-quiz)";

/// Recording grades acceptable without falling back, best to worst
const QUALITY_WHITELIST: [&str; 3] = ["A", "B", "C"];

/// Quality-scoped query tiers tried in order by the proxy search
const PROXY_QUALITY_TIERS: [Option<&str>; 3] = [Some("A"), Some("B"), None];

/// xeno-canto client errors
#[derive(Debug, Error)]
pub enum XenoError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Recordings query response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecordingsResponse {
    #[serde(default)]
    pub recordings: Vec<RawRecording>,
}

/// One recording as the archive returns it
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawRecording {
    /// Archive catalogue number
    pub id: String,
    /// Audio file URL; may be empty or scheme-relative
    #[serde(default)]
    pub file: String,
    /// Quality grade: A best, then B, C, or unrated
    #[serde(default)]
    pub q: Option<String>,
    /// Sound type ("song", "call", ...)
    #[serde(default, rename = "type")]
    pub sound_type: Option<String>,
    /// Recordist credit
    #[serde(default)]
    pub rec: Option<String>,
    /// Recording location
    #[serde(default)]
    pub loc: Option<String>,
    /// Recording country
    #[serde(default)]
    pub cnt: Option<String>,
}

/// The single recording shape returned by the sounds proxy endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopRecording {
    pub id: String,
    pub url: String,
    #[serde(rename = "type")]
    pub sound_type: Option<String>,
    pub recordist: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
}

/// Rewrite insecure or scheme-relative URLs to https
pub fn secure_url(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("http://") {
        format!("https://{rest}")
    } else if url.starts_with("//") {
        format!("https:{url}")
    } else {
        url.to_string()
    }
}

/// Pick the recording used for an audio question.
///
/// Keeps recordings whose grade is whitelisted, falls back to the full set
/// when the whitelist filters everything out, and takes the first remaining
/// candidate with a usable file URL.
pub fn select_recording(recordings: &[RawRecording]) -> Option<&RawRecording> {
    let graded: Vec<&RawRecording> = recordings
        .iter()
        .filter(|r| {
            r.q.as_deref()
                .map(|q| QUALITY_WHITELIST.contains(&q))
                .unwrap_or(false)
        })
        .collect();

    let pool: Vec<&RawRecording> = if graded.is_empty() {
        recordings.iter().collect()
    } else {
        graded
    };

    pool.into_iter().find(|r| !r.file.trim().is_empty())
}

/// xeno-canto API client
pub struct XenoCantoClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl XenoCantoClient {
    pub fn new() -> Result<Self, XenoError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| XenoError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: XENO_CANTO_BASE_URL.to_string(),
        })
    }

    /// Best-effort audio URL for a species.
    ///
    /// Network or parse failure degrades to `None`; an audio question
    /// without a recording is still a question.
    pub async fn resolve_audio(&self, scientific_name: &str) -> Option<String> {
        match self.query(scientific_name).await {
            Ok(recordings) => {
                let url = select_recording(&recordings).map(|r| secure_url(&r.file));
                if url.is_none() {
                    tracing::info!(species = scientific_name, "No recording available");
                }
                url
            }
            Err(e) => {
                tracing::warn!(species = scientific_name, error = %e, "Audio resolution failed");
                None
            }
        }
    }

    /// Three-tier quality fallback search used by the sounds proxy: best
    /// quality, then next tier, then unscoped. Returns at most one
    /// recording.
    pub async fn top_recording(&self, species: &str) -> Result<Option<TopRecording>, XenoError> {
        for tier in PROXY_QUALITY_TIERS {
            let query = match tier {
                Some(grade) => format!("{species} q:{grade}"),
                None => species.to_string(),
            };

            let recordings = self.query(&query).await?;
            if let Some(rec) = recordings.first() {
                return Ok(Some(TopRecording {
                    id: rec.id.clone(),
                    url: secure_url(&rec.file),
                    sound_type: rec.sound_type.clone(),
                    recordist: rec.rec.clone(),
                    location: rec.loc.clone(),
                    country: rec.cnt.clone(),
                }));
            }
        }

        Ok(None)
    }

    /// Query the recordings endpoint once
    async fn query(&self, query: &str) -> Result<Vec<RawRecording>, XenoError> {
        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[("query", query)])
            .send()
            .await
            .map_err(|e| XenoError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(XenoError::ApiError(status.as_u16(), error_text));
        }

        let parsed: RecordingsResponse = response
            .json()
            .await
            .map_err(|e| XenoError::ParseError(e.to_string()))?;

        Ok(parsed.recordings)
    }
}
