//! Sample source client for a ThingSpeak-compatible feeds API.
//!
//! Fetches the most recent feeds of one channel and maps them onto raw
//! [`Sample`]s. Field values arrive as strings or nulls; anything that
//! does not parse as a number is treated as missing rather than an
//! error, matching how the channel itself reports sensor dropouts.

use crate::config::ChannelConfig;
use crate::core::Sample;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Sample source error types.
#[derive(Debug)]
pub enum SourceError {
    /// Network/HTTP error
    Network(String),
    /// Server returned an error response
    Server { status: u16, message: String },
    /// Response body did not parse
    Decode(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Network(msg) => write!(f, "source network error: {msg}"),
            SourceError::Server { status, message } => {
                write!(f, "source server error ({status}): {message}")
            }
            SourceError::Decode(msg) => write!(f, "source decode error: {msg}"),
        }
    }
}

impl std::error::Error for SourceError {}

/// Raw feeds envelope as returned by the channel API.
#[derive(Debug, Deserialize)]
struct FeedsResponse {
    #[serde(default)]
    feeds: Vec<Feed>,
}

/// One feed row; the four numeric fields are strings or null.
#[derive(Debug, Deserialize)]
struct Feed {
    created_at: DateTime<Utc>,
    field1: Option<String>,
    field2: Option<String>,
    field3: Option<String>,
    field4: Option<String>,
}

impl Feed {
    fn into_sample(self) -> Sample {
        Sample {
            timestamp: self.created_at,
            indoor_temp: coerce(self.field1),
            indoor_humidity: coerce(self.field2),
            outdoor_temp: coerce(self.field3),
            outdoor_humidity: coerce(self.field4),
        }
    }
}

/// Parse a string field into a number; unparsable values become missing.
fn coerce(field: Option<String>) -> Option<f64> {
    field.and_then(|s| s.trim().parse().ok())
}

/// HTTP client for the sample channel.
pub struct SampleSource {
    config: ChannelConfig,
    client: reqwest::Client,
}

impl SampleSource {
    /// Create a new source client for the configured channel.
    pub fn new(config: ChannelConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// The feeds endpoint URL for the configured channel.
    pub fn feeds_url(&self) -> String {
        format!(
            "{}/channels/{}/feeds.json",
            self.config.base_url, self.config.channel_id
        )
    }

    /// Fetch up to the configured number of most recent samples.
    ///
    /// An empty feed list is a valid result and surfaces as an empty
    /// vec; the caller treats it as "no data" for the tick.
    pub async fn fetch_recent(&self) -> Result<Vec<Sample>, SourceError> {
        let response = self
            .client
            .get(self.feeds_url())
            .query(&[
                ("api_key", self.config.read_key.as_str()),
                ("results", &self.config.fetch_count.to_string()),
            ])
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(SourceError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body: FeedsResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        Ok(body.feeds.into_iter().map(Feed::into_sample).collect())
    }
}
