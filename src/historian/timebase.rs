//! TimeBase Client - REST client for the plant historian
//!
//! `GET {base}/api/datasets/{dataset}/data?tagname=..&start=..&end=..`
//! returns `{ "tl": [ { "d": [ {t, v, q}, ... ] } ] }`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Deserialize;
use tracing::{error, info};

use super::HistorianSource;
use crate::config::HistorianConfig;
use crate::types::RawSample;

/// Timestamp format accepted by the data endpoint.
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Historian client errors. Never returned through [`HistorianSource`].
#[derive(Debug, thiserror::Error)]
pub enum HistorianError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Historian returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("Invalid historian URL: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Default, Deserialize)]
struct DataResponse {
    #[serde(default)]
    tl: Vec<TagTimeline>,
}

#[derive(Debug, Default, Deserialize)]
struct TagTimeline {
    #[serde(default)]
    d: Vec<RawSample>,
}

/// HTTP client for one TimeBase dataset.
#[derive(Debug, Clone)]
pub struct TimeBaseClient {
    http: reqwest::Client,
    data_url: Url,
    min_good_quality: i32,
}

impl TimeBaseClient {
    pub fn new(config: &HistorianConfig) -> Result<Self, HistorianError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            data_url: data_url(&config.base_url, &config.dataset)?,
            min_good_quality: config.min_good_quality,
        })
    }

    /// Fully built data endpoint (dataset name percent-encoded).
    pub fn data_url(&self) -> &Url {
        &self.data_url
    }

    async fn try_fetch(
        &self,
        tag_path: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawSample>, HistorianError> {
        let start = start.format(TIME_FORMAT).to_string();
        let end = end.format(TIME_FORMAT).to_string();

        let resp = self
            .http
            .get(self.data_url.clone())
            .query(&[("tagname", tag_path), ("start", start.as_str()), ("end", end.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(HistorianError::Status(status));
        }

        let payload: DataResponse = resp.json().await?;
        let raw = payload.tl.into_iter().next().map(|t| t.d).unwrap_or_default();
        let total = raw.len();
        let good: Vec<RawSample> = raw
            .into_iter()
            .filter(|s| s.quality >= self.min_good_quality)
            .collect();

        info!(
            tag = tag_path.rsplit('/').next().unwrap_or(tag_path),
            total,
            good = good.len(),
            %start,
            %end,
            "TimeBase fetch"
        );
        Ok(good)
    }
}

#[async_trait]
impl HistorianSource for TimeBaseClient {
    async fn fetch(&self, tag_path: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<RawSample> {
        match self.try_fetch(tag_path, start, end).await {
            Ok(samples) => samples,
            Err(e) => {
                error!(tag = tag_path, error = %e, "TimeBase fetch failed");
                Vec::new()
            }
        }
    }

    fn source_name(&self) -> &str {
        "TimeBase"
    }
}

/// `{base}/api/datasets/{dataset}/data`, with the dataset as one encoded segment.
fn data_url(base_url: &str, dataset: &str) -> Result<Url, HistorianError> {
    let mut url = Url::parse(base_url).map_err(|e| HistorianError::InvalidUrl(format!("{base_url}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| HistorianError::InvalidUrl(format!("{base_url}: cannot be a base URL")))?
        .pop_if_empty()
        .extend(["api", "datasets", dataset, "data"]);
    Ok(url)
}
