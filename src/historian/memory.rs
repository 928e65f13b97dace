//! In-process historian backed by preloaded samples (tests, `--replay`).

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use super::HistorianSource;
use crate::config::TagPaths;
use crate::types::{RawSample, TagStreams};

/// Samples keyed by full tag path, served by time window.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistorian {
    samples: HashMap<String, Vec<RawSample>>,
    min_good_quality: i32,
}

impl MemoryHistorian {
    pub fn new(min_good_quality: i32) -> Self {
        Self {
            samples: HashMap::new(),
            min_good_quality,
        }
    }

    /// Replace the samples stored for `tag_path`.
    pub fn insert(&mut self, tag_path: &str, samples: Vec<RawSample>) {
        self.samples.insert(tag_path.to_string(), samples);
    }

    /// Store alias-keyed streams under their configured paths.
    pub fn from_streams(streams: &TagStreams, tags: &TagPaths, min_good_quality: i32) -> Self {
        let mut historian = Self::new(min_good_quality);
        for (tag, samples) in streams.iter() {
            historian.insert(tags.path(tag), samples.to_vec());
        }
        historian
    }

    /// Load a replay file: a JSON object of `{ "<tag alias>": [TVQ, ...] }`.
    pub fn load_replay(path: &Path, tags: &TagPaths, min_good_quality: i32) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay file {}", path.display()))?;
        let streams: TagStreams = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse replay file {}", path.display()))?;
        let historian = Self::from_streams(&streams, tags, min_good_quality);
        info!(
            path = %path.display(),
            samples = historian.sample_count(),
            latest = ?historian.latest_timestamp(),
            "Loaded replay data"
        );
        Ok(historian)
    }

    pub fn sample_count(&self) -> usize {
        self.samples.values().map(Vec::len).sum()
    }

    /// Newest timestamp across all tags.
    pub fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.samples.values().flatten().map(|s| s.timestamp).max()
    }
}

#[async_trait]
impl HistorianSource for MemoryHistorian {
    async fn fetch(&self, tag_path: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<RawSample> {
        self.samples
            .get(tag_path)
            .map(|samples| {
                samples
                    .iter()
                    .filter(|s| s.timestamp >= start && s.timestamp <= end)
                    .filter(|s| s.quality >= self.min_good_quality)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn source_name(&self) -> &str {
        "memory"
    }
}
