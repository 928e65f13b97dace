//! Historian collaborator: where raw tag samples come from.
//!
//! A [`HistorianSource`] never fails toward the engine. Transport and
//! protocol problems are logged inside the source and surface as an empty
//! sample list, which the aligner treats as a missing stream.

mod memory;
mod timebase;

pub use memory::MemoryHistorian;
pub use timebase::{HistorianError, TimeBaseClient};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use tracing::debug;

use crate::config::TagPaths;
use crate::types::{CurrentValues, RawSample, Tag, TagStreams};

/// Trait abstracting where raw TVQ samples come from.
#[async_trait]
pub trait HistorianSource: Send + Sync + 'static {
    /// Good-quality samples for `tag_path` in `[start, end]`. Empty on any error.
    async fn fetch(&self, tag_path: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<RawSample>;

    /// Human-readable name for logging (e.g. "TimeBase", "memory").
    fn source_name(&self) -> &str;
}

/// Fetch every separator tag concurrently for one window.
pub async fn fetch_all_tags(
    source: &dyn HistorianSource,
    tags: &TagPaths,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> TagStreams {
    let requests = Tag::ALL.map(|tag| async move { (tag, source.fetch(tags.path(tag), start, end).await) });
    let streams: TagStreams = join_all(requests).await.into_iter().collect();
    debug!(source = source.source_name(), %start, %end, "Fetched all tags");
    streams
}

/// Latest value per tag within `window` before `now`. Tags with no samples
/// in the window are absent.
pub async fn fetch_current_values(
    source: &dyn HistorianSource,
    tags: &TagPaths,
    now: DateTime<Utc>,
    window: Duration,
) -> CurrentValues {
    let streams = fetch_all_tags(source, tags, now - window, now).await;
    let mut values = CurrentValues::new();
    for (tag, samples) in streams.iter() {
        if let Some(latest) = samples.iter().max_by_key(|s| s.timestamp) {
            values.set(tag, latest.value);
        }
    }
    values
}
