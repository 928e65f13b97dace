//! Historian sample types: TVQ records, tag identities, per-tag streams

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Raw Samples
// ============================================================================

/// Value carried by a historian sample.
///
/// Boolean tags arrive either as JSON booleans or as integer 1/0 depending on
/// how the historian stored them, so both shapes are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleValue {
    Bool(bool),
    Number(f64),
}

impl SampleValue {
    /// Numeric view (`true` = 1.0, `false` = 0.0).
    pub fn as_f64(&self) -> f64 {
        match *self {
            SampleValue::Bool(b) => f64::from(u8::from(b)),
            SampleValue::Number(n) => n,
        }
    }

    /// Boolean view. Numbers are truncated toward zero first, so 0.7 reads
    /// as `false` and 1.0 as `true`.
    pub fn as_bool(&self) -> bool {
        match *self {
            SampleValue::Bool(b) => b,
            SampleValue::Number(n) => n.trunc() != 0.0,
        }
    }

    /// Truthiness: any non-zero number is `true`, so 0.5 reads as `true`.
    /// Used for live values, where no truncation is applied.
    pub fn is_truthy(&self) -> bool {
        match *self {
            SampleValue::Bool(b) => b,
            SampleValue::Number(n) => n != 0.0,
        }
    }
}

impl From<bool> for SampleValue {
    fn from(b: bool) -> Self {
        SampleValue::Bool(b)
    }
}

impl From<f64> for SampleValue {
    fn from(n: f64) -> Self {
        SampleValue::Number(n)
    }
}

/// A single timestamp/value/quality record from the historian.
///
/// Field names follow the TimeBase wire format (`t`, `v`, `q`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    #[serde(rename = "t")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "v")]
    pub value: SampleValue,
    #[serde(rename = "q", default)]
    pub quality: i32,
}

impl RawSample {
    pub fn new(timestamp: DateTime<Utc>, value: impl Into<SampleValue>, quality: i32) -> Self {
        Self {
            timestamp,
            value: value.into(),
            quality,
        }
    }
}

// ============================================================================
// Tags
// ============================================================================

/// How a tag is sampled by the historian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// Continuously sampled (motor current).
    Analog,
    /// Stored on change only; needs forward-fill.
    Boolean,
}

/// The four separator signals the engine consumes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    MotorAmps,
    Running,
    Cip,
    Process,
}

impl Tag {
    pub const ALL: [Tag; 4] = [Tag::MotorAmps, Tag::Running, Tag::Cip, Tag::Process];

    /// Event-driven tags, forward-filled by the aligner.
    pub const BOOLEANS: [Tag; 3] = [Tag::Running, Tag::Cip, Tag::Process];

    pub fn kind(&self) -> TagKind {
        match self {
            Tag::MotorAmps => TagKind::Analog,
            Tag::Running | Tag::Cip | Tag::Process => TagKind::Boolean,
        }
    }

    /// Short alias used in logs, replay files and the debug endpoint.
    pub fn alias(&self) -> &'static str {
        match self {
            Tag::MotorAmps => "motor_amps",
            Tag::Running => "running",
            Tag::Cip => "cip",
            Tag::Process => "process",
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.alias())
    }
}

// ============================================================================
// Tag Streams
// ============================================================================

/// Raw samples for every tag fetched in one request.
///
/// A tag that was never inserted behaves exactly like an empty stream, which
/// is how a failed historian fetch surfaces here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagStreams {
    streams: BTreeMap<Tag, Vec<RawSample>>,
}

impl TagStreams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: Tag, samples: Vec<RawSample>) {
        self.streams.insert(tag, samples);
    }

    /// Samples for `tag`, empty when the tag is missing.
    pub fn get(&self, tag: Tag) -> &[RawSample] {
        self.streams.get(&tag).map_or(&[], Vec::as_slice)
    }

    /// True when no tag has a single sample.
    pub fn is_empty(&self) -> bool {
        self.streams.values().all(Vec::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tag, &[RawSample])> {
        self.streams.iter().map(|(tag, samples)| (*tag, samples.as_slice()))
    }
}

impl FromIterator<(Tag, Vec<RawSample>)> for TagStreams {
    fn from_iter<I: IntoIterator<Item = (Tag, Vec<RawSample>)>>(iter: I) -> Self {
        Self {
            streams: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// Current Values
// ============================================================================

/// Most recent value per tag, used for the live snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrentValues {
    values: BTreeMap<Tag, SampleValue>,
}

impl CurrentValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, tag: Tag, value: SampleValue) {
        self.values.insert(tag, value);
    }

    pub fn get(&self, tag: Tag) -> Option<SampleValue> {
        self.values.get(&tag).copied()
    }

    /// Latest motor current, if the analog tag reported anything.
    pub fn motor_amps(&self) -> Option<f64> {
        self.get(Tag::MotorAmps).map(|v| v.as_f64())
    }

    /// Latest boolean value by truthiness; absent reads as `false`.
    pub fn flag(&self, tag: Tag) -> bool {
        self.get(tag).is_some_and(|v| v.is_truthy())
    }
}
