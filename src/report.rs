//! Serializable aggregation reports.
//!
//! An [`AggregateReport`] captures the two-stage scores of a collection
//! together with the reductions that produced them, for writing to JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::collection::CollectionConfig;
use crate::error::Result;
use crate::metrics::Metric;
use crate::stats::Aggregation;
use crate::table::{AggregateResult, EvalTable, FrameKey, TrackKey};

/// One aggregated score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Method, absent for single-method tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Track, only present for frame-level entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<String>,
    /// Target name.
    pub target: String,
    /// Metric.
    pub metric: Metric,
    /// Aggregated score; `None` when every input was missing.
    pub score: Option<f64>,
}

impl ScoreEntry {
    fn from_frame(key: FrameKey, score: f64) -> Self {
        Self {
            method: key.method,
            track: Some(key.track),
            target: key.target,
            metric: key.metric,
            score: present(score),
        }
    }

    fn from_track(key: TrackKey, score: f64) -> Self {
        Self {
            method: key.method,
            track: None,
            target: key.target,
            metric: key.metric,
            score: present(score),
        }
    }
}

/// Aggregated scores of a table plus the settings used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateReport {
    /// Reduction over frames.
    pub frames_agg: Aggregation,
    /// Reduction over tracks; absent for frame-level reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracks_agg: Option<Aggregation>,
    /// Number of tracks in the source table.
    pub track_count: usize,
    /// Aggregated scores in key order.
    pub scores: Vec<ScoreEntry>,
    /// When this report was generated.
    #[serde(with = "chrono_serde")]
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl AggregateReport {
    /// Frame-level report: one score per `(method, track, target, metric)`.
    #[must_use]
    pub fn frames(table: &EvalTable, frames_agg: Aggregation) -> Self {
        let scores = table.aggregate_frames(frames_agg);
        Self::build(table, frames_agg, None, frame_entries(scores))
    }

    /// Two-stage report: one score per `(method, target, metric)`.
    #[must_use]
    pub fn frames_and_tracks(table: &EvalTable, config: &CollectionConfig) -> Self {
        let scores = table.aggregate_frames_and_tracks(config.frames_agg, config.tracks_agg);
        Self::build(table, config.frames_agg, Some(config.tracks_agg), track_entries(scores))
    }

    fn build(
        table: &EvalTable,
        frames_agg: Aggregation,
        tracks_agg: Option<Aggregation>,
        scores: Vec<ScoreEntry>,
    ) -> Self {
        Self {
            frames_agg,
            tracks_agg,
            track_count: table.tracks().len(),
            scores,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Write the report as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Load a report written by [`save`](Self::save).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Flatten frame-level results into report entries.
#[must_use]
pub fn frame_entries(scores: AggregateResult<FrameKey>) -> Vec<ScoreEntry> {
    scores
        .into_iter()
        .map(|(key, score)| ScoreEntry::from_frame(key, score))
        .collect()
}

/// Flatten two-stage results into report entries.
#[must_use]
pub fn track_entries(scores: AggregateResult<TrackKey>) -> Vec<ScoreEntry> {
    scores
        .into_iter()
        .map(|(key, score)| ScoreEntry::from_track(key, score))
        .collect()
}

// JSON has no NaN
fn present(score: f64) -> Option<f64> {
    if score.is_nan() { None } else { Some(score) }
}

mod chrono_serde {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        dt.to_rfc3339().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
