//! Flat score table and grouped aggregation.
//!
//! An [`EvalTable`] is an append-only list of [`ScoreRow`]s. Aggregation
//! never touches the rows; it groups them by a composite key and reduces
//! each group with an [`Aggregation`], skipping missing scores.
//!
//! Two-stage aggregation first collapses the frames of every track
//! ([`EvalTable::aggregate_frames`]) and then collapses tracks
//! ([`aggregate_tracks`]), so a long track weighs the same as a short one.

mod io;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::metrics::Metric;
use crate::stats::Aggregation;

pub use io::{read_csv, write_csv};

/// One observation: a single metric of one frame of one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    /// Evaluated method; only set once the row is part of a method table.
    pub method: Option<String>,
    /// Track identifier.
    pub track: String,
    /// Target name.
    pub target: String,
    /// Metric.
    pub metric: Metric,
    /// Frame offset in seconds.
    pub time: Option<f64>,
    /// Score in dB; `None` or `NaN` when the metric is absent.
    pub score: Option<f64>,
}

impl ScoreRow {
    /// Score with missing values as `NaN`.
    #[must_use]
    pub fn score_or_nan(&self) -> f64 {
        self.score.unwrap_or(f64::NAN)
    }
}

/// Group key of frame-level aggregation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FrameKey {
    /// Method, absent for single-method tables.
    pub method: Option<String>,
    /// Track identifier.
    pub track: String,
    /// Target name.
    pub target: String,
    /// Metric.
    pub metric: Metric,
}

impl FrameKey {
    /// Key without a method.
    pub fn new(track: impl Into<String>, target: impl Into<String>, metric: Metric) -> Self {
        Self {
            method: None,
            track: track.into(),
            target: target.into(),
            metric,
        }
    }

    /// Set the method component.
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }
}

/// Group key of track-level aggregation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TrackKey {
    /// Method, absent for single-method tables.
    pub method: Option<String>,
    /// Target name.
    pub target: String,
    /// Metric.
    pub metric: Metric,
}

impl TrackKey {
    /// Key without a method.
    pub fn new(target: impl Into<String>, metric: Metric) -> Self {
        Self {
            method: None,
            target: target.into(),
            metric,
        }
    }

    /// Set the method component.
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }
}

/// Reduced scores keyed by group, ordered by key.
///
/// Produced fresh by every aggregation call.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult<K: Ord> {
    scores: BTreeMap<K, f64>,
}

impl<K: Ord> AggregateResult<K> {
    /// Score of a group, `None` if the group does not exist.
    ///
    /// A group whose scores were all missing exists and returns `NaN`.
    pub fn get(&self, key: &K) -> Option<f64> {
        self.scores.get(key).copied()
    }

    /// Iterate groups in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, f64)> {
        self.scores.iter().map(|(k, v)| (k, *v))
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Check if there are no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl<K: Ord> IntoIterator for AggregateResult<K> {
    type Item = (K, f64);
    type IntoIter = std::collections::btree_map::IntoIter<K, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.scores.into_iter()
    }
}

/// Group `(key, score)` pairs and reduce every group.
///
/// Missing scores (`NaN`) still create their group; a group with no present
/// score reduces to `NaN`.
pub fn group_reduce<K, I>(items: I, agg: Aggregation) -> AggregateResult<K>
where
    K: Ord,
    I: IntoIterator<Item = (K, f64)>,
{
    let mut groups: BTreeMap<K, Vec<f64>> = BTreeMap::new();
    for (key, score) in items {
        groups.entry(key).or_default().push(score);
    }

    let scores = groups
        .into_iter()
        .map(|(key, values)| {
            let reduced = agg.reduce(&values);
            (key, reduced)
        })
        .collect();

    AggregateResult { scores }
}

/// Collapse frame-level results over tracks, keeping method, target and metric.
pub fn aggregate_tracks(frames: &AggregateResult<FrameKey>, agg: Aggregation) -> AggregateResult<TrackKey> {
    group_reduce(
        frames.iter().map(|(key, score)| {
            let track_key = TrackKey {
                method: key.method.clone(),
                target: key.target.clone(),
                metric: key.metric,
            };
            (track_key, score)
        }),
        agg,
    )
}

/// Append-only table of score rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvalTable {
    rows: Vec<ScoreRow>,
}

impl EvalTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows in insertion order.
    #[must_use]
    pub fn rows(&self) -> &[ScoreRow] {
        &self.rows
    }

    /// Iterate rows in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, ScoreRow> {
        self.rows.iter()
    }

    /// Consume the table, returning its rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<ScoreRow> {
        self.rows
    }

    /// Append rows.
    pub fn extend(&mut self, rows: impl IntoIterator<Item = ScoreRow>) {
        self.rows.extend(rows);
    }

    /// Append all rows of another table.
    pub fn append(&mut self, other: EvalTable) {
        self.rows.extend(other.rows);
    }

    /// Distinct targets in order of first appearance.
    #[must_use]
    pub fn targets(&self) -> Vec<&str> {
        distinct(self.rows.iter().map(|r| r.target.as_str()))
    }

    /// Distinct targets scored for `method`, in order of first appearance.
    #[must_use]
    pub fn targets_for(&self, method: &str) -> Vec<&str> {
        distinct(
            self.rows
                .iter()
                .filter(|r| r.method.as_deref() == Some(method))
                .map(|r| r.target.as_str()),
        )
    }

    /// Distinct tracks in order of first appearance.
    #[must_use]
    pub fn tracks(&self) -> Vec<&str> {
        distinct(self.rows.iter().map(|r| r.track.as_str()))
    }

    /// Distinct methods in order of first appearance.
    #[must_use]
    pub fn methods(&self) -> Vec<&str> {
        distinct(self.rows.iter().filter_map(|r| r.method.as_deref()))
    }

    /// Reduce frames to one score per `(method, track, target, metric)`.
    #[must_use]
    pub fn aggregate_frames(&self, frames_agg: Aggregation) -> AggregateResult<FrameKey> {
        group_reduce(
            self.rows.iter().map(|row| {
                let key = FrameKey {
                    method: row.method.clone(),
                    track: row.track.clone(),
                    target: row.target.clone(),
                    metric: row.metric,
                };
                (key, row.score_or_nan())
            }),
            frames_agg,
        )
    }

    /// Two-stage aggregation: frames within each track, then tracks.
    #[must_use]
    pub fn aggregate_frames_and_tracks(
        &self,
        frames_agg: Aggregation,
        tracks_agg: Aggregation,
    ) -> AggregateResult<TrackKey> {
        aggregate_tracks(&self.aggregate_frames(frames_agg), tracks_agg)
    }
}

impl From<Vec<ScoreRow>> for EvalTable {
    fn from(rows: Vec<ScoreRow>) -> Self {
        Self { rows }
    }
}

impl<'a> IntoIterator for &'a EvalTable {
    type Item = &'a ScoreRow;
    type IntoIter = std::slice::Iter<'a, ScoreRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

fn distinct<'a>(items: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = Vec::new();
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}
