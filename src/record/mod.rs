//! Per-track evaluation records and their normalization into score rows.
//!
//! The evaluation toolkit writes one JSON file per track:
//!
//! ```json
//! {
//!   "targets": [
//!     {
//!       "name": "vocals",
//!       "frames": [
//!         { "time": 0.0, "duration": 1.0, "metrics": { "SDR": 4.2, "SIR": 9.1, "ISR": 7.7, "SAR": 5.0 } }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! [`normalize`] flattens such a record into one [`ScoreRow`] per
//! `(target, frame, metric)`.
//!
//! Silent frames are written with the bare `NaN` literal (and overflowing
//! ratios with `Infinity`), which is not JSON. [`parse_record`] reads those
//! tokens as missing scores, the same as `null` or a non-numeric value.

use std::borrow::Cow;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::metrics::Metric;
use crate::table::ScoreRow;

/// Evaluation record of a single track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTrackRecord {
    /// Separated targets with their framewise scores.
    pub targets: Vec<RawTarget>,
}

/// Framewise scores of one target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTarget {
    /// Target name, e.g. `vocals`.
    pub name: String,
    /// Scored frames.
    pub frames: Vec<RawFrame>,
}

/// Scores of one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFrame {
    /// Frame offset in seconds.
    #[serde(default)]
    pub time: Option<f64>,
    /// Metric values; absent keys are missing scores.
    #[serde(default)]
    pub metrics: RawMetrics,
}

/// The metric mapping of a frame. Keys other than the four metrics are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMetrics {
    /// Signal-to-distortion ratio.
    #[serde(rename = "SDR", default, deserialize_with = "lenient_score")]
    pub sdr: Option<f64>,
    /// Signal-to-interference ratio.
    #[serde(rename = "SIR", default, deserialize_with = "lenient_score")]
    pub sir: Option<f64>,
    /// Image-to-spatial distortion ratio.
    #[serde(rename = "ISR", default, deserialize_with = "lenient_score")]
    pub isr: Option<f64>,
    /// Signal-to-artifacts ratio.
    #[serde(rename = "SAR", default, deserialize_with = "lenient_score")]
    pub sar: Option<f64>,
}

/// Any metric value that is not a JSON number counts as missing.
fn lenient_score<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64())
}

impl RawMetrics {
    /// Value for a metric, if present.
    #[must_use]
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Sdr => self.sdr,
            Metric::Sir => self.sir,
            Metric::Isr => self.isr,
            Metric::Sar => self.sar,
        }
    }
}

impl RawTrackRecord {
    /// Total number of frames over all targets.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.targets.iter().map(|t| t.frames.len()).sum()
    }
}

/// Parse a track record from JSON text.
///
/// Bare `NaN`, `Infinity` and `-Infinity` tokens are read as `null`.
/// Invalid JSON yields [`Error::Parse`]; valid JSON without the expected
/// `targets`/`name`/`frames` structure yields [`Error::MalformedRecord`].
pub fn parse_record(json: &str, track_id: &str) -> Result<RawTrackRecord> {
    let json = replace_non_finite(json);
    let value: serde_json::Value = serde_json::from_str(&json).map_err(|source| Error::Parse {
        origin: track_id.to_string(),
        source,
    })?;
    record_from_value(value, track_id)
}

/// Non-finite literals, longest first so `-Infinity` wins over `Infinity`.
const NON_FINITE: [&str; 3] = ["-Infinity", "Infinity", "NaN"];

/// Rewrite non-finite literals outside of strings to `null`.
fn replace_non_finite(json: &str) -> Cow<'_, str> {
    if !json.contains("NaN") && !json.contains("Infinity") {
        return Cow::Borrowed(json);
    }

    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut rest = json;

    while let Some(c) = rest.chars().next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if let Some(token) = NON_FINITE.iter().find(|t| rest.starts_with(**t)) {
            out.push_str("null");
            rest = &rest[token.len()..];
            continue;
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    Cow::Owned(out)
}

/// Interpret an already parsed JSON value as a track record.
pub fn record_from_value(value: serde_json::Value, track_id: &str) -> Result<RawTrackRecord> {
    serde_json::from_value(value).map_err(|e| Error::MalformedRecord {
        track: track_id.to_string(),
        reason: e.to_string(),
    })
}

/// Flatten a track record into score rows.
///
/// Emits exactly one row per target, frame and metric, in
/// [`Metric::NORMALIZE_ORDER`]. Metrics missing from a frame produce a row
/// with no score rather than no row.
#[must_use]
pub fn normalize(record: &RawTrackRecord, track_id: &str) -> Vec<ScoreRow> {
    let mut rows = Vec::with_capacity(record.frame_count() * Metric::NORMALIZE_ORDER.len());

    for target in &record.targets {
        for frame in &target.frames {
            for metric in Metric::NORMALIZE_ORDER {
                rows.push(ScoreRow {
                    method: None,
                    track: track_id.to_string(),
                    target: target.name.clone(),
                    metric,
                    time: frame.time,
                    score: frame.metrics.get(metric),
                });
            }
        }
    }

    rows
}

/// Parse and flatten a track record in one step.
pub fn normalize_json(json: &str, track_id: &str) -> Result<Vec<ScoreRow>> {
    let record = parse_record(json, track_id)?;
    Ok(normalize(&record, track_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_FRAMES: &str = r#"{
        "targets": [
            {
                "name": "vocals",
                "frames": [
                    { "time": 0.0, "duration": 1.0, "metrics": { "SDR": 1.0, "SAR": 2.0 } },
                    { "time": 1.0, "duration": 1.0, "metrics": { "SDR": 3.0 } }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_normalize_emits_row_per_metric() {
        let rows = normalize_json(TWO_FRAMES, "track1").unwrap();
        assert_eq!(rows.len(), 8);

        let first: Vec<Metric> = rows.iter().take(4).map(|r| r.metric).collect();
        assert_eq!(first, Metric::NORMALIZE_ORDER);

        assert!(rows.iter().all(|r| r.track == "track1" && r.target == "vocals"));
        assert!(rows.iter().all(|r| r.method.is_none()));

        let missing = rows.iter().filter(|r| r.score.is_none()).count();
        assert_eq!(missing, 5);
        assert_eq!(rows[4].time, Some(1.0));
        assert_eq!(rows[4].score, Some(3.0));
    }

    #[test]
    fn test_row_count_is_targets_frames_metrics() {
        let json = r#"{
            "targets": [
                { "name": "drums", "frames": [ { "time": 0.0, "metrics": {} }, { "time": 1.0, "metrics": { "ISR": 5.0 } } ] },
                { "name": "bass", "frames": [ { "time": 0.0, "metrics": { "SDR": 1.0, "SIR": 1.0, "ISR": 1.0, "SAR": 1.0 } } ] },
                { "name": "other", "frames": [] }
            ]
        }"#;
        let record = parse_record(json, "t").unwrap();
        let rows = normalize(&record, "t");
        assert_eq!(rows.len(), record.frame_count() * 4);
        assert_eq!(rows.len(), 12);
    }

    #[test]
    fn test_unknown_metric_keys_are_ignored() {
        let json = r#"{ "targets": [ { "name": "vocals", "frames": [ { "time": 0.0, "metrics": { "SDR": 1.0, "PES": 9.0 } } ] } ] }"#;
        let rows = normalize_json(json, "t").unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.score.is_none() || r.metric == Metric::Sdr));
    }

    #[test]
    fn test_null_metric_is_missing_score() {
        let json = r#"{ "targets": [ { "name": "vocals", "frames": [ { "time": null, "metrics": { "SDR": null } } ] } ] }"#;
        let rows = normalize_json(json, "t").unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.score.is_none() && r.time.is_none()));
    }

    #[test]
    fn test_empty_targets() {
        let rows = normalize_json(r#"{ "targets": [] }"#, "t").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_missing_structure_is_malformed() {
        for json in [
            r#"{ "tracks": [] }"#,
            r#"{ "targets": [ { "frames": [] } ] }"#,
            r#"{ "targets": [ { "name": "vocals" } ] }"#,
        ] {
            let err = parse_record(json, "broken").unwrap_err();
            assert!(
                matches!(err, Error::MalformedRecord { ref track, .. } if track == "broken"),
                "unexpected error for {json}: {err}"
            );
        }
    }

    #[test]
    fn test_non_finite_literals_are_missing_scores() {
        let json = r#"{"targets":[{"name":"vocals","frames":[{"time":0.0,"metrics":{"SDR":NaN,"SIR":1.0,"ISR":-Infinity,"SAR":Infinity}}]}]}"#;
        let rows = normalize_json(json, "t").unwrap();
        assert_eq!(rows.len(), 4);

        let score = |metric| rows.iter().find(|r| r.metric == metric).unwrap().score;
        assert_eq!(score(Metric::Sdr), None);
        assert_eq!(score(Metric::Sir), Some(1.0));
        assert_eq!(score(Metric::Isr), None);
        assert_eq!(score(Metric::Sar), None);
    }

    #[test]
    fn test_non_finite_words_inside_strings_are_kept() {
        let json = r#"{ "targets": [ { "name": "NaN \"Infinity\"", "frames": [ { "metrics": { "SDR": NaN } } ] } ] }"#;
        let rows = normalize_json(json, "t").unwrap();
        assert_eq!(rows[0].target, "NaN \"Infinity\"");
        assert!(rows.iter().all(|r| r.score.is_none()));
    }

    #[test]
    fn test_non_numeric_metric_is_missing_score() {
        let json = r#"{ "targets": [ { "name": "vocals", "frames": [ { "time": 0.0, "metrics": { "SDR": "n/a", "SIR": 1.0, "ISR": [], "SAR": true } } ] } ] }"#;
        let rows = normalize_json(json, "t").unwrap();
        assert_eq!(rows.len(), 4);
        let present: Vec<_> = rows.iter().filter_map(|r| r.score.map(|s| (r.metric, s))).collect();
        assert_eq!(present, vec![(Metric::Sir, 1.0)]);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = parse_record("{ \"targets\": [", "broken").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }
}
