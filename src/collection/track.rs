//! Scores of a single method across tracks.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::collection::{CollectionConfig, scan_directory, write_header, write_targets};
use crate::error::Result;
use crate::record::{RawTrackRecord, normalize, normalize_json};
use crate::stats::Aggregation;
use crate::table::{AggregateResult, EvalTable, FrameKey, TrackKey, read_csv, write_csv};

/// Accumulates the framewise scores of one method over many tracks.
///
/// Rows carry no method; [`MethodCollection::add_method`] stamps it when the
/// collection is merged.
///
/// [`MethodCollection::add_method`]: crate::MethodCollection::add_method
#[derive(Debug, Clone, Default)]
pub struct TrackCollection {
    config: CollectionConfig,
    table: EvalTable,
}

impl TrackCollection {
    /// Create an empty collection with median/median aggregation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty collection with the given aggregation settings.
    #[must_use]
    pub fn with_config(config: CollectionConfig) -> Self {
        Self {
            config,
            table: EvalTable::new(),
        }
    }

    /// Aggregation settings used by [`render`](Self::render).
    #[must_use]
    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    /// The underlying score table.
    #[must_use]
    pub fn table(&self) -> &EvalTable {
        &self.table
    }

    /// Number of score rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if no track has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Normalize a track record and append its rows.
    pub fn add_track(&mut self, track_id: &str, record: &RawTrackRecord) {
        self.table.extend(normalize(record, track_id));
    }

    /// Parse a track record from JSON text and append its rows.
    pub fn add_track_json(&mut self, track_id: &str, json: &str) -> Result<()> {
        let rows = normalize_json(json, track_id)?;
        self.table.extend(rows);
        Ok(())
    }

    /// Add every `test/**/*.json` evaluation file under `path`.
    ///
    /// The file stem is the track identifier. Fails without appending
    /// anything if the directory is missing or any file is invalid.
    /// Returns the number of rows added.
    pub fn add_directory(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let rows = scan_directory(path.as_ref())?;
        let added = rows.len();
        self.table.extend(rows);
        Ok(added)
    }

    /// Reduce frames to one score per `(track, target, metric)`.
    #[must_use]
    pub fn aggregate_frames(&self, frames_agg: Aggregation) -> AggregateResult<FrameKey> {
        self.table.aggregate_frames(frames_agg)
    }

    /// Reduce frames per track, then tracks per `(target, metric)`.
    #[must_use]
    pub fn aggregate_frames_and_tracks(
        &self,
        frames_agg: Aggregation,
        tracks_agg: Aggregation,
    ) -> AggregateResult<TrackKey> {
        self.table.aggregate_frames_and_tracks(frames_agg, tracks_agg)
    }

    /// Replace the table with one saved by [`save`](Self::save).
    ///
    /// Any method column in the file is dropped.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::open(path.as_ref())?;
        let table = read_csv(BufReader::new(file))?;
        let mut rows = table.into_rows();
        for row in &mut rows {
            row.method = None;
        }
        self.table = EvalTable::from(rows);
        tracing::info!(path = %path.as_ref().display(), rows = self.table.len(), "loaded track table");
        Ok(())
    }

    /// Write the table to `path`, replacing the file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        write_csv(&self.table, BufWriter::new(file))
    }

    /// Human-readable two-stage summary, one line per target.
    #[must_use]
    pub fn render(&self) -> String {
        let scores = self.aggregate_frames_and_tracks(self.config.frames_agg, self.config.tracks_agg);
        let mut out = String::new();
        write_header(&mut out, &self.config);
        write_targets(&mut out, &self.table.targets(), &scores, None);
        out
    }
}

impl fmt::Display for TrackCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::error::Error;
    use crate::metrics::Metric;
    use crate::record::parse_record;

    const TWO_FRAMES: &str = r#"{
        "targets": [
            {
                "name": "vocals",
                "frames": [
                    { "time": 0.0, "metrics": { "SDR": 1.0, "SAR": 2.0 } },
                    { "time": 1.0, "metrics": { "SDR": 3.0 } }
                ]
            }
        ]
    }"#;

    fn track_json(target: &str, sdr: &[f64]) -> String {
        let frames: Vec<String> = sdr
            .iter()
            .enumerate()
            .map(|(i, v)| format!(r#"{{ "time": {i}.0, "metrics": {{ "SDR": {v}, "SIR": {v}, "ISR": {v}, "SAR": {v} }} }}"#))
            .collect();
        format!(r#"{{ "targets": [ {{ "name": "{target}", "frames": [ {} ] }} ] }}"#, frames.join(", "))
    }

    #[test]
    fn test_two_frame_scenario() {
        let mut tracks = TrackCollection::new();
        let record = parse_record(TWO_FRAMES, "track").unwrap();
        tracks.add_track("track", &record);
        assert_eq!(tracks.len(), 8);

        let frames = tracks.aggregate_frames(Aggregation::Median);
        assert_eq!(frames.get(&FrameKey::new("track", "vocals", Metric::Sdr)), Some(2.0));
        assert_eq!(frames.get(&FrameKey::new("track", "vocals", Metric::Sar)), Some(2.0));
        assert!(frames.get(&FrameKey::new("track", "vocals", Metric::Isr)).unwrap().is_nan());
        assert!(frames.get(&FrameKey::new("track", "vocals", Metric::Sir)).unwrap().is_nan());
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let mut tracks = TrackCollection::new();
        tracks.add_track_json("a", &track_json("vocals", &[1.0, 5.0, 2.0])).unwrap();
        tracks.add_track_json("b", &track_json("vocals", &[4.0])).unwrap();

        let first = tracks.aggregate_frames(Aggregation::Mean);
        let second = tracks.aggregate_frames(Aggregation::Mean);
        assert_eq!(first, second);
        assert_eq!(first.len(), 8);
    }

    #[test]
    fn test_two_stage_weighs_tracks_equally() {
        let mut tracks = TrackCollection::new();
        tracks.add_track_json("long", &track_json("vocals", &[0.0; 20])).unwrap();
        tracks.add_track_json("short", &track_json("vocals", &[6.0])).unwrap();

        let scores = tracks.aggregate_frames_and_tracks(Aggregation::Mean, Aggregation::Mean);
        assert_eq!(scores.get(&TrackKey::new("vocals", Metric::Sdr)), Some(3.0));

        let flat: Vec<f64> = tracks
            .table()
            .iter()
            .filter(|r| r.metric == Metric::Sdr)
            .map(|r| r.score_or_nan())
            .collect();
        assert!((Aggregation::Mean.reduce(&flat) - 6.0 / 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_unsupported_aggregation_leaves_table() {
        let mut tracks = TrackCollection::new();
        tracks.add_track_json("a", TWO_FRAMES).unwrap();
        let before = tracks.table().clone();

        let err = "mode".parse::<Aggregation>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedAggregation(_)));
        assert_eq!(tracks.table(), &before);
    }

    #[test]
    fn test_malformed_json_is_not_appended() {
        let mut tracks = TrackCollection::new();
        let err = tracks.add_track_json("a", r#"{ "targets": [ { "name": "vocals" } ] }"#).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { .. }));
        assert!(tracks.is_empty());
    }

    #[test]
    fn test_add_directory() {
        let dir = tempfile::tempdir().unwrap();
        let test = dir.path().join("test");
        fs::create_dir_all(&test).unwrap();
        fs::write(test.join("Track A.json"), track_json("vocals", &[1.0, 2.0])).unwrap();
        fs::write(test.join("Track B.json"), track_json("drums", &[3.0])).unwrap();

        let mut tracks = TrackCollection::new();
        let added = tracks.add_directory(dir.path()).unwrap();
        assert_eq!(added, 12);
        assert_eq!(tracks.table().tracks(), vec!["Track A", "Track B"]);
    }

    #[test]
    fn test_add_directory_with_silent_frame() {
        let dir = tempfile::tempdir().unwrap();
        let test = dir.path().join("test");
        fs::create_dir_all(&test).unwrap();
        // `{v}` of NaN writes the bare `NaN` token
        fs::write(test.join("quiet.json"), track_json("vocals", &[f64::NAN, 4.0])).unwrap();

        let mut tracks = TrackCollection::new();
        assert_eq!(tracks.add_directory(dir.path()).unwrap(), 8);
        assert_eq!(tracks.table().iter().filter(|r| r.score.is_none()).count(), 4);

        let frames = tracks.aggregate_frames(Aggregation::Median);
        assert_eq!(frames.get(&FrameKey::new("quiet", "vocals", Metric::Sdr)), Some(4.0));
    }

    #[test]
    fn test_add_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut tracks = TrackCollection::new();
        let err = tracks.add_directory(dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, Error::DirectoryNotFound(_)));
        assert!(tracks.is_empty());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.csv");

        let mut tracks = TrackCollection::new();
        tracks.add_track_json("a", TWO_FRAMES).unwrap();
        tracks.add_track_json("b", &track_json("drums", &[1.0, 7.0])).unwrap();
        tracks.save(&path).unwrap();

        let mut loaded = TrackCollection::new();
        loaded.load(&path).unwrap();
        assert_eq!(loaded.len(), tracks.len());

        let expected = tracks.aggregate_frames_and_tracks(Aggregation::Median, Aggregation::Mean);
        let actual = loaded.aggregate_frames_and_tracks(Aggregation::Median, Aggregation::Mean);
        assert_eq!(expected.len(), actual.len());
        for (key, score) in expected.iter() {
            let other = actual.get(key).unwrap();
            assert!(score == other || (score.is_nan() && other.is_nan()));
        }
    }

    #[test]
    fn test_render() {
        let mut tracks = TrackCollection::new();
        tracks.add_track_json("a", TWO_FRAMES).unwrap();
        tracks.add_track_json("b", &track_json("drums", &[1.0])).unwrap();

        let out = tracks.to_string();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Aggregated Scores (median over frames, median over tracks)");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("vocals          ==> SDR:   2.000  SIR:     NaN"));
        assert!(lines[2].starts_with("drums           ==> SDR:   1.000"));
    }
}
