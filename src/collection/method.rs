//! Scores of many named methods.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::baseline::BaselineSource;
use crate::collection::{CollectionConfig, TrackCollection, scan_directory, write_header, write_targets};
use crate::discovery::method_name;
use crate::error::{Error, Result};
use crate::stats::Aggregation;
use crate::table::{AggregateResult, EvalTable, FrameKey, ScoreRow, TrackKey, read_csv, write_csv};

/// Accumulates whole [`TrackCollection`]s under method names.
///
/// Every row of a method collection carries the method it was merged under.
#[derive(Debug, Clone, Default)]
pub struct MethodCollection {
    config: CollectionConfig,
    table: EvalTable,
}

impl MethodCollection {
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

    /// Check if no method has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Methods in order of first appearance.
    #[must_use]
    pub fn methods(&self) -> Vec<&str> {
        self.table.methods()
    }

    /// Copy all rows of `tracks`, stamped with `name` as their method.
    ///
    /// The source collection is left untouched.
    pub fn add_method(&mut self, tracks: &TrackCollection, name: &str) {
        self.table.extend(stamp(tracks.table().iter().cloned(), name));
        tracing::info!(method = name, rows = tracks.len(), "added method");
    }

    /// Scan a result directory and add it under the directory's base name.
    ///
    /// Returns the number of rows added.
    pub fn add_directory(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let rows = scan_directory(path)?;
        let added = rows.len();
        let name = method_name(path);
        self.table.extend(stamp(rows, &name));
        tracing::info!(method = %name, rows = added, "added method directory");
        Ok(added)
    }

    /// Union a baseline table of published methods into this collection.
    ///
    /// Rows are appended as they are, so calling this twice duplicates them.
    /// Returns the number of rows added.
    pub fn add_remote_baseline(&mut self, source: &impl BaselineSource) -> Result<usize> {
        tracing::info!(source = %source.describe(), "fetching baseline scores");
        let baseline = source.load_table()?;
        require_methods(&baseline)?;
        let added = baseline.len();
        self.table.append(baseline);
        tracing::info!(rows = added, "added baseline scores");
        Ok(added)
    }

    /// Reduce frames to one score per `(method, track, target, metric)`.
    #[must_use]
    pub fn aggregate_frames(&self, frames_agg: Aggregation) -> AggregateResult<FrameKey> {
        self.table.aggregate_frames(frames_agg)
    }

    /// Reduce frames per track, then tracks per `(method, target, metric)`.
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
    /// Fails with [`Error::MalformedTable`] if a row has no method.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::open(path.as_ref())?;
        let table = read_csv(BufReader::new(file))?;
        require_methods(&table)?;
        self.table = table;
        tracing::info!(path = %path.as_ref().display(), rows = self.table.len(), "loaded method table");
        Ok(())
    }

    /// Write the table to `path`, replacing the file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        write_csv(&self.table, BufWriter::new(file))
    }

    /// Human-readable two-stage summary.
    ///
    /// One block per method, one line per target within it. Targets keep
    /// the order in which they first appear for that method.
    #[must_use]
    pub fn render(&self) -> String {
        let scores = self.aggregate_frames_and_tracks(self.config.frames_agg, self.config.tracks_agg);
        let mut out = String::new();
        write_header(&mut out, &self.config);

        for method in self.table.methods() {
            out.push_str(method);
            out.push('\n');
            write_targets(&mut out, &self.table.targets_for(method), &scores, Some(method));
        }
        out
    }
}

impl fmt::Display for MethodCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn stamp(rows: impl IntoIterator<Item = ScoreRow>, name: &str) -> impl Iterator<Item = ScoreRow> {
    rows.into_iter().map(move |mut row| {
        row.method = Some(name.to_string());
        row
    })
}

fn require_methods(table: &EvalTable) -> Result<()> {
    match table.iter().position(|r| r.method.as_deref().map_or(true, str::is_empty)) {
        Some(idx) => Err(Error::MalformedTable {
            line: idx + 2,
            reason: "row has no method".to_string(),
        }),
        None => Ok(()),
    }
}
