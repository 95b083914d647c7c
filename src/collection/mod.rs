//! Score collections for one or many evaluated methods.
//!
//! - [`TrackCollection`]: scores of a single method across tracks
//! - [`MethodCollection`]: scores of many named methods
//! - [`CollectionConfig`]: aggregation used for rendering summaries
//!
//! ## Example
//!
//! ```rust,ignore
//! use sep_eval::{Aggregation, MethodCollection, TrackCollection};
//!
//! let mut umx = TrackCollection::new();
//! umx.add_directory("./results/UMX")?;
//!
//! let mut methods = MethodCollection::new();
//! methods.add_method(&umx, "UMX");
//! methods.add_directory("./results/XUMX")?;
//!
//! let scores = methods.aggregate_frames_and_tracks(Aggregation::Median, Aggregation::Median);
//! println!("{methods}");
//! ```

mod method;
mod track;

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

pub use method::MethodCollection;
pub use track::TrackCollection;

use crate::discovery::discover_eval_files;
use crate::error::{Error, Result};
use crate::metrics::Metric;
use crate::record::normalize_json;
use crate::stats::Aggregation;
use crate::table::{AggregateResult, ScoreRow, TrackKey};

/// Aggregation settings of a collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionConfig {
    /// Reduction over the frames of a track.
    pub frames_agg: Aggregation,
    /// Reduction over tracks.
    pub tracks_agg: Aggregation,
}

impl CollectionConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> CollectionConfigBuilder {
        CollectionConfigBuilder::default()
    }
}

/// Builder for [`CollectionConfig`].
#[derive(Debug, Default)]
pub struct CollectionConfigBuilder {
    frames_agg: Option<Aggregation>,
    tracks_agg: Option<Aggregation>,
}

impl CollectionConfigBuilder {
    /// Set the reduction over frames.
    #[must_use]
    pub fn frames_agg(mut self, agg: Aggregation) -> Self {
        self.frames_agg = Some(agg);
        self
    }

    /// Set the reduction over tracks.
    #[must_use]
    pub fn tracks_agg(mut self, agg: Aggregation) -> Self {
        self.tracks_agg = Some(agg);
        self
    }

    /// Build the configuration. Unset reductions default to median.
    #[must_use]
    pub fn build(self) -> CollectionConfig {
        CollectionConfig {
            frames_agg: self.frames_agg.unwrap_or_default(),
            tracks_agg: self.tracks_agg.unwrap_or_default(),
        }
    }
}

/// Read and normalize every evaluation file of a result directory.
///
/// All files are parsed before anything is returned, so a single bad file
/// fails the whole scan.
pub(crate) fn scan_directory(root: &Path) -> Result<Vec<ScoreRow>> {
    let files = discover_eval_files(root)?;
    let mut rows = Vec::new();

    for file in &files {
        let json = fs::read_to_string(&file.path)?;
        let track_rows = normalize_json(&json, &file.track).map_err(|e| match e {
            Error::Parse { source, .. } => Error::Parse {
                origin: file.path.display().to_string(),
                source,
            },
            other => other,
        })?;
        tracing::debug!(track = %file.track, rows = track_rows.len(), "parsed evaluation file");
        rows.extend(track_rows);
    }

    tracing::info!(root = %root.display(), tracks = files.len(), rows = rows.len(), "scanned result directory");
    Ok(rows)
}

/// Render the two-stage summary header.
pub(crate) fn write_header(out: &mut String, config: &CollectionConfig) {
    let _ = writeln!(
        out,
        "Aggregated Scores ({} over frames, {} over tracks)",
        config.frames_agg, config.tracks_agg
    );
}

/// Render one line per target with the four metrics to 3 decimals.
///
/// Metrics without a score for a target print as `NaN`.
pub(crate) fn write_targets(
    out: &mut String,
    targets: &[&str],
    scores: &AggregateResult<TrackKey>,
    method: Option<&str>,
) {
    for target in targets {
        let _ = write!(out, "{:<16}==> ", target);
        for metric in Metric::DISPLAY_ORDER {
            let key = TrackKey {
                method: method.map(String::from),
                target: (*target).to_string(),
                metric,
            };
            let score = scores.get(&key).unwrap_or(f64::NAN);
            let _ = write!(out, "{}:{:>8.3}  ", metric, score);
        }
        out.push('\n');
    }
}
