//! # sep-eval
//!
//! Aggregation of source separation evaluation scores.
//!
//! The evaluation toolkit writes framewise SDR, SIR, ISR and SAR scores as
//! one JSON file per track. This library flattens those files into a score
//! table and reduces it in two stages: first over the frames of each track,
//! then over the tracks of each method. It does not compute the metrics
//! itself.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sep_eval::{Aggregation, CollectionConfig, MethodCollection};
//!
//! let mut methods = MethodCollection::with_config(CollectionConfig::default());
//! methods.add_directory("./results/UMX")?;
//! methods.add_directory("./results/XUMX")?;
//!
//! let scores = methods.aggregate_frames_and_tracks(Aggregation::Median, Aggregation::Median);
//! print!("{methods}");
//! ```
//!
//! ## Modules
//!
//! - [`error`]: Error types for the library
//! - [`metrics`]: The four BSS Eval metrics
//! - [`record`]: Per-track JSON records and their normalization
//! - [`table`]: Score table, grouping and CSV persistence
//! - [`stats`]: NaN-skipping reductions and summaries
//! - [`collection`]: Track and method collections
//! - [`discovery`]: Evaluation file discovery
//! - [`baseline`]: Reference tables of published methods
//! - [`report`]: JSON aggregation reports

pub mod baseline;
pub mod collection;
pub mod discovery;
pub mod error;
pub mod metrics;
pub mod record;
pub mod report;
pub mod stats;
pub mod table;

// Re-export commonly used types
#[cfg(feature = "remote")]
pub use baseline::HttpBaseline;
pub use baseline::{BaselineSource, StaticBaseline};
pub use collection::{CollectionConfig, MethodCollection, TrackCollection};
pub use error::{Error, Result};
pub use metrics::Metric;
pub use record::{RawTrackRecord, normalize};
pub use report::AggregateReport;
pub use stats::{Aggregation, Summary};
pub use table::{AggregateResult, EvalTable, FrameKey, ScoreRow, TrackKey};
