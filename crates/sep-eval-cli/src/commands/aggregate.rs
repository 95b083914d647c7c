//! Aggregate command.

use std::path::Path;

use anyhow::{Context, Result};
use sep_eval::report::ScoreEntry;
use sep_eval::{AggregateReport, CollectionConfig, MethodCollection};

pub fn run(input: &Path, by_track: bool, json: Option<&Path>, config: &CollectionConfig) -> Result<()> {
    let mut methods = MethodCollection::with_config(*config);
    methods
        .load(input)
        .with_context(|| format!("Failed to load table from {}", input.display()))?;

    let report = if by_track {
        AggregateReport::frames(methods.table(), config.frames_agg)
    } else {
        AggregateReport::frames_and_tracks(methods.table(), config)
    };

    print_scores(&report.scores, by_track);

    if let Some(path) = json {
        report
            .save(path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        println!("Saved to: {}", path.display());
    }

    Ok(())
}

fn print_scores(scores: &[ScoreEntry], by_track: bool) {
    if by_track {
        println!("{:<15} {:<30} {:<12} {:<6} {:>8}", "Method", "Track", "Target", "Metric", "Score");
    } else {
        println!("{:<15} {:<12} {:<6} {:>8}", "Method", "Target", "Metric", "Score");
    }
    println!("{:-<75}", "");

    for entry in scores {
        let method = entry.method.as_deref().unwrap_or("-");
        let score = entry.score.unwrap_or(f64::NAN);
        if by_track {
            let track = entry.track.as_deref().unwrap_or("-");
            let len = track.chars().count();
            let track = if len > 28 {
                let tail: String = track.chars().skip(len - 25).collect();
                format!("...{tail}")
            } else {
                track.to_string()
            };
            println!("{:<15} {:<30} {:<12} {:<6} {:>8.3}", method, track, entry.target, entry.metric, score);
        } else {
            println!("{:<15} {:<12} {:<6} {:>8.3}", method, entry.target, entry.metric, score);
        }
    }
}
