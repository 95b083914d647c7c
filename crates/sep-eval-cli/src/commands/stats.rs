//! Statistics command.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use sep_eval::{Aggregation, MethodCollection, Metric, Summary};

pub fn run(input: &Path, frames_agg: Aggregation) -> Result<()> {
    let mut methods = MethodCollection::new();
    methods
        .load(input)
        .with_context(|| format!("Failed to load table from {}", input.display()))?;

    let table = methods.table();
    println!("Total rows: {}", table.len());
    println!("Methods: {}", table.methods().len());
    println!("Tracks: {}", table.tracks().len());
    println!();

    // Track-level scores per (method, target, metric)
    let mut groups: BTreeMap<(String, String, Metric), Vec<f64>> = BTreeMap::new();
    for (key, score) in methods.aggregate_frames(frames_agg) {
        let method = key.method.unwrap_or_default();
        groups.entry((method, key.target, key.metric)).or_default().push(score);
    }

    println!("Track scores ({frames_agg} over frames):");
    println!(
        "{:<15} {:<12} {:<6} {:>6} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "Method", "Target", "Metric", "Tracks", "Mean", "Median", "StdDev", "P5", "P95"
    );
    println!("{:-<90}", "");

    for ((method, target, metric), scores) in &groups {
        match Summary::compute(scores) {
            Some(s) => println!(
                "{:<15} {:<12} {:<6} {:>6} {:>8.3} {:>8.3} {:>8.3} {:>8.3} {:>8.3}",
                method, target, metric, s.count, s.mean, s.median, s.std_dev, s.p5, s.p95
            ),
            None => println!("{:<15} {:<12} {:<6} {:>6} {:>8}", method, target, metric, 0, "-"),
        }
    }

    Ok(())
}
