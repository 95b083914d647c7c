//! Collect command.

use std::path::Path;

use anyhow::{Context, Result};
use sep_eval::{MethodCollection, TrackCollection};

pub fn run(dir: &Path, output: &Path, method: Option<&str>, verbose: bool) -> Result<()> {
    if verbose {
        eprintln!("Scanning: {}", dir.display());
    }

    let mut tracks = TrackCollection::new();
    tracks
        .add_directory(dir)
        .with_context(|| format!("Failed to collect scores from {}", dir.display()))?;

    let table = tracks.table();
    println!("Collected {} rows", table.len());
    println!("  Tracks: {}", table.tracks().len());
    println!("  Targets: {}", table.targets().join(", "));

    if let Some(name) = method {
        let mut methods = MethodCollection::new();
        methods.add_method(&tracks, name);
        methods
            .save(output)
            .with_context(|| format!("Failed to save table to {}", output.display()))?;
        println!("  Method: {name}");
    } else {
        tracks
            .save(output)
            .with_context(|| format!("Failed to save table to {}", output.display()))?;
    }

    println!("Saved to: {}", output.display());
    Ok(())
}
