//! Summary command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use sep_eval::baseline::BASELINE_URL_ENV;
use sep_eval::{CollectionConfig, HttpBaseline, MethodCollection, StaticBaseline};

/// Where to take baseline scores from.
pub struct BaselineArgs {
    pub enabled: bool,
    pub url: Option<String>,
    pub file: Option<PathBuf>,
}

pub fn run(dirs: &[PathBuf], baseline: &BaselineArgs, config: &CollectionConfig) -> Result<()> {
    let mut methods = MethodCollection::with_config(*config);

    for dir in dirs {
        let rows = methods
            .add_directory(dir)
            .with_context(|| format!("Failed to collect scores from {}", dir.display()))?;
        tracing::debug!(dir = %dir.display(), rows, "collected");
    }

    if baseline.enabled || baseline.file.is_some() {
        add_baseline(&mut methods, baseline)?;
    }

    if methods.is_empty() {
        eprintln!("No scores found (expected <dir>/test/**/*.json)");
    }

    print!("{methods}");
    Ok(())
}

fn add_baseline(methods: &mut MethodCollection, baseline: &BaselineArgs) -> Result<()> {
    let result = if let Some(path) = &baseline.file {
        let source = StaticBaseline::new(read_table(path)?);
        methods.add_remote_baseline(&source)
    } else if let Some(url) = &baseline.url {
        methods.add_remote_baseline(&HttpBaseline::new(url.as_str()))
    } else {
        bail!("--baseline needs --baseline-url, {BASELINE_URL_ENV} or --baseline-file (no default baseline is published as CSV)");
    };
    let added = result.context("Failed to add baseline scores")?;

    tracing::info!(rows = added, "baseline added");
    Ok(())
}

fn read_table(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}
