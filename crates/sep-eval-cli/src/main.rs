//! sep-eval CLI - source separation score aggregation

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sep_eval::baseline::BASELINE_URL_ENV;
use sep_eval::{Aggregation, CollectionConfig};
use tracing_subscriber::EnvFilter;

mod commands;

/// Aggregate source separation evaluation scores.
#[derive(Parser)]
#[command(name = "sep-eval")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Reductions applied over frames and tracks.
#[derive(Args, Debug, Clone)]
pub struct AggArgs {
    /// Aggregation over the frames of a track (median, mean)
    #[arg(long, default_value = "median", value_parser = parse_aggregation)]
    frames_agg: Aggregation,

    /// Aggregation over tracks (median, mean)
    #[arg(long, default_value = "median", value_parser = parse_aggregation)]
    tracks_agg: Aggregation,
}

impl AggArgs {
    pub fn config(&self) -> CollectionConfig {
        CollectionConfig::builder()
            .frames_agg(self.frames_agg)
            .tracks_agg(self.tracks_agg)
            .build()
    }
}

fn parse_aggregation(s: &str) -> Result<Aggregation, String> {
    s.parse().map_err(|e: sep_eval::Error| e.to_string())
}

#[derive(Subcommand)]
enum Commands {
    /// Print aggregated scores of one or more result directories
    Summary {
        /// Result directories, one per method
        #[arg(required = true)]
        dirs: Vec<PathBuf>,

        /// Include a baseline table (needs --baseline-url, SEP_EVAL_BASELINE_URL or --baseline-file)
        ///
        /// There is no built-in download location. The published SiSEC18
        /// scores only exist as a pandas pickle, so the baseline has to be a
        /// score table in the CSV layout written by `collect`.
        #[arg(long)]
        baseline: bool,

        /// URL of the baseline table (CSV)
        #[arg(long, env = BASELINE_URL_ENV)]
        baseline_url: Option<String>,

        /// Local baseline table instead of a download
        #[arg(long, conflicts_with = "baseline_url")]
        baseline_file: Option<PathBuf>,

        #[command(flatten)]
        agg: AggArgs,
    },

    /// Scan a result directory and save its score table
    Collect {
        /// Result directory
        dir: PathBuf,

        /// Output table (CSV)
        #[arg(short, long)]
        output: PathBuf,

        /// Stamp rows with a method name (defaults to none)
        #[arg(long)]
        method: Option<String>,
    },

    /// Aggregate a saved method table
    Aggregate {
        /// Input table (CSV)
        #[arg(short, long)]
        input: PathBuf,

        /// Report per track instead of over tracks
        #[arg(long)]
        by_track: bool,

        /// Write the report as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        #[command(flatten)]
        agg: AggArgs,
    },

    /// Show score distributions of a saved method table
    Stats {
        /// Input table (CSV)
        #[arg(short, long)]
        input: PathBuf,

        /// Aggregation over the frames of a track (median, mean)
        #[arg(long, default_value = "median", value_parser = parse_aggregation)]
        frames_agg: Aggregation,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Summary { dirs, baseline, baseline_url, baseline_file, agg } => {
            let source = commands::summary::BaselineArgs { enabled: baseline, url: baseline_url, file: baseline_file };
            commands::summary::run(&dirs, &source, &agg.config())
        }
        Commands::Collect { dir, output, method } => {
            commands::collect::run(&dir, &output, method.as_deref(), cli.verbose)
        }
        Commands::Aggregate { input, by_track, json, agg } => {
            commands::aggregate::run(&input, by_track, json.as_deref(), &agg.config())
        }
        Commands::Stats { input, frames_agg } => commands::stats::run(&input, frames_agg),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_baseline_url_reads_env() {
        let cmd = Cli::command();
        let summary = cmd.find_subcommand("summary").unwrap();
        let url = summary.get_arguments().find(|a| a.get_id() == "baseline_url").unwrap();
        assert_eq!(url.get_env(), Some(std::ffi::OsStr::new(BASELINE_URL_ENV)));
    }

    #[test]
    fn test_baseline_help_names_sources() {
        let cmd = Cli::command();
        let summary = cmd.find_subcommand("summary").unwrap();
        let flag = summary.get_arguments().find(|a| a.get_id() == "baseline").unwrap();
        let help = flag.get_help().unwrap().to_string();
        assert!(help.contains("--baseline-url"));
        assert!(help.contains(BASELINE_URL_ENV));
        assert!(help.contains("--baseline-file"));
        let long_help = flag.get_long_help().unwrap().to_string();
        assert!(long_help.contains("pandas pickle"));
    }

    #[test]
    fn test_baseline_file_conflicts_with_url() {
        let parsed = Cli::try_parse_from([
            "sep-eval",
            "summary",
            "results",
            "--baseline-url",
            "https://example.org/b.csv",
            "--baseline-file",
            "b.csv",
        ]);
        assert!(parsed.is_err());
    }
}
