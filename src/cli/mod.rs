//! Command-line parsing for the ballot-box result exporter.
//!
//! Parsing stays here; turning flags into an `ExportConfig` (including
//! environment defaults) happens in `crate::app`.

use std::path::PathBuf;

use clap::Parser;

use crate::domain::{Category, FloatFormat, Round};

/// Top-level CLI.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "sandik",
    version,
    about = "Export per-ballot-box election results to CSV, one file per round and category"
)]
pub struct Cli {
    /// Directory the CSV reports are written to.
    #[arg(short = 'o', long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Directory for schema cache files (defaults to the output directory).
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Always run the discovery pass; never read or write schema caches.
    #[arg(long)]
    pub no_cache: bool,

    /// Round(s) to export. Repeatable; defaults to both.
    #[arg(short = 'r', long = "round", value_enum)]
    pub rounds: Vec<Round>,

    /// Categories to export. Repeatable; defaults to all four.
    #[arg(short = 'c', long = "category", value_enum)]
    pub categories: Vec<Category>,

    /// Election id on the provider (falls back to SANDIK_ELECTION_ID).
    #[arg(long)]
    pub election_id: Option<u64>,

    /// Provider API base URL (falls back to SANDIK_BASE_URL).
    #[arg(long)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// Delay between retries of a failed request, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    pub retry_delay_ms: u64,

    /// Give up on a request after this many attempts (default: retry forever).
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// How non-integer numbers are written.
    #[arg(long, value_enum, default_value_t = FloatFormat::Plain)]
    pub float_format: FloatFormat,

    /// Keep columns that never carried a value.
    #[arg(long)]
    pub keep_empty_columns: bool,

    /// Accept invalid TLS certificates from the provider.
    #[arg(long)]
    pub insecure: bool,

    /// More logging (debug).
    #[arg(short = 'v', long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Less logging (warnings and errors only).
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

impl Cli {
    pub fn selected_rounds(&self) -> Vec<Round> {
        if self.rounds.is_empty() {
            Round::ALL.to_vec()
        } else {
            dedup(&self.rounds)
        }
    }

    pub fn selected_categories(&self) -> Vec<Category> {
        if self.categories.is_empty() {
            Category::ALL.to_vec()
        } else {
            dedup(&self.categories)
        }
    }

    /// Default log filter; `RUST_LOG` still wins.
    pub fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else if self.quiet {
            log::LevelFilter::Warn
        } else {
            log::LevelFilter::Info
        }
    }
}

/// Drop repeats, keeping first-seen order.
fn dedup<T: Copy + PartialEq>(items: &[T]) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(item) {
            out.push(*item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("sandik").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_select_every_job() {
        let cli = parse(&[]);
        assert_eq!(cli.selected_rounds(), Round::ALL.to_vec());
        assert_eq!(cli.selected_categories(), Category::ALL.to_vec());
        assert_eq!(cli.timeout_secs, 60);
        assert_eq!(cli.retry_delay_ms, 1000);
        assert_eq!(cli.max_attempts, None);
        assert_eq!(cli.float_format, FloatFormat::Plain);
        assert_eq!(cli.log_level(), log::LevelFilter::Info);
    }

    #[test]
    fn repeated_filters_are_deduplicated() {
        let cli = parse(&[
            "--round",
            "parliamentary",
            "-c",
            "prison",
            "-c",
            "overseas",
            "-c",
            "prison",
        ]);
        assert_eq!(cli.selected_rounds(), vec![Round::Parliamentary]);
        assert_eq!(cli.selected_categories(), vec![Category::Prison, Category::Overseas]);
    }

    #[test]
    fn verbosity_flags_conflict() {
        assert_eq!(parse(&["-q"]).log_level(), log::LevelFilter::Warn);
        assert_eq!(parse(&["-v"]).log_level(), log::LevelFilter::Debug);
        assert!(Cli::try_parse_from(["sandik", "-v", "-q"]).is_err());
    }
}
