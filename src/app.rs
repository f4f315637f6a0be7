//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and resolves environment defaults
//! - prepares output/cache directories and the HTTP client
//! - runs every (round, category) job on its own worker
//! - prints the final `DONE.`

use std::path::Path;
use std::time::Duration;

use clap::Parser;
use rayon::prelude::*;

use crate::cli::Cli;
use crate::data::{ApiClient, DEFAULT_BASE_URL, DEFAULT_ELECTION_ID, Fetch, HttpFetcher, RetryPolicy};
use crate::domain::{ExportConfig, Job};
use crate::error::AppError;
use crate::io::{Clock, FixedOffsetClock, SchemaCache};

pub mod pipeline;

pub const ENV_BASE_URL: &str = "SANDIK_BASE_URL";
pub const ENV_ELECTION_ID: &str = "SANDIK_ELECTION_ID";

/// Entry point for the `sandik` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    // `.env` may carry RUST_LOG, so it is loaded before the logger.
    dotenvy::dotenv().ok();
    logger(cli.log_level(), std::env::var("RUST_LOG").ok().as_deref()).init();

    let config = config_from_cli(&cli, |key| std::env::var(key).ok())?;

    prepare_dir(&config.out_dir)?;
    if let Some(dir) = &config.cache_dir {
        prepare_dir(dir)?;
    }

    let fetcher = HttpFetcher::new(&config.base_url, config.request_timeout, config.insecure_tls)?;
    let api = ApiClient::new(fetcher, retry_policy(&config), config.election_id);
    let cache = match &config.cache_dir {
        Some(dir) => SchemaCache::new(dir),
        None => SchemaCache::disabled(),
    };
    let clock = FixedOffsetClock::report_default();

    run_jobs(&api, &config.jobs(), &cache, &config, &clock)?;

    println!("DONE.");
    Ok(())
}

/// Logger with `level` as the default and `rust_log` directives on top.
fn logger(level: log::LevelFilter, rust_log: Option<&str>) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).format_timestamp_secs();
    if let Some(directives) = rust_log {
        builder.parse_filters(directives);
    }
    builder
}

/// Resolve CLI flags against environment defaults.
///
/// `env` is the variable lookup (process environment in production).
pub fn config_from_cli(cli: &Cli, env: impl Fn(&str) -> Option<String>) -> Result<ExportConfig, AppError> {
    let base_url = cli
        .base_url
        .clone()
        .or_else(|| env(ENV_BASE_URL).filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let election_id = match (cli.election_id, env(ENV_ELECTION_ID)) {
        (Some(id), _) => id,
        (None, Some(raw)) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| AppError::new(2, format!("Invalid {ENV_ELECTION_ID}: '{raw}'")))?,
        (None, _) => DEFAULT_ELECTION_ID,
    };

    let cache_dir = if cli.no_cache {
        None
    } else {
        Some(cli.cache_dir.clone().unwrap_or_else(|| cli.out_dir.clone()))
    };

    Ok(ExportConfig {
        base_url,
        election_id,
        rounds: cli.selected_rounds(),
        categories: cli.selected_categories(),
        out_dir: cli.out_dir.clone(),
        cache_dir,
        request_timeout: Duration::from_secs(cli.timeout_secs),
        retry_delay: Duration::from_millis(cli.retry_delay_ms),
        max_attempts: cli.max_attempts,
        insecure_tls: cli.insecure,
        float_format: cli.float_format,
        keep_empty_columns: cli.keep_empty_columns,
    })
}

pub fn retry_policy(config: &ExportConfig) -> RetryPolicy {
    match config.max_attempts {
        Some(max) => RetryPolicy::bounded(max, config.retry_delay),
        None => RetryPolicy::forever(config.retry_delay),
    }
}

fn prepare_dir(dir: &Path) -> Result<(), AppError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| AppError::new(2, format!("Failed to create directory '{}': {e}", dir.display())))
}

/// Run all jobs concurrently, one worker per job.
///
/// The pool has exactly one thread per job and `with_max_len(1)` makes every
/// job its own task, so no job waits behind another's blocking requests.
/// A failing job ends the whole process with its exit code; the other
/// workers are not waited for.
pub fn run_jobs<F: Fetch>(
    api: &ApiClient<F>,
    jobs: &[Job],
    cache: &SchemaCache,
    config: &ExportConfig,
    clock: &dyn Clock,
) -> Result<(), AppError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.len().max(1))
        .thread_name(|i| format!("sandik-job-{i}"))
        .build()
        .map_err(|e| AppError::new(2, format!("Failed to start worker pool: {e}")))?;

    pool.install(|| {
        jobs.par_iter().with_max_len(1).for_each(|&job| {
            match pipeline::run_job(api, job, cache, config, clock) {
                Ok(summary) => log::info!(
                    "[{job}] wrote {} rows x {} columns to {}{}",
                    summary.rows,
                    summary.columns,
                    summary.path.display(),
                    if summary.cache_hit { " (cached schema)" } else { "" }
                ),
                Err(err) => {
                    log::error!("[{job}] {err}");
                    eprintln!("{err}");
                    std::process::exit(i32::from(err.exit_code()));
                }
            }
        })
    });
    Ok(())
}
