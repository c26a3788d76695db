//! tickcache - find the climbers who share the most routes with you.
//!
//! Reads a user's ticked route URLs, brings the local route tick cache up to
//! date from the ticks API, and prints the users with the most routes in
//! common:
//!
//! ```text
//! tickcache 200123456/thomas-anderson --routes ticks.txt
//! tickcache 200123456/thomas-anderson --routes ticks.txt --threshold-mins 1440
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

use tickcache_core::{compare, CacheStore, Config, TargetUser, TickClient, TickSync};

/// Log file name inside the log directory
const LOG_FILE: &str = "tickcache.log";

#[derive(Parser, Debug)]
#[command(name = "tickcache", version)]
#[command(about = "Find other climbers with the most routes in common")]
struct Args {
    /// Target user as <id>/<name>, e.g. 200123456/thomas-anderson
    user: String,

    /// File with the user's ticked route URLs, one per line
    #[arg(short, long, env = "TICKCACHE_ROUTES")]
    routes: PathBuf,

    /// Config file (default: ~/.config/tickcache/config.json)
    #[arg(short, long, env = "TICKCACHE_CONFIG")]
    config: Option<PathBuf>,

    /// Route tick cache file
    #[arg(long, env = "TICKCACHE_CACHE_FILE")]
    cache_file: Option<PathBuf>,

    /// Minutes before a cached route is checked against the API again
    #[arg(short, long, env = "TICKCACHE_THRESHOLD_MINS")]
    threshold_mins: Option<i64>,

    /// Number of users to report
    #[arg(short, long)]
    max_rank: Option<usize>,

    /// Directory for the log file
    #[arg(long, env = "TICKCACHE_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Write the effective settings back to the config file
    #[arg(long)]
    save_config: bool,
}

/// Initialize the tracing subscriber: warnings to stderr, everything
/// `RUST_LOG` allows (default info) to the log file.
fn init_tracing(log_dir: &Path) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match std::fs::create_dir_all(log_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(filter);
            (Some(layer), Some(guard))
        }
        Err(e) => {
            eprintln!("{} not usable ({}), logging to stderr only", log_dir.display(), e);
            (None, None)
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_filter(LevelFilter::WARN))
        .with(file_layer)
        .init();

    guard
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None if Config::config_path().is_ok() => Config::load()?,
        None => Config::default(),
    };

    if let Some(ref path) = args.cache_file {
        config.cache_file = Some(path.clone());
    }
    if let Some(ref dir) = args.log_dir {
        config.log_dir = Some(dir.clone());
    }
    if let Some(mins) = args.threshold_mins {
        config.sync.refetch_threshold_mins = mins;
    }
    if let Some(rank) = args.max_rank {
        config.sync.max_rank = rank;
    }
    config.sync.validate().context("Invalid sync settings")?;
    Ok(config)
}

fn save_config(args: &Args, config: &Config) -> Result<()> {
    match &args.config {
        Some(path) => config.save_to(path),
        None => config.save(),
    }
}

/// Route URLs from a text file; blank lines and `#` comments are ignored.
fn read_route_list(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read route list: {}", path.display()))?;
    Ok(parse_route_list(&contents))
}

fn parse_route_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let config = load_config(&args)?;
    let _guard = init_tracing(&config.log_dir());

    if args.save_config {
        save_config(&args, &config)?;
        info!("Saved settings to config file");
    }

    let started = Instant::now();
    let target = TargetUser::parse(&args.user)?;
    info!(user = %target, version = env!("CARGO_PKG_VERSION"), "Starting tickcache");

    let route_urls = read_route_list(&args.routes)?;
    info!(routes = route_urls.len(), path = %args.routes.display(), "Read route list");

    let cache_file = config.cache_file();
    if config.cache_file.is_none() {
        if let Some(parent) = cache_file.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create cache directory: {}", parent.display()))?;
        }
    }
    let store = CacheStore::new(cache_file);

    let client = TickClient::new(&config.sync)?;
    let sync = TickSync::new(client, config.sync.clone());
    let now = chrono::Local::now().naive_local();

    let comparison = match compare(&store, &sync, &target, &route_urls, now).await {
        Ok(comparison) => comparison,
        Err(e) => {
            error!(error = %e, "tickcache run failed");
            return Err(e.into());
        }
    };

    if !comparison.persisted {
        warn!(path = %store.path().display(), "Route tick cache was not saved");
    }
    if !comparison.skipped_routes.is_empty() {
        warn!(count = comparison.skipped_routes.len(), "Some routes were skipped");
    }

    for line in &comparison.results {
        println!("{}", line);
    }

    info!(
        user = %target,
        elapsed_secs = %format!("{:.2}", started.elapsed().as_secs_f64()),
        "tickcache finished"
    );
    Ok(())
}
