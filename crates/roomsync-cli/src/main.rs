//! roomsync demo binary.
//!
//! # Usage
//!
//! ```bash
//! # Default run: 20 rooms, 50 mutations
//! roomsync-demo
//!
//! # Larger feed, partial sync, directory search at the end
//! roomsync-demo --rooms 200 --batch-size 50 --sync-mode partial --search ali
//! ```

use std::time::Duration;

use clap::{Parser, ValueEnum};
use roomsync_cli::DemoConfig;
use roomsync_core::{FeedConfig, SessionConfig, SyncMode};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Feed sync mode
#[derive(Debug, Clone, Copy, ValueEnum)]
enum SyncModeArg {
    /// Grow the synced range until the whole list is known
    Full,
    /// Keep only the first batch in sync
    Partial,
}

impl From<SyncModeArg> for SyncMode {
    fn from(mode: SyncModeArg) -> Self {
        match mode {
            SyncModeArg::Full => Self::Full,
            SyncModeArg::Partial => Self::Partial,
        }
    }
}

/// Simulated room-list sync session
#[derive(Parser, Debug)]
#[command(name = "roomsync-demo")]
#[command(about = "Run a simulated room-list sync session end to end")]
#[command(version)]
struct Args {
    /// Rooms in the feed at session start
    #[arg(short, long, default_value = "20")]
    rooms: usize,

    /// Feed mutations to apply
    #[arg(long, default_value = "50")]
    steps: usize,

    /// Pause between mutations in milliseconds
    #[arg(long, default_value = "10")]
    step_interval_ms: u64,

    /// Seed for generated rooms and mutations
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// Feed view name
    #[arg(long, default_value = "home")]
    feed_name: String,

    /// Rooms fetched per sync round
    #[arg(long, default_value = "20")]
    batch_size: u32,

    /// Feed sync mode
    #[arg(long, value_enum, default_value = "full")]
    sync_mode: SyncModeArg,

    /// Minimum query length before searching the directory
    #[arg(long, default_value = "3")]
    min_search_len: usize,

    /// Search the user directory once the mutations are done
    #[arg(long)]
    search: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn config(self) -> DemoConfig {
        let feed = FeedConfig {
            name: self.feed_name,
            batch_size: self.batch_size,
            sync_mode: self.sync_mode.into(),
            ..FeedConfig::default()
        };
        DemoConfig {
            session: SessionConfig { feed, min_search_query_len: self.min_search_len },
            rooms: self.rooms,
            seed: self.seed,
            steps: self.steps,
            step_interval: Duration::from_millis(self.step_interval_ms),
            search: self.search,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("roomsync demo starting");

    let report = roomsync_cli::run(args.config()).await.inspect_err(|e| {
        tracing::error!(error = %e, "demo failed");
    })?;

    tracing::info!(
        rooms = report.rooms,
        notifications = report.notifications,
        renders = report.renders,
        search_results = ?report.search_results,
        "demo finished"
    );

    Ok(())
}
