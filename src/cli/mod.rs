//! CLI module for the rating synchronizer
//!
//! - `sync`: run one synchronization and exit
//! - `serve`: read API, optionally with scheduled synchronization

pub mod serve;
pub mod sync;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Rating sync - refreshes team release ratings from the rating service
#[derive(Parser)]
#[command(name = "rating-sync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run one synchronization: enumerate, fetch, transform and swap the table
    Sync(sync::SyncArgs),

    /// Run the read API server
    Serve,
}

/// Load `.env`, the layered configuration and the tracing subscriber
fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    Ok(config)
}
