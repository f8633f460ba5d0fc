//! CLI module
//!
//! - `serve`: run the HTTP API
//! - `search`, `similar`, `stats`: run one operation and print JSON

pub mod query;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging::init_logging;

/// Freight Reason Search - semantic search over freight-payment event reasons
#[derive(Parser)]
#[command(name = "freight-reason-search")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Search reasons similar to a text
    Search {
        text: String,
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Find documents similar to a stored document
    Similar {
        document_id: String,
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Print document counts and embedding coverage
    Stats,
}

/// Loads `.env` and layered configuration, then installs logging
pub fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&config.logging);

    Ok(config)
}
