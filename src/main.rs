use clap::Parser;
use freight_reason_search::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Search { text, limit } => cli::query::search(text, limit).await,
        Command::Similar { document_id, limit } => cli::query::similar(document_id, limit).await,
        Command::Stats => cli::query::stats().await,
    }
}
