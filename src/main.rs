use clap::Parser;
use rating_sync::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Sync(args) => cli::sync::run(args).await,
        Command::Serve => cli::serve::run().await,
    }
}
