use clap::Parser;
use volunteer_teams::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Migrate => cli::migrate::run().await,
        Command::Healthcheck => cli::healthcheck::run().await,
        Command::Stats(args) => cli::stats::run(args).await,
    }
}
