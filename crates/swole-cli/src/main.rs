//! Swolemate CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use swole_cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate(args) => commands::execute_evaluate(args).await?,
        Commands::Corpus(args) => commands::execute_corpus(args).await?,
        Commands::Version => {
            println!("swole {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
