use anyhow::Context;
use bookstore_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// Bookstore catalog operations
#[derive(Debug, Parser)]
#[command(name = "bookstore-cli", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API until interrupted
    Serve,
    /// Insert the base author and books into empty collections
    Seed,
    /// Print the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load bookstore settings")?;

    match cli.command {
        Command::Config => {
            println!("{:#?}", settings);
            Ok(())
        }
        Command::Serve => {
            bookstore_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "serving from bookstore-cli");
            bookstore_app::serve(settings).await
        }
        Command::Seed => {
            bookstore_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "seeding from bookstore-cli");
            bookstore_app::seed(settings).await
        }
    }
}
