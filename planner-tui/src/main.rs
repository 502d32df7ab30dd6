use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cli;
mod form;
mod format;
mod ui;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Opt-in via RUST_LOG. Logs go to stderr so they stay out of the terminal UI and JSON output.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .filter(|raw| !raw.trim().is_empty())
        .and_then(|raw| EnvFilter::try_new(raw.trim()).ok())
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    cli::Cli::parse().run().await
}
