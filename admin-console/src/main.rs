use admin_console::cli::{self, Cli};
use admin_console::config::get_configuration;
use admin_console::Console;
use clap::Parser;
use console_core::observability::init_tracing;
use dotenvy::dotenv;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Cli::parse();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "admin-console",
        &configuration.telemetry.log_level,
        configuration.telemetry.otlp_endpoint.as_deref(),
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    let console = Console::bootstrap(&configuration).await.map_err(|e| {
        tracing::error!("Failed to start console: {}", e);
        anyhow::anyhow!("Startup error: {}", e)
    })?;

    cli::run(&console, args).await
}
