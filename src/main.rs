use delegation_rewards::orchestration::run_report;
use delegation_rewards::{config::Config, EventSource, FileEventSource};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries the report.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let source: Arc<dyn EventSource> = match FileEventSource::open(&config.events_path).await {
        Ok(source) => Arc::new(source),
        Err(e) => {
            eprintln!("Failed to load events from {}: {}", config.events_path, e);
            std::process::exit(1);
        }
    };

    let stdout = std::io::stdout();
    match run_report(&config, source, stdout.lock()).await {
        Ok(summary) => {
            tracing::info!(
                participants = summary.participants,
                total_allocated = %summary.total_allocated,
                remaining_budget = %summary.remaining_budget,
                "Done"
            );
        }
        Err(e) => {
            eprintln!("Run failed: {}", e);
            std::process::exit(1);
        }
    }
}
