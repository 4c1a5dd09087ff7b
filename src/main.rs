use clap::Parser;
use parley::api::ApiClient;
use parley::cli::{commands::Cli, run_cli};
use parley::config::AppConfig;
use parley::llm::TransportFactory;
use std::process::ExitCode;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(path) = &cli.env_file {
        if let Err(e) = dotenv::from_filename(path) {
            error!("Failed to read env file {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    }

    let config = match AppConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut builder = reqwest::Client::builder();
    if let Some(secs) = config.transport.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    let client = match builder.build() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to initialize HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let transport = TransportFactory::create(&config, client.clone());
    let api = ApiClient::new(client, config.transport.api_base_url.clone());

    run_cli(cli.command, config, transport, api).await
}
