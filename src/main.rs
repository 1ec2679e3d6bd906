//! TaskHub server binary

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use taskhub::config::LoggingConfig;
use taskhub::server::builder::{load_config, run_server};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "taskhub", version, about = "Collaborative project-management server")]
struct Args {
    /// YAML configuration file; environment variables are used when it is absent
    #[arg(short, long, env = "TASKHUB_CONFIG", default_value = "config/taskhub.yaml")]
    config: PathBuf,

    /// Override the bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port
    #[arg(short, long)]
    port: Option<u16>,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let (mut config, source) = match load_config(&args.config).await {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(host) = args.host {
        config.app.server.host = host;
    }
    if let Some(port) = args.port {
        config.app.server.port = port;
    }

    init_tracing(&config.app.logging);
    info!("Configuration loaded from {}", source);

    match run_server(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
