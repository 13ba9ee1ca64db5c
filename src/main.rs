// src/main.rs

//! The main entry point for the comet client binary.

use anyhow::Result;
use comet_client::PushClient;
use comet_client::config::ClientConfig;
use comet_client::core::LoggingListener;
use std::env;
use tracing::{error, info};
use tracing_subscriber::filter::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    run_app().await
}

async fn run_app() -> Result<()> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let args: Vec<String> = env::args().collect();

    if args.contains(&"--version".to_string()) {
        println!("comet-client version {VERSION}");
        return Ok(());
    }

    // The config path can be provided via a --config flag; otherwise it defaults to "client.toml".
    let config_path = args
        .iter()
        .position(|arg| arg == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
        .unwrap_or("client.toml");

    let config = match ClientConfig::from_file(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration from \"{config_path}\": {e:#}");
            std::process::exit(1);
        }
    };

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .compact()
        .with_ansi(true)
        .init();

    let client = match PushClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build comet client: {}", e);
            return Err(e.into());
        }
    };
    client.set_listener(LoggingListener);

    info!("Starting comet client version {VERSION}...");
    let mut read_loop = client.start();

    let interrupted = tokio::select! {
        _ = tokio::signal::ctrl_c() => true,
        result = &mut read_loop => {
            if let Err(e) = result {
                error!("Read loop ended abnormally: {}", e);
            }
            info!("Comet connection ended with state {}.", client.state());
            false
        }
    };

    if interrupted {
        info!("Received Ctrl-C, stopping comet client.");
        client.stop();
        if let Err(e) = read_loop.await {
            error!("Read loop ended abnormally: {}", e);
        }
    }

    Ok(())
}
