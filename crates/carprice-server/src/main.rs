//! Car Price Estimator
//!
//! Serves the estimator form, or runs one-off predictions from the command
//! line against the exported GBM artifact.

use carprice_model::ModelLoader;
use carprice_server::cli::{Cli, CommonArgs, Commands};
use carprice_server::config::ServerConfig;
use carprice_server::server::run_server;
use carprice_server::state::AppState;
use carprice_server::telemetry::{init_logging, init_metrics};
use carprice_server::{predict_price, render};
use clap::Parser;
use std::net::SocketAddr;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            address,
            common,
            preload,
        } => {
            init_logging(common.verbose);

            let mut config = load_config(&common)?;
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(address) = address {
                config.server.address = address;
            }
            config.model.preload |= preload;

            let addr: SocketAddr =
                format!("{}:{}", config.server.address, config.server.port).parse()?;
            let preload = config.model.preload;

            info!("Model: {}", config.model.path.display());

            let metrics_handle = init_metrics()?;
            let state = AppState::new(config).with_prometheus(metrics_handle);

            if preload {
                // A broken artifact should stop the process before it serves anything
                state.loader.get().await?;
            }

            println!();
            println!("  🚗 Car Price Estimator");
            println!();
            println!("  Open http://{} in your browser", addr);
            println!();

            run_server(state, addr).await?;
        }

        Commands::Predict { vehicle, common } => {
            init_logging(common.verbose);

            let config = load_config(&common)?;
            let loader = ModelLoader::new(config.model.path);
            let result = predict_price(&loader, &vehicle.to_raw_inputs()).await;

            println!("{}", render(&result));
            if result.is_err() {
                std::process::exit(1);
            }
        }

        Commands::Inspect { common } => {
            init_logging(common.verbose);

            let config = load_config(&common)?;
            let loader = ModelLoader::new(config.model.path);
            let loaded = loader.get().await?;

            println!("{}", serde_json::to_string_pretty(&loaded.info)?);
        }
    }

    Ok(())
}

/// Load layered configuration and apply the shared `--model` override
fn load_config(common: &CommonArgs) -> anyhow::Result<ServerConfig> {
    let mut config = ServerConfig::load(Some(&common.config))?;
    if let Some(model) = &common.model {
        config.model.path = model.clone();
    }
    Ok(config)
}
