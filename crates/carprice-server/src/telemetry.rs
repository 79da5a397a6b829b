//! Logging and metrics setup for the binary

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing. Logs go to stderr so CLI output stays clean on stdout.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("carprice=debug,carprice_server=debug,carprice_model=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("carprice=info,carprice_server=info,carprice_model=info,tower_http=warn")
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Install the Prometheus recorder and return the handle for rendering
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "carprice_predictions_total",
        "Total number of prediction requests by outcome"
    );
    metrics::describe_histogram!(
        "carprice_prediction_latency_us",
        metrics::Unit::Microseconds,
        "End-to-end prediction latency in microseconds"
    );
    metrics::describe_counter!(
        "carprice_model_loads_total",
        "Number of successful model artifact loads"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
