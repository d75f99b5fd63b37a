use std::sync::Arc;

use polywatch::config::AppConfig;
use polywatch::errors::MonitorError;
use polywatch::models::TradingStatus;
use polywatch::polymarket::{DataClient, HttpTransport};
use polywatch::services::{format_status_report, Monitor, StatusObserver};

/// Prints each delivered snapshot to stdout.
struct ReportPrinter;

impl StatusObserver for ReportPrinter {
    fn on_update(&self, status: &TradingStatus) {
        println!("{}", format_status_report(status));
    }

    fn on_error(&self, error: &MonitorError) {
        tracing::error!(error = %error, "Monitoring error");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    polywatch::metrics::describe_metrics();

    let config = AppConfig::from_env()?;

    let transport = HttpTransport::new(
        config.data_api_base_url.clone(),
        config.data_api_key.clone(),
        config.request_timeout(),
    )?;
    let client = DataClient::new(Arc::new(transport));
    let monitor = Monitor::new(client, config.monitor_config(), Arc::new(ReportPrinter))?;

    tracing::info!(
        address = %config.target_address,
        base_url = %config.data_api_base_url,
        "Starting account monitor"
    );
    monitor.start().await;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    monitor.stop().await;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .init();
}
