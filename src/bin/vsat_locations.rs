// Fetch terminal geolocation/status from the monitoring API and forward one
// point per managed terminal to InfluxDB.

use anyhow::Result;
use reqwest::Client;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use vsatpoll::{config::Config, influx::InfluxSink, monitor};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── init logging ────────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    let config = Config::load_default()?;

    // a single tag argument overrides the configured tag list
    let tags: Vec<String> = match std::env::args().nth(1) {
        Some(tag) => vec![tag],
        None => config.monitor.tags.clone(),
    };
    anyhow::ensure!(!tags.is_empty(), "no tags given and none configured");

    let client = Client::new();
    let sink = InfluxSink::new(&client, &config.influx);

    for tag in &tags {
        let devices =
            monitor::fetch_devices(&client, &config.monitor, config.fallback, tag).await?;
        sink.write_points(&devices, tag).await?;
        info!(tag = %tag, "added {} elements to DB", devices.len());
    }

    info!("done");
    Ok(())
}
