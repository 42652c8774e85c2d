// src/influx/mod.rs

use reqwest::Client;
use tracing::debug;

use crate::config::InfluxConfig;
use crate::error::{PollError, Result};
use crate::monitor::VsatLocation;

/// Thin InfluxDB v1 line-protocol writer over the shared HTTP client.
pub struct InfluxSink<'a> {
    client: &'a Client,
    write_url: String,
    measurement: String,
}

/// Escape a measurement or tag value per line protocol: commas, spaces and
/// equals signs must be backslashed.
fn escape_tag(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(',', "\\,")
        .replace(' ', "\\ ")
        .replace('=', "\\=")
}

/// Escape a string field value: backslashes and double quotes.
fn escape_field(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

impl<'a> InfluxSink<'a> {
    pub fn new(client: &'a Client, cfg: &InfluxConfig) -> Self {
        Self {
            client,
            write_url: format!(
                "http://{}:{}/write?db={}",
                cfg.host, cfg.port, cfg.database
            ),
            measurement: cfg.measurement.clone(),
        }
    }

    fn point_line(&self, device: &VsatLocation, tag: &str) -> String {
        format!(
            "{},id={} name=\"{}\",status=\"{}\",status_raw=\"{}\",latitude={},longitude={},tag=\"{}\"",
            escape_tag(&format!("{}_{}", self.measurement, tag)),
            device.id,
            escape_field(&device.name),
            escape_field(&device.status),
            escape_field(&device.status_raw),
            device.latitude,
            device.longitude,
            escape_field(tag),
        )
    }

    /// Write one point per device under measurement `<measurement>_<tag>`.
    pub async fn write_points(&self, devices: &[VsatLocation], tag: &str) -> Result<()> {
        if devices.is_empty() {
            return Ok(());
        }
        let body = devices
            .iter()
            .map(|d| self.point_line(d, tag))
            .collect::<Vec<_>>()
            .join("\n");

        let resp = self.client.post(&self.write_url).body(body).send().await?;
        if !resp.status().is_success() {
            return Err(PollError::sink_write(
                &self.write_url,
                format!("HTTP {}", resp.status()),
            ));
        }
        debug!(points = devices.len(), tag, "points written");
        Ok(())
    }
}
