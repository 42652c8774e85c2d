// src/monitor/mod.rs

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{FallbackCoordinates, MonitorConfig};
use crate::error::Result;

/// Device name suffix marking the management entry we forward.
const MANAGED_SUFFIX: &str = "-MNG";

/// Raw device entry as the monitoring API returns it.
#[derive(Debug, Deserialize)]
struct RawDevice {
    objid: i64,
    name: String,
    status: String,
    status_raw: String,
    #[serde(default)]
    location_raw: String,
}

#[derive(Debug, Deserialize)]
struct DeviceListing {
    devices: Vec<RawDevice>,
}

/// One terminal's geolocation and status, ready for the time-series sink.
#[derive(Debug, Clone, PartialEq)]
pub struct VsatLocation {
    pub id: i64,
    pub name: String,
    pub status: String,
    pub status_raw: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Parse a free-text `"<lat>, <lon>"` location field. Anything malformed
/// yields the configured fallback pair; this never fails.
pub fn parse_location(raw: &str, fallback: FallbackCoordinates) -> (f64, f64) {
    let mut parts = raw.splitn(2, ',');
    let lat = parts.next().and_then(|s| s.trim().parse::<f64>().ok());
    let lon = parts.next().and_then(|s| s.trim().parse::<f64>().ok());
    match (lat, lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => {
            warn!(location = raw, "malformed location field, using fallback");
            (fallback.latitude, fallback.longitude)
        }
    }
}

fn listing_url(cfg: &MonitorConfig, tag: &str) -> String {
    format!(
        "http://{}:443/api/table.json?content=devices&columns=objid,name,status,location=raw&\
         filter_tags=@tag({})&username={}&passhash={}",
        cfg.host, tag, cfg.username, cfg.passhash
    )
}

fn managed_locations(listing: DeviceListing, fallback: FallbackCoordinates) -> Vec<VsatLocation> {
    listing
        .devices
        .into_iter()
        .filter(|d| d.name.ends_with(MANAGED_SUFFIX))
        .map(|d| {
            let (latitude, longitude) = parse_location(&d.location_raw, fallback);
            VsatLocation {
                id: d.objid,
                name: d.name,
                status: d.status,
                status_raw: d.status_raw,
                latitude,
                longitude,
            }
        })
        .collect()
}

/// Fetch the device listing for `tag` and keep the managed (`-MNG`) entries,
/// locations parsed with `fallback` substitution.
pub async fn fetch_devices(
    client: &Client,
    cfg: &MonitorConfig,
    fallback: FallbackCoordinates,
    tag: &str,
) -> Result<Vec<VsatLocation>> {
    let url = listing_url(cfg, tag);
    let listing: DeviceListing = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    debug!(tag, total = listing.devices.len(), "device listing fetched");
    Ok(managed_locations(listing, fallback))
}
