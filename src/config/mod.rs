// src/config/mod.rs

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{PollError, Result};

/// Environment variable naming the config file; falls back to
/// `vsatpoll.yaml` in the working directory.
pub const CONFIG_ENV: &str = "VSATPOLL_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "vsatpoll.yaml";

/// Deployment configuration. Credentials and endpoints are deliberately not
/// compiled in; every deployment supplies its own file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub monitor: MonitorConfig,
    pub influx: InfluxConfig,
    pub fallback: FallbackCoordinates,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Monitoring API endpoint and credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    pub host: String,
    pub username: String,
    pub passhash: String,
    /// Tags polled when the CLI does not name one.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// InfluxDB v1 endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct InfluxConfig {
    pub host: String,
    #[serde(default = "default_influx_port")]
    pub port: u16,
    pub database: String,
    pub measurement: String,
}

fn default_influx_port() -> u16 {
    8086
}

/// Coordinates substituted when a device's location field is malformed.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FallbackCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Optional overrides for the equipment hosts; the domain resolver supplies
/// them when absent.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub dps_host: Option<String>,
    pub hsp_host: Option<String>,
    #[serde(default = "default_session_port")]
    pub port: u16,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dps_host: None,
            hsp_host: None,
            port: default_session_port(),
        }
    }
}

fn default_session_port() -> u16 {
    23
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PollError::Config(format!("reading {}: {}", path.display(), e))
        })?;
        Self::parse(&content, path)
    }

    /// Load from `path`, treating a missing file as "no config". Any other
    /// failure, a present-but-malformed file in particular, stays fatal so
    /// a typo cannot silently fall back to defaults.
    pub fn load_if_present(path: &Path) -> Result<Option<Self>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PollError::Config(format!(
                    "reading {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        Self::parse(&content, path).map(Some)
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| PollError::Config(format!("parsing {}: {}", path.display(), e)))
    }

    fn default_path() -> String {
        std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }

    /// Load from `$VSATPOLL_CONFIG`, or the default path.
    pub fn load_default() -> Result<Self> {
        Self::load(Path::new(&Self::default_path()))
    }

    /// `load_if_present` over `$VSATPOLL_CONFIG` or the default path.
    pub fn load_default_if_present() -> Result<Option<Self>> {
        Self::load_if_present(Path::new(&Self::default_path()))
    }
}
