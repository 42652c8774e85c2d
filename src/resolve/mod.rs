// src/resolve/mod.rs

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{PollError, Result};

/// Where the deployment keeps its interface configs.
pub const NETWORK_SCRIPTS_DIR: &str = "/etc/sysconfig/network-scripts";

/// Candidate interface files, most specific first. The first one present
/// decides the domain.
const CANDIDATE_FILES: &[&str] = &["ifcfg-bond0.17", "ifcfg-br17", "ifcfg-eth0"];

static IPADDR: Lazy<Regex> = Lazy::new(|| Regex::new(r"IPADDR=\d+\.\d+\.(\d+)").unwrap());

/// Addresses of the two polled equipment roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipmentAddresses {
    pub dps: String,
    pub hsp: String,
}

/// Derive the single-digit domain id from the local interface config.
///
/// The third octet of the management IPADDR encodes the domain in its
/// second character (e.g. `IPADDR=10.44.172.1` → domain `7`).
pub fn resolve_domain(scripts_dir: &Path) -> Result<String> {
    let path = CANDIDATE_FILES
        .iter()
        .map(|name| scripts_dir.join(name))
        .find(|p| p.is_file())
        .ok_or_else(|| PollError::ConfigNotFound(scripts_dir.to_path_buf()))?;

    let content = fs::read_to_string(&path).map_err(|e| PollError::ResolveParse {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let octet = IPADDR
        .captures(&content)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| PollError::ResolveParse {
            path: path.clone(),
            reason: "no IPADDR assignment".to_string(),
        })?;

    let domain = octet
        .chars()
        .nth(1)
        .filter(char::is_ascii_digit)
        .ok_or_else(|| PollError::ResolveParse {
            path: path.clone(),
            reason: format!("third octet {:?} too short for a domain digit", octet),
        })?;

    debug!(path = %path.display(), domain = %domain, "domain resolved");
    Ok(domain.to_string())
}

/// DPS and HSP management addresses for a resolved domain digit.
pub fn equipment_addresses(domain: &str) -> EquipmentAddresses {
    EquipmentAddresses {
        dps: format!("172.17.{}4.1", domain),
        hsp: format!("172.17.{}2.1", domain),
    }
}

/// Convenience over the deployment's fixed scripts directory.
pub fn resolve_equipment_addresses() -> Result<EquipmentAddresses> {
    let domain = resolve_domain(Path::new(NETWORK_SCRIPTS_DIR))?;
    Ok(equipment_addresses(&domain))
}
