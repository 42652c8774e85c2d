// Poll per-terminal buffer occupancy from the DPS and append one CSV row
// per active VSAT.

use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use vsatpoll::{
    batch::{CsvBatch, FlushOptions},
    cli::OutputArgs,
    config::{Config, SessionConfig},
    extract::{extract_buf_pair, parse_bb_links},
    resolve,
    session::{LineSession, Pacing},
};

const DEFAULT_OUTPUT: &str = "buf_vsat_owners.csv";

fn dps_host(session_cfg: &SessionConfig) -> Result<String> {
    if let Some(host) = &session_cfg.dps_host {
        return Ok(host.clone());
    }
    Ok(resolve::resolve_equipment_addresses()?.dps)
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── init logging ────────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    let args = OutputArgs::from_env(DEFAULT_OUTPUT);
    // a config file is optional here, but a malformed one is still fatal
    let config = Config::load_default_if_present()?;
    let session_cfg = config.map(|c| c.session).unwrap_or_default();
    let host = dps_host(&session_cfg)?;
    let stamp = Utc::now();

    // ─── enumerate active terminals ──────────────────────────────────
    info!(host = %host, "gathering list of VSAT ids");
    let mut session = LineSession::connect(&host, session_cfg.port).await?;
    session.send("bb links", Pacing::Block).await?;
    let vsat_ids = parse_bb_links(&session.read_available()?);
    info!("got {} VSATs", vsat_ids.len());
    if vsat_ids.is_empty() {
        warn!("no active terminals reported, nothing to poll");
        return Ok(());
    }

    // ─── trigger the buffer dump and read it back ────────────────────
    session
        .send("sym set buf_vsat_owners_in_progress 0 4", Pacing::Block)
        .await?;
    // the dump takes a couple of seconds to regenerate after the trigger
    tokio::time::sleep(Duration::from_secs(2)).await;
    session.send("buf vsat_owners", Pacing::Block).await?;
    let dump = session.read_available()?;

    // ─── one row per terminal, absent terminals read 0/0 ─────────────
    let mut batch = CsvBatch::new();
    for vsat_id in &vsat_ids {
        let record = extract_buf_pair(&dump, vsat_id)?;
        batch.append(&record, Some(stamp));
    }

    info!(rows = batch.row_count(), output = %args.output.display(), "writing to file");
    batch.flush(&args.output, FlushOptions::default())?;

    if args.special {
        warn!("-s has no effect for this poller");
    }

    info!("done");
    Ok(())
}
