// Poll global CAC statistics from the HSP console and append one CSV row.

use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use vsatpoll::{
    batch::{CsvBatch, FlushOptions},
    cli::OutputArgs,
    config::{Config, SessionConfig},
    extract::{extract, maps, MatchStrategy},
    resolve,
    session::{LineSession, Pacing},
};

const DEFAULT_OUTPUT: &str = "tele_cac_global.csv";

/// Entry id recorded for the HSP row.
const HSP_ENTRY_ID: &str = "HSP_67";

fn hsp_host(session_cfg: &SessionConfig) -> Result<String> {
    if let Some(host) = &session_cfg.hsp_host {
        return Ok(host.clone());
    }
    Ok(resolve::resolve_equipment_addresses()?.hsp)
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
    let host = hsp_host(&session_cfg)?;
    let stamp = Utc::now();

    // ─── scrape `tele cac global` ────────────────────────────────────
    // The HSP console drops input arriving faster than its echo, so the
    // command is paced per character.
    let map = maps::hsp_tele_cac_global()?;
    let mut session = LineSession::connect(&host, session_cfg.port).await?;
    session.send("tele cac global", Pacing::PerChar).await?;
    let raw = session.read_available()?;
    let record = extract(&raw, &map, HSP_ENTRY_ID, MatchStrategy::FirstMatch);

    match record.require("Current SDR") {
        Ok(usage) => info!("{} SDR usage: {}%", HSP_ENTRY_ID, usage),
        Err(e) => warn!("{}", e),
    }

    // ─── append the row ──────────────────────────────────────────────
    let mut batch = CsvBatch::new();
    batch.append(&record, Some(stamp));
    info!(output = %args.output.display(), "writing to file");
    batch.flush(&args.output, FlushOptions::default())?;

    if args.special {
        warn!("-s has no effect for this poller");
    }

    info!("done");
    Ok(())
}
