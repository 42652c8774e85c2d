//! Polling toolkit for satellite-network ground equipment.
//!
//! One pipeline, three front-ends (see `src/bin/`): open a command session
//! or HTTP client, scrape structured values out of free-text output with
//! parse maps, aggregate timestamped CSV rows, flush to a file or push
//! points to InfluxDB.

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod influx;
pub mod monitor;
pub mod resolve;
pub mod session;

pub use error::{PollError, Result};
