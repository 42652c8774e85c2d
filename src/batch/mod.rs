// src/batch/mod.rs

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{PollError, Result};
use crate::extract::ExtractedRecord;

/// Timestamp format used for the leading `datetime` column.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Flush behavior knobs for [`CsvBatch::flush`].
#[derive(Debug, Clone, Copy)]
pub struct FlushOptions {
    /// Write the header even when the destination already has content.
    pub force_header: bool,
    /// Write the accumulated data lines.
    pub write_data: bool,
    /// Clear the in-memory batch after the write.
    pub clear_after: bool,
}

impl Default for FlushOptions {
    fn default() -> Self {
        Self {
            force_header: false,
            write_data: true,
            clear_after: true,
        }
    }
}

/// Accumulates extracted records as CSV lines sharing one header.
///
/// The header is fixed from the first appended record, `datetime` first then
/// the record's fields in insertion order. Later records are assumed to
/// carry the same field set; no reconciliation happens if they do not.
/// Values must not contain the delimiter, nothing is escaped.
#[derive(Debug, Default)]
pub struct CsvBatch {
    header: String,
    data: String,
}

impl CsvBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record stamped with `timestamp` (UTC now when `None`).
    pub fn append(&mut self, record: &ExtractedRecord, timestamp: Option<DateTime<Utc>>) {
        let stamp = timestamp
            .unwrap_or_else(Utc::now)
            .format(DATETIME_FORMAT)
            .to_string();

        if self.header.is_empty() {
            let mut names = vec!["datetime"];
            names.extend(record.names());
            self.header = format!("{}\n", names.join(","));
        }

        let mut values = vec![stamp.as_str()];
        values.extend(record.values());
        self.data.push_str(&values.join(","));
        self.data.push('\n');
    }

    pub fn row_count(&self) -> usize {
        self.data.lines().count()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append the batch to `path`. The header goes first when forced or the
    /// file is currently empty; existing content is never rewritten.
    pub fn flush(&mut self, path: &Path, opts: FlushOptions) -> Result<()> {
        let target = path.display().to_string();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| PollError::sink_write(&target, e))?;

        let existing = file
            .metadata()
            .map_err(|e| PollError::sink_write(&target, e))?
            .len();

        if opts.force_header || existing == 0 {
            file.write_all(self.header.as_bytes())
                .map_err(|e| PollError::sink_write(&target, e))?;
        }
        if opts.write_data {
            file.write_all(self.data.as_bytes())
                .map_err(|e| PollError::sink_write(&target, e))?;
        }
        debug!(target, rows = self.row_count(), "batch flushed");

        if opts.clear_after {
            self.header.clear();
            self.data.clear();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::tempdir;

    fn record(pairs: &[(&str, &str)]) -> ExtractedRecord {
        let mut r = ExtractedRecord::new(pairs[0].1);
        for (name, value) in &pairs[1..] {
            r.set(name, value, false);
        }
        r
    }

    fn fixed_stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 29, 12, 0, 0).unwrap()
    }

    #[test]
    fn single_append_and_flush_writes_header_then_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut batch = CsvBatch::new();
        batch.append(
            &record(&[("entry_id", "1282"), ("Outbound_buf", "12"), ("Inbound_buf", "34")]),
            Some(fixed_stamp()),
        );
        batch.flush(&path, FlushOptions::default()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "datetime,entry_id,Outbound_buf,Inbound_buf",
                "2026-08-29 12:00:00,1282,12,34",
            ]
        );
    }

    #[test]
    fn n_records_produce_n_plus_one_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut batch = CsvBatch::new();
        for id in ["1282", "1288", "1384"] {
            batch.append(
                &record(&[("entry_id", id), ("Outbound_buf", "1"), ("Inbound_buf", "2")]),
                Some(fixed_stamp()),
            );
        }
        batch.flush(&path, FlushOptions::default()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 4);
    }

    #[test]
    fn header_is_not_repeated_when_appending_to_nonempty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut batch = CsvBatch::new();
        batch.append(&record(&[("entry_id", "a"), ("v", "1")]), Some(fixed_stamp()));
        batch.flush(&path, FlushOptions::default()).unwrap();

        let mut batch = CsvBatch::new();
        batch.append(&record(&[("entry_id", "b"), ("v", "2")]), Some(fixed_stamp()));
        batch.flush(&path, FlushOptions::default()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let headers = content.lines().filter(|l| l.starts_with("datetime")).count();
        assert_eq!(headers, 1);
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn force_header_repeats_the_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut batch = CsvBatch::new();
        batch.append(&record(&[("entry_id", "a"), ("v", "1")]), Some(fixed_stamp()));
        batch.flush(&path, FlushOptions::default()).unwrap();

        let mut batch = CsvBatch::new();
        batch.append(&record(&[("entry_id", "b"), ("v", "2")]), Some(fixed_stamp()));
        batch
            .flush(
                &path,
                FlushOptions {
                    force_header: true,
                    ..Default::default()
                },
            )
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let headers = content.lines().filter(|l| l.starts_with("datetime")).count();
        assert_eq!(headers, 2);
    }

    #[test]
    fn bb_links_to_buf_dump_to_csv_end_to_end() {
        use crate::extract::{extract_buf_pair, parse_bb_links};

        let bb_links = "+--------+\n\r| 1282 | up\n\r| 1288 | up\n\r| 1384 | up\n\r+--------+";
        let dump = "owner table\n\r 1282    12    34\n\r 1288    56    78\n\rdone";

        let ids = parse_bb_links(bb_links);
        assert_eq!(ids.len(), 3);

        let dir = tempdir().unwrap();
        let path = dir.path().join("owners.csv");
        let mut batch = CsvBatch::new();
        for id in &ids {
            batch.append(&extract_buf_pair(dump, id).unwrap(), Some(fixed_stamp()));
        }
        batch.flush(&path, FlushOptions::default()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "datetime,entry_id,Outbound_buf,Inbound_buf");
        assert!(lines[1].ends_with("1282,12,34"));
        assert!(lines[2].ends_with("1288,56,78"));
        assert!(lines[3].ends_with("1384,0,0"));
    }

    #[test]
    fn clear_after_false_keeps_the_batch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut batch = CsvBatch::new();
        batch.append(&record(&[("entry_id", "a"), ("v", "1")]), Some(fixed_stamp()));
        batch
            .flush(
                &path,
                FlushOptions {
                    clear_after: false,
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(!batch.is_empty());

        batch.flush(&path, FlushOptions::default()).unwrap();
        assert!(batch.is_empty());
    }
}
