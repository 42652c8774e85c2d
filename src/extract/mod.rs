// src/extract/mod.rs

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::error::{PollError, Result};

pub mod maps;

/// The equipment console terminates lines with LF-CR, not the usual CRLF.
/// Splitting on a single `\n` would leave stray `\r` at line starts and
/// break the anchored patterns, so the literal two-byte sequence is used.
pub const LINE_SEP: &str = "\n\r";

/// One named pattern. The regex must carry exactly one capturing group; the
/// group's text becomes the field value.
#[derive(Debug, Clone)]
pub struct FieldPattern {
    pub name: String,
    pub regex: Regex,
}

/// Ordered set of field patterns. Column order in the eventual CSV follows
/// the order fields were compiled in, so this is an explicit list rather
/// than a map.
#[derive(Debug, Clone, Default)]
pub struct ParseMap {
    fields: Vec<FieldPattern>,
}

impl ParseMap {
    /// Compile `(name, pattern)` pairs in order. Names must be unique.
    pub fn compile(pairs: &[(&str, &str)]) -> Result<Self> {
        let mut fields: Vec<FieldPattern> = Vec::with_capacity(pairs.len());
        for (name, pattern) in pairs {
            if fields.iter().any(|f| f.name == *name) {
                return Err(PollError::Config(format!(
                    "duplicate field {:?} in parse map",
                    name
                )));
            }
            let regex = Regex::new(pattern)
                .map_err(|e| PollError::Config(format!("bad pattern for {:?}: {}", name, e)))?;
            fields.push(FieldPattern {
                name: (*name).to_string(),
                regex,
            });
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[FieldPattern] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// How repeated matches for the same field are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// A field once set is never overwritten, and scanning of a line stops
    /// at its first matching pattern.
    FirstMatch,
    /// Every pattern is tried on every line; later matches overwrite.
    AllMatches,
}

/// Ordered field → value record scraped from one entity. `entry_id` is
/// always the first field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRecord {
    fields: Vec<(String, String)>,
}

impl ExtractedRecord {
    pub fn new(entry_id: &str) -> Self {
        Self {
            fields: vec![("entry_id".to_string(), entry_id.to_string())],
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Like `get`, but missing fields become a `NoMatch` error so callers
    /// can decide whether the absence is worth a warning or a default.
    pub fn require(&self, name: &str) -> Result<&str> {
        self.get(name)
            .ok_or_else(|| PollError::NoMatch(name.to_string()))
    }

    /// Set `name` to `value`, appending the field if it is new. Existing
    /// values are only replaced when `overwrite` is set.
    pub fn set(&mut self, name: &str, value: &str, overwrite: bool) -> bool {
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| n == name) {
            if overwrite {
                slot.1 = value.to_string();
                return true;
            }
            return false;
        }
        self.fields.push((name.to_string(), value.to_string()));
        true
    }

    /// Field names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Scan `raw` line by line against `map`, collecting the first capturing
/// group of each matching pattern. Fields that never match are absent from
/// the result; callers wanting zero-defaults apply them afterwards.
pub fn extract(
    raw: &str,
    map: &ParseMap,
    entry_id: &str,
    strategy: MatchStrategy,
) -> ExtractedRecord {
    let mut record = ExtractedRecord::new(entry_id);
    for line in raw.split(LINE_SEP) {
        for field in map.fields() {
            if let Some(caps) = field.regex.captures(line) {
                let value = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                record.set(&field.name, value, strategy == MatchStrategy::AllMatches);
                if strategy == MatchStrategy::FirstMatch {
                    break;
                }
            }
        }
    }
    if record.len() == 1 && !map.is_empty() {
        warn!(entry_id, "no parse map field matched the scraped output");
    }
    record
}

/// Strict fixed-pair contract for `buf vsat_owners` dumps: exactly one line
/// holds both counters for `entry_id`, outbound then inbound. Terminals
/// absent from the dump get `"0"`/`"0"`; when several lines match, the last
/// one wins. The patterns are anchored to the line start so an id showing
/// up mid-line, say as another row's counter value, is not mistaken for a
/// counter row.
pub fn extract_buf_pair(raw: &str, entry_id: &str) -> Result<ExtractedRecord> {
    let out_re = Regex::new(&format!(r"^\W{}\W*(\d*)\W*\d*", regex::escape(entry_id)))
        .map_err(|e| PollError::Config(format!("bad entry id {:?}: {}", entry_id, e)))?;
    let in_re = Regex::new(&format!(r"^\W{}\W*\d*\W*(\d*)", regex::escape(entry_id)))
        .map_err(|e| PollError::Config(format!("bad entry id {:?}: {}", entry_id, e)))?;

    let mut record = ExtractedRecord::new(entry_id);
    let mut matched = false;
    for line in raw.split(LINE_SEP) {
        if let (Some(out_caps), Some(in_caps)) = (out_re.captures(line), in_re.captures(line)) {
            matched = true;
            record.set("Outbound_buf", &out_caps[1], true);
            record.set("Inbound_buf", &in_caps[1], true);
        }
    }
    if !matched {
        record.set("Outbound_buf", "0", false);
        record.set("Inbound_buf", "0", false);
    }
    Ok(record)
}

static BB_LINK_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\|\W(\d*)\W\|").unwrap());

/// Pull active terminal ids out of `bb links` output. Id rows look like
/// `| 1282 | ...`; everything else (borders, headers) is skipped.
pub fn parse_bb_links(raw: &str) -> Vec<String> {
    raw.split(LINE_SEP)
        .filter_map(|line| BB_LINK_ID.captures(line))
        .map(|caps| caps[1].to_string())
        .collect()
}
