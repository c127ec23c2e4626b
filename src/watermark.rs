//! Watermark calculation
//!
//! The watermark is the `updated_at_utc` boundary below which every record
//! is known to be synced. Each window queries from the watermark minus a
//! look-back margin so late upstream edits are picked up again; the
//! destination deduplicates by primary key.

use crate::types::{Record, ResourceType};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;
use tracing::debug;

/// Record field holding the last-modified instant
pub const UPDATED_AT_FIELD: &str = "updated_at_utc";

/// A candidate or confirmed watermark, keeping the upstream string verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watermark {
    /// Parsed instant, used for comparisons
    pub at: DateTime<Utc>,
    /// Original string as received
    pub raw: String,
}

impl Watermark {
    /// Parse a watermark string
    pub fn parse(raw: &str) -> Option<Self> {
        parse_timestamp(raw).map(|at| Self {
            at,
            raw: raw.to_string(),
        })
    }
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339 with any offset, and offset-less date-times which are
/// read as UTC (the field names say `_utc`).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Format an instant the way the state object stores it
/// (`2024-01-01T00:00:00.000Z`)
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Lower bound sent as `updated_after`: the watermark minus the look-back
/// window, or `None` on a first sync
pub fn look_back(
    last_synced_at: Option<DateTime<Utc>>,
    window: chrono::Duration,
) -> Option<String> {
    last_synced_at.map(|at| format_timestamp(at - window))
}

/// Latest `updated_at_utc` on a page of records.
///
/// The whole page is scanned rather than trusting upstream ordering.
/// Records without a parseable timestamp are skipped.
pub fn latest_in_page(records: &[Record]) -> Option<Watermark> {
    records
        .iter()
        .filter_map(|record| {
            let raw = record.get(UPDATED_AT_FIELD)?.as_str()?;
            let parsed = Watermark::parse(raw);
            if parsed.is_none() {
                debug!("Skipping unparseable {UPDATED_AT_FIELD}: {raw:?}");
            }
            parsed
        })
        .max_by_key(|w| w.at)
}

/// Candidate watermark across all resource types fetched this invocation
pub fn compute_watermark(results: &BTreeMap<ResourceType, Vec<Record>>) -> Option<Watermark> {
    results
        .values()
        .filter_map(|records| latest_in_page(records))
        .max_by_key(|w| w.at)
}

/// Watermark to commit once a window is drained.
///
/// Never moves backwards: the look-back re-fetches records older than the
/// current watermark, so the candidate may be earlier than it.
pub fn advance(current: Option<Watermark>, candidate: Option<Watermark>) -> Option<Watermark> {
    match (current, candidate) {
        (Some(current), Some(candidate)) => {
            if candidate.at > current.at {
                Some(candidate)
            } else {
                Some(current)
            }
        }
        (current, candidate) => current.or(candidate),
    }
}
