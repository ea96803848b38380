//! Telemetry record parsing.
//!
//! Wire format (one record per line, comma-separated):
//! `<anchor-short-name>,<range-as-decimal-text>,<tag-identifier>`
//!
//! A range of exactly `0.0` means "no valid reading yet" and is what any
//! unusable range text collapses to.

use serde::{Deserialize, Serialize};

/// Sentinel range value: no reading from that anchor yet.
pub const NO_READING: f64 = 0.0;

/// One parsed ranging report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// Short name of the reporting anchor (not yet routed to a side)
    pub anchor: String,
    /// Range in meters, or [`NO_READING`]
    pub range: f64,
    /// Opaque tag identifier (e.g. a MAC-derived string)
    pub identifier: String,
}

impl TelemetryRecord {
    /// Parse a raw line. Returns `None` unless there are exactly three fields.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut fields = raw.split(',');
        let anchor = fields.next()?.trim();
        let range = fields.next()?.trim();
        let identifier = fields.next()?.trim();
        if fields.next().is_some() {
            return None;
        }
        Some(Self {
            anchor: anchor.to_string(),
            range: parse_range(range),
            identifier: identifier.to_string(),
        })
    }

    /// Format back to the wire format.
    pub fn to_line(&self) -> String {
        format!("{},{},{}", self.anchor, self.range, self.identifier)
    }
}

/// Parse range text in meters. Unparsable, non-finite and negative values
/// become [`NO_READING`].
pub fn parse_range(text: &str) -> f64 {
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        _ => NO_READING,
    }
}
