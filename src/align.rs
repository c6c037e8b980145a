//! Mapping device-relative telemetry timestamps onto an absolute time axis.

use chrono::{DateTime, Duration, Utc};

/// Anchor device-relative timestamps (seconds) at an absolute start instant.
///
/// The first timestamp is the zero-offset reference regardless of its
/// literal value, so the first output instant equals `start` exactly.
/// Offsets are applied at microsecond precision and input order is
/// preserved.
pub fn align_to_start(timestamps: &[f64], start: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let Some(&first) = timestamps.first() else {
        return Vec::new();
    };
    timestamps
        .iter()
        .map(|&ts| start + Duration::microseconds(((ts - first) * 1_000_000.0).round() as i64))
        .collect()
}
