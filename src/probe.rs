//! Video metadata probing via ffprobe.
//!
//! The recording start time lives in the companion video's container
//! metadata, not in the telemetry track. ffprobe reports it as an ISO-8601
//! string under `format.tags.creation_time`.

use std::path::Path;
use std::process::Command;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{Result, TelemetryError};

/// Query the wall-clock recording start of a video file.
///
/// Runs `ffprobe -v quiet -print_format json -show_format` and reads the
/// creation time from the resulting document. Any probe failure is fatal
/// for the conversion run.
pub fn probe_creation_time(video: &Path) -> Result<DateTime<Utc>> {
    let output = Command::new("ffprobe")
        .args(["-v", "quiet", "-print_format", "json", "-show_format"])
        .arg(video)
        .output()
        .map_err(|err| TelemetryError::Probe(format!("failed to run ffprobe: {}", err)))?;

    if !output.status.success() {
        return Err(TelemetryError::Probe(format!(
            "ffprobe exited with status {} for {:?}: {}",
            output.status.code().unwrap_or(-1),
            video,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let info: Value = serde_json::from_slice(&output.stdout)
        .map_err(|err| TelemetryError::Probe(format!("ffprobe produced invalid JSON: {}", err)))?;

    creation_time_from_probe(&info)
}

/// Extract and parse the creation time from an ffprobe format document.
///
/// A `Z` UTC suffix is normalized to an explicit `+00:00` offset before
/// parsing; a timestamp without an offset is rejected.
pub fn creation_time_from_probe(info: &Value) -> Result<DateTime<Utc>> {
    let raw = info
        .get("format")
        .and_then(|format| format.get("tags"))
        .and_then(|tags| tags.get("creation_time"))
        .and_then(|value| value.as_str())
        .ok_or_else(|| {
            TelemetryError::CreationTime(
                "probe output has no format.tags.creation_time field".to_string(),
            )
        })?;

    let normalized = raw.replace('Z', "+00:00");
    let parsed = DateTime::parse_from_rfc3339(&normalized).map_err(|err| {
        TelemetryError::CreationTime(format!("{:?} is not valid ISO-8601: {}", raw, err))
    })?;
    Ok(parsed.with_timezone(&Utc))
}
