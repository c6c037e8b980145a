//! GPS stream extraction from GPMF payloads.

use std::path::Path;

use crate::error::{Result, TelemetryError};
use crate::gpmf::klv::{parse_siblings, Klv};
use crate::mp4;
use crate::types::{GpsSample, TelemetryTrack};

/// One GPMF payload with its placement on the media timeline
#[derive(Debug, Clone)]
struct TimedPayload {
    data: Vec<u8>,
    start_s: f64,
    duration_s: f64,
}

/// Scoped access to the GPMF telemetry track of a GoPro recording.
///
/// Opening reads and indexes the container in one pass; the handle owns its
/// payload data and releases it on drop, on every exit path.
pub struct TelemetryExtractor {
    payloads: Vec<TimedPayload>,
}

impl TelemetryExtractor {
    /// Open a recording and index its GPMF payloads
    pub fn open(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let locations = mp4::find_gpmf_payloads(&data)?;

        let mut payloads = Vec::with_capacity(locations.len());
        for location in locations {
            let start = location.offset as usize;
            let end = start + location.size as usize;
            if end > data.len() {
                return Err(TelemetryError::InvalidContainer(format!(
                    "payload at offset {} extends past end of file",
                    location.offset
                )));
            }
            payloads.push(TimedPayload {
                data: data[start..end].to_vec(),
                start_s: location.start_s,
                duration_s: location.duration_s,
            });
        }
        Ok(Self { payloads })
    }

    /// Number of indexed payloads
    pub fn payload_count(&self) -> usize {
        self.payloads.len()
    }

    /// Extract the named sensor stream (e.g. "GPS5") from every payload.
    ///
    /// Returns index-aligned samples and device-relative timestamps in
    /// seconds. Samples within a payload are spread evenly across the
    /// payload's time span. An empty track is a valid result; the caller
    /// decides whether that is an error.
    pub fn extract(&self, stream_name: &str) -> Result<TelemetryTrack> {
        let key: [u8; 4] = stream_name.as_bytes().try_into().map_err(|_| {
            TelemetryError::InvalidStream(format!(
                "stream name must be a four-character key, got {:?}",
                stream_name
            ))
        })?;

        let mut track = TelemetryTrack::new();
        for payload in &self.payloads {
            let samples = payload_samples(&payload.data, &key)?;
            if samples.is_empty() {
                continue;
            }
            let step = payload.duration_s / samples.len() as f64;
            for (index, sample) in samples.into_iter().enumerate() {
                track.push(sample, payload.start_s + index as f64 * step);
            }
        }
        Ok(track)
    }
}

/// Decode the requested sensor stream from one payload.
///
/// A payload holds one or more DEVC device containers, each holding STRM
/// stream containers. The stream carrying the requested key is decoded with
/// its SCAL divisors; payloads without the stream contribute nothing.
fn payload_samples(data: &[u8], key: &[u8; 4]) -> Result<Vec<GpsSample>> {
    let mut samples = Vec::new();
    for device in parse_siblings(data)? {
        if device.key != *b"DEVC" || !device.is_container() {
            continue;
        }
        for stream in device.children()? {
            if stream.key != *b"STRM" || !stream.is_container() {
                continue;
            }
            let children = stream.children()?;
            let Some(matrix) = children.iter().find(|node| node.key == *key) else {
                continue;
            };
            let scale = match children.iter().find(|node| node.key == *b"SCAL") {
                Some(node) => Some(node.int_values()?),
                None => None,
            };
            decode_samples(matrix, scale.as_deref(), &mut samples)?;
        }
    }
    Ok(samples)
}

/// Scale raw integer rows into GPS samples.
///
/// GPS5 rows are [latitude, longitude, altitude, 2D speed, 3D speed], each
/// divided by the matching SCAL entry.
fn decode_samples(matrix: &Klv, scale: Option<&[i64]>, out: &mut Vec<GpsSample>) -> Result<()> {
    let divisor = |column: usize| -> f64 {
        match scale.and_then(|s| s.get(column)) {
            Some(&value) if value != 0 => value as f64,
            _ => 1.0,
        }
    };

    for row in matrix.int_rows()? {
        if row.len() < 3 {
            return Err(TelemetryError::InvalidStream(format!(
                "{} sample has {} fields, expected at least 3",
                matrix.key_str(),
                row.len()
            )));
        }
        out.push(GpsSample {
            latitude: row[0] as f64 / divisor(0),
            longitude: row[1] as f64 / divisor(1),
            altitude: row[2] as f64 / divisor(2),
            speed_2d: row.get(3).map(|&v| v as f64 / divisor(3)),
            speed_3d: row.get(4).map(|&v| v as f64 / divisor(4)),
        });
    }
    Ok(())
}
