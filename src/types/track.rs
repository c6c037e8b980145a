use crate::types::GpsSample;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// GPS samples and device-relative timestamps for one telemetry stream.
///
/// Invariant: `samples` and `timestamps` have equal length and are
/// index-aligned. Timestamps are seconds from an arbitrary device epoch;
/// only differences between them are meaningful.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TelemetryTrack {
    pub samples: Vec<GpsSample>,
    pub timestamps: Vec<f64>,
}

impl TelemetryTrack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: GpsSample, timestamp: f64) {
        self.samples.push(sample);
        self.timestamps.push(timestamp);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Span between the first and last timestamp in seconds
    pub fn duration_seconds(&self) -> f64 {
        match (self.timestamps.first(), self.timestamps.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }
}
