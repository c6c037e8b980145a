use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One decoded GPS5 sample from the telemetry stream.
///
/// Only latitude, longitude and altitude feed the conversion pipeline; the
/// trailing speed fields are carried through for library consumers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GpsSample {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub speed_2d: Option<f64>,
    pub speed_3d: Option<f64>,
}

/// An accepted track point with its absolute UTC timestamp
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub time: DateTime<Utc>,
}

/// A candidate excluded by the jump filter, with the great-circle distance
/// from the last accepted point that caused the rejection
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RejectedPoint {
    pub point: TrackPoint,
    pub distance_m: f64,
}
