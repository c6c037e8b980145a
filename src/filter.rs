//! Great-circle jump filtering for GPS track points.
//!
//! Spurious GPS fixes show up as large instantaneous jumps. Candidates are
//! compared against the last *accepted* point, so one bad fix cannot move
//! the baseline and mask the jumps that follow it.

use crate::types::{RejectedPoint, TrackPoint};

/// Earth radius for the haversine distance, in meters
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Default rejection threshold between consecutive accepted points
pub const DEFAULT_MAX_JUMP_M: f64 = 100.0;

/// Great-circle distance between two lat/lon pairs in meters
pub fn haversine_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// Jump filtering strategy for candidate track points
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JumpFilter {
    /// Accept every candidate unconditionally
    PassThrough,
    /// Reject candidates farther than this many meters from the last
    /// accepted point
    MaxDistance(f64),
}

impl Default for JumpFilter {
    fn default() -> Self {
        JumpFilter::MaxDistance(DEFAULT_MAX_JUMP_M)
    }
}

/// Result of a filtering pass: accepted points in input order, plus the
/// rejected candidates with their offending distances
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub accepted: Vec<TrackPoint>,
    pub rejected: Vec<RejectedPoint>,
}

/// Filter candidates against the last accepted point.
///
/// The first candidate is accepted unconditionally. A candidate strictly
/// farther than the threshold is rejected and does not move the baseline;
/// a candidate at exactly the threshold is accepted.
pub fn filter_track_points(points: Vec<TrackPoint>, filter: JumpFilter) -> FilterOutcome {
    let threshold = match filter {
        JumpFilter::PassThrough => {
            return FilterOutcome {
                accepted: points,
                rejected: Vec::new(),
            }
        }
        JumpFilter::MaxDistance(meters) => meters,
    };

    let mut outcome = FilterOutcome::default();
    let mut last_accepted: Option<(f64, f64)> = None;
    for point in points {
        let distance = last_accepted
            .map(|(lat, lon)| haversine_distance_m(lat, lon, point.latitude, point.longitude));
        match distance {
            Some(meters) if meters > threshold => {
                outcome.rejected.push(RejectedPoint {
                    point,
                    distance_m: meters,
                });
            }
            _ => {
                last_accepted = Some((point.latitude, point.longitude));
                outcome.accepted.push(point);
            }
        }
    }
    outcome
}
