//! The conversion pipeline: extract, align, filter, export.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::align::align_to_start;
use crate::error::TelemetryError;
use crate::export::{export_to_gpx, GPX_TIME_FORMAT};
use crate::filter::{filter_track_points, FilterOutcome, JumpFilter};
use crate::gpmf::TelemetryExtractor;
use crate::probe::probe_creation_time;
use crate::types::{TelemetryTrack, TrackPoint};

/// Name of the GPMF sensor stream carrying GPS fixes
pub const GPS_STREAM: &str = "GPS5";

/// Options controlling a conversion run
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub output: PathBuf,
    pub filter: JumpFilter,
    pub csv: bool,
    pub debug: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            output: PathBuf::from("track.gpx"),
            filter: JumpFilter::default(),
            csv: false,
            debug: false,
        }
    }
}

/// Results of a completed conversion with output paths
#[derive(Debug)]
pub struct ConvertReport {
    pub gpx_path: PathBuf,
    pub csv_path: Option<PathBuf>,
    pub points_written: usize,
    pub points_rejected: usize,
}

/// Align a telemetry track to `start` and filter it.
///
/// Pure core of the pipeline; all file and process I/O stays in
/// [`convert_file`], so this runs against injected sequences in tests.
pub fn convert_track(
    track: &TelemetryTrack,
    start: DateTime<Utc>,
    filter: JumpFilter,
) -> FilterOutcome {
    let times = align_to_start(&track.timestamps, start);
    let points = track
        .samples
        .iter()
        .zip(times)
        .map(|(sample, time)| TrackPoint {
            latitude: sample.latitude,
            longitude: sample.longitude,
            altitude: sample.altitude,
            time,
        })
        .collect();
    filter_track_points(points, filter)
}

/// Run the full conversion for one telemetry/video pair.
///
/// Fails before writing any output when the telemetry track is empty or the
/// video's creation time cannot be determined. Rejected samples are reported
/// as warnings and excluded from the written track.
pub fn convert_file(
    telemetry_path: &Path,
    video_path: &Path,
    options: &ConvertOptions,
) -> Result<ConvertReport> {
    let extractor = TelemetryExtractor::open(telemetry_path)
        .with_context(|| format!("Failed to open telemetry container {:?}", telemetry_path))?;
    if options.debug {
        println!("Indexed {} telemetry payloads", extractor.payload_count());
    }

    let track = extractor
        .extract(GPS_STREAM)
        .with_context(|| format!("Failed to extract {} from {:?}", GPS_STREAM, telemetry_path))?;
    if track.is_empty() {
        return Err(TelemetryError::NoTelemetry)
            .with_context(|| format!("Nothing to convert in {:?}", telemetry_path));
    }
    if options.debug {
        println!(
            "Extracted {} GPS samples spanning {:.1}s",
            track.len(),
            track.duration_seconds()
        );
    }

    let start = probe_creation_time(video_path)
        .with_context(|| format!("Failed to read creation time from {:?}", video_path))?;
    if options.debug {
        println!("Video recording starts at {}", start.format(GPX_TIME_FORMAT));
    }

    let outcome = convert_track(&track, start, options.filter);
    for rejected in &outcome.rejected {
        let point = &rejected.point;
        eprintln!(
            "Warning: GPS jump of {:.0} m at {}, lat = {:.0}, lon = {:.0} - skipping sample",
            rejected.distance_m,
            point.time.format(GPX_TIME_FORMAT),
            point.latitude,
            point.longitude
        );
    }

    export_to_gpx(&outcome.accepted, &options.output)?;

    #[cfg(feature = "csv")]
    let csv_path = if options.csv {
        let path = options.output.with_extension("csv");
        crate::export::export_to_csv(&outcome.accepted, &path)?;
        Some(path)
    } else {
        None
    };
    #[cfg(not(feature = "csv"))]
    let csv_path = None;

    Ok(ConvertReport {
        gpx_path: options.output.clone(),
        csv_path,
        points_written: outcome.accepted.len(),
        points_rejected: outcome.rejected.len(),
    })
}
