//! Track export.
//!
//! The GPX writer emits the exact document structure downstream consumers
//! expect; coordinate values keep their native representation so source
//! values survive byte-exact. A flat CSV export of the same points is
//! available behind the `csv` feature.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::types::TrackPoint;

/// Timestamp layout for `<time>` elements: UTC, microsecond precision
pub const GPX_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Write the accepted points as a GPX 1.1 document.
///
/// The target is unconditionally overwritten. The document is written in a
/// single pass; a failure mid-write leaves a truncated file.
pub fn export_to_gpx(points: &[TrackPoint], output_path: &Path) -> Result<()> {
    let mut gpx_file = std::fs::File::create(output_path)
        .with_context(|| format!("Failed to create GPX file {:?}", output_path))?;

    writeln!(gpx_file, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(gpx_file, r#"<gpx version="1.1" creator="GoPro360GPX">"#)?;
    writeln!(gpx_file, "  <trk>")?;
    writeln!(gpx_file, "    <name>GoPro Track</name>")?;
    writeln!(gpx_file, "    <trkseg>")?;
    for point in points {
        writeln!(
            gpx_file,
            r#"      <trkpt lat="{}" lon="{}"><ele>{}</ele><time>{}</time></trkpt>"#,
            point.latitude,
            point.longitude,
            point.altitude,
            point.time.format(GPX_TIME_FORMAT)
        )?;
    }
    writeln!(gpx_file, "    </trkseg>")?;
    writeln!(gpx_file, "  </trk>")?;
    writeln!(gpx_file, "</gpx>")?;
    Ok(())
}

/// Write the accepted points as CSV (time, latitude, longitude, altitude)
#[cfg(feature = "csv")]
pub fn export_to_csv(points: &[TrackPoint], output_path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("Failed to create CSV file {:?}", output_path))?;
    writer.write_record(["time", "latitude", "longitude", "altitude"])?;
    for point in points {
        writer.write_record([
            point.time.format(GPX_TIME_FORMAT).to_string(),
            point.latitude.to_string(),
            point.longitude.to_string(),
            point.altitude.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
