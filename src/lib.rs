//! GoPro 360 GPS-to-GPX Library
//!
//! A Rust library for extracting the GPS telemetry embedded in a GoPro 360
//! recording's GPMF metadata track and writing it out as a GPX 1.1 track
//! log, time-aligned to the wall-clock recording start of a companion video
//! file.
//!
//! # Features
//!
//! - **`csv`** (default): Enable the flat CSV export of accepted points
//! - **`cli`** (default): Build the command-line interface binary
//! - **`serde`**: Enable serialization/deserialization of types
//!
//! # Quick Start
//!
//! Run the whole pipeline for one telemetry/video pair:
//! ```rust,no_run
//! use gopro360gpx::{convert_file, ConvertOptions};
//! use std::path::Path;
//!
//! let options = ConvertOptions::default();
//! let report = convert_file(
//!     Path::new("GS010042.360"),
//!     Path::new("GS010042.mp4"),
//!     &options,
//! ).unwrap();
//! println!("Wrote {} points to {}", report.points_written, report.gpx_path.display());
//! ```
//!
//! Or drive the stages individually:
//! ```rust,no_run
//! use gopro360gpx::{convert_track, JumpFilter, TelemetryExtractor, probe_creation_time};
//! use std::path::Path;
//!
//! let extractor = TelemetryExtractor::open(Path::new("GS010042.360")).unwrap();
//! let track = extractor.extract("GPS5").unwrap();
//! let start = probe_creation_time(Path::new("GS010042.mp4")).unwrap();
//! let outcome = convert_track(&track, start, JumpFilter::MaxDistance(100.0));
//! println!("{} accepted, {} rejected", outcome.accepted.len(), outcome.rejected.len());
//! ```
//!
//! # Public API
//!
//! ## Pipeline
//! - [`convert_file`] - Run extraction, alignment, filtering and export
//! - [`convert_track`] - Align and filter an in-memory track (pure core)
//! - [`ConvertOptions`] / [`ConvertReport`] - Run configuration and results
//!
//! ## Stages
//! - [`TelemetryExtractor`] - Scoped GPMF container access
//! - [`probe_creation_time`] - Video recording start via ffprobe
//! - [`align_to_start`] - Device-relative to absolute timestamps
//! - [`filter_track_points`] / [`JumpFilter`] - Great-circle jump filtering
//! - [`export_to_gpx`] - GPX 1.1 track writer

// Module declarations
pub mod align;
pub mod convert;
pub mod error;
pub mod export;
pub mod filter;
pub mod gpmf;
pub mod mp4;
pub mod probe;
pub mod types;

// Re-export everything from modules for convenience
#[allow(ambiguous_glob_reexports)]
pub use align::*;
#[allow(ambiguous_glob_reexports)]
pub use convert::*;
#[allow(ambiguous_glob_reexports)]
pub use error::*;
#[allow(ambiguous_glob_reexports)]
pub use export::*;
#[allow(ambiguous_glob_reexports)]
pub use filter::*;
#[allow(ambiguous_glob_reexports)]
pub use gpmf::*;
#[allow(ambiguous_glob_reexports)]
pub use mp4::*;
#[allow(ambiguous_glob_reexports)]
pub use probe::*;
#[allow(ambiguous_glob_reexports)]
pub use types::*;

// Re-export Result type for convenience
pub use anyhow::Result;
