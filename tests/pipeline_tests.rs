//! Integration tests for the conversion pipeline
//!
//! Exercises the stages together across scenarios:
//! - Alignment anchored at the video start time
//! - Jump filtering with the baseline held on rejection
//! - GPX output for a synthetic GPMF recording
//! - No-telemetry failure before any output is written

use chrono::{Duration, TimeZone, Utc};
use gopro360gpx::{
    convert_file, convert_track, export_to_gpx, ConvertOptions, GpsSample, JumpFilter,
    TelemetryExtractor, TelemetryTrack,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// GPS5 scale divisors as GoPro firmware emits them
const SCAL: [i32; 5] = [10_000_000, 10_000_000, 1_000, 1_000, 100];

fn sample(latitude: f64, longitude: f64, altitude: f64) -> GpsSample {
    GpsSample {
        latitude,
        longitude,
        altitude,
        speed_2d: None,
        speed_3d: None,
    }
}

/// The three-sample track from the scripts this tool replaces: two close
/// fixes and a ~5000 km jump
fn jump_track() -> TelemetryTrack {
    TelemetryTrack {
        samples: vec![
            sample(10.0, 20.0, 5.0),
            sample(10.0001, 20.0001, 5.1),
            sample(50.0, 60.0, 5.2),
        ],
        timestamps: vec![1000.0, 1001.0, 1002.0],
    }
}

#[test]
fn test_track_aligned_to_video_start() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let outcome = convert_track(&jump_track(), start, JumpFilter::PassThrough);

    assert_eq!(outcome.accepted.len(), 3);
    assert_eq!(outcome.accepted[0].time, start);
    assert_eq!(outcome.accepted[1].time, start + Duration::seconds(1));
    assert_eq!(outcome.accepted[2].time, start + Duration::seconds(2));
}

#[test]
fn test_jump_rejected_and_logged_with_distance() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let outcome = convert_track(&jump_track(), start, JumpFilter::MaxDistance(100.0));

    assert_eq!(outcome.accepted.len(), 2);
    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(outcome.rejected[0].point.latitude, 50.0);
    assert!(outcome.rejected[0].distance_m > 1_000_000.0);
    // The rejected fix keeps its aligned timestamp for the diagnostic
    assert_eq!(
        outcome.rejected[0].point.time,
        start + Duration::seconds(2)
    );
}

#[test]
fn test_round_trip_gpx_document() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let gpx_path = temp_dir.path().join("track.gpx");

    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let outcome = convert_track(&jump_track(), start, JumpFilter::MaxDistance(100.0));
    export_to_gpx(&outcome.accepted, &gpx_path).unwrap();

    let content = fs::read_to_string(&gpx_path).unwrap();
    assert_eq!(content.matches("<trkpt").count(), 2);
    assert!(content.contains(
        r#"<trkpt lat="10" lon="20"><ele>5</ele><time>2024-01-01T00:00:00.000000Z</time></trkpt>"#
    ));
    assert!(content.contains("<time>2024-01-01T00:00:01.000000Z</time>"));
    assert!(!content.contains(r#"lat="50""#));
}

#[test]
fn test_filter_outcome_preserves_input_order() {
    let start = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap();
    let track = TelemetryTrack {
        samples: (0..20)
            .map(|i| sample(10.0 + i as f64 * 1e-5, 20.0, 0.0))
            .collect(),
        timestamps: (0..20).map(|i| 500.0 + i as f64 * 0.2).collect(),
    };
    let outcome = convert_track(&track, start, JumpFilter::default());
    assert_eq!(outcome.accepted.len(), 20);
    for pair in outcome.accepted.windows(2) {
        assert!(pair[0].time < pair[1].time);
        assert!(pair[0].latitude < pair[1].latitude);
    }
}

// --- Synthetic GPMF recording helpers -------------------------------------

fn klv(key: &[u8; 4], type_id: u8, struct_size: u8, repeat: u16, payload: &[u8]) -> Vec<u8> {
    assert_eq!(payload.len(), struct_size as usize * repeat as usize);
    let mut out = Vec::new();
    out.extend_from_slice(key);
    out.push(type_id);
    out.push(struct_size);
    out.extend_from_slice(&repeat.to_be_bytes());
    out.extend_from_slice(payload);
    while out.len() % 4 != 0 {
        out.push(0);
    }
    out
}

fn gpmf_payload(fixes: &[[i32; 5]]) -> Vec<u8> {
    let mut scal_bytes = Vec::new();
    for value in SCAL {
        scal_bytes.extend_from_slice(&value.to_be_bytes());
    }
    let mut gps_bytes = Vec::new();
    for fix in fixes {
        for value in fix {
            gps_bytes.extend_from_slice(&value.to_be_bytes());
        }
    }
    let mut inner = klv(b"SCAL", b'l', 4, 5, &scal_bytes);
    inner.extend_from_slice(&klv(b"GPS5", b'l', 20, fixes.len() as u16, &gps_bytes));
    let strm = klv(b"STRM", 0, 1, inner.len() as u16, &inner);
    klv(b"DEVC", 0, 1, strm.len() as u16, &strm)
}

fn mp4_box(fourcc: &[u8; 4], content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + content.len());
    out.extend_from_slice(&(content.len() as u32 + 8).to_be_bytes());
    out.extend_from_slice(fourcc);
    out.extend_from_slice(content);
    out
}

/// Assemble a minimal MP4 with a gpmd metadata track holding the given
/// payloads, one second per payload at a 1000-tick timescale
fn build_recording(payloads: &[Vec<u8>]) -> Vec<u8> {
    let mut ftyp_content = Vec::new();
    ftyp_content.extend_from_slice(b"mp42");
    ftyp_content.extend_from_slice(&0u32.to_be_bytes());
    ftyp_content.extend_from_slice(b"mp42");
    let ftyp = mp4_box(b"ftyp", &ftyp_content);

    let mdat_content: Vec<u8> = payloads.iter().flatten().copied().collect();
    let mdat = mp4_box(b"mdat", &mdat_content);
    // Payloads start right after the ftyp box and the mdat header
    let chunk_offset = (ftyp.len() + 8) as u32;

    let count = payloads.len() as u32;

    let mut mdhd = vec![0u8; 12];
    mdhd.extend_from_slice(&1000u32.to_be_bytes()); // timescale
    mdhd.extend_from_slice(&(count * 1000).to_be_bytes()); // duration
    mdhd.extend_from_slice(&[0u8; 4]); // language + pre_defined

    let mut stsd = vec![0u8; 4];
    stsd.extend_from_slice(&1u32.to_be_bytes());
    stsd.extend_from_slice(&16u32.to_be_bytes());
    stsd.extend_from_slice(b"gpmd");
    stsd.extend_from_slice(&[0u8; 6]);
    stsd.extend_from_slice(&1u16.to_be_bytes());

    let mut stts = vec![0u8; 4];
    stts.extend_from_slice(&1u32.to_be_bytes());
    stts.extend_from_slice(&count.to_be_bytes());
    stts.extend_from_slice(&1000u32.to_be_bytes());

    let mut stsc = vec![0u8; 4];
    stsc.extend_from_slice(&1u32.to_be_bytes());
    stsc.extend_from_slice(&1u32.to_be_bytes());
    stsc.extend_from_slice(&count.to_be_bytes());
    stsc.extend_from_slice(&1u32.to_be_bytes());

    let mut stsz = vec![0u8; 4];
    stsz.extend_from_slice(&0u32.to_be_bytes());
    stsz.extend_from_slice(&count.to_be_bytes());
    for payload in payloads {
        stsz.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    }

    let mut stco = vec![0u8; 4];
    stco.extend_from_slice(&1u32.to_be_bytes());
    stco.extend_from_slice(&chunk_offset.to_be_bytes());

    let stbl_content: Vec<u8> = [
        mp4_box(b"stsd", &stsd),
        mp4_box(b"stts", &stts),
        mp4_box(b"stsc", &stsc),
        mp4_box(b"stsz", &stsz),
        mp4_box(b"stco", &stco),
    ]
    .concat();
    let stbl = mp4_box(b"stbl", &stbl_content);
    let minf = mp4_box(b"minf", &stbl);
    let mdia_content: Vec<u8> = [mp4_box(b"mdhd", &mdhd), minf].concat();
    let mdia = mp4_box(b"mdia", &mdia_content);
    let trak = mp4_box(b"trak", &mdia);
    let moov = mp4_box(b"moov", &trak);

    [ftyp, mdat, moov].concat()
}

#[test]
fn test_extract_from_synthetic_recording() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let recording_path = temp_dir.path().join("ride.360");

    let payloads = vec![
        gpmf_payload(&[[100_000_000, 200_000_000, 5_000, 0, 0]]),
        gpmf_payload(&[[100_001_000, 200_001_000, 5_100, 0, 0]]),
        gpmf_payload(&[[500_000_000, 600_000_000, 5_200, 0, 0]]),
    ];
    fs::write(&recording_path, build_recording(&payloads)).unwrap();

    let extractor = TelemetryExtractor::open(&recording_path).unwrap();
    let track = extractor.extract("GPS5").unwrap();

    assert_eq!(track.len(), 3);
    assert_eq!(track.timestamps, vec![0.0, 1.0, 2.0]);
    assert!((track.samples[0].latitude - 10.0).abs() < 1e-9);
    assert!((track.samples[1].longitude - 20.0001).abs() < 1e-9);
    assert!((track.samples[2].altitude - 5.2).abs() < 1e-9);
}

#[test]
fn test_synthetic_recording_full_pipeline() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let recording_path = temp_dir.path().join("ride.360");
    let gpx_path = temp_dir.path().join("ride.gpx");

    let payloads = vec![
        gpmf_payload(&[[100_000_000, 200_000_000, 5_000, 0, 0]]),
        gpmf_payload(&[[100_001_000, 200_001_000, 5_100, 0, 0]]),
        gpmf_payload(&[[500_000_000, 600_000_000, 5_200, 0, 0]]),
    ];
    fs::write(&recording_path, build_recording(&payloads)).unwrap();

    let extractor = TelemetryExtractor::open(&recording_path).unwrap();
    let track = extractor.extract("GPS5").unwrap();
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let outcome = convert_track(&track, start, JumpFilter::default());
    export_to_gpx(&outcome.accepted, &gpx_path).unwrap();

    let content = fs::read_to_string(&gpx_path).unwrap();
    assert_eq!(content.matches("<trkpt").count(), 2);
    assert!(content.contains("<time>2024-01-01T00:00:00.000000Z</time>"));
    assert!(content.contains("<time>2024-01-01T00:00:01.000000Z</time>"));
}

#[test]
fn test_no_telemetry_fails_before_writing_output() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let recording_path = temp_dir.path().join("empty.360");
    let output_path = temp_dir.path().join("track.gpx");

    // A well-formed recording whose metadata track has zero payloads
    fs::write(&recording_path, build_recording(&[])).unwrap();

    let options = ConvertOptions {
        output: output_path.clone(),
        ..ConvertOptions::default()
    };
    let err = convert_file(
        &recording_path,
        &PathBuf::from("does-not-matter.mp4"),
        &options,
    )
    .unwrap_err();

    assert!(format!("{:#}", err).contains("No GPS data"));
    assert!(
        !output_path.exists(),
        "No output file should exist after a no-telemetry failure"
    );
}

#[test]
fn test_recording_without_gpmd_track_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let recording_path = temp_dir.path().join("not-a-gopro.mp4");
    fs::write(&recording_path, b"not an mp4 at all").unwrap();

    assert!(TelemetryExtractor::open(&recording_path).is_err());
}
