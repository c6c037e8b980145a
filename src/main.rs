//! CLI for GoPro 360 GPS-to-GPX conversion.

use anyhow::Result;
use clap::{Arg, Command};
use gopro360gpx::{convert_file, ConvertOptions, JumpFilter, DEFAULT_MAX_JUMP_M};
use std::path::PathBuf;

fn build_command() -> Command {
    Command::new("GoPro360GPX")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Extract GPS telemetry from a GoPro 360 recording and write a GPX track aligned to the companion video's start time.")
        .arg(
            Arg::new("telemetry_file")
                .help("GoPro recording carrying the GPMF telemetry track (.360)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("video_file")
                .help("Companion video whose creation time anchors the track (.mp4)")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .default_value("track.gpx")
                .help("Output GPX filename (overwritten if it exists)"),
        )
        .arg(
            Arg::new("no-filter")
                .long("no-filter")
                .help("Write every GPS sample without jump filtering")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("max-jump")
                .long("max-jump")
                .value_name("METERS")
                .value_parser(clap::value_parser!(f64))
                .help("Reject samples farther than this from the last accepted point [default: 100]"),
        )
        .arg(
            Arg::new("csv")
                .long("csv")
                .help("Also write the accepted points as CSV next to the GPX output")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug output")
                .action(clap::ArgAction::SetTrue),
        )
}

fn main() -> Result<()> {
    let matches = build_command().get_matches();

    let telemetry_file = PathBuf::from(matches.get_one::<String>("telemetry_file").unwrap());
    let video_file = PathBuf::from(matches.get_one::<String>("video_file").unwrap());

    let filter = if matches.get_flag("no-filter") {
        JumpFilter::PassThrough
    } else {
        JumpFilter::MaxDistance(
            matches
                .get_one::<f64>("max-jump")
                .copied()
                .unwrap_or(DEFAULT_MAX_JUMP_M),
        )
    };

    let options = ConvertOptions {
        output: PathBuf::from(matches.get_one::<String>("output").unwrap()),
        filter,
        csv: matches.get_flag("csv"),
        debug: matches.get_flag("debug"),
    };

    let report = convert_file(&telemetry_file, &video_file, &options)?;

    println!("GPX file written to {}", report.gpx_path.display());
    if let Some(csv_path) = &report.csv_path {
        println!("CSV file written to {}", csv_path.display());
    }
    if report.points_rejected > 0 {
        println!(
            "{} of {} samples rejected as GPS jumps",
            report.points_rejected,
            report.points_written + report.points_rejected
        );
    }

    Ok(())
}
