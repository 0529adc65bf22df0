use clap::{Arg, Command};
use rplidar_capture::{record_from_csv, CaptureError};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let matches = Command::new("record_scan_csv")
        .about("Replays a reference CSV, re-records it and writes a report.")
        .disable_version_flag(true)
        .arg(
            Arg::new("csv")
                .long("csv")
                .help("Capture file to replay")
                .required(true),
        )
        .arg(
            Arg::new("out")
                .long("out")
                .help("Output directory")
                .default_value("docs"),
        )
        .get_matches();

    let csv: &String = matches.get_one("csv").unwrap();
    let out: &String = matches.get_one("out").unwrap();

    if let Err(e) = run(csv, out) {
        eprintln!("record_scan_csv: {e}");
        std::process::exit(1);
    }
}

fn run(csv: &str, out: &str) -> Result<(), CaptureError> {
    let output = record_from_csv(csv, out)?;
    println!("Generated:");
    println!("  {}", output.capture.display());
    println!("  {}", output.report.filtered_points.display());
    println!("  {}", output.report.report.display());
    println!(
        "{} frames, {} samples replayed",
        output.summary.frames, output.summary.samples
    );
    Ok(())
}
