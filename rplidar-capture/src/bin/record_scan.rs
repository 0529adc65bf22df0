use clap::{Arg, Command};
use rplidar_capture::{CaptureConfig, CaptureError, LiveDevice, Recorder, Session};
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let matches = Command::new("record_scan")
        .about("Records live RPLidar scans to a capture file.")
        .disable_version_flag(true)
        .arg(
            Arg::new("port")
                .long("port")
                .help("The device path to a serial port")
                .required(true),
        )
        .arg(
            Arg::new("seconds")
                .long("seconds")
                .help("Recording duration in seconds")
                .value_parser(clap::value_parser!(u64))
                .default_value("10"),
        )
        .arg(
            Arg::new("out")
                .long("out")
                .help("Output directory")
                .default_value("data"),
        )
        .arg(
            Arg::new("decimation")
                .long("decimation")
                .help("Keep 1 of every N samples")
                .value_parser(clap::value_parser!(u64).range(1..))
                .default_value("1"),
        )
        .get_matches();

    let port: &String = matches.get_one("port").unwrap();
    let seconds: u64 = *matches.get_one("seconds").unwrap();
    let out: &String = matches.get_one("out").unwrap();
    let decimation: u64 = *matches.get_one("decimation").unwrap();

    if let Err(e) = run(port, seconds, Path::new(out), decimation) {
        eprintln!("record_scan: {e}");
        std::process::exit(1);
    }
}

fn run(port: &str, seconds: u64, out: &Path, decimation: u64) -> Result<(), CaptureError> {
    std::fs::create_dir_all(out)?;
    let filename = out.join(format!(
        "scan_{}.csv",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    ));

    let config = CaptureConfig::new(port);
    let mut device = LiveDevice::open(&config)?;
    let mut recorder = Recorder::with_decimation(&filename, decimation)?;
    let mut session = Session::new(Some(Duration::from_secs(seconds)), config.retry_budget);

    println!("Recording {seconds}s from {port} to {}", filename.display());
    let summary = session.run(&mut device, &mut recorder)?;
    println!(
        "Recorded {} frames ({} samples, {} rows after decimation) in {:.1}s",
        summary.frames,
        summary.samples,
        recorder.rows_written(),
        summary.elapsed.as_secs_f64(),
    );
    Ok(())
}
