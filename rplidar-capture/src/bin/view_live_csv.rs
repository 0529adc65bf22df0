use clap::{Arg, ArgAction, Command};
use rplidar_capture::capture_file::read_capture;
use rplidar_capture::render::TextRenderer;
use rplidar_capture::{CaptureError, FileReplay, LiveView, Session};
use rplidar_data::DatasetHealth;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let matches = Command::new("view_live_csv")
        .about("Views a recorded capture, optionally with live-like pacing.")
        .disable_version_flag(true)
        .arg(
            Arg::new("csv")
                .long("csv")
                .help("Capture file to replay")
                .required(true),
        )
        .arg(
            Arg::new("animate")
                .long("animate")
                .help("Yield frames at the recorded interval")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let csv: &String = matches.get_one("csv").unwrap();
    let animate = matches.get_flag("animate");

    if let Err(e) = run(csv, animate) {
        eprintln!("view_live_csv: {e}");
        std::process::exit(1);
    }
}

fn run(csv: &str, animate: bool) -> Result<(), CaptureError> {
    let frames = read_capture(csv)?;
    let health = DatasetHealth::from_samples(frames.iter().flat_map(|f| f.samples.iter()));
    println!(
        "{}: {} frames, {} samples ({} without return), \
         quality {}..{}, distance {:.0}..{:.0} mm",
        csv,
        frames.len(),
        health.count,
        health.no_return_count,
        health.quality_min,
        health.quality_max,
        health.distance_min_mm,
        health.distance_max_mm,
    );

    let mut replay = FileReplay::open(csv)?;
    if animate {
        replay = replay.animate();
    }
    let mut view = LiveView::new(Box::new(TextRenderer::default()));
    let mut session = Session::new(None, rplidar_capture::config::DEFAULT_RETRY_BUDGET);
    session.run(&mut replay, &mut view)?;
    Ok(())
}
