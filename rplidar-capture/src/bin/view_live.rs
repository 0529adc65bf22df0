use clap::{Arg, Command};
use rplidar_capture::render::TextRenderer;
use rplidar_capture::{CaptureConfig, CaptureError, LiveDevice, LiveView, Session};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let matches = Command::new("view_live")
        .about("Shows live RPLidar scans frame by frame.")
        .disable_version_flag(true)
        .arg(
            Arg::new("port")
                .long("port")
                .help("The device path to a serial port")
                .required(true),
        )
        .get_matches();

    let port: &String = matches.get_one("port").unwrap();

    if let Err(e) = run(port) {
        eprintln!("view_live: {e}");
        std::process::exit(1);
    }
}

fn run(port: &str) -> Result<(), CaptureError> {
    let config = CaptureConfig::new(port);
    let mut device = LiveDevice::open(&config)?;
    let mut view = LiveView::new(Box::new(TextRenderer::default()));
    let mut session = Session::new(None, config.retry_budget);

    println!("Viewing live scans from {port}, Ctrl-C to quit");
    session.run(&mut device, &mut view)?;
    Ok(())
}
