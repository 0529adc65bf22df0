use clap::{Arg, Command};
use plotters::drawing::IntoDrawingArea;
use plotters::prelude::{BitMapBackend, ChartBuilder, Circle, GREEN, RED, WHITE};
use plotters::style::Color;
use rplidar_capture::capture_file::read_capture;
use rplidar_data::{filter_and_project, FilterLimits};

const WINDOW_RANGE: f64 = 10.;

fn main() {
    let matches = Command::new("plot_capture")
        .about("Draws a recorded capture as a PNG scatter plot.")
        .disable_version_flag(true)
        .arg(
            Arg::new("csv")
                .help("Capture file to draw")
                .required(true),
        )
        .arg(
            Arg::new("out")
                .long("out")
                .help("Output image path")
                .default_value("capture.png"),
        )
        .get_matches();

    let csv: &String = matches.get_one("csv").unwrap();
    let out: &String = matches.get_one("out").unwrap();

    let frames = read_capture(csv).unwrap();
    let limits = FilterLimits::default();
    let points: Vec<(f64, f64)> = frames
        .iter()
        .flat_map(|frame| filter_and_project(frame, &limits))
        .map(|p| (p.x_m, p.y_m))
        .collect();

    println!("Drawing {} points from {} frames.", points.len(), frames.len());

    let root = BitMapBackend::new(out, (800, 800)).into_drawing_area();
    root.fill(&WHITE).unwrap();

    let mut cc = ChartBuilder::on(&root)
        .build_cartesian_2d(-WINDOW_RANGE..WINDOW_RANGE, -WINDOW_RANGE..WINDOW_RANGE)
        .unwrap();

    let circles: Vec<_> = points
        .iter()
        .map(|(x, y)| Circle::new((*x, *y), 2, GREEN.filled()))
        .collect();
    cc.draw_series(circles).unwrap();
    // the sensor sits at the origin
    cc.draw_series([Circle::new((0., 0.), 4, RED.filled())])
        .unwrap();

    root.present().unwrap();
    println!("Saved {out}.");
}
