use crate::config::CaptureConfig;
use crate::driver::{parse_packets, read_device_signal, DriverThreads};
use crate::error::CaptureError;
use crate::serial::{open_port, start_scan, stop_scan_and_flush};
use crate::source::{FramePoll, SampleSource};
use crate::time::sleep_ms;
use crossbeam_channel::bounded;
use rplidar_data::ScanFrame;
use std::sync::mpsc;
use std::time::Duration;

/// Live sample source backed by a serial device.
///
/// Opening spawns the reader/parser thread pair; the public contract
/// stays pull-based. Dropping the device terminates the threads, which
/// stop the scan and release the port.
pub struct LiveDevice {
    // declared before the threads so the receiver drops first:
    // a parser parked in a blocking send on a full frame channel
    // gets a send error and exits, letting the join complete
    frame_rx: mpsc::Receiver<ScanFrame>,
    // joined on drop, after which the port is closed
    _threads: DriverThreads,
    frame_timeout: Duration,
}

impl LiveDevice {
    /// Connects to the device named in `config` and starts scanning.
    pub fn open(config: &CaptureConfig) -> Result<LiveDevice, CaptureError> {
        let mut port = open_port(config)?;

        if !cfg!(test) {
            // In testing, skip flushing so dummy signals survive
            stop_scan_and_flush(&mut port)?;
            sleep_ms(10);
            stop_scan_and_flush(&mut port)?;
        }

        let (reader_terminator_tx, reader_terminator_rx) = bounded(10);
        let (parser_terminator_tx, parser_terminator_rx) = bounded(10);
        let (raw_data_tx, raw_data_rx) = mpsc::sync_channel::<Vec<u8>>(200);

        start_scan(&mut port)?;

        let reader_thread = Some(std::thread::spawn(move || {
            read_device_signal(&mut port, raw_data_tx, reader_terminator_rx);
        }));

        let (frame_tx, frame_rx) = mpsc::sync_channel::<ScanFrame>(10);
        let parser_thread = Some(std::thread::spawn(move || {
            parse_packets(raw_data_rx, parser_terminator_rx, frame_tx);
        }));

        Ok(LiveDevice {
            frame_rx,
            _threads: DriverThreads {
                reader_terminator_tx,
                parser_terminator_tx,
                reader_thread,
                parser_thread,
            },
            frame_timeout: config.frame_timeout,
        })
    }
}

impl SampleSource for LiveDevice {
    fn next_frame(&mut self) -> Result<FramePoll, CaptureError> {
        match self.frame_rx.recv_timeout(self.frame_timeout) {
            Ok(frame) => Ok(FramePoll::Frame(frame)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(FramePoll::TimedOut),
            Err(mpsc::RecvTimeoutError::Disconnected) => Ok(FramePoll::EndOfStream),
        }
    }
}
