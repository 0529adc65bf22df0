//! Background threads that turn the serial byte stream into scan frames.
//!
//! One thread drains the port, a second frames packets and assembles
//! rotations. Both are terminated through bounded channels and joined
//! when [`DriverThreads`] is dropped, which also stops the scan and
//! flushes the port.

use crate::packet::{
    decode_samples, err_if_checksum_mismatched, is_start_of_rotation, sendable_packet_range,
    validate_packet,
};
use crate::serial::{get_n_read, read, stop_scan_and_flush};
use crate::time::{sleep_ms, unix_now};
use crossbeam_channel::{Receiver, Sender};
use rplidar_data::{Sample, ScanFrame};
use serialport::SerialPort;
use std::collections::VecDeque;
use std::sync::mpsc;
use std::thread::JoinHandle;
use tracing::warn;

/// Handles to the reader and parser threads.
pub struct DriverThreads {
    pub(crate) reader_terminator_tx: Sender<bool>,
    pub(crate) parser_terminator_tx: Sender<bool>,
    pub(crate) reader_thread: Option<JoinHandle<()>>,
    pub(crate) parser_thread: Option<JoinHandle<()>>,
}

pub(crate) fn read_device_signal(
    port: &mut Box<dyn SerialPort>,
    raw_data_tx: mpsc::SyncSender<Vec<u8>>,
    reader_terminator_rx: Receiver<bool>,
) {
    loop {
        if do_terminate(&reader_terminator_rx) {
            if let Err(e) = stop_scan_and_flush(port) {
                warn!("stopping scan on shutdown failed: {e}");
            }
            return;
        }

        let n_read: usize = get_n_read(port).unwrap_or(0);
        if n_read == 0 {
            continue;
        }

        if let Ok(signal) = read(port, n_read) {
            if raw_data_tx.send(signal).is_err() {
                // parser side is gone, stop the scan on the way out
                if let Err(e) = stop_scan_and_flush(port) {
                    warn!("stopping scan on shutdown failed: {e}");
                }
                return;
            }
        }
    }
}

pub(crate) fn parse_packets(
    raw_data_rx: mpsc::Receiver<Vec<u8>>,
    parser_terminator_rx: Receiver<bool>,
    frame_tx: mpsc::SyncSender<ScanFrame>,
) {
    let mut buffer = VecDeque::<u8>::new();
    let mut rotation = Vec::<Sample>::new();
    let mut next_seq: u64 = 0;
    while !do_terminate(&parser_terminator_rx) {
        match raw_data_rx.try_recv() {
            Ok(data) => buffer.extend(data),
            Err(_) => sleep_ms(10),
        }

        if buffer.is_empty() {
            continue;
        }

        let (start_index, n_packet_bytes) = match sendable_packet_range(&buffer) {
            Ok(t) => t,
            Err(_) => continue,
        };
        buffer.drain(..start_index); // remove resync garbage
        if buffer.len() < n_packet_bytes {
            // insufficient buffer size to extract a packet
            continue;
        }
        let packet = buffer.drain(0..n_packet_bytes).collect::<Vec<_>>();
        if let Err(e) = validate_packet(&packet) {
            warn!("dropping unframeable packet: {e}");
            continue;
        }
        if let Err(e) = err_if_checksum_mismatched(&packet) {
            warn!("dropping corrupted packet: {e}");
            continue;
        }

        if is_start_of_rotation(&packet) && !rotation.is_empty() {
            let mut frame = ScanFrame::new(next_seq, unix_now());
            frame.samples = std::mem::take(&mut rotation);
            next_seq += 1;
            if frame_tx.send(frame).is_err() {
                return;
            }
        }
        rotation.extend(decode_samples(&packet));
    }
}

pub(crate) fn do_terminate(terminator_rx: &Receiver<bool>) -> bool {
    terminator_rx.try_recv().unwrap_or(false)
}

/// Joins the driver threads.
/// Called automatically when `DriverThreads` is dropped.
pub fn join(driver_threads: &mut DriverThreads) {
    let _ = driver_threads.reader_terminator_tx.send(true);
    let _ = driver_threads.parser_terminator_tx.send(true);

    if let Some(thread) = driver_threads.reader_thread.take() {
        let _ = thread.join();
    }
    if let Some(thread) = driver_threads.parser_thread.take() {
        let _ = thread.join();
    }
}

impl Drop for DriverThreads {
    fn drop(&mut self) {
        join(self);
    }
}
