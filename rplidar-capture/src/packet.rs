//! Framing for the raw sample feed coming over the serial port.
//!
//! The feed is a sequence of packets:
//!
//! ```text
//! 0xAA 0x55 | flags | n | n x (quality u8, angle u16 LE, distance u16 LE) | checksum u16 LE
//! ```
//!
//! Angle is in 1/64 degree, distance in millimeters. Bit 0 of `flags`
//! marks the first packet of a new rotation. The checksum is a 16-bit
//! XOR fold over everything before it. Garbled input is recovered by
//! scanning forward to the next `0xAA 0x55` header.

use crate::error::CaptureError;
use rplidar_data::Sample;
use std::collections::VecDeque;

pub(crate) const PACKET_HEADER_SIZE: usize = 4;
pub(crate) const SAMPLE_SIZE: usize = 5;
pub(crate) const CHECKSUM_SIZE: usize = 2;
pub(crate) const PACKET_SYNC_0: u8 = 0xAA;
pub(crate) const PACKET_SYNC_1: u8 = 0x55;
pub(crate) const FLAG_NEW_ROTATION: u8 = 0x01;

pub(crate) fn to_u16_le(lo: u8, hi: u8) -> u16 {
    (lo as u16) + ((hi as u16) << 8)
}

pub(crate) fn to_string(data: &[u8]) -> String {
    data.iter()
        .map(|e| format!("{:02X}", e))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_packet_header(element0: u8, element1: u8) -> bool {
    element0 == PACKET_SYNC_0 && element1 == PACKET_SYNC_1
}

pub(crate) fn packet_size(n_samples: usize) -> usize {
    PACKET_HEADER_SIZE + n_samples * SAMPLE_SIZE + CHECKSUM_SIZE
}

pub(crate) fn n_samples(packet: &[u8]) -> usize {
    packet[3] as usize
}

pub(crate) fn sample_index(idx: usize) -> usize {
    PACKET_HEADER_SIZE + idx * SAMPLE_SIZE
}

pub(crate) fn is_start_of_rotation(packet: &[u8]) -> bool {
    packet[2] & FLAG_NEW_ROTATION == FLAG_NEW_ROTATION
}

fn get_packet_size(buffer: &VecDeque<u8>, start_index: usize) -> Result<usize, ()> {
    match buffer.get(start_index + 3) {
        Some(n) => Ok(packet_size(*n as usize)),
        None => Err(()),
    }
}

fn find_start_index(buffer: &VecDeque<u8>) -> Result<usize, ()> {
    if buffer.is_empty() {
        return Err(());
    }
    for i in 0..(buffer.len() - 1) {
        let e0 = match buffer.get(i) {
            Some(e) => e,
            None => continue,
        };
        let e1 = match buffer.get(i + 1) {
            Some(e) => e,
            None => continue,
        };
        if is_packet_header(*e0, *e1) {
            return Ok(i);
        }
    }
    Err(())
}

/// Locates the next packet in the buffer: offset of its header and its
/// total size. Bytes before the offset are resync garbage.
pub(crate) fn sendable_packet_range(buffer: &VecDeque<u8>) -> Result<(usize, usize), ()> {
    let start_index = find_start_index(buffer)?;
    let n_packet_bytes = get_packet_size(buffer, start_index)?;
    Ok((start_index, n_packet_bytes))
}

fn calc_checksum(packet: &[u8]) -> u16 {
    let payload_end = packet.len() - CHECKSUM_SIZE;
    let mut checksum: u16 = 0;
    for (i, byte) in packet[..payload_end].iter().enumerate() {
        if i % 2 == 0 {
            checksum ^= *byte as u16;
        } else {
            checksum ^= (*byte as u16) << 8;
        }
    }
    checksum
}

pub(crate) fn err_if_checksum_mismatched(packet: &[u8]) -> Result<(), CaptureError> {
    let calculated = calc_checksum(packet);
    let expected = to_u16_le(packet[packet.len() - 2], packet[packet.len() - 1]);
    match calculated != expected {
        true => Err(CaptureError::ChecksumMismatch(expected, calculated)),
        false => Ok(()),
    }
}

pub(crate) fn validate_packet(packet: &[u8]) -> Result<(), CaptureError> {
    if packet.len() < PACKET_HEADER_SIZE + CHECKSUM_SIZE {
        return Err(CaptureError::Protocol(format!(
            "packet of {} bytes is shorter than the minimal framing",
            packet.len()
        )));
    }
    if !is_packet_header(packet[0], packet[1]) {
        return Err(CaptureError::Protocol(format!(
            "packet does not start with the sync header: {}",
            to_string(&packet[0..2])
        )));
    }
    Ok(())
}

/// Decodes the sample records of a framed packet.
/// Zero distances are kept: "no return" is data, not noise.
pub(crate) fn decode_samples(packet: &[u8]) -> Vec<Sample> {
    (0..n_samples(packet))
        .map(|idx| {
            let i = sample_index(idx);
            let quality = packet[i];
            let angle_raw = to_u16_le(packet[i + 1], packet[i + 2]);
            let distance = to_u16_le(packet[i + 3], packet[i + 4]);
            Sample::new((angle_raw as f64) / 64. % 360., distance as f64, quality)
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn encode_packet(new_rotation: bool, samples: &[(u8, f64, f64)]) -> Vec<u8> {
    let mut packet = vec![
        PACKET_SYNC_0,
        PACKET_SYNC_1,
        if new_rotation { FLAG_NEW_ROTATION } else { 0x00 },
        samples.len() as u8,
    ];
    for (quality, angle_degrees, distance_mm) in samples {
        let angle_raw = (angle_degrees * 64.).round() as u16;
        let distance = distance_mm.round() as u16;
        packet.push(*quality);
        packet.push((angle_raw & 0xFF) as u8);
        packet.push((angle_raw >> 8) as u8);
        packet.push((distance & 0xFF) as u8);
        packet.push((distance >> 8) as u8);
    }
    let checksum = calc_checksum(&[&packet[..], &[0, 0]].concat());
    packet.push((checksum & 0xFF) as u8);
    packet.push((checksum >> 8) as u8);
    packet
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_packet() {
        let packet = encode_packet(true, &[(47, 12.5, 1500.0), (50, 13.0, 0.0)]);
        assert_eq!(packet.len(), packet_size(2));
        assert!(is_start_of_rotation(&packet));
        assert!(validate_packet(&packet).is_ok());
        assert!(err_if_checksum_mismatched(&packet).is_ok());

        let samples = decode_samples(&packet);
        assert_eq!(samples.len(), 2);
        assert!((samples[0].angle_degrees - 12.5).abs() < 1. / 64.);
        assert_eq!(samples[0].distance_mm, 1500.0);
        assert_eq!(samples[0].quality, 47);
        // no-return sample survives decoding
        assert!(samples[1].is_no_return());
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut packet = encode_packet(false, &[(47, 90.0, 800.0)]);
        packet[5] ^= 0xFF;
        assert!(matches!(
            err_if_checksum_mismatched(&packet),
            Err(CaptureError::ChecksumMismatch(_, _))
        ));
    }

    #[test]
    fn test_resync_skips_leading_garbage() {
        let packet = encode_packet(true, &[(47, 0.0, 100.0)]);
        let mut buffer = VecDeque::from(vec![0x01, 0x02, 0xAA, 0x03]);
        buffer.extend(packet.iter());

        let (start_index, n_packet_bytes) = sendable_packet_range(&buffer).unwrap();
        assert_eq!(start_index, 4);
        assert_eq!(n_packet_bytes, packet.len());
    }

    #[test]
    fn test_incomplete_header_is_not_sendable() {
        let buffer = VecDeque::from(vec![0xAA, 0x55, 0x01]);
        assert!(sendable_packet_range(&buffer).is_err());
    }

    #[test]
    fn test_validate_packet() {
        assert!(matches!(
            validate_packet(&[0xAA, 0x55, 0x00]),
            Err(CaptureError::Protocol(_))
        ));
        assert!(matches!(
            validate_packet(&[0xAB, 0x55, 0x00, 0x00, 0x00, 0x00]),
            Err(CaptureError::Protocol(_))
        ));
    }
}
