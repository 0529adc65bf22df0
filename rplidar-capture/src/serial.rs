use crate::config::CaptureConfig;
use crate::error::CaptureError;
use crate::time::sleep_ms;
use serialport::SerialPort;
use std::io::Read;
use std::time::Duration;

const CMD_SYNC_BYTE: u8 = 0xA5;
const CMD_SCAN: u8 = 0x20;
const CMD_STOP: u8 = 0x25;
const N_READ_TRIALS: usize = 3;

pub(crate) fn open_port(config: &CaptureConfig) -> Result<Box<dyn SerialPort>, CaptureError> {
    let port = serialport::new(&config.port, config.baud_rate)
        .timeout(Duration::from_millis(10))
        .open()?;
    Ok(port)
}

fn send_data(port: &mut Box<dyn SerialPort>, data: &[u8]) -> std::io::Result<usize> {
    port.write(data)
}

pub(crate) fn send_command(port: &mut Box<dyn SerialPort>, command: u8) -> std::io::Result<usize> {
    let data: [u8; 2] = [CMD_SYNC_BYTE, command];
    send_data(port, &data)
}

pub(crate) fn start_scan(port: &mut Box<dyn SerialPort>) -> Result<(), CaptureError> {
    send_command(port, CMD_SCAN)?;
    Ok(())
}

fn stop_scan(port: &mut Box<dyn SerialPort>) -> Result<(), CaptureError> {
    send_command(port, CMD_STOP)?;
    Ok(())
}

pub(crate) fn stop_scan_and_flush(port: &mut Box<dyn SerialPort>) -> Result<(), CaptureError> {
    stop_scan(port)?;
    flush(port)?;
    Ok(())
}

pub(crate) fn get_n_read(port: &mut Box<dyn SerialPort>) -> Result<usize, CaptureError> {
    let n_u32: u32 = port.bytes_to_read()?;
    Ok(n_u32.try_into().unwrap_or(0))
}

pub(crate) fn flush(port: &mut Box<dyn SerialPort>) -> Result<(), CaptureError> {
    let n_read: usize = get_n_read(port).unwrap_or(0);
    if n_read == 0 {
        return Ok(());
    }
    let mut packet: Vec<u8> = vec![0; n_read];
    port.read(packet.as_mut_slice())?;
    Ok(())
}

pub(crate) fn read(
    port: &mut Box<dyn SerialPort>,
    data_size: usize,
) -> Result<Vec<u8>, CaptureError> {
    assert!(data_size > 0);
    for _ in 0..N_READ_TRIALS {
        let n_read: usize = get_n_read(port)?;

        if n_read < data_size {
            sleep_ms(10);
            continue;
        }

        let mut packet: Vec<u8> = vec![0; data_size];
        if let Err(e) = port.read(packet.as_mut_slice()) {
            return Err(CaptureError::Io(e));
        }
        return Ok(packet);
    }
    Err(CaptureError::Timeout(N_READ_TRIALS as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serialport::TTYPort;
    use std::io::{Read, Write};

    #[test]
    fn test_start_scan() {
        let (mut master, slave) = TTYPort::pair().expect("Unable to create ptty pair");
        let mut slave_ptr = Box::new(slave) as Box<dyn SerialPort>;
        start_scan(&mut slave_ptr).unwrap();

        sleep_ms(10);

        let mut buf = [0u8; 2];
        master.read(&mut buf).unwrap();
        assert_eq!(buf, [0xA5, 0x20]);
    }

    #[test]
    fn test_stop_scan() {
        let (master, mut slave) = TTYPort::pair().expect("Unable to create ptty pair");
        let mut master_ptr = Box::new(master) as Box<dyn SerialPort>;
        stop_scan(&mut master_ptr).unwrap();

        sleep_ms(10);

        let mut buf = [0u8; 2];
        slave.read(&mut buf).unwrap();
        assert_eq!(buf, [0xA5, 0x25]);
    }

    #[test]
    fn test_read() {
        let (mut master, slave) = TTYPort::pair().expect("Unable to create ptty pair");
        let mut slave_ptr = Box::new(slave) as Box<dyn SerialPort>;

        master.write(&[0x01, 0x02, 0x03]).unwrap();
        sleep_ms(10);

        let data = read(&mut slave_ptr, 3).unwrap();
        assert_eq!(data, vec![0x01, 0x02, 0x03]);

        // nothing more to read: all trials exhausted
        assert!(matches!(
            read(&mut slave_ptr, 1),
            Err(CaptureError::Timeout(_))
        ));
    }

    #[test]
    fn test_open_port_unknown_device() {
        let config = CaptureConfig::new("/dev/nonexistent-lidar");
        assert!(matches!(
            open_port(&config),
            Err(CaptureError::Connection(_))
        ));
    }
}
