use std::error::Error;
use std::fmt::Display;
use std::path::PathBuf;
use std::{fmt, io};

#[derive(Debug)]
pub enum CaptureError {
    /// The serial port could not be opened or was lost.
    Connection(serialport::Error),
    /// Bytes received from the device do not frame into a valid packet.
    Protocol(String),
    /// A packet framed correctly but its checksum did not match.
    /// Recovered locally by dropping the packet; never fatal on its own.
    ChecksumMismatch(u16, u16),
    /// The replay file does not exist.
    NotFound(PathBuf),
    /// A replay file row did not parse. Carries the 1-based row number.
    Format(u64, String),
    /// The source produced no frame within the timeout, this many times in a row.
    Timeout(u32),
    Io(io::Error),
    Csv(csv::Error),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CaptureError::Connection(err) => write!(f, "Cannot open serial connection: {}.", err),
            CaptureError::Protocol(detail) => write!(f, "Device sent unframeable data: {}.", detail),
            CaptureError::ChecksumMismatch(expected, calculated) => write!(
                f,
                "Checksum mismatched. Calculated = {:04X}, expected = {:04X}.",
                calculated, expected
            ),
            CaptureError::NotFound(path) => {
                write!(f, "Capture file \"{}\" does not exist.", path.display())
            }
            CaptureError::Format(row, detail) => {
                write!(f, "Capture file row {} does not parse: {}.", row, detail)
            }
            CaptureError::Timeout(count) => {
                write!(f, "No frame received after {} consecutive attempts.", count)
            }
            CaptureError::Io(err) => Display::fmt(&err, f),
            CaptureError::Csv(err) => Display::fmt(&err, f),
        }
    }
}

impl Error for CaptureError {}

impl From<io::Error> for CaptureError {
    fn from(err: io::Error) -> Self {
        CaptureError::Io(err)
    }
}

impl From<serialport::Error> for CaptureError {
    fn from(err: serialport::Error) -> Self {
        CaptureError::Connection(err)
    }
}

impl From<csv::Error> for CaptureError {
    fn from(err: csv::Error) -> Self {
        CaptureError::Csv(err)
    }
}
