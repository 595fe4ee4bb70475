use thiserror::Error;

/// Failure of a single USB operation.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("usb error: {0}")]
    Usb(#[from] rusb::Error),
    #[error(
        "short control write for request {request:#04x}: {written} of {expected} bytes acknowledged"
    )]
    ShortWrite {
        request: u8,
        expected: usize,
        written: usize,
    },
}

impl TransportError {
    /// Returns true if the operation ran out of time rather than failing outright.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Usb(rusb::Error::Timeout))
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("device {vendor_id:04x}:{product_id:04x} not found")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl From<rusb::Error> for Error {
    fn from(e: rusb::Error) -> Self {
        Error::Transport(TransportError::Usb(e))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
