use bytes::BytesMut;

use super::READ_TOLERANCE;
use crate::frame::{RawFrame, FRAME_BYTES};

/// Offset of the status byte inside a raw frame.
const STATUS_OFFSET: usize = 4;

/// What a frame is for, as marked by its status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// Shutter closed over the internal black body.
    Calibration,
    /// A regular image.
    Normal,
    /// Map of the sensor's dead pixels, sent once after init.
    DeadPixelMap,
    Other(u8),
}

impl From<u8> for FrameStatus {
    fn from(status: u8) -> Self {
        match status {
            1 => FrameStatus::Calibration,
            3 => FrameStatus::Normal,
            4 => FrameStatus::DeadPixelMap,
            other => FrameStatus::Other(other),
        }
    }
}

impl From<FrameStatus> for u8 {
    fn from(status: FrameStatus) -> Self {
        match status {
            FrameStatus::Calibration => 1,
            FrameStatus::Normal => 3,
            FrameStatus::DeadPixelMap => 4,
            FrameStatus::Other(other) => other,
        }
    }
}

/// Status byte of a (possibly partial) transfer, if enough bytes arrived.
pub fn status_byte(data: &[u8]) -> Option<u8> {
    data.get(STATUS_OFFSET).copied()
}

/// Turn the bytes of one transfer into a status and, if usable, a frame.
///
/// Transfers up to [`READ_TOLERANCE`] bytes short are zero padded; the
/// padding lands in the bottom border which cropping discards. Shorter
/// transfers and overruns yield no frame. A transfer too short to hold a
/// status byte reports status 0.
pub fn assemble(mut data: BytesMut) -> (u8, Option<RawFrame>) {
    let status = match status_byte(&data) {
        Some(status) => status,
        None => return (0, None),
    };

    if data.len() > FRAME_BYTES || data.len() + READ_TOLERANCE < FRAME_BYTES {
        log::debug!("unusable transfer of {} bytes", data.len());
        return (status, None);
    }

    data.resize(FRAME_BYTES, 0);
    (status, RawFrame::from_le_bytes(&data))
}
