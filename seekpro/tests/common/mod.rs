#![allow(dead_code)]

use std::collections::VecDeque;
use std::time::Duration;

use seekpro::capture::seek_pro::{CHUNK_SIZE, START_GET_IMAGE_TRANSFER};
use seekpro::frame::{CROP_LEFT, CROP_TOP, FRAME_BYTES, HEIGHT, RAW_HEIGHT, RAW_WIDTH, WIDTH};
use seekpro::rusb;
use seekpro::{Transport, TransportError};

/// What the device answers to one frame request.
pub enum Reply {
    /// Bytes streamed back, followed by zero-length packets.
    Transfer(Vec<u8>),
    /// Bytes streamed back, after which bulk reads time out.
    Stall(Vec<u8>),
    /// Every bulk read times out.
    Timeout,
}

/// Scripted stand-in for a camera.
pub struct MockTransport {
    replies: VecDeque<Reply>,
    current: Option<(Vec<u8>, usize, bool)>,
    pub chunk_size: usize,
    pub fail_request: Option<u8>,
    pub control_timeout: bool,
    pub writes: Vec<(u8, Vec<u8>)>,
    pub bulk_reads: usize,
}

impl MockTransport {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: replies.into_iter().collect(),
            current: None,
            chunk_size: CHUNK_SIZE,
            fail_request: None,
            control_timeout: false,
            writes: Vec::new(),
            bulk_reads: 0,
        }
    }

    /// A device that never sends a frame.
    pub fn idle() -> Self {
        Self::new(Vec::new())
    }

    /// Number of completed init handshakes (each ends with an operation mode start).
    pub fn init_count(&self) -> usize {
        self.writes
            .iter()
            .filter(|(request, data)| *request == 0x3c && data == &[0x01, 0x00])
            .count()
    }

    pub fn frame_requests(&self) -> usize {
        self.writes
            .iter()
            .filter(|(request, _)| *request == START_GET_IMAGE_TRANSFER)
            .count()
    }

    pub fn pending_replies(&self) -> usize {
        self.replies.len()
    }
}

impl Transport for MockTransport {
    fn send_control(
        &mut self,
        request: u8,
        data: &[u8],
        _value: u16,
        _index: u16,
    ) -> Result<(), TransportError> {
        if self.control_timeout {
            return Err(TransportError::Usb(rusb::Error::Timeout));
        }
        if self.fail_request == Some(request) {
            return Err(TransportError::Usb(rusb::Error::Pipe));
        }

        self.writes.push((request, data.to_vec()));

        if request == START_GET_IMAGE_TRANSFER {
            self.current = match self.replies.pop_front() {
                Some(Reply::Transfer(bytes)) => Some((bytes, 0, false)),
                Some(Reply::Stall(bytes)) => Some((bytes, 0, true)),
                Some(Reply::Timeout) | None => None,
            };
        }

        Ok(())
    }

    fn receive_control(
        &mut self,
        request: u8,
        length: usize,
        _value: u16,
        _index: u16,
    ) -> Result<Vec<u8>, TransportError> {
        Ok((0..length).map(|i| request.wrapping_add(i as u8)).collect())
    }

    fn bulk_read(
        &mut self,
        endpoint: u8,
        buf: &mut [u8],
        _timeout: Duration,
    ) -> Result<usize, TransportError> {
        assert_eq!(endpoint, 0x81);
        self.bulk_reads += 1;

        let (bytes, pos, stall) = match self.current.as_mut() {
            Some(current) => current,
            None => return Err(TransportError::Usb(rusb::Error::Timeout)),
        };
        if *stall && *pos == bytes.len() {
            return Err(TransportError::Usb(rusb::Error::Timeout));
        }

        let len = buf.len().min(self.chunk_size).min(bytes.len() - *pos);
        buf[..len].copy_from_slice(&bytes[*pos..*pos + len]);
        *pos += len;

        Ok(len)
    }
}

/// Raw transfer with every sample given by `sample(row, col)` and the
/// status byte patched in.
pub fn raw_transfer(status: u8, sample: impl Fn(usize, usize) -> u16) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(FRAME_BYTES);
    for row in 0..RAW_HEIGHT {
        for col in 0..RAW_WIDTH {
            bytes.extend_from_slice(&sample(row, col).to_le_bytes());
        }
    }
    bytes[4] = status;
    bytes
}

/// Raw transfer whose usable area is `pattern(row, col)` and whose
/// border holds unrelated data.
pub fn padded_transfer(status: u8, pattern: impl Fn(usize, usize) -> u16) -> Vec<u8> {
    raw_transfer(status, |row, col| {
        let inside = (CROP_TOP..CROP_TOP + HEIGHT).contains(&row)
            && (CROP_LEFT..CROP_LEFT + WIDTH).contains(&col);
        if inside {
            pattern(row - CROP_TOP, col - CROP_LEFT)
        } else {
            (0xbeef ^ (row * 31 + col)) as u16
        }
    })
}

pub fn uniform(status: u8, value: u16) -> Reply {
    Reply::Transfer(raw_transfer(status, |_, _| value))
}
