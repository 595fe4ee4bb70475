//! Seek Thermal Pro vendor protocol: init handshake and frame transfer.

mod parse;

pub use parse::{assemble, status_byte, FrameStatus};

use std::time::Duration;

use bytes::BytesMut;
use itertools::iproduct;

use crate::capture::Transport;
use crate::error::TransportError;
use crate::frame::{RawFrame, FRAME_BYTES};

pub const SEEK_PRO_VID: u16 = 0x289d;
pub const SEEK_PRO_PID: u16 = 0x0011;

// Vendor requests
pub const READ_CHIP_ID: u8 = 0x36;
pub const START_GET_IMAGE_TRANSFER: u8 = 0x53;

pub const GET_OPERATION_MODE: u8 = 0x3d;
pub const GET_IMAGE_PROCESSING_MODE: u8 = 0x3f;
pub const GET_FIRMWARE_INFO: u8 = 0x4e;
pub const GET_FACTORY_SETTINGS: u8 = 0x58;

pub const SET_OPERATION_MODE: u8 = 0x3c;
pub const SET_IMAGE_PROCESSING_MODE: u8 = 0x3e;
pub const SET_FIRMWARE_INFO_FEATURES: u8 = 0x55;
pub const SET_FACTORY_SETTINGS_FEATURES: u8 = 0x56;

/// Payload of the "send me a frame" request.
pub const FRAME_REQUEST: [u8; 4] = [0x58, 0x5b, 0x01, 0x00];

/// Bulk IN endpoint carrying frame data.
pub const FRAME_ENDPOINT: u8 = 0x81;

/// Size of each bulk read while assembling a frame.
pub const CHUNK_SIZE: usize = 13680;

/// A transfer this close to complete is considered finished. The first
/// frame after init often arrives with an unexpected offset.
pub const READ_TOLERANCE: usize = 512;

/// Bring the sensor into streaming mode.
///
/// Sends the fixed handshake in order and stops at the first failed
/// write. Safe to call again on an already streaming device.
pub fn initialize<T: Transport>(transport: &mut T) -> Result<(), TransportError> {
    log::debug!("initializing sensor");

    send(transport, SET_OPERATION_MODE, &[0x00, 0x00])?;
    send(
        transport,
        SET_FACTORY_SETTINGS_FEATURES,
        &[0x06, 0x00, 0x08, 0x00, 0x00, 0x00],
    )?;
    send(transport, SET_FIRMWARE_INFO_FEATURES, &[0x17, 0x00])?;
    send(
        transport,
        SET_FACTORY_SETTINGS_FEATURES,
        &[0x01, 0x00, 0x00, 0x06, 0x00, 0x00],
    )?;

    for (i, j) in iproduct!(0..10u8, (0..=224u8).step_by(32)) {
        send(
            transport,
            SET_FACTORY_SETTINGS_FEATURES,
            &[0x20, 0x00, j, i, 0x00, 0x00],
        )?;
    }

    send(transport, SET_FIRMWARE_INFO_FEATURES, &[0x15, 0x00])?;
    send(transport, SET_IMAGE_PROCESSING_MODE, &[0x08, 0x00])?;
    send(transport, SET_OPERATION_MODE, &[0x01, 0x00])?;

    Ok(())
}

/// Put the sensor back into its idle operation mode.
pub fn deinit<T: Transport>(transport: &mut T) -> Result<(), TransportError> {
    log::debug!("deinitializing sensor");

    for _ in 0..3 {
        send(transport, SET_OPERATION_MODE, &[0x00, 0x00])?;
    }

    Ok(())
}

/// Request one frame and read it off the bulk endpoint.
///
/// Returns the frame status byte together with the frame, or `None` in
/// place of the frame if the transfer did not add up to a usable length.
/// A device that stops short without sending a zero-length packet leaves
/// the next bulk read to time out, which is returned as an error.
pub fn grab<T: Transport>(
    transport: &mut T,
    timeout: Duration,
) -> Result<(u8, Option<RawFrame>), TransportError> {
    request_frame(transport)?;
    read_frame(transport, timeout)
}

/// Ask the sensor to start streaming one frame.
pub fn request_frame<T: Transport>(transport: &mut T) -> Result<(), TransportError> {
    send(transport, START_GET_IMAGE_TRANSFER, &FRAME_REQUEST)
}

/// Read a requested frame until it is complete within [`READ_TOLERANCE`]
/// or the device ends the transfer with a zero-length packet.
pub fn read_frame<T: Transport>(
    transport: &mut T,
    timeout: Duration,
) -> Result<(u8, Option<RawFrame>), TransportError> {
    let mut frame = BytesMut::with_capacity(FRAME_BYTES);
    let mut chunk = vec![0u8; CHUNK_SIZE];

    loop {
        let len = transport.bulk_read(FRAME_ENDPOINT, &mut chunk, timeout)?;
        frame.extend_from_slice(&chunk[..len]);

        let remaining = FRAME_BYTES.saturating_sub(frame.len());
        log::trace!("read {} bytes, {} remaining", len, remaining);

        if remaining <= READ_TOLERANCE {
            break;
        }

        // A zero-length packet ends the transfer early.
        if len == 0 {
            log::debug!("transfer ended with {} bytes outstanding", remaining);
            break;
        }
    }

    Ok(assemble(frame))
}

/// Read the 12 byte chip identifier.
pub fn read_chip_id<T: Transport>(transport: &mut T) -> Result<Vec<u8>, TransportError> {
    transport.receive_control(READ_CHIP_ID, 12, 0, 0)
}

/// Read the 4 byte firmware info block.
pub fn firmware_info<T: Transport>(transport: &mut T) -> Result<Vec<u8>, TransportError> {
    transport.receive_control(GET_FIRMWARE_INFO, 4, 0, 0)
}

/// Read the current operation mode.
pub fn operation_mode<T: Transport>(transport: &mut T) -> Result<Vec<u8>, TransportError> {
    transport.receive_control(GET_OPERATION_MODE, 2, 0, 0)
}

fn send<T: Transport>(transport: &mut T, request: u8, data: &[u8]) -> Result<(), TransportError> {
    log::debug!("request {:#04x} <- {}", request, hex::encode(data));
    transport.send_control(request, data, 0, 0)
}
