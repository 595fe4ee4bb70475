pub mod seek_pro;

use std::time::Duration;

use rusb::{Device, DeviceDescriptor, DeviceHandle, Direction, Recipient, RequestType, UsbContext};

use crate::error::TransportError;

/// Raw USB operations the camera protocol is built on.
///
/// Implementations carry no protocol knowledge and never retry; callers
/// decide whether a failure (a timeout in particular) is fatal.
pub trait Transport {
    /// Host-to-device vendor control transfer. Fails unless the device
    /// acknowledges every byte of `data`.
    fn send_control(
        &mut self,
        request: u8,
        data: &[u8],
        value: u16,
        index: u16,
    ) -> Result<(), TransportError>;

    /// Device-to-host vendor control transfer of up to `length` bytes.
    fn receive_control(
        &mut self,
        request: u8,
        length: usize,
        value: u16,
        index: u16,
    ) -> Result<Vec<u8>, TransportError>;

    /// One bulk IN transfer into `buf`. Returns the number of bytes
    /// received, which is less than `buf.len()` on a short packet.
    fn bulk_read(
        &mut self,
        endpoint: u8,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, TransportError>;
}

/// [`Transport`] over an opened rusb device handle.
pub struct UsbTransport<T: UsbContext> {
    handle: DeviceHandle<T>,
    timeout: Duration,
}

impl<T: UsbContext> UsbTransport<T> {
    pub fn new(handle: DeviceHandle<T>, timeout: Duration) -> Self {
        Self { handle, timeout }
    }
}

impl<T: UsbContext> Transport for UsbTransport<T> {
    fn send_control(
        &mut self,
        request: u8,
        data: &[u8],
        value: u16,
        index: u16,
    ) -> Result<(), TransportError> {
        let request_type =
            rusb::request_type(Direction::Out, RequestType::Vendor, Recipient::Interface);

        let written = self
            .handle
            .write_control(request_type, request, value, index, data, self.timeout)?;

        if written != data.len() {
            return Err(TransportError::ShortWrite {
                request,
                expected: data.len(),
                written,
            });
        }

        Ok(())
    }

    fn receive_control(
        &mut self,
        request: u8,
        length: usize,
        value: u16,
        index: u16,
    ) -> Result<Vec<u8>, TransportError> {
        let request_type =
            rusb::request_type(Direction::In, RequestType::Vendor, Recipient::Interface);

        let mut buf = vec![0u8; length];
        let len = self
            .handle
            .read_control(request_type, request, value, index, &mut buf, self.timeout)?;
        buf.truncate(len);

        Ok(buf)
    }

    fn bulk_read(
        &mut self,
        endpoint: u8,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, TransportError> {
        Ok(self.handle.read_bulk(endpoint, buf, timeout)?)
    }
}

/// Find and open the first device matching `vid`:`pid`.
pub fn open_device<T: UsbContext>(
    context: &T,
    vid: u16,
    pid: u16,
) -> rusb::Result<Option<(Device<T>, DeviceDescriptor, DeviceHandle<T>)>> {
    let devices = context.devices()?;

    for device in devices.iter() {
        let device_desc = match device.device_descriptor() {
            Ok(d) => d,
            Err(_) => continue,
        };

        if device_desc.vendor_id() == vid && device_desc.product_id() == pid {
            let handle = device.open()?;
            return Ok(Some((device, device_desc, handle)));
        }
    }

    Ok(None)
}

/// Make the device's first configuration active and claim its first interface.
pub fn configure<T: UsbContext>(
    device: &Device<T>,
    handle: &mut DeviceHandle<T>,
) -> rusb::Result<()> {
    let config = device.config_descriptor(0)?;

    // Not supported on every platform.
    if let Err(err) = handle.set_auto_detach_kernel_driver(true) {
        log::debug!("kernel driver auto-detach unavailable: {}", err);
    }

    handle.set_active_configuration(config.number())?;
    handle.claim_interface(0)?;

    Ok(())
}
