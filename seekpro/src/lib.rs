//! Driver for the Seek Thermal Pro USB thermal camera.
//!
//! A [`SeekPro`] session owns the device handle, runs the init handshake,
//! finds the sensor's dead pixels and then hands out calibrated,
//! dead-pixel-corrected 320x240 images from [`SeekPro::get_image`].
//!
//! ```no_run
//! fn main() -> seekpro::Result<()> {
//!     let mut camera = seekpro::SeekPro::open()?;
//!     let image = camera.get_image()?;
//!     println!("{}x{}", image.width(), image.height());
//!     Ok(())
//! }
//! ```

pub mod capture;
mod config;
pub mod correct;
pub mod discovery;
mod error;
pub mod frame;

pub use capture::seek_pro::FrameStatus;
pub use capture::{Transport, UsbTransport};
pub use config::SessionConfig;
pub use correct::{CalibrationState, Corrector, DeadPixel};
pub use error::{Error, Result, TransportError};
pub use frame::{Image, RawFrame};

pub use rusb;

use rusb::Context;

use capture::seek_pro::{self, SEEK_PRO_PID, SEEK_PRO_VID};

/// One camera session. The transport is owned for the whole lifetime of
/// the session and released when it is dropped.
pub struct SeekPro<T: Transport> {
    transport: T,
    config: SessionConfig,
    corrector: Corrector,
}

impl SeekPro<UsbTransport<Context>> {
    /// Open the first connected camera with default settings.
    pub fn open() -> Result<Self> {
        Self::open_with(SessionConfig::default())
    }

    pub fn open_with(config: SessionConfig) -> Result<Self> {
        let context = Context::new()?;

        let (device, _, mut handle) = capture::open_device(&context, SEEK_PRO_VID, SEEK_PRO_PID)?
            .ok_or(Error::DeviceNotFound {
                vendor_id: SEEK_PRO_VID,
                product_id: SEEK_PRO_PID,
            })?;

        log::info!("opened {:04x}:{:04x}", SEEK_PRO_VID, SEEK_PRO_PID);

        capture::configure(&device, &mut handle)?;

        Self::with_transport(UsbTransport::new(handle, config.control_timeout), config)
    }
}

impl<T: Transport> SeekPro<T> {
    /// Start a session over an already configured transport.
    ///
    /// Runs dead pixel discovery, which also leaves the sensor initialized.
    pub fn with_transport(mut transport: T, config: SessionConfig) -> Result<Self> {
        let dead_pixels = discovery::discover_dead_pixels(
            &mut transport,
            config.discovery_attempts,
            config.bulk_timeout,
        )?;

        if config.discovery_attempts == 0 {
            seek_pro::initialize(&mut transport)?;
        }

        Ok(Self {
            transport,
            config,
            corrector: Corrector::new(dead_pixels),
        })
    }

    /// Re-run the init handshake.
    pub fn initialize(&mut self) -> Result<()> {
        Ok(seek_pro::initialize(&mut self.transport)?)
    }

    /// Read one raw frame together with its status byte.
    pub fn grab(&mut self) -> Result<(u8, Option<RawFrame>)> {
        Ok(seek_pro::grab(&mut self.transport, self.config.bulk_timeout)?)
    }

    /// Block until the next corrected image is available.
    ///
    /// Frames are grabbed until a normal frame arrives after at least one
    /// calibration frame. There is no overall deadline.
    pub fn get_image(&mut self) -> Result<Image<i32>> {
        loop {
            let (status, frame) = self.grab()?;
            if let Some(image) = self.corrector.process(status, frame.as_ref()) {
                return Ok(image);
            }
        }
    }

    /// Return the sensor to idle. The session stays usable after
    /// [`SeekPro::initialize`].
    pub fn deinit(&mut self) -> Result<()> {
        Ok(seek_pro::deinit(&mut self.transport)?)
    }

    pub fn read_chip_id(&mut self) -> Result<Vec<u8>> {
        Ok(seek_pro::read_chip_id(&mut self.transport)?)
    }

    pub fn firmware_info(&mut self) -> Result<Vec<u8>> {
        Ok(seek_pro::firmware_info(&mut self.transport)?)
    }

    pub fn operation_mode(&mut self) -> Result<Vec<u8>> {
        Ok(seek_pro::operation_mode(&mut self.transport)?)
    }

    /// Dead pixels found at startup. Empty if discovery gave up.
    pub fn dead_pixels(&self) -> &[DeadPixel] {
        self.corrector.dead_pixels()
    }

    pub fn is_calibrated(&self) -> bool {
        self.corrector.is_calibrated()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }
}
