//! Calibration tracking and dead pixel repair.

use crate::capture::seek_pro::FrameStatus;
use crate::frame::{Image, RawFrame};

/// Offset removed from a calibration frame to form the reference.
pub const CALIBRATION_OFFSET: i32 = 1600;

/// Samples of the dead pixel map below this value are dead.
pub const DEAD_PIXEL_THRESHOLD: u16 = 100;

/// A `(row, col)` position in a cropped image.
pub type DeadPixel = (usize, usize);

/// Reference subtracted from every normal frame.
pub fn calibration_reference(cropped: &Image<u16>) -> Image<i32> {
    cropped.map(|v| v as i32 - CALIBRATION_OFFSET)
}

/// `cropped - reference`, or `None` if the sizes differ.
pub fn subtract_calibration(cropped: &Image<u16>, reference: &Image<i32>) -> Option<Image<i32>> {
    cropped.zip_map(reference, |v, r| v as i32 - r)
}

/// Positions of every dead pixel in a cropped dead pixel map, row major.
pub fn dead_pixels_from_map(cropped: &Image<u16>) -> Vec<DeadPixel> {
    let mut dead_pixels = Vec::new();
    for row in 0..cropped.height() {
        for (col, &value) in cropped.row(row).iter().enumerate() {
            if value < DEAD_PIXEL_THRESHOLD {
                dead_pixels.push((row, col));
            }
        }
    }
    dead_pixels
}

/// Replace each listed pixel with the median of its 3x3 neighbourhood.
///
/// The neighbourhood includes the pixel itself and is clipped at the
/// image border. Pixels are repaired in list order, in place.
pub fn correct_dead_pixels(image: &mut Image<i32>, dead_pixels: &[DeadPixel]) {
    let mut neighbourhood = Vec::with_capacity(9);

    for &(row, col) in dead_pixels {
        if row >= image.height() || col >= image.width() {
            continue;
        }

        neighbourhood.clear();
        for r in row.saturating_sub(1)..(row + 2).min(image.height()) {
            for c in col.saturating_sub(1)..(col + 2).min(image.width()) {
                neighbourhood.push(image.get(r, c));
            }
        }

        let value = median(&mut neighbourhood);
        image.set(row, col, value);
    }
}

// Even counts take the mean of the two middle values, truncated toward zero.
fn median(values: &mut [i32]) -> i32 {
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalibrationState {
    AwaitingCalibration,
    Calibrated(Image<i32>),
}

/// Turns classified frames into corrected images.
#[derive(Debug, Clone)]
pub struct Corrector {
    state: CalibrationState,
    dead_pixels: Vec<DeadPixel>,
}

impl Corrector {
    pub fn new(dead_pixels: Vec<DeadPixel>) -> Self {
        Self {
            state: CalibrationState::AwaitingCalibration,
            dead_pixels,
        }
    }

    pub fn state(&self) -> &CalibrationState {
        &self.state
    }

    pub fn is_calibrated(&self) -> bool {
        matches!(self.state, CalibrationState::Calibrated(_))
    }

    pub fn dead_pixels(&self) -> &[DeadPixel] {
        &self.dead_pixels
    }

    /// Feed one grabbed frame through the state machine.
    ///
    /// Calibration frames replace the reference. Normal frames produce a
    /// corrected image once a reference exists. Everything else, and any
    /// missing frame, is dropped.
    pub fn process(&mut self, status: u8, frame: Option<&RawFrame>) -> Option<Image<i32>> {
        let frame = match frame {
            Some(frame) => frame,
            None => {
                log::debug!("dropping incomplete frame (status {})", status);
                return None;
            }
        };

        match FrameStatus::from(status) {
            FrameStatus::Calibration => {
                log::debug!("updating calibration reference");
                self.state = CalibrationState::Calibrated(calibration_reference(&frame.crop()));
                None
            }
            FrameStatus::Normal => match &self.state {
                CalibrationState::AwaitingCalibration => {
                    log::debug!("dropping frame received before calibration");
                    None
                }
                CalibrationState::Calibrated(reference) => {
                    let mut image = subtract_calibration(&frame.crop(), reference)?;
                    correct_dead_pixels(&mut image, &self.dead_pixels);
                    Some(image)
                }
            },
            other => {
                log::debug!("dropping frame with status {:?}", other);
                None
            }
        }
    }
}
