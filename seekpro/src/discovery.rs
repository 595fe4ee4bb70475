//! Locating the sensor's dead pixel map at startup.

use std::time::Duration;

use crate::capture::seek_pro::{self, FrameStatus};
use crate::capture::Transport;
use crate::correct::{dead_pixels_from_map, DeadPixel};
use crate::error::TransportError;

/// Re-initialize and grab until a dead pixel map frame shows up.
///
/// The first frames after power-up sometimes carry the wrong status, so
/// up to `max_attempts` rounds are made. A frame read that times out
/// counts as a miss; a failed init write does not and is returned.
/// If no map arrives the result is empty and correction is disabled;
/// this is not an error.
pub fn discover_dead_pixels<T: Transport>(
    transport: &mut T,
    max_attempts: usize,
    timeout: Duration,
) -> Result<Vec<DeadPixel>, TransportError> {
    for attempt in 1..=max_attempts {
        seek_pro::initialize(transport)?;
        seek_pro::request_frame(transport)?;

        match seek_pro::read_frame(transport, timeout) {
            Ok((status, Some(frame))) if FrameStatus::from(status) == FrameStatus::DeadPixelMap => {
                let dead_pixels = dead_pixels_from_map(&frame.crop());
                log::info!(
                    "found {} dead pixels on attempt {}",
                    dead_pixels.len(),
                    attempt
                );
                return Ok(dead_pixels);
            }
            Ok((status, frame)) => {
                log::debug!(
                    "attempt {}: status {} (frame {})",
                    attempt,
                    status,
                    if frame.is_some() { "complete" } else { "incomplete" }
                );
            }
            Err(err) if err.is_timeout() => {
                log::debug!("attempt {}: {}", attempt, err);
            }
            Err(err) => return Err(err),
        }
    }

    log::warn!(
        "could not get the dead pixel frame after {} attempts, dead pixel correction disabled",
        max_attempts
    );
    Ok(Vec::new())
}
