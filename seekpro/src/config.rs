use std::time::Duration;

/// Tunables for a camera session.
///
/// Protocol constants (frame geometry, status offset, read tolerance) are
/// fixed by the sensor firmware and live in `capture::seek_pro`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Timeout for every vendor control transfer.
    pub control_timeout: Duration,
    /// Timeout for each bulk read of a frame chunk.
    pub bulk_timeout: Duration,
    /// How many init + grab rounds to spend looking for the dead pixel map.
    pub discovery_attempts: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            control_timeout: Duration::from_millis(1000),
            bulk_timeout: Duration::from_millis(1000),
            discovery_attempts: 4,
        }
    }
}

impl SessionConfig {
    pub fn with_control_timeout(mut self, timeout: Duration) -> Self {
        self.control_timeout = timeout;
        self
    }

    pub fn with_bulk_timeout(mut self, timeout: Duration) -> Self {
        self.bulk_timeout = timeout;
        self
    }

    pub fn with_discovery_attempts(mut self, attempts: usize) -> Self {
        self.discovery_attempts = attempts;
        self
    }
}
