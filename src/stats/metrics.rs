//! Session-level statistics

use std::time::Duration;

/// What one streaming session delivered before it closed
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Number of frames written to the client
    pub frames_sent: u64,
    /// Total frame payload bytes written (multipart framing excluded)
    pub bytes_sent: u64,
    /// How long the session ran
    pub duration: Duration,
}

impl SessionStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivered frame rate over the whole session
    pub fn frame_rate(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.frames_sent as f64 / secs
        } else {
            0.0
        }
    }

    /// Delivered payload bitrate in bits per second
    pub fn bitrate(&self) -> u64 {
        let secs = self.duration.as_secs();
        if secs > 0 {
            (self.bytes_sent * 8) / secs
        } else {
            0
        }
    }
}
