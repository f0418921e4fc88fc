//! Sound system error types.

use thiserror::Error;

/// Errors that can occur in the background audio system.
#[derive(Debug, Error)]
pub enum SoundError {
    /// Audio device is not available (e.g., headless host).
    #[error("audio device not available: {0}")]
    DeviceNotAvailable(String),

    /// Track file was not found at the resolved path.
    #[error("sound file not found: {0}")]
    FileNotFound(String),

    /// Failed to decode the track file.
    #[error("failed to decode sound file: {0}")]
    DecodeError(String),

    /// Failed to create the audio output sink.
    #[error("failed to create audio sink: {0}")]
    StreamError(String),
}

impl SoundError {
    /// Returns true if this error is related to device availability.
    #[must_use]
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceNotAvailable(_) | Self::StreamError(_))
    }

    /// Returns true if this error is related to the track file.
    #[must_use]
    pub fn is_file_error(&self) -> bool {
        matches!(self, Self::FileNotFound(_) | Self::DecodeError(_))
    }
}
