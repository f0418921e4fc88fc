//! Background audio for focus sessions.
//!
//! The daemon observes four values: whether the timer is running, whether
//! it is paused, whether audio is muted, and which track is selected. This
//! module turns that observation into playback:
//!
//! - the track loops while the timer is running and not paused
//! - playback pauses in every other state
//! - mute silences the sink without losing the playback position
//! - switching tracks restarts playback from the beginning
//!
//! When no audio device or track file is available the collaborator
//! degrades to a logged no-op; the timer itself is never affected.

mod error;
mod player;
mod source;

pub use error::SoundError;
pub use player::{create_background_audio, RodioBackgroundPlayer};
pub use source::{resolve_track, sound_dir, track_file_name, SOUND_DIR_ENV};

use crate::types::BackgroundSound;

// ============================================================================
// AudioSnapshot
// ============================================================================

/// The values the audio collaborator observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSnapshot {
    /// Whether the countdown is ticking
    pub is_running: bool,
    /// Whether the countdown is paused
    pub is_paused: bool,
    /// Mute preference
    pub is_muted: bool,
    /// Selected background track
    pub sound: BackgroundSound,
}

impl AudioSnapshot {
    /// Returns true when the background track should be audibly advancing.
    ///
    /// Mute does not factor in: a muted session still plays (at zero
    /// volume) so unmuting resumes mid-track.
    #[must_use]
    pub fn should_play(&self) -> bool {
        self.is_running && !self.is_paused && self.sound != BackgroundSound::None
    }
}

// ============================================================================
// BackgroundAudio
// ============================================================================

/// Trait for background audio implementations.
///
/// `apply` reconciles playback with an observed snapshot. It is called on
/// every state change and must be idempotent.
pub trait BackgroundAudio: Send + Sync {
    /// Brings playback in line with the snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the track cannot be loaded or played. Callers
    /// log and continue; audio failures never disturb the timer.
    fn apply(&self, snapshot: &AudioSnapshot) -> Result<(), SoundError>;
}

/// No-op collaborator used when audio hardware is unavailable.
#[derive(Debug, Default)]
pub struct SilentAudio;

impl BackgroundAudio for SilentAudio {
    fn apply(&self, _snapshot: &AudioSnapshot) -> Result<(), SoundError> {
        Ok(())
    }
}

/// Mock collaborator recording every applied snapshot, for tests.
#[derive(Debug, Default)]
pub struct MockBackgroundAudio {
    applied: std::sync::Mutex<Vec<AudioSnapshot>>,
    should_fail: std::sync::atomic::AtomicBool,
}

impl MockBackgroundAudio {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `apply` call fail.
    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail
            .store(should_fail, std::sync::atomic::Ordering::SeqCst);
    }

    /// Returns every snapshot applied so far, oldest first.
    #[must_use]
    pub fn applied(&self) -> Vec<AudioSnapshot> {
        self.applied.lock().unwrap().clone()
    }

    /// Returns the most recently applied snapshot.
    #[must_use]
    pub fn last_applied(&self) -> Option<AudioSnapshot> {
        self.applied.lock().unwrap().last().copied()
    }
}

impl BackgroundAudio for MockBackgroundAudio {
    fn apply(&self, snapshot: &AudioSnapshot) -> Result<(), SoundError> {
        if self.should_fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(SoundError::DeviceNotAvailable("mock failure".to_string()));
        }
        self.applied.lock().unwrap().push(*snapshot);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
