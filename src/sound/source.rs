//! Background track file resolution.
//!
//! Each [`BackgroundSound`] selection maps to one file under the sound
//! directory: `$WAVE_SOUND_DIR` when set, `~/.wave/sounds` otherwise.

use std::path::PathBuf;

use crate::types::BackgroundSound;

use super::error::SoundError;

/// Environment variable overriding the sound directory.
pub const SOUND_DIR_ENV: &str = "WAVE_SOUND_DIR";

/// Returns the directory searched for track files.
#[must_use]
pub fn sound_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(SOUND_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".wave")
        .join("sounds")
}

/// Returns the file name for a track selection, `None` for no track.
#[must_use]
pub fn track_file_name(sound: BackgroundSound) -> Option<&'static str> {
    match sound {
        BackgroundSound::Waves => Some("waves.mp3"),
        BackgroundSound::Rain => Some("rain.mp3"),
        BackgroundSound::Forest => Some("forest.mp3"),
        BackgroundSound::None => None,
    }
}

/// Resolves a track selection to an existing file path.
///
/// # Errors
///
/// Returns `SoundError::FileNotFound` when the selection has no file on
/// disk, or when called for `BackgroundSound::None`.
pub fn resolve_track(sound: BackgroundSound) -> Result<PathBuf, SoundError> {
    let file_name = track_file_name(sound)
        .ok_or_else(|| SoundError::FileNotFound("no track selected".to_string()))?;
    let path = sound_dir().join(file_name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(SoundError::FileNotFound(path.display().to_string()))
    }
}
