//! Wave library
//!
//! Core functionality for the Wave Pomodoro timer:
//! - Timer engine and tick loop for the daemon
//! - IPC server/client for daemon-CLI communication
//! - Preference store for mute and background sound selection
//! - Looping background sound playback
//! - Task server (REST API) and its HTTP client
//! - CLI command parsing and display utilities

pub mod cli;
pub mod daemon;
pub mod prefs;
pub mod server;
pub mod sound;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    format_time, BackgroundSound, IpcRequest, IpcResponse, ResponseData, TimerMode, TimerState,
};

pub use prefs::{FilePreferenceStore, MockPreferenceStore, PreferenceStore, Preferences};

pub use sound::{
    create_background_audio, AudioSnapshot, BackgroundAudio, MockBackgroundAudio, SilentAudio,
    SoundError,
};

pub use daemon::{RequestHandler, TimerEngine, TimerEvent};
