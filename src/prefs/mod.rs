//! Persisted user preferences.
//!
//! Two independent settings survive daemon restarts:
//! - whether background audio is muted (`pomodoro_is_muted`)
//! - which background track is selected (`background_music_selection`)
//!
//! Each key lives in its own file, so a write failure on one never affects
//! the other. Reads happen once at startup; setters update the in-memory
//! value first and persist best-effort, logging failures instead of
//! propagating them. The timer never waits on the disk.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::warn;

use crate::types::BackgroundSound;

/// Storage key for the mute flag.
pub const KEY_IS_MUTED: &str = "pomodoro_is_muted";

/// Storage key for the background track selection.
pub const KEY_BACKGROUND_SOUND: &str = "background_music_selection";

// ============================================================================
// PreferenceStore
// ============================================================================

/// Key-value persistence behind the preference layer.
///
/// Implementations must keep keys independent: failure to write one key
/// must not disturb another.
pub trait PreferenceStore: Send + Sync {
    /// Reads a stored value, `None` when the key has never been written.
    fn get(&self, key: &str) -> Option<String>;

    /// Persists a value for a key.
    fn set(&self, key: &str, value: &str) -> std::io::Result<()>;
}

// ============================================================================
// FilePreferenceStore
// ============================================================================

/// File-per-key store under a base directory.
pub struct FilePreferenceStore {
    base_dir: PathBuf,
}

impl FilePreferenceStore {
    /// Creates a store rooted at the given directory.
    #[must_use]
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Creates a store under the default location, `~/.wave/prefs`.
    pub fn default_location() -> std::io::Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "home directory not found")
        })?;
        Ok(Self::new(home.join(".wave").join("prefs")))
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(key)
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        match std::fs::read_to_string(self.key_path(key)) {
            Ok(value) => Some(value.trim().to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(key, error = %e, "failed to read preference");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::write(self.key_path(key), value)
    }
}

// ============================================================================
// MockPreferenceStore
// ============================================================================

/// In-memory store with write-failure injection, for tests.
pub struct MockPreferenceStore {
    values: Mutex<HashMap<String, String>>,
    fail_writes: Mutex<bool>,
}

impl MockPreferenceStore {
    /// Creates an empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
            fail_writes: Mutex::new(false),
        }
    }

    /// Pre-seeds a stored value.
    pub fn seed(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    /// Makes every subsequent `set` call fail.
    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }
}

impl Default for MockPreferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceStore for MockPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> std::io::Result<()> {
        if *self.fail_writes.lock().unwrap() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "injected write failure",
            ));
        }
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ============================================================================
// Preferences
// ============================================================================

/// In-memory preference values backed by a [`PreferenceStore`].
///
/// Setters are optimistic: the in-memory value changes immediately and is
/// never rolled back, even when persistence fails. Failures are logged at
/// warn level.
pub struct Preferences {
    store: Box<dyn PreferenceStore>,
    is_muted: bool,
    background_sound: BackgroundSound,
}

impl Preferences {
    /// Loads both preferences from the store, falling back to defaults
    /// (`false`, `Waves`) for missing or unparseable values.
    pub fn load(store: Box<dyn PreferenceStore>) -> Self {
        let is_muted = match store.get(KEY_IS_MUTED).as_deref() {
            Some("true") => true,
            Some("false") | None => false,
            Some(other) => {
                warn!(value = other, "unrecognized mute preference, using default");
                false
            }
        };

        let background_sound = match store.get(KEY_BACKGROUND_SOUND) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "unrecognized sound preference, using default");
                BackgroundSound::default()
            }),
            None => BackgroundSound::default(),
        };

        Self {
            store,
            is_muted,
            background_sound,
        }
    }

    /// Returns the current mute flag.
    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.is_muted
    }

    /// Returns the current background track selection.
    #[must_use]
    pub fn background_sound(&self) -> BackgroundSound {
        self.background_sound
    }

    /// Updates the mute flag and persists it best-effort.
    pub fn set_muted(&mut self, muted: bool) {
        self.is_muted = muted;
        let value = if muted { "true" } else { "false" };
        if let Err(e) = self.store.set(KEY_IS_MUTED, value) {
            warn!(error = %e, "failed to persist mute preference");
        }
    }

    /// Updates the track selection and persists it best-effort.
    pub fn set_background_sound(&mut self, sound: BackgroundSound) {
        self.background_sound = sound;
        if let Err(e) = self.store.set(KEY_BACKGROUND_SOUND, sound.as_str()) {
            warn!(error = %e, "failed to persist sound preference");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
