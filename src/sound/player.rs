//! Background audio playback using rodio.
//!
//! The player keeps a single looping sink for the selected track and
//! reconciles it against the observed timer state: play while the timer is
//! running, pause otherwise, silence via sink volume while muted.
//!
//! rodio's output stream is not `Send`, so all rodio objects live on a
//! dedicated audio thread. The handle that the daemon shares across tasks
//! only carries a channel to that thread.

use std::fs::File;
use std::io::BufReader;
use std::sync::mpsc;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tracing::{debug, warn};

use crate::types::BackgroundSound;

use super::error::SoundError;
use super::source::resolve_track;
use super::{AudioSnapshot, BackgroundAudio};

type ApplyReply = mpsc::Sender<Result<(), SoundError>>;

/// Looping background player backed by rodio.
///
/// Dropping the player shuts the audio thread down.
pub struct RodioBackgroundPlayer {
    tx: mpsc::Sender<(AudioSnapshot, ApplyReply)>,
}

impl RodioBackgroundPlayer {
    /// Creates a new background player.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if no audio output device
    /// is available.
    pub fn new() -> Result<Self, SoundError> {
        let (tx, rx) = mpsc::channel::<(AudioSnapshot, ApplyReply)>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), SoundError>>();

        std::thread::Builder::new()
            .name("wave-audio".to_string())
            .spawn(move || audio_thread(rx, &ready_tx))
            .map_err(|e| SoundError::StreamError(e.to_string()))?;

        // Wait for the thread to open the output device.
        match ready_rx.recv() {
            Ok(Ok(())) => {
                debug!("audio output stream initialized");
                Ok(Self { tx })
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(SoundError::StreamError(
                "audio thread exited during startup".to_string(),
            )),
        }
    }
}

impl BackgroundAudio for RodioBackgroundPlayer {
    fn apply(&self, snapshot: &AudioSnapshot) -> Result<(), SoundError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send((*snapshot, reply_tx))
            .map_err(|_| SoundError::StreamError("audio thread is gone".to_string()))?;
        reply_rx
            .recv()
            .map_err(|_| SoundError::StreamError("audio thread is gone".to_string()))?
    }
}

impl std::fmt::Debug for RodioBackgroundPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioBackgroundPlayer").finish_non_exhaustive()
    }
}

/// Owns the rodio objects; exits when the last sender is dropped.
fn audio_thread(rx: mpsc::Receiver<(AudioSnapshot, ApplyReply)>, ready_tx: &ApplyReply) {
    let (stream, stream_handle) = match OutputStream::try_default() {
        Ok(pair) => pair,
        Err(e) => {
            let _ = ready_tx.send(Err(SoundError::DeviceNotAvailable(e.to_string())));
            return;
        }
    };
    // Keep the stream alive for the lifetime of the thread.
    let _stream = stream;
    let _ = ready_tx.send(Ok(()));

    let mut sink: Option<Sink> = None;
    let mut loaded: Option<BackgroundSound> = None;

    while let Ok((snapshot, reply)) = rx.recv() {
        let result = reconcile(&stream_handle, &mut sink, &mut loaded, &snapshot);
        let _ = reply.send(result);
    }
}

/// Brings the sink in line with the observed state.
fn reconcile(
    stream_handle: &OutputStreamHandle,
    sink: &mut Option<Sink>,
    loaded: &mut Option<BackgroundSound>,
    snapshot: &AudioSnapshot,
) -> Result<(), SoundError> {
    // Selection changed: throw away the old sink so the new track starts
    // from the beginning.
    if *loaded != Some(snapshot.sound) {
        *sink = None;
        *loaded = None;
    }

    if !snapshot.should_play() {
        if let Some(sink) = sink {
            sink.pause();
        }
        return Ok(());
    }

    if sink.is_none() {
        *sink = Some(load_track(stream_handle, snapshot.sound)?);
        *loaded = Some(snapshot.sound);
    }

    if let Some(sink) = sink {
        sink.set_volume(if snapshot.is_muted { 0.0 } else { 1.0 });
        sink.play();
    }
    Ok(())
}

/// Loads a track into a fresh paused sink that loops forever.
fn load_track(
    stream_handle: &OutputStreamHandle,
    sound: BackgroundSound,
) -> Result<Sink, SoundError> {
    let path = resolve_track(sound)?;
    let file = File::open(&path)
        .map_err(|e| SoundError::FileNotFound(format!("{}: {}", path.display(), e)))?;
    let decoder = Decoder::new(BufReader::new(file))
        .map_err(|e| SoundError::DecodeError(e.to_string()))?;

    let sink = Sink::try_new(stream_handle)
        .map_err(|e| SoundError::StreamError(e.to_string()))?;
    sink.pause();
    sink.append(decoder.repeat_infinite());

    debug!(track = sound.as_str(), "background track loaded");
    Ok(sink)
}

/// Creates the background audio collaborator, degrading to a no-op when the
/// audio device is unavailable.
#[must_use]
pub fn create_background_audio() -> Box<dyn BackgroundAudio> {
    match RodioBackgroundPlayer::new() {
        Ok(player) => Box::new(player),
        Err(e) => {
            warn!("audio not available, background sound disabled: {}", e);
            Box::new(super::SilentAudio)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These tests tolerate environments without audio hardware (CI
    // containers); the player constructor failing there is expected.

    #[test]
    fn test_create_background_audio_never_panics() {
        let audio = create_background_audio();

        // A stopped snapshot is always applicable, even on the no-op path.
        let snapshot = AudioSnapshot {
            is_running: false,
            is_paused: false,
            is_muted: false,
            sound: BackgroundSound::Waves,
        };
        audio.apply(&snapshot).unwrap();
    }

    #[test]
    fn test_apply_while_idle_needs_no_track_file() {
        let player = match RodioBackgroundPlayer::new() {
            Ok(p) => p,
            Err(_) => return, // no audio device
        };

        let snapshot = AudioSnapshot {
            is_running: false,
            is_paused: true,
            is_muted: false,
            sound: BackgroundSound::Forest,
        };
        // Nothing should play, so the missing track file is never touched.
        player.apply(&snapshot).unwrap();
    }

    #[test]
    fn test_debug_impl() {
        let player = match RodioBackgroundPlayer::new() {
            Ok(p) => p,
            Err(_) => return,
        };

        let debug_str = format!("{:?}", player);
        assert!(debug_str.contains("RodioBackgroundPlayer"));
    }
}
