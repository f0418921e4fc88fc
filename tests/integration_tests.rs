//! Integration tests for the daemon stack.
//!
//! These assemble the real IPC server, timer engine and preference layer
//! over a real Unix socket, with the audio collaborator mocked out.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::sync::{mpsc, Mutex};

use wave::daemon::{run_tick_loop, IpcServer, RequestHandler, TimerEngine, TimerEvent};
use wave::prefs::{
    MockPreferenceStore, PreferenceStore, Preferences, KEY_BACKGROUND_SOUND, KEY_IS_MUTED,
};
use wave::sound::MockBackgroundAudio;
use wave::types::{IpcResponse, TimerMode};

// ============================================================================
// Test Harness
// ============================================================================

struct TestDaemon {
    socket_path: PathBuf,
    engine: Arc<Mutex<TimerEngine>>,
    store: Arc<MockPreferenceStore>,
    audio: Arc<MockBackgroundAudio>,
    server_task: tokio::task::JoinHandle<()>,
    _event_rx: mpsc::UnboundedReceiver<TimerEvent>,
    _dir: tempfile::TempDir,
}

impl TestDaemon {
    /// Boots the full daemon stack on a temp socket.
    async fn spawn() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let socket_path = dir.path().join("wave.sock");

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let engine = Arc::new(Mutex::new(TimerEngine::new(event_tx)));

        let store = Arc::new(MockPreferenceStore::new());
        let prefs = Arc::new(Mutex::new(Preferences::load(Box::new(
            SharedStore(store.clone()),
        ))));

        let audio = Arc::new(MockBackgroundAudio::new());
        let handler = Arc::new(RequestHandler::new(
            engine.clone(),
            prefs,
            audio.clone(),
        ));

        let server = IpcServer::new(&socket_path).expect("bind server");
        let server_task = tokio::spawn(async move {
            loop {
                let Ok(mut stream) = server.accept().await else {
                    break;
                };
                let handler = handler.clone();
                tokio::spawn(async move {
                    if let Ok(request) = IpcServer::receive_request(&mut stream).await {
                        let response = handler.handle(request).await;
                        let _ = IpcServer::send_response(&mut stream, &response).await;
                    }
                });
            }
        });

        Self {
            socket_path,
            engine,
            store,
            audio,
            server_task,
            _event_rx: event_rx,
            _dir: dir,
        }
    }

    /// Sends a raw JSON request and returns the parsed response.
    async fn send(&self, request_json: &str) -> IpcResponse {
        let mut stream = UnixStream::connect(&self.socket_path)
            .await
            .expect("connect");
        stream
            .write_all(request_json.as_bytes())
            .await
            .expect("write");
        stream.shutdown().await.expect("shutdown");

        let mut buffer = vec![0u8; 65536];
        let n = stream.read(&mut buffer).await.expect("read");
        serde_json::from_slice(&buffer[..n]).expect("parse response")
    }
}

impl Drop for TestDaemon {
    fn drop(&mut self) {
        self.server_task.abort();
    }
}

/// Adapter so the harness can keep a handle on the mock store after the
/// preference layer takes ownership of its own.
struct SharedStore(Arc<MockPreferenceStore>);

impl PreferenceStore for SharedStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key)
    }

    fn set(&self, key: &str, value: &str) -> std::io::Result<()> {
        self.0.set(key, value)
    }
}

// ============================================================================
// Socket Flow Tests
// ============================================================================

#[tokio::test]
async fn test_status_reports_initial_state() {
    let daemon = TestDaemon::spawn().await;

    let response = daemon.send(r#"{"command":"status"}"#).await;

    assert_eq!(response.status, "success");
    let data = response.data.expect("data");
    assert_eq!(data.mode, TimerMode::Focus);
    assert_eq!(data.time_remaining, 1500);
    assert_eq!(data.clock, "25:00");
    assert!(!data.is_running);
    assert!(!data.is_paused);
    assert_eq!(data.current_task, "");
    assert!(!data.is_muted);
    assert_eq!(data.background_sound.as_str(), "waves");
}

#[tokio::test]
async fn test_start_pause_reset_sequence() {
    let daemon = TestDaemon::spawn().await;

    let response = daemon.send(r#"{"command":"start"}"#).await;
    let data = response.data.expect("data");
    assert!(data.is_running);
    assert!(!data.is_paused);

    let response = daemon.send(r#"{"command":"pause"}"#).await;
    let data = response.data.expect("data");
    assert!(!data.is_running);
    assert!(data.is_paused);

    let response = daemon.send(r#"{"command":"reset"}"#).await;
    let data = response.data.expect("data");
    assert!(!data.is_running);
    assert!(!data.is_paused);
    assert_eq!(data.time_remaining, 1500);
}

#[tokio::test]
async fn test_mode_switch_ignored_while_running() {
    let daemon = TestDaemon::spawn().await;

    daemon.send(r#"{"command":"start"}"#).await;
    let response = daemon
        .send(r#"{"command":"setMode","mode":"longBreak"}"#)
        .await;

    // Still a success; the state is simply unchanged.
    assert_eq!(response.status, "success");
    let data = response.data.expect("data");
    assert_eq!(data.mode, TimerMode::Focus);
    assert!(data.is_running);
}

#[tokio::test]
async fn test_mode_switch_applies_when_idle() {
    let daemon = TestDaemon::spawn().await;

    let response = daemon
        .send(r#"{"command":"setMode","mode":"shortBreak"}"#)
        .await;

    let data = response.data.expect("data");
    assert_eq!(data.mode, TimerMode::ShortBreak);
    assert_eq!(data.time_remaining, 300);
    assert_eq!(data.clock, "05:00");
}

#[tokio::test]
async fn test_set_task_round_trips() {
    let daemon = TestDaemon::spawn().await;

    let response = daemon
        .send(r#"{"command":"setTask","name":"Write the report"}"#)
        .await;
    assert_eq!(response.data.expect("data").current_task, "Write the report");

    // Clearing works too.
    let response = daemon.send(r#"{"command":"setTask","name":""}"#).await;
    assert_eq!(response.data.expect("data").current_task, "");
}

#[tokio::test]
async fn test_invalid_json_answers_error() {
    let daemon = TestDaemon::spawn().await;

    let mut stream = UnixStream::connect(&daemon.socket_path).await.unwrap();
    stream.write_all(b"this is not json").await.unwrap();
    stream.shutdown().await.unwrap();

    // The connection task drops the stream without a response body we can
    // rely on; at minimum the daemon must survive and answer the next
    // well-formed request.
    let mut buffer = vec![0u8; 1024];
    let _ = stream.read(&mut buffer).await;

    let response = daemon.send(r#"{"command":"status"}"#).await;
    assert_eq!(response.status, "success");
}

// ============================================================================
// Preference Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_mute_persists_to_store() {
    let daemon = TestDaemon::spawn().await;

    let response = daemon.send(r#"{"command":"setMuted","muted":true}"#).await;
    assert!(response.data.expect("data").is_muted);

    assert_eq!(daemon.store.get(KEY_IS_MUTED).as_deref(), Some("true"));
}

#[tokio::test]
async fn test_sound_selection_persists_to_store() {
    let daemon = TestDaemon::spawn().await;

    let response = daemon
        .send(r#"{"command":"setSound","sound":"forest"}"#)
        .await;
    assert_eq!(
        response.data.expect("data").background_sound.as_str(),
        "forest"
    );

    assert_eq!(
        daemon.store.get(KEY_BACKGROUND_SOUND).as_deref(),
        Some("forest")
    );
}

#[tokio::test]
async fn test_preferences_survive_timer_commands() {
    let daemon = TestDaemon::spawn().await;

    daemon.send(r#"{"command":"setMuted","muted":true}"#).await;
    daemon.send(r#"{"command":"setSound","sound":"rain"}"#).await;
    daemon.send(r#"{"command":"start"}"#).await;
    daemon.send(r#"{"command":"pause"}"#).await;

    let response = daemon.send(r#"{"command":"status"}"#).await;
    let data = response.data.expect("data");
    assert!(data.is_muted);
    assert_eq!(data.background_sound.as_str(), "rain");
}

// ============================================================================
// Audio Sync Tests
// ============================================================================

#[tokio::test]
async fn test_audio_follows_timer_commands() {
    let daemon = TestDaemon::spawn().await;

    daemon.send(r#"{"command":"start"}"#).await;
    let applied = daemon.audio.last_applied().expect("audio synced");
    assert!(applied.is_running);

    daemon.send(r#"{"command":"pause"}"#).await;
    let applied = daemon.audio.last_applied().expect("audio synced");
    assert!(!applied.is_running);
    assert!(applied.is_paused);
}

#[tokio::test]
async fn test_audio_sees_mute_and_selection() {
    let daemon = TestDaemon::spawn().await;

    daemon.send(r#"{"command":"setMuted","muted":true}"#).await;
    daemon.send(r#"{"command":"setSound","sound":"none"}"#).await;

    let applied = daemon.audio.last_applied().expect("audio synced");
    assert!(applied.is_muted);
    assert_eq!(applied.sound.as_str(), "none");
}

// ============================================================================
// Tick Loop Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_tick_loop_counts_down_through_daemon_state() {
    let daemon = TestDaemon::spawn().await;
    let tick_task = tokio::spawn(run_tick_loop(daemon.engine.clone()));

    daemon.send(r#"{"command":"start"}"#).await;
    tokio::time::sleep(Duration::from_secs(3)).await;

    let remaining = daemon.engine.lock().await.state().time_remaining;
    assert!(remaining < 1500, "timer should have ticked, got {remaining}");

    tick_task.abort();
}
