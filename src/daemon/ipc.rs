//! IPC server for the Wave daemon.
//!
//! This module provides Unix Domain Socket IPC functionality:
//! - Server that listens on a Unix socket
//! - Request/response handling for timer and preference commands
//! - Audio re-sync after every handled command

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;
use tokio::time::{timeout, Duration};
use tracing::warn;

use crate::prefs::Preferences;
use crate::sound::{AudioSnapshot, BackgroundAudio};
use crate::types::{IpcRequest, IpcResponse, ResponseData};

use super::timer::TimerEngine;

// ============================================================================
// Constants
// ============================================================================

/// Environment variable overriding the socket path.
pub const SOCKET_PATH_ENV: &str = "WAVE_SOCKET";

/// Maximum request size in bytes (4KB)
const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

/// Returns the socket path: `$WAVE_SOCKET` when set, `~/.wave/wave.sock`
/// otherwise.
#[must_use]
pub fn default_socket_path() -> PathBuf {
    if let Ok(path) = std::env::var(SOCKET_PATH_ENV) {
        return PathBuf::from(path);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".wave")
        .join("wave.sock")
}

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Socket binding error
    #[error("failed to bind socket: {0}")]
    BindError(String),

    /// Connection error
    #[error("connection error: {0}")]
    ConnectionError(String),

    /// Read error
    #[error("failed to read request: {0}")]
    ReadError(String),

    /// Write error
    #[error("failed to write response: {0}")]
    WriteError(String),

    /// Timeout error
    #[error("operation timed out")]
    Timeout,

    /// Request too large
    #[error("request too large (max {MAX_REQUEST_SIZE} bytes)")]
    RequestTooLarge,
}

// ============================================================================
// IpcServer
// ============================================================================

/// Unix Domain Socket IPC server.
pub struct IpcServer {
    /// Unix socket listener
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a new IPC server bound to the specified socket path.
    ///
    /// If the socket file already exists, it will be removed before binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound.
    pub fn new(socket_path: &Path) -> Result<Self> {
        // Remove existing socket file if present
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .with_context(|| format!("failed to remove existing socket: {:?}", socket_path))?;
        }

        // Ensure parent directory exists
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create socket directory: {:?}", parent))?;
        }

        let listener = UnixListener::bind(socket_path)
            .map_err(|e| IpcError::BindError(format!("{:?}: {e}", socket_path)))?;

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts an incoming client connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be accepted.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .map_err(|e| IpcError::ConnectionError(e.to_string()))?;
        Ok(stream)
    }

    /// Receives and deserializes an IPC request from the stream.
    ///
    /// Applies a read timeout to prevent blocking indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or deserialization fails, or if the
    /// request fills the whole read buffer.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest> {
        let mut buffer = vec![0u8; MAX_REQUEST_SIZE];

        let read_result = timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            stream.read(&mut buffer),
        )
        .await;

        let n = match read_result {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string()).into()),
            Err(_) => return Err(IpcError::Timeout.into()),
        };

        if n == 0 {
            anyhow::bail!("connection closed by client");
        }
        if n == MAX_REQUEST_SIZE {
            return Err(IpcError::RequestTooLarge.into());
        }

        let request: IpcRequest = serde_json::from_slice(&buffer[..n])
            .with_context(|| "failed to deserialize IPC request")?;

        Ok(request)
    }

    /// Serializes and sends an IPC response to the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn send_response(stream: &mut UnixStream, response: &IpcResponse) -> Result<()> {
        let json = serde_json::to_vec(response).context("failed to serialize IPC response")?;

        stream
            .write_all(&json)
            .await
            .map_err(|e| IpcError::WriteError(e.to_string()))?;
        stream
            .flush()
            .await
            .map_err(|e| IpcError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        // Clean up socket file on drop
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Handles IPC requests by dispatching to the timer engine and the
/// preference store.
///
/// Every command answers with a success response carrying the state after
/// the command was applied. A command that does not apply in the current
/// state (pausing an idle timer, switching mode mid-session) simply
/// reports the unchanged state; the protocol has no failure case for
/// valid requests.
pub struct RequestHandler {
    /// Shared reference to the timer engine
    engine: Arc<Mutex<TimerEngine>>,
    /// Shared reference to the persisted preferences
    prefs: Arc<Mutex<Preferences>>,
    /// Background audio collaborator
    audio: Arc<dyn BackgroundAudio>,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(
        engine: Arc<Mutex<TimerEngine>>,
        prefs: Arc<Mutex<Preferences>>,
        audio: Arc<dyn BackgroundAudio>,
    ) -> Self {
        Self {
            engine,
            prefs,
            audio,
        }
    }

    /// Handles an IPC request and returns the appropriate response.
    pub async fn handle(&self, request: IpcRequest) -> IpcResponse {
        let result = self.apply(&request).await;

        match result {
            Ok(message) => {
                self.sync_audio().await;
                IpcResponse::success(message, Some(self.snapshot().await))
            }
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }

    /// Applies the command and returns the response message.
    async fn apply(&self, request: &IpcRequest) -> Result<&'static str> {
        match request {
            IpcRequest::Start => {
                self.engine.lock().await.start()?;
                Ok("Timer started")
            }
            IpcRequest::Pause => {
                self.engine.lock().await.pause()?;
                Ok("Timer paused")
            }
            IpcRequest::Reset => {
                self.engine.lock().await.reset()?;
                Ok("Timer reset")
            }
            IpcRequest::Status => Ok(""),
            IpcRequest::SetMode { mode } => {
                self.engine.lock().await.set_mode(*mode)?;
                Ok("Mode updated")
            }
            IpcRequest::SetTask { name } => {
                self.engine.lock().await.set_task(name.clone())?;
                Ok("Task updated")
            }
            IpcRequest::SetMuted { muted } => {
                self.prefs.lock().await.set_muted(*muted);
                Ok("Mute updated")
            }
            IpcRequest::SetSound { sound } => {
                self.prefs.lock().await.set_background_sound(*sound);
                Ok("Background sound updated")
            }
        }
    }

    /// Reconciles background audio with the current state.
    ///
    /// Audio failures are logged and swallowed; they never surface to the
    /// client and never disturb the timer.
    pub async fn sync_audio(&self) {
        let snapshot = {
            let engine = self.engine.lock().await;
            let prefs = self.prefs.lock().await;
            let state = engine.state();
            AudioSnapshot {
                is_running: state.is_running,
                is_paused: state.is_paused,
                is_muted: prefs.is_muted(),
                sound: prefs.background_sound(),
            }
        };

        if let Err(e) = self.audio.apply(&snapshot) {
            warn!("background audio sync failed: {}", e);
        }
    }

    /// Builds a state snapshot for the response.
    async fn snapshot(&self) -> ResponseData {
        let engine = self.engine.lock().await;
        let prefs = self.prefs.lock().await;
        ResponseData::snapshot(engine.state(), prefs.is_muted(), prefs.background_sound())
    }
}

// ============================================================================
// Tests
// ============================================================================
