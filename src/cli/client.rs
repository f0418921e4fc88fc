//! IPC client for talking to the timer daemon.
//!
//! Connects to the daemon's Unix socket, sends one JSON request per
//! connection and reads one JSON response back.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tracing::{debug, warn};

use crate::daemon::default_socket_path;
use crate::types::{BackgroundSound, IpcRequest, IpcResponse, TimerMode};

// ============================================================================
// Constants
// ============================================================================

/// Timeout for connecting and writing (seconds)
const IO_TIMEOUT_SECS: u64 = 5;

/// Maximum response size (64KB)
const MAX_RESPONSE_SIZE: usize = 65536;

/// Number of connection attempts before giving up
const MAX_RETRIES: u32 = 3;

/// Base delay between retries (milliseconds)
const RETRY_DELAY_MS: u64 = 500;

// ============================================================================
// IpcClient
// ============================================================================

/// Client for the daemon's Unix socket.
pub struct IpcClient {
    socket_path: PathBuf,
}

impl IpcClient {
    /// Creates a client pointed at the default socket path.
    #[must_use]
    pub fn new() -> Self {
        Self {
            socket_path: default_socket_path(),
        }
    }

    /// Creates a client with a custom socket path (used in tests).
    #[must_use]
    pub fn with_socket_path(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    /// Starts or resumes the countdown.
    pub async fn start(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Start).await
    }

    /// Pauses the countdown.
    pub async fn pause(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Pause).await
    }

    /// Resets the countdown to the full duration.
    pub async fn reset(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Reset).await
    }

    /// Fetches the current timer state.
    pub async fn status(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Status).await
    }

    /// Switches the countdown mode.
    pub async fn set_mode(&self, mode: TimerMode) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::SetMode { mode })
            .await
    }

    /// Sets the current task label.
    pub async fn set_task(&self, name: String) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::SetTask { name })
            .await
    }

    /// Mutes or unmutes background sound.
    pub async fn set_muted(&self, muted: bool) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::SetMuted { muted })
            .await
    }

    /// Selects the background track.
    pub async fn set_sound(&self, sound: BackgroundSound) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::SetSound { sound })
            .await
    }

    /// Sends a request, retrying on connection failure.
    ///
    /// An error the daemon itself reports is final and is not retried.
    async fn send_request_with_retry(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut last_error = None;

        for attempt in 1..=MAX_RETRIES {
            match self.send_request(request).await {
                Ok(response) => {
                    if response.status == "error" {
                        bail!("daemon error: {}", response.message);
                    }
                    return Ok(response);
                }
                Err(e) => {
                    debug!("Attempt {}/{} failed: {}", attempt, MAX_RETRIES, e);
                    last_error = Some(e);

                    if attempt < MAX_RETRIES {
                        let delay = Duration::from_millis(RETRY_DELAY_MS * u64::from(attempt));
                        warn!("Retrying in {:?}...", delay);
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        bail!(
            "cannot reach the timer daemon at {:?} after {} attempts: {}. \
             Is it running? Start it with 'wave daemon'.",
            self.socket_path,
            MAX_RETRIES,
            last_error.map_or_else(|| "unknown error".to_string(), |e| e.to_string())
        )
    }

    /// Sends a single request over a fresh connection.
    async fn send_request(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut stream = tokio::time::timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            UnixStream::connect(&self.socket_path),
        )
        .await
        .context("connection timed out")?
        .with_context(|| format!("failed to connect to {:?}", self.socket_path))?;

        let request_json = serde_json::to_string(request).context("failed to encode request")?;
        debug!("Sending request: {}", request_json);

        tokio::time::timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            stream.write_all(request_json.as_bytes()),
        )
        .await
        .context("write timed out")?
        .context("failed to send request")?;

        stream.flush().await.context("failed to flush request")?;
        // Half-close so the daemon sees EOF and responds.
        stream
            .shutdown()
            .await
            .context("failed to shutdown write side")?;

        let mut buffer = vec![0u8; MAX_RESPONSE_SIZE];
        let n = tokio::time::timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            stream.read(&mut buffer),
        )
        .await
        .context("read timed out")?
        .context("failed to read response")?;

        if n == 0 {
            bail!("daemon closed the connection without responding");
        }

        let response: IpcResponse =
            serde_json::from_slice(&buffer[..n]).context("failed to parse response")?;
        debug!("Received response: status={}", response.status);

        Ok(response)
    }
}

impl Default for IpcClient {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
