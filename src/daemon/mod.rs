//! Daemon module for the Wave timer.
//!
//! This module contains the core daemon functionality:
//! - `timer`: Timer engine with reducer operations and the countdown loop
//! - `ipc`: Unix socket server and request handling
//!
//! [`run`] wires everything together: the engine behind a mutex, the
//! persisted preferences, the background audio collaborator, the one-second
//! tick loop, and the IPC accept loop, shutting down on Ctrl-C.

pub mod ipc;
pub mod timer;

pub use ipc::{default_socket_path, IpcError, IpcServer, RequestHandler};
pub use timer::{run_tick_loop, TimerEngine, TimerEvent};

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::prefs::{FilePreferenceStore, Preferences};
use crate::sound::create_background_audio;
use crate::types::IpcResponse;

/// Runs the daemon until a shutdown signal arrives.
pub async fn run(socket_path: &Path) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let engine = Arc::new(Mutex::new(TimerEngine::new(event_tx)));

    let store =
        FilePreferenceStore::default_location().context("failed to locate preference store")?;
    let prefs = Arc::new(Mutex::new(Preferences::load(Box::new(store))));

    let audio = Arc::from(create_background_audio());
    let handler = Arc::new(RequestHandler::new(
        engine.clone(),
        prefs.clone(),
        audio,
    ));

    // Bring audio in line with the loaded preferences before serving.
    handler.sync_audio().await;

    let server = IpcServer::new(socket_path)?;
    info!(socket = %socket_path.display(), "daemon listening");

    let tick_handle = tokio::spawn(run_tick_loop(engine.clone()));

    // Consume engine events: log them, and re-sync audio on completion so
    // the looping track pauses the moment the countdown hits zero.
    let event_handler = handler.clone();
    let event_handle = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                TimerEvent::Tick { time_remaining } => {
                    debug!(time_remaining, "tick");
                }
                TimerEvent::Completed { mode } => {
                    info!(mode = mode.as_str(), "session complete");
                    event_handler.sync_audio().await;
                }
                other => debug!(?other, "timer event"),
            }
        }
    });

    loop {
        tokio::select! {
            accepted = server.accept() => {
                match accepted {
                    Ok(mut stream) => {
                        let handler = handler.clone();
                        tokio::spawn(async move {
                            match IpcServer::receive_request(&mut stream).await {
                                Ok(request) => {
                                    let response = handler.handle(request).await;
                                    if let Err(e) =
                                        IpcServer::send_response(&mut stream, &response).await
                                    {
                                        warn!("failed to send response: {}", e);
                                    }
                                }
                                Err(e) => {
                                    let response = IpcResponse::error(e.to_string());
                                    let _ =
                                        IpcServer::send_response(&mut stream, &response).await;
                                }
                            }
                        });
                    }
                    Err(e) => warn!("failed to accept connection: {}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    tick_handle.abort();
    event_handle.abort();
    Ok(())
}
