//! Timer engine for the Wave daemon.
//!
//! This module provides the core timer functionality:
//! - Reducer operations over [`TimerState`]
//! - Countdown with tokio::time::interval
//! - Event firing for the audio collaborator and logging

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::types::{TimerMode, TimerState};

// ============================================================================
// TimerEvent
// ============================================================================

/// Timer events for the audio collaborator and external integrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// Countdown started or resumed
    Started,
    /// Countdown paused
    Paused,
    /// Countdown reset to the full duration
    Reset,
    /// Mode switched while not running
    ModeChanged {
        /// The new mode
        mode: TimerMode,
    },
    /// Current task label changed
    TaskChanged {
        /// The new label
        name: String,
    },
    /// One second elapsed
    Tick {
        /// Remaining seconds
        time_remaining: u32,
    },
    /// Countdown reached zero; the timer is idle again
    Completed {
        /// The mode that finished
        mode: TimerMode,
    },
}

// ============================================================================
// TimerEngine
// ============================================================================

/// Timer engine that owns the countdown state and publishes events.
///
/// Every command is total: commands that do not apply in the current state
/// leave it untouched and publish nothing.
pub struct TimerEngine {
    /// Current timer state
    state: TimerState,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<TimerEvent>,
}

impl TimerEngine {
    /// Creates a new engine publishing events on the given channel.
    pub fn new(event_tx: mpsc::UnboundedSender<TimerEvent>) -> Self {
        Self {
            state: TimerState::new(),
            event_tx,
        }
    }

    /// Starts or resumes the countdown.
    pub fn start(&mut self) -> Result<()> {
        if self.state.is_running {
            return Ok(());
        }
        self.state.start();
        self.send(TimerEvent::Started)
    }

    /// Pauses a running countdown.
    pub fn pause(&mut self) -> Result<()> {
        if !self.state.is_running {
            return Ok(());
        }
        self.state.pause();
        self.send(TimerEvent::Paused)
    }

    /// Resets the countdown to the full duration of the current mode.
    pub fn reset(&mut self) -> Result<()> {
        self.state.reset();
        self.send(TimerEvent::Reset)
    }

    /// Switches the countdown mode; ignored while running.
    pub fn set_mode(&mut self, mode: TimerMode) -> Result<()> {
        if self.state.is_running {
            return Ok(());
        }
        self.state.set_mode(mode);
        self.send(TimerEvent::ModeChanged { mode })
    }

    /// Sets the current task label.
    pub fn set_task(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        self.state.set_current_task(name.clone());
        self.send(TimerEvent::TaskChanged { name })
    }

    /// Advances the countdown by one second, publishing tick and
    /// completion events. Meant to be driven by [`run_tick_loop`].
    pub fn tick_once(&mut self) -> Result<()> {
        if !self.state.is_running {
            return Ok(());
        }

        let completed = self.state.tick();

        self.send(TimerEvent::Tick {
            time_remaining: self.state.time_remaining,
        })?;

        if completed {
            // Completion leaves the timer idle at zero. The user picks
            // the next mode; nothing advances automatically.
            self.send(TimerEvent::Completed {
                mode: self.state.mode,
            })?;
        }

        Ok(())
    }

    /// Returns a reference to the current timer state.
    pub fn state(&self) -> &TimerState {
        &self.state
    }

    /// Returns a mutable reference to the timer state (for testing).
    #[cfg(test)]
    pub fn state_mut(&mut self) -> &mut TimerState {
        &mut self.state
    }

    fn send(&self, event: TimerEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .context("failed to send timer event")
    }
}

/// Runs the daemon's one-second tick loop.
///
/// A single interval drives the shared engine; iterations while the timer
/// is not running are skipped, so no ticks can fire outside a session and
/// no second ticker ever exists. Should be spawned as a tokio task.
pub async fn run_tick_loop(engine: Arc<Mutex<TimerEngine>>) -> Result<()> {
    let mut ticker = interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let mut engine = engine.lock().await;
        if !engine.state().is_running {
            continue;
        }
        engine.tick_once()?;
    }
}

// ============================================================================
// Tests
// ============================================================================
