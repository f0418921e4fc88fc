//! Formatted terminal output for the Wave CLI.

use crate::types::{IpcResponse, TimerMode};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the result of a start command.
    pub fn show_start_success(response: &IpcResponse) {
        println!("* Timer started");
        Self::show_clock_line(response);
    }

    /// Shows the result of a pause command.
    pub fn show_pause_success(response: &IpcResponse) {
        println!("|| Timer paused");
        Self::show_clock_line(response);
    }

    /// Shows the result of a reset command.
    pub fn show_reset_success(response: &IpcResponse) {
        println!("[] Timer reset");
        Self::show_clock_line(response);
    }

    /// Shows the result of a mode command.
    pub fn show_mode_changed(response: &IpcResponse) {
        if let Some(data) = &response.data {
            println!("* Mode set to {}", Self::mode_label(data.mode));
            println!("  Remaining: {}", data.clock);
        }
    }

    /// Shows the result of a task command.
    pub fn show_task_changed(response: &IpcResponse) {
        match response.data.as_ref().map(|d| d.current_task.as_str()) {
            Some("") | None => println!("* Task cleared"),
            Some(task) => println!("* Task set to \"{}\"", task),
        }
    }

    /// Shows the result of a mute command.
    pub fn show_mute_changed(response: &IpcResponse) {
        match response.data.as_ref().map(|d| d.is_muted) {
            Some(true) => println!("* Sound muted"),
            _ => println!("* Sound unmuted"),
        }
    }

    /// Shows the result of a sound command.
    pub fn show_sound_changed(response: &IpcResponse) {
        if let Some(data) = &response.data {
            println!("* Background sound set to {}", data.background_sound.as_str());
        }
    }

    /// Shows the current timer status.
    pub fn show_status(response: &IpcResponse) {
        println!("Wave Timer Status");
        println!("-----------------");

        let Some(data) = &response.data else {
            println!("The daemon did not report any state");
            return;
        };

        let state = if data.is_running {
            "running"
        } else if data.is_paused {
            "paused"
        } else {
            "idle"
        };

        println!("Mode:      {}", Self::mode_label(data.mode));
        println!("State:     {}", state);
        println!("Remaining: {}", data.clock);
        if !data.current_task.is_empty() {
            println!("Task:      {}", data.current_task);
        }
        println!(
            "Sound:     {}{}",
            data.background_sound.as_str(),
            if data.is_muted { " (muted)" } else { "" }
        );
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    fn show_clock_line(response: &IpcResponse) {
        if let Some(data) = &response.data {
            println!("  Remaining: {}", data.clock);
        }
    }

    fn mode_label(mode: TimerMode) -> &'static str {
        match mode {
            TimerMode::Focus => "focus",
            TimerMode::ShortBreak => "short break",
            TimerMode::LongBreak => "long break",
        }
    }

    /// Formats a task list row fetched from the server.
    pub fn show_task_row(id: &str, name: &str, created_at: &str) {
        println!("{}  {}  {}", id, created_at, name);
    }
}

// ============================================================================
// Tests
// ============================================================================
