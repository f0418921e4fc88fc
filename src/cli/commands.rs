//! Command definitions for the Wave CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::types::{BackgroundSound, TimerMode};

// ============================================================================
// CLI Structure
// ============================================================================

/// Wave - a Pomodoro focus timer with background sounds and a task API
#[derive(Parser, Debug)]
#[command(
    name = "wave",
    version,
    about = "Pomodoro focus timer with background sounds and a companion task API",
    long_about = "A terminal Pomodoro timer. A background daemon owns the countdown and\n\
                  plays looping focus sounds; this CLI talks to it over a local socket.\n\
                  The account and tasks commands talk to a Wave task server over HTTP.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start or resume the countdown
    Start,

    /// Pause the countdown
    Pause,

    /// Reset the countdown to the full duration
    Reset,

    /// Show the current timer status
    Status,

    /// Switch the countdown mode (ignored while running)
    Mode {
        /// Target mode: focus, short-break or long-break
        mode: TimerMode,
    },

    /// Set the task you are working on (no argument clears it)
    Task {
        /// Task label
        name: Vec<String>,
    },

    /// Mute or unmute background sound
    Mute {
        /// "on" or "off"
        #[arg(value_parser = parse_on_off, action = clap::ArgAction::Set)]
        state: bool,
    },

    /// Select the background track: waves, rain, forest or none
    Sound {
        /// Track selection
        sound: BackgroundSound,
    },

    /// Run the timer daemon (background service)
    #[command(hide = true)]
    Daemon,

    /// Run the task API server
    Serve(ServeArgs),

    /// Manage the account on a Wave task server
    Account {
        /// Server base URL (defaults to $WAVE_API_URL or localhost)
        #[arg(long)]
        server: Option<String>,

        #[command(subcommand)]
        command: AccountCommands,
    },

    /// Manage tasks on a Wave task server
    Tasks {
        /// Server base URL (defaults to $WAVE_API_URL or localhost)
        #[arg(long)]
        server: Option<String>,

        #[command(subcommand)]
        command: TaskCommands,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Arguments for the serve command
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3333")]
    pub addr: SocketAddr,

    /// SQLite database path (defaults to ~/.wave/wave.db)
    #[arg(long)]
    pub db: Option<PathBuf>,
}

/// Account subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum AccountCommands {
    /// Create an account and log in
    Register {
        /// Display name (at least 2 characters)
        #[arg(long)]
        name: String,
        /// E-mail address
        #[arg(long)]
        email: String,
        /// Password (at least 6 characters)
        #[arg(long)]
        password: String,
    },

    /// Log in and store the token
    Login {
        /// E-mail address
        #[arg(long)]
        email: String,
        /// Password
        #[arg(long)]
        password: String,
    },

    /// Forget the stored token
    Logout,

    /// Show the logged-in account
    Profile,
}

/// Task subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum TaskCommands {
    /// List your tasks, newest first
    List,

    /// Create a task
    Add {
        /// Task name
        #[arg(required = true)]
        name: Vec<String>,
    },

    /// Show a single task
    Show {
        /// Task id
        id: String,
    },

    /// Rename a task
    Rename {
        /// Task id
        id: String,
        /// New name
        #[arg(required = true)]
        name: Vec<String>,
    },

    /// Delete a task
    Remove {
        /// Task id
        id: String,
    },
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Parses an on/off flag value.
fn parse_on_off(s: &str) -> Result<bool, String> {
    match s {
        "on" | "true" => Ok(true),
        "off" | "false" => Ok(false),
        other => Err(format!("expected 'on' or 'off', got '{other}'")),
    }
}

// ============================================================================
// Tests
// ============================================================================
