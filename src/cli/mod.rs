//! CLI module for Wave.
//!
//! - `commands`: Command definitions using clap derive
//! - `client`: IPC client for daemon communication
//! - `api`: HTTP client for the task server
//! - `display`: Output formatting and display logic

pub mod api;
pub mod client;
pub mod commands;
pub mod display;

pub use api::ApiClient;
pub use client::IpcClient;
pub use commands::{AccountCommands, Cli, Commands, ServeArgs, TaskCommands};
pub use display::Display;
