//! Core data types for the Wave focus timer.
//!
//! This module defines the data structures used for:
//! - The Pomodoro countdown state machine
//! - Persisted preference values
//! - IPC request/response serialization

use serde::{Deserialize, Serialize};

// ============================================================================
// TimerMode
// ============================================================================

/// The three countdown modes, each with a fixed duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    /// 25-minute focus session
    Focus,
    /// 5-minute short break
    ShortBreak,
    /// 20-minute long break
    LongBreak,
}

impl TimerMode {
    /// Returns the full countdown duration for this mode, in seconds.
    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        match self {
            TimerMode::Focus => 25 * 60,
            TimerMode::ShortBreak => 5 * 60,
            TimerMode::LongBreak => 20 * 60,
        }
    }

    /// Returns the string representation of the mode.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Focus => "focus",
            TimerMode::ShortBreak => "shortBreak",
            TimerMode::LongBreak => "longBreak",
        }
    }
}

impl Default for TimerMode {
    fn default() -> Self {
        TimerMode::Focus
    }
}

impl std::str::FromStr for TimerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "focus" => Ok(TimerMode::Focus),
            "short-break" | "shortBreak" => Ok(TimerMode::ShortBreak),
            "long-break" | "longBreak" => Ok(TimerMode::LongBreak),
            other => Err(format!(
                "unknown mode '{other}' (expected focus, short-break or long-break)"
            )),
        }
    }
}

// ============================================================================
// BackgroundSound
// ============================================================================

/// Background track selection for focus sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundSound {
    /// Ocean waves (default)
    Waves,
    /// Rainfall
    Rain,
    /// Forest ambience
    Forest,
    /// No background track
    None,
}

impl BackgroundSound {
    /// Returns the string representation, also used as the persisted value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            BackgroundSound::Waves => "waves",
            BackgroundSound::Rain => "rain",
            BackgroundSound::Forest => "forest",
            BackgroundSound::None => "none",
        }
    }
}

impl Default for BackgroundSound {
    fn default() -> Self {
        BackgroundSound::Waves
    }
}

impl std::str::FromStr for BackgroundSound {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waves" => Ok(BackgroundSound::Waves),
            "rain" => Ok(BackgroundSound::Rain),
            "forest" => Ok(BackgroundSound::Forest),
            "none" => Ok(BackgroundSound::None),
            other => Err(format!(
                "unknown sound '{other}' (expected waves, rain, forest or none)"
            )),
        }
    }
}

// ============================================================================
// TimerState
// ============================================================================

/// The countdown state machine.
///
/// Invariants: `is_running` and `is_paused` are never both true, and
/// `time_remaining` stays within `[0, mode.duration_secs()]`. Every
/// operation is total; transitions that are not allowed from the current
/// state are silent no-ops rather than errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    /// Current countdown mode
    pub mode: TimerMode,
    /// Remaining seconds in the current mode
    pub time_remaining: u32,
    /// Whether the countdown is ticking
    pub is_running: bool,
    /// Whether the countdown is paused mid-way
    pub is_paused: bool,
    /// Label of the task being worked on (may be empty)
    pub current_task: String,
}

impl TimerState {
    /// Creates a new state: idle, focus mode, full duration, no task.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mode: TimerMode::Focus,
            time_remaining: TimerMode::Focus.duration_secs(),
            is_running: false,
            is_paused: false,
            current_task: String::new(),
        }
    }

    /// Starts or resumes the countdown.
    ///
    /// A finished timer (`time_remaining == 0`) is first reset to the full
    /// duration of the current mode, so starting it again restarts it.
    pub fn start(&mut self) {
        if self.time_remaining == 0 {
            self.time_remaining = self.mode.duration_secs();
        }
        self.is_running = true;
        self.is_paused = false;
    }

    /// Pauses a running countdown; no-op in any other state.
    pub fn pause(&mut self) {
        if self.is_running {
            self.is_running = false;
            self.is_paused = true;
        }
    }

    /// Returns to idle with the full duration for the current mode.
    pub fn reset(&mut self) {
        self.time_remaining = self.mode.duration_secs();
        self.is_running = false;
        self.is_paused = false;
    }

    /// Switches mode and resets the countdown.
    ///
    /// Ignored while running: the mode cannot change mid-session.
    pub fn set_mode(&mut self, mode: TimerMode) {
        if self.is_running {
            return;
        }
        self.mode = mode;
        self.time_remaining = mode.duration_secs();
        self.is_paused = false;
    }

    /// Sets the current task label. Allowed in any state.
    pub fn set_current_task(&mut self, label: impl Into<String>) {
        self.current_task = label.into();
    }

    /// Advances the countdown by one second.
    ///
    /// Only meaningful while running; calling it in any other state does
    /// nothing. Returns true exactly when this tick completes the countdown,
    /// which leaves the timer idle at zero. There is no automatic mode
    /// advance on completion; the user picks the next mode.
    pub fn tick(&mut self) -> bool {
        if !self.is_running {
            return false;
        }
        if self.time_remaining <= 1 {
            self.time_remaining = 0;
            self.is_running = false;
            self.is_paused = false;
            true
        } else {
            self.time_remaining -= 1;
            false
        }
    }

    /// Returns true if the timer is neither running nor paused.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        !self.is_running && !self.is_paused
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats a second count as a zero-padded `MM:SS` clock string.
#[must_use]
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

// ============================================================================
// IPC Types
// ============================================================================

/// IPC request from the CLI to the daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum IpcRequest {
    /// Start or resume the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Reset the countdown to the full duration
    Reset,
    /// Query the current state
    Status,
    /// Switch countdown mode
    SetMode {
        /// Target mode
        mode: TimerMode,
    },
    /// Set the current task label
    SetTask {
        /// Task label (may be empty to clear)
        name: String,
    },
    /// Toggle the mute preference
    SetMuted {
        /// New mute value
        muted: bool,
    },
    /// Select the background track
    SetSound {
        /// New selection
        sound: BackgroundSound,
    },
}

/// Snapshot of daemon state carried in IPC responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    /// Current countdown mode
    pub mode: TimerMode,
    /// Remaining seconds
    #[serde(rename = "timeRemaining")]
    pub time_remaining: u32,
    /// Remaining time formatted as MM:SS
    pub clock: String,
    /// Whether the countdown is ticking
    #[serde(rename = "isRunning")]
    pub is_running: bool,
    /// Whether the countdown is paused
    #[serde(rename = "isPaused")]
    pub is_paused: bool,
    /// Current task label
    #[serde(rename = "currentTask")]
    pub current_task: String,
    /// Mute preference
    #[serde(rename = "isMuted")]
    pub is_muted: bool,
    /// Background track preference
    #[serde(rename = "backgroundSound")]
    pub background_sound: BackgroundSound,
}

impl ResponseData {
    /// Builds a snapshot from the timer state and the preference values.
    #[must_use]
    pub fn snapshot(state: &TimerState, is_muted: bool, background_sound: BackgroundSound) -> Self {
        Self {
            mode: state.mode,
            time_remaining: state.time_remaining,
            clock: format_time(state.time_remaining),
            is_running: state.is_running,
            is_paused: state.is_paused,
            current_task: state.current_task.clone(),
            is_muted,
            background_sound,
        }
    }
}

/// IPC response from the daemon to the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// State snapshot after the command was applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<ResponseData>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // TimerMode Tests
    // ------------------------------------------------------------------------

    mod timer_mode_tests {
        use super::*;

        #[test]
        fn test_durations() {
            assert_eq!(TimerMode::Focus.duration_secs(), 1500);
            assert_eq!(TimerMode::ShortBreak.duration_secs(), 300);
            assert_eq!(TimerMode::LongBreak.duration_secs(), 1200);
        }

        #[test]
        fn test_default_is_focus() {
            assert_eq!(TimerMode::default(), TimerMode::Focus);
        }

        #[test]
        fn test_as_str() {
            assert_eq!(TimerMode::Focus.as_str(), "focus");
            assert_eq!(TimerMode::ShortBreak.as_str(), "shortBreak");
            assert_eq!(TimerMode::LongBreak.as_str(), "longBreak");
        }

        #[test]
        fn test_from_str() {
            assert_eq!("focus".parse::<TimerMode>().unwrap(), TimerMode::Focus);
            assert_eq!(
                "short-break".parse::<TimerMode>().unwrap(),
                TimerMode::ShortBreak
            );
            assert_eq!(
                "long-break".parse::<TimerMode>().unwrap(),
                TimerMode::LongBreak
            );
            assert!("siesta".parse::<TimerMode>().is_err());
        }

        #[test]
        fn test_serialize_deserialize() {
            let json = serde_json::to_string(&TimerMode::ShortBreak).unwrap();
            assert_eq!(json, "\"shortBreak\"");

            let mode: TimerMode = serde_json::from_str("\"longBreak\"").unwrap();
            assert_eq!(mode, TimerMode::LongBreak);
        }
    }

    // ------------------------------------------------------------------------
    // BackgroundSound Tests
    // ------------------------------------------------------------------------

    mod background_sound_tests {
        use super::*;

        #[test]
        fn test_default_is_waves() {
            assert_eq!(BackgroundSound::default(), BackgroundSound::Waves);
        }

        #[test]
        fn test_as_str_round_trip() {
            for sound in [
                BackgroundSound::Waves,
                BackgroundSound::Rain,
                BackgroundSound::Forest,
                BackgroundSound::None,
            ] {
                assert_eq!(sound.as_str().parse::<BackgroundSound>().unwrap(), sound);
            }
        }

        #[test]
        fn test_from_str_invalid() {
            assert!("whale-song".parse::<BackgroundSound>().is_err());
        }

        #[test]
        fn test_serialize_lowercase() {
            let json = serde_json::to_string(&BackgroundSound::Forest).unwrap();
            assert_eq!(json, "\"forest\"");
        }
    }

    // ------------------------------------------------------------------------
    // TimerState Tests
    // ------------------------------------------------------------------------

    mod timer_state_tests {
        use super::*;

        #[test]
        fn test_new_state() {
            let state = TimerState::new();

            assert_eq!(state.mode, TimerMode::Focus);
            assert_eq!(state.time_remaining, 1500);
            assert!(!state.is_running);
            assert!(!state.is_paused);
            assert!(state.current_task.is_empty());
            assert!(state.is_idle());
        }

        #[test]
        fn test_start_from_idle() {
            let mut state = TimerState::new();

            state.start();

            assert!(state.is_running);
            assert!(!state.is_paused);
            assert_eq!(state.time_remaining, 1500);
        }

        #[test]
        fn test_start_resumes_paused_countdown() {
            let mut state = TimerState::new();
            state.set_mode(TimerMode::ShortBreak);
            state.start();
            for _ in 0..5 {
                state.tick();
            }
            state.pause();
            assert_eq!(state.time_remaining, 295);

            state.start();

            // Resumed, not reset to 300.
            assert_eq!(state.time_remaining, 295);
            assert!(state.is_running);
            assert!(!state.is_paused);
        }

        #[test]
        fn test_start_restarts_finished_timer() {
            let mut state = TimerState::new();
            state.start();
            state.time_remaining = 1;
            state.tick();
            assert_eq!(state.time_remaining, 0);

            state.start();

            assert_eq!(state.time_remaining, 1500);
            assert!(state.is_running);
        }

        #[test]
        fn test_pause_from_running() {
            let mut state = TimerState::new();
            state.start();
            state.tick();

            state.pause();

            assert!(!state.is_running);
            assert!(state.is_paused);
            assert_eq!(state.time_remaining, 1499);
        }

        #[test]
        fn test_pause_from_idle_is_noop() {
            let mut state = TimerState::new();

            state.pause();

            assert!(state.is_idle());
        }

        #[test]
        fn test_reset_from_any_state() {
            let mut state = TimerState::new();
            state.start();
            for _ in 0..10 {
                state.tick();
            }

            state.reset();
            assert_eq!(state.time_remaining, 1500);
            assert!(state.is_idle());

            state.start();
            state.pause();
            state.reset();
            assert_eq!(state.time_remaining, 1500);
            assert!(state.is_idle());
        }

        #[test]
        fn test_set_mode_while_idle() {
            let mut state = TimerState::new();

            state.set_mode(TimerMode::LongBreak);

            assert_eq!(state.mode, TimerMode::LongBreak);
            assert_eq!(state.time_remaining, 1200);
            assert!(state.is_idle());
        }

        #[test]
        fn test_set_mode_while_running_is_noop() {
            let mut state = TimerState::new();
            state.start();
            state.tick();
            let before = state.clone();

            state.set_mode(TimerMode::ShortBreak);

            assert_eq!(state, before);
        }

        #[test]
        fn test_set_mode_while_paused_resets() {
            let mut state = TimerState::new();
            state.start();
            state.tick();
            state.pause();

            state.set_mode(TimerMode::ShortBreak);

            assert_eq!(state.mode, TimerMode::ShortBreak);
            assert_eq!(state.time_remaining, 300);
            assert!(!state.is_paused);
            assert!(state.is_idle());
        }

        #[test]
        fn test_set_mode_all_modes_when_idle() {
            for mode in [TimerMode::Focus, TimerMode::ShortBreak, TimerMode::LongBreak] {
                let mut state = TimerState::new();
                state.set_mode(mode);
                assert_eq!(state.time_remaining, mode.duration_secs());
                assert!(!state.is_running);
                assert!(!state.is_paused);
            }
        }

        #[test]
        fn test_tick_decrements_while_running() {
            let mut state = TimerState::new();
            state.start();

            let completed = state.tick();

            assert!(!completed);
            assert_eq!(state.time_remaining, 1499);
        }

        #[test]
        fn test_tick_completion_at_one_second() {
            let mut state = TimerState::new();
            state.start();
            state.time_remaining = 1;

            let completed = state.tick();

            assert!(completed);
            assert_eq!(state.time_remaining, 0);
            assert!(!state.is_running);
            assert!(!state.is_paused);
        }

        #[test]
        fn test_tick_after_completion_is_noop() {
            let mut state = TimerState::new();
            state.start();
            state.time_remaining = 1;
            assert!(state.tick());

            // Timer is idle at zero; further ticks change nothing.
            assert!(!state.tick());
            assert_eq!(state.time_remaining, 0);
            assert!(state.is_idle());
        }

        #[test]
        fn test_tick_while_idle_is_noop() {
            let mut state = TimerState::new();

            assert!(!state.tick());
            assert_eq!(state.time_remaining, 1500);
        }

        #[test]
        fn test_tick_while_paused_is_noop() {
            let mut state = TimerState::new();
            state.start();
            state.tick();
            state.pause();

            assert!(!state.tick());
            assert_eq!(state.time_remaining, 1499);
        }

        #[test]
        fn test_full_focus_countdown() {
            let mut state = TimerState::new();
            state.start();

            for i in 0..1500 {
                let completed = state.tick();
                assert_eq!(completed, i == 1499);
            }

            assert_eq!(state.time_remaining, 0);
            assert!(!state.is_running);
            assert!(!state.is_paused);
        }

        #[test]
        fn test_set_current_task_any_state() {
            let mut state = TimerState::new();

            state.set_current_task("Write report");
            assert_eq!(state.current_task, "Write report");

            state.start();
            state.set_current_task("Review PR");
            assert_eq!(state.current_task, "Review PR");

            state.pause();
            state.set_current_task("");
            assert!(state.current_task.is_empty());
        }

        #[test]
        fn test_flags_never_both_true() {
            let mut state = TimerState::new();

            state.start();
            assert!(!(state.is_running && state.is_paused));
            state.pause();
            assert!(!(state.is_running && state.is_paused));
            state.start();
            assert!(!(state.is_running && state.is_paused));
            state.reset();
            assert!(!(state.is_running && state.is_paused));
        }

        #[test]
        fn test_serialize_deserialize() {
            let mut state = TimerState::new();
            state.set_mode(TimerMode::ShortBreak);
            state.set_current_task("Deep work");
            state.start();

            let json = serde_json::to_string(&state).unwrap();
            let deserialized: TimerState = serde_json::from_str(&json).unwrap();

            assert_eq!(deserialized, state);
        }
    }

    // ------------------------------------------------------------------------
    // format_time Tests
    // ------------------------------------------------------------------------

    mod format_time_tests {
        use super::*;

        #[test]
        fn test_zero() {
            assert_eq!(format_time(0), "00:00");
        }

        #[test]
        fn test_zero_padding() {
            assert_eq!(format_time(9), "00:09");
            assert_eq!(format_time(61), "01:01");
        }

        #[test]
        fn test_mode_durations() {
            assert_eq!(format_time(1500), "25:00");
            assert_eq!(format_time(300), "05:00");
            assert_eq!(format_time(1200), "20:00");
        }

        #[test]
        fn test_large_values_use_total_minutes() {
            assert_eq!(format_time(5400), "90:00");
        }
    }

    // ------------------------------------------------------------------------
    // IPC Types Tests
    // ------------------------------------------------------------------------

    mod ipc_tests {
        use super::*;

        #[test]
        fn test_request_simple_commands_serialize() {
            assert_eq!(
                serde_json::to_string(&IpcRequest::Start).unwrap(),
                r#"{"command":"start"}"#
            );
            assert_eq!(
                serde_json::to_string(&IpcRequest::Pause).unwrap(),
                r#"{"command":"pause"}"#
            );
            assert_eq!(
                serde_json::to_string(&IpcRequest::Reset).unwrap(),
                r#"{"command":"reset"}"#
            );
            assert_eq!(
                serde_json::to_string(&IpcRequest::Status).unwrap(),
                r#"{"command":"status"}"#
            );
        }

        #[test]
        fn test_request_set_mode_round_trip() {
            let request = IpcRequest::SetMode {
                mode: TimerMode::LongBreak,
            };
            let json = serde_json::to_string(&request).unwrap();
            assert_eq!(json, r#"{"command":"setMode","mode":"longBreak"}"#);

            let parsed: IpcRequest = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, request);
        }

        #[test]
        fn test_request_set_task_deserialize() {
            let json = r#"{"command":"setTask","name":"Ship release"}"#;
            let request: IpcRequest = serde_json::from_str(json).unwrap();
            assert_eq!(
                request,
                IpcRequest::SetTask {
                    name: "Ship release".to_string()
                }
            );
        }

        #[test]
        fn test_request_set_muted_and_sound() {
            let json = r#"{"command":"setMuted","muted":true}"#;
            let request: IpcRequest = serde_json::from_str(json).unwrap();
            assert_eq!(request, IpcRequest::SetMuted { muted: true });

            let json = r#"{"command":"setSound","sound":"rain"}"#;
            let request: IpcRequest = serde_json::from_str(json).unwrap();
            assert_eq!(
                request,
                IpcRequest::SetSound {
                    sound: BackgroundSound::Rain
                }
            );
        }

        #[test]
        fn test_snapshot_from_state() {
            let mut state = TimerState::new();
            state.set_mode(TimerMode::ShortBreak);
            state.set_current_task("Emails");
            state.start();

            let data = ResponseData::snapshot(&state, true, BackgroundSound::Forest);

            assert_eq!(data.mode, TimerMode::ShortBreak);
            assert_eq!(data.time_remaining, 300);
            assert_eq!(data.clock, "05:00");
            assert!(data.is_running);
            assert!(!data.is_paused);
            assert_eq!(data.current_task, "Emails");
            assert!(data.is_muted);
            assert_eq!(data.background_sound, BackgroundSound::Forest);
        }

        #[test]
        fn test_response_serialize_camel_case() {
            let state = TimerState::new();
            let response = IpcResponse::success(
                "ok",
                Some(ResponseData::snapshot(&state, false, BackgroundSound::Waves)),
            );

            let json = serde_json::to_string(&response).unwrap();
            assert!(json.contains("\"timeRemaining\":1500"));
            assert!(json.contains("\"isRunning\":false"));
            assert!(json.contains("\"isPaused\":false"));
            assert!(json.contains("\"currentTask\":\"\""));
            assert!(json.contains("\"isMuted\":false"));
            assert!(json.contains("\"backgroundSound\":\"waves\""));
            assert!(json.contains("\"clock\":\"25:00\""));
        }

        #[test]
        fn test_response_error_has_no_data() {
            let response = IpcResponse::error("boom");
            assert_eq!(response.status, "error");
            let json = serde_json::to_string(&response).unwrap();
            assert!(!json.contains("data"));
        }

        #[test]
        fn test_response_deserialize() {
            let json = r#"{"status":"success","message":"","data":{"mode":"focus","timeRemaining":42,"clock":"00:42","isRunning":true,"isPaused":false,"currentTask":"x","isMuted":false,"backgroundSound":"none"}}"#;
            let response: IpcResponse = serde_json::from_str(json).unwrap();

            assert_eq!(response.status, "success");
            let data = response.data.unwrap();
            assert_eq!(data.time_remaining, 42);
            assert_eq!(data.background_sound, BackgroundSound::None);
        }
    }
}
