//! Focus/break session engine.
//!
//! The engine is a tick-driven state machine. It does not use internal
//! threads or read a clock - the caller invokes `tick()` once per elapsed
//! second while the session is running.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Focus --(remaining hits 0)--> Break --(remaining hits 0)--> Idle
//!                   \________________ reset (any state) ________________/
//! ```
//!
//! `RunState` (Stopped / Running / Paused) is orthogonal to the mode.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = SessionEngine::default();
//! engine.start();
//! // Once per second:
//! if let Some(event) = engine.tick() { notify(event) }
//! ```

use serde::{Deserialize, Serialize};
use tracing::info;

use super::durations::SessionDurations;
use crate::error::ValidationError;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    Idle,
    Focus,
    Break,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Stopped,
    Running,
    Paused,
}

/// Serializable view of the engine for hosts and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub mode: SessionMode,
    pub run_state: RunState,
    pub duration_secs: u64,
    pub remaining_secs: u64,
    pub remaining: String,
    pub progress_pct: f64,
    pub sessions_completed: u64,
    pub total_focus_secs: u64,
}

/// Core session engine.
///
/// Invariant: `1 <= remaining_secs <= duration_secs`, `remaining_secs` only
/// moves while `run_state == Running`, and the engine is `Stopped` exactly
/// when it is `Idle`. Deserialization rejects state that breaks these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EngineState")]
pub struct SessionEngine {
    durations: SessionDurations,
    mode: SessionMode,
    duration_secs: u64,
    remaining_secs: u64,
    run_state: RunState,
    sessions_completed: u64,
    total_focus_secs: u64,
}

/// Unchecked wire form of [`SessionEngine`].
#[derive(Deserialize)]
struct EngineState {
    durations: SessionDurations,
    mode: SessionMode,
    duration_secs: u64,
    remaining_secs: u64,
    run_state: RunState,
    sessions_completed: u64,
    total_focus_secs: u64,
}

impl TryFrom<EngineState> for SessionEngine {
    type Error = ValidationError;

    fn try_from(state: EngineState) -> Result<Self, Self::Error> {
        if state.remaining_secs == 0 || state.remaining_secs > state.duration_secs {
            return Err(ValidationError::OutOfRange {
                field: "remaining_secs",
                min: 1,
                max: i64::try_from(state.duration_secs).unwrap_or(i64::MAX),
                value: i64::try_from(state.remaining_secs).unwrap_or(i64::MAX),
            });
        }
        if (state.mode == SessionMode::Idle) != (state.run_state == RunState::Stopped) {
            return Err(ValidationError::InvalidValue {
                field: "run_state".into(),
                message: format!("{:?} engine cannot be {:?}", state.mode, state.run_state),
            });
        }
        Ok(Self {
            durations: state.durations,
            mode: state.mode,
            duration_secs: state.duration_secs,
            remaining_secs: state.remaining_secs,
            run_state: state.run_state,
            sessions_completed: state.sessions_completed,
            total_focus_secs: state.total_focus_secs,
        })
    }
}

impl Default for SessionEngine {
    fn default() -> Self {
        Self::new(SessionDurations::default())
    }
}

impl SessionEngine {
    /// Create an idle, stopped engine.
    pub fn new(durations: SessionDurations) -> Self {
        Self {
            durations,
            mode: SessionMode::Idle,
            duration_secs: durations.focus_secs(),
            remaining_secs: durations.focus_secs(),
            run_state: RunState::Stopped,
            sessions_completed: 0,
            total_focus_secs: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn sessions_completed(&self) -> u64 {
        self.sessions_completed
    }

    pub fn total_focus_secs(&self) -> u64 {
        self.total_focus_secs
    }

    pub fn durations(&self) -> SessionDurations {
        self.durations
    }

    /// 0.0 ..= 100.0 progress within the current interval.
    pub fn progress_percent(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        let elapsed = self.duration_secs.saturating_sub(self.remaining_secs) as f64;
        (elapsed / self.duration_secs as f64 * 100.0).clamp(0.0, 100.0)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            mode: self.mode,
            run_state: self.run_state,
            duration_secs: self.duration_secs,
            remaining_secs: self.remaining_secs,
            remaining: format_time(self.remaining_secs),
            progress_pct: self.progress_percent(),
            sessions_completed: self.sessions_completed,
            total_focus_secs: self.total_focus_secs,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a focus interval from idle, or resume a paused one.
    /// Returns `None` when already running.
    pub fn start(&mut self) -> Option<Event> {
        match (self.mode, self.run_state) {
            (_, RunState::Running) => None,
            (SessionMode::Idle, _) => {
                self.mode = SessionMode::Focus;
                self.duration_secs = self.durations.focus_secs();
                self.remaining_secs = self.duration_secs;
                self.run_state = RunState::Running;
                Some(Event::SessionStarted {
                    mode: self.mode,
                    duration_secs: self.duration_secs,
                })
            }
            (mode, _) => {
                self.run_state = RunState::Running;
                Some(Event::SessionResumed {
                    mode,
                    remaining_secs: self.remaining_secs,
                })
            }
        }
    }

    /// Pause a running interval. No-op otherwise.
    pub fn pause(&mut self) -> Option<Event> {
        if self.run_state != RunState::Running {
            return None;
        }
        self.run_state = RunState::Paused;
        Some(Event::SessionPaused {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
        })
    }

    /// Back to idle. Cumulative counters are kept.
    pub fn reset(&mut self) -> Event {
        self.mode = SessionMode::Idle;
        self.duration_secs = self.durations.focus_secs();
        self.remaining_secs = self.duration_secs;
        self.run_state = RunState::Stopped;
        Event::SessionReset {
            sessions_completed: self.sessions_completed,
            total_focus_secs: self.total_focus_secs,
        }
    }

    /// Advance one second. Returns the completion event when an interval
    /// runs out; ticks outside `Running` change nothing.
    pub fn tick(&mut self) -> Option<Event> {
        if self.run_state != RunState::Running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }

        match self.mode {
            SessionMode::Focus => {
                let finished_secs = self.duration_secs;
                self.sessions_completed += 1;
                self.total_focus_secs = self.total_focus_secs.saturating_add(self.duration_secs);
                self.mode = SessionMode::Break;
                self.duration_secs = self.durations.break_secs();
                self.remaining_secs = self.duration_secs;
                info!(
                    sessions_completed = self.sessions_completed,
                    "focus interval completed, break started"
                );
                Some(Event::FocusCompleted {
                    duration_secs: finished_secs,
                    sessions_completed: self.sessions_completed,
                    total_focus_secs: self.total_focus_secs,
                    break_secs: self.duration_secs,
                })
            }
            SessionMode::Break => {
                let finished_secs = self.duration_secs;
                self.mode = SessionMode::Idle;
                self.duration_secs = self.durations.focus_secs();
                self.remaining_secs = self.duration_secs;
                self.run_state = RunState::Stopped;
                info!("break completed, session idle");
                Some(Event::BreakCompleted {
                    duration_secs: finished_secs,
                    sessions_completed: self.sessions_completed,
                })
            }
            // Running always implies Focus or Break.
            SessionMode::Idle => None,
        }
    }

    /// Swap interval lengths. Takes effect from the next interval; an idle
    /// engine shows the new focus length immediately.
    pub fn set_durations(&mut self, durations: SessionDurations) {
        self.durations = durations;
        if self.mode == SessionMode::Idle {
            self.duration_secs = durations.focus_secs();
            self.remaining_secs = self.duration_secs;
        }
    }
}

/// Render seconds as zero-padded `MM:SS`. Minutes are not capped at 59.
pub fn format_time(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
