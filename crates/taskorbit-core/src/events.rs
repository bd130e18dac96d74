use serde::{Deserialize, Serialize};

use crate::timer::SessionMode;

/// Every state change of the session engine produces an Event.
/// Hosts forward completions to notifications and motivational messaging.
///
/// Events carry no timestamp; the host stamps them with its own clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A new focus interval began from idle.
    SessionStarted {
        mode: SessionMode,
        duration_secs: u64,
    },
    /// A paused interval continues.
    SessionResumed {
        mode: SessionMode,
        remaining_secs: u64,
    },
    SessionPaused {
        mode: SessionMode,
        remaining_secs: u64,
    },
    SessionReset {
        sessions_completed: u64,
        total_focus_secs: u64,
    },
    /// A focus interval ran out; the break has started automatically.
    FocusCompleted {
        /// Length of the focus interval that just finished.
        duration_secs: u64,
        sessions_completed: u64,
        total_focus_secs: u64,
        break_secs: u64,
    },
    /// A break ran out; the engine is idle again.
    BreakCompleted {
        duration_secs: u64,
        sessions_completed: u64,
    },
}

/// Which interval a completion event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionKind {
    Focus,
    Break,
}

impl Event {
    /// `Some` for the two completion events, `None` otherwise.
    pub fn completion(&self) -> Option<CompletionKind> {
        match self {
            Event::FocusCompleted { .. } => Some(CompletionKind::Focus),
            Event::BreakCompleted { .. } => Some(CompletionKind::Break),
            _ => None,
        }
    }

    /// Kind and length of the interval a completion event closes.
    pub fn completed_interval(&self) -> Option<(CompletionKind, u64)> {
        match self {
            Event::FocusCompleted { duration_secs, .. } => {
                Some((CompletionKind::Focus, *duration_secs))
            }
            Event::BreakCompleted { duration_secs, .. } => {
                Some((CompletionKind::Break, *duration_secs))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(Event::BreakCompleted {
            duration_secs: 300,
            sessions_completed: 2,
        })
        .unwrap();
        assert_eq!(json["type"], "break_completed");
        assert_eq!(json["sessions_completed"], 2);
        assert_eq!(json["duration_secs"], 300);
    }

    #[test]
    fn completion_kind() {
        let focus = Event::FocusCompleted {
            duration_secs: 1500,
            sessions_completed: 1,
            total_focus_secs: 1500,
            break_secs: 300,
        };
        assert_eq!(focus.completion(), Some(CompletionKind::Focus));
        assert_eq!(
            focus.completed_interval(),
            Some((CompletionKind::Focus, 1500))
        );
        assert_eq!(
            Event::SessionReset {
                sessions_completed: 0,
                total_focus_secs: 0
            }
            .completion(),
            None
        );
    }
}
