//! Wall-clock adapter for the session engine.
//!
//! The engine only understands ticks. A host that is not alive every second
//! (the CLI runs once per command) persists a [`TickDriver`] next to the
//! engine and replays the elapsed seconds on its next invocation.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::engine::SessionEngine;
use crate::events::Event;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickDriver {
    /// Instant up to which elapsed time has been converted to ticks.
    /// `None` while the engine is not running.
    #[serde(default)]
    last_synced_at: Option<DateTime<Utc>>,
}

impl TickDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.last_synced_at
    }

    /// Re-anchor after a command changed the engine's run state.
    pub fn sync(&mut self, engine: &SessionEngine, now: DateTime<Utc>) {
        if engine.is_running() {
            self.last_synced_at.get_or_insert(now);
        } else {
            self.last_synced_at = None;
        }
    }

    /// Tick once per whole second elapsed since the anchor.
    ///
    /// Stops early when the engine leaves `Running` (a break finished).
    /// The sub-second remainder stays on the anchor for the next call.
    pub fn catch_up(&mut self, engine: &mut SessionEngine, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::new();
        let Some(anchor) = self.last_synced_at else {
            self.sync(engine, now);
            return events;
        };
        if !engine.is_running() {
            self.last_synced_at = None;
            return events;
        }

        let elapsed = now.signed_duration_since(anchor).num_seconds().max(0);
        let mut consumed = 0;
        while consumed < elapsed && engine.is_running() {
            consumed += 1;
            if let Some(event) = engine.tick() {
                events.push(event);
            }
        }

        self.last_synced_at = if engine.is_running() {
            Some(anchor + Duration::seconds(consumed))
        } else {
            None
        };
        events
    }
}
