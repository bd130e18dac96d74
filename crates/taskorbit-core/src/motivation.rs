//! Pep talks shown after a completed focus or break interval.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::events::{CompletionKind, Event};

/// Number of pep talks kept around.
pub const HISTORY_LEN: usize = 5;

const FOCUS_COMPLETE: &[&str] = &[
    "🎉 Amazing focus! You just conquered a full session of pure productivity. Your future self is already thanking you!",
    "💪 That's what I call laser focus! Take a well-deserved break and come back even stronger.",
    "🚀 You're on fire! Another Pomodoro session crushed. Keep this momentum going!",
    "⭐ Incredible dedication! You've just proven that you can achieve anything with focused effort.",
    "🎯 Bulls-eye! Another focused session in the books. You're building unstoppable habits!",
    "🏆 Champion mindset right there! Your consistency is the key to extraordinary results.",
    "✨ Pure magic happens when you focus like that! Ready to tackle the next challenge?",
    "🔥 You're absolutely crushing it! That focused energy is your superpower.",
    "💎 Diamond-level focus! You're transforming your goals into reality, one session at a time.",
    "🌟 Stellar performance! You've just added another victory to your success story.",
];

const BREAK_COMPLETE: &[&str] = &[
    "⚡ Recharged and ready! Your mind is sharp and your energy is renewed. Let's make magic happen!",
    "🌱 That break was exactly what you needed! Now you're primed for another round of excellence.",
    "🔋 Battery at 100%! Your refreshed mind is ready to tackle any challenge that comes your way.",
    "🌈 Perfect timing! You're balanced, focused, and ready to turn your next session into pure gold.",
    "🎪 Break time well spent! Your creativity and focus are now perfectly aligned for success.",
    "🚀 Lift-off ready! That break has prepared you for another incredible journey of productivity.",
    "💫 Refreshed and revitalized! Your next focus session is going to be absolutely phenomenal.",
    "🎨 Your mind is now a blank canvas, ready to create something amazing in the next session!",
    "⚡ Lightning-charged and ready to strike! Your next session is going to be legendary.",
    "🌊 Riding the wave of perfect balance! Dive into your next session with renewed vigor.",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PepTalk {
    pub sequence: u64,
    pub kind: CompletionKind,
    pub message: String,
}

/// Pick a message for a completion kind.
pub fn pep_talk_message<R: Rng + ?Sized>(kind: CompletionKind, rng: &mut R) -> &'static str {
    let (pool, fallback) = match kind {
        CompletionKind::Focus => (
            FOCUS_COMPLETE,
            "🎉 Great job completing your focus session! Take a well-deserved break.",
        ),
        CompletionKind::Break => (
            BREAK_COMPLETE,
            "⚡ Break complete! You're refreshed and ready for another productive session.",
        ),
    };
    pool.choose(rng).copied().unwrap_or(fallback)
}

/// Keeps the most recent pep talks, newest first.
#[derive(Debug, Clone, Default)]
pub struct Motivator {
    history: VecDeque<PepTalk>,
    next_sequence: u64,
}

impl Motivator {
    pub fn new() -> Self {
        Self::default()
    }

    /// React to an engine event. Only completions produce a pep talk.
    pub fn on_event<R: Rng + ?Sized>(&mut self, event: &Event, rng: &mut R) -> Option<PepTalk> {
        let kind = event.completion()?;
        let talk = PepTalk {
            sequence: self.next_sequence,
            kind,
            message: pep_talk_message(kind, rng).to_string(),
        };
        self.next_sequence += 1;
        self.history.push_front(talk.clone());
        self.history.truncate(HISTORY_LEN);
        Some(talk)
    }

    pub fn recent(&self) -> impl Iterator<Item = &PepTalk> {
        self.history.iter()
    }

    /// Remove one pep talk. Returns whether it was present.
    pub fn dismiss(&mut self, sequence: u64) -> bool {
        let before = self.history.len();
        self.history.retain(|t| t.sequence != sequence);
        self.history.len() != before
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}
