//! Mood-based personalization.
//!
//! The user's self-reported mood scales how much the host shows at once and
//! which kind of work it nudges towards.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Amazing,
    #[default]
    Neutral,
    Sad,
}

/// How ambitious the suggested work should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusLevel {
    High,
    Medium,
    Low,
}

const HAPPY_QUOTES: &[&str] = &[
    "Your positive energy is lighting up everything around you! Keep shining and spreading those good vibes.",
    "Happiness is your superpower today! Use this amazing energy to tackle your biggest dreams.",
    "You're radiating joy and it's contagious! This is the perfect time to take on new challenges.",
    "Your smile is changing the world! Channel this beautiful energy into your most important goals.",
    "You're absolutely glowing with positivity! Let this happiness fuel your productivity and creativity.",
];

const AMAZING_QUOTES: &[&str] = &[
    "You're absolutely unstoppable today! This incredible energy you have is pure magic - use it wisely!",
    "What an amazing day to be you! Your enthusiasm is infectious and your potential is limitless.",
    "You're on fire with positivity! This is your moment to shine and achieve something extraordinary.",
    "Your energy is absolutely electric! Harness this incredible feeling to make today legendary.",
    "You're radiating pure awesomeness! This is the perfect time to chase your wildest dreams.",
];

const NEUTRAL_QUOTES: &[&str] = &[
    "Steady and balanced - you're in the perfect headspace for consistent progress and thoughtful decisions.",
    "Your calm energy is a strength. Use this balanced state to build solid foundations for your goals.",
    "Being centered is a superpower. Your steady approach will lead to lasting, meaningful progress.",
    "Your balanced mindset is perfect for tackling tasks methodically and building great habits.",
    "Steady wins the race! Your calm, focused energy is exactly what you need for sustainable success.",
];

const SAD_QUOTES: &[&str] = &[
    "It's okay to feel this way - you're human and your feelings are valid. Take things one small step at a time.",
    "Gentle days call for gentle progress. Be kind to yourself and celebrate every small victory.",
    "Your sensitivity is a gift, even when it feels heavy. Take care of yourself and trust that this will pass.",
    "Some days are for healing, not hustling. Honor where you are and be patient with yourself.",
    "You're stronger than you know, even in difficult moments. Small steps forward are still progress.",
];

const FALLBACK_QUOTE: &str =
    "Remember, every day is a new opportunity to grow and achieve your goals!";

impl Mood {
    pub const ALL: [Mood; 4] = [Mood::Happy, Mood::Amazing, Mood::Neutral, Mood::Sad];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Amazing => "amazing",
            Mood::Neutral => "neutral",
            Mood::Sad => "sad",
        }
    }

    /// How many open tasks to show before the list gets overwhelming.
    pub fn task_display_limit(&self) -> usize {
        match self {
            Mood::Happy | Mood::Amazing => 10,
            Mood::Neutral => 6,
            Mood::Sad => 3,
        }
    }

    pub fn focus_level(&self) -> FocusLevel {
        match self {
            Mood::Happy | Mood::Amazing => FocusLevel::High,
            Mood::Neutral => FocusLevel::Medium,
            Mood::Sad => FocusLevel::Low,
        }
    }

    /// Speech rate hint for a text-to-speech host.
    pub fn speech_rate(&self) -> f32 {
        match self {
            Mood::Amazing => 1.1,
            Mood::Sad => 0.9,
            Mood::Happy | Mood::Neutral => 1.0,
        }
    }

    fn quotes(&self) -> &'static [&'static str] {
        match self {
            Mood::Happy => HAPPY_QUOTES,
            Mood::Amazing => AMAZING_QUOTES,
            Mood::Neutral => NEUTRAL_QUOTES,
            Mood::Sad => SAD_QUOTES,
        }
    }

    /// A quote matching the mood, picked with the caller's RNG.
    pub fn quote<R: Rng + ?Sized>(&self, rng: &mut R) -> &'static str {
        self.quotes().choose(rng).copied().unwrap_or(FALLBACK_QUOTE)
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Mood::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "mood".into(),
                message: format!("expected one of happy, amazing, neutral, sad; got '{s}'"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn parses_known_moods_only() {
        assert_eq!("Happy".parse::<Mood>().unwrap(), Mood::Happy);
        assert_eq!(" sad ".parse::<Mood>().unwrap(), Mood::Sad);
        assert!("grumpy".parse::<Mood>().is_err());
    }

    #[test]
    fn display_limits_shrink_with_low_mood() {
        assert_eq!(Mood::Amazing.task_display_limit(), 10);
        assert_eq!(Mood::Neutral.task_display_limit(), 6);
        assert_eq!(Mood::Sad.task_display_limit(), 3);
        assert_eq!(Mood::Sad.focus_level(), FocusLevel::Low);
        assert_eq!(Mood::default(), Mood::Neutral);
    }

    #[test]
    fn quote_comes_from_the_mood_list() {
        let mut rng = StepRng::new(0, 1);
        for mood in Mood::ALL {
            let quote = mood.quote(&mut rng);
            assert!(mood.quotes().contains(&quote));
        }
    }
}
