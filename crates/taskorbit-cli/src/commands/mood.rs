use clap::Subcommand;
use serde_json::json;
use taskorbit_core::{Database, Mood};

#[derive(Subcommand)]
pub enum MoodAction {
    /// Show the current mood with a matching quote
    Get,
    /// Set the current mood (happy, amazing, neutral, sad)
    Set {
        mood: String,
    },
}

fn describe(mood: Mood) -> serde_json::Value {
    json!({
        "mood": mood,
        "quote": mood.quote(&mut rand::thread_rng()),
        "task_display_limit": mood.task_display_limit(),
        "focus_level": mood.focus_level(),
        "speech_rate": mood.speech_rate(),
    })
}

pub fn run(action: MoodAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut profile = db.load_profile()?;

    match action {
        MoodAction::Get => {}
        MoodAction::Set { mood } => {
            profile.mood = mood.parse()?;
            db.save_profile(&profile)?;
        }
    }
    println!("{}", serde_json::to_string_pretty(&describe(profile.mood))?);
    Ok(())
}
