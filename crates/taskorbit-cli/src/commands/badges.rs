use chrono::Local;
use serde_json::json;
use taskorbit_core::gamification::{achievements, StreakTracker};
use taskorbit_core::Database;

pub fn run(available: bool) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let profile = db.load_profile()?;
    let streak = StreakTracker::current(&profile, Local::now().date_naive());
    let completed = db.count_completed_tasks()?;

    let badges = if available {
        profile.available_badges()
    } else {
        profile.earned_badges()
    };
    let output = json!({
        "badges": badges,
        "achievements": achievements(streak, completed),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
