use chrono::Local;
use serde_json::json;
use taskorbit_core::gamification::StreakTracker;
use taskorbit_core::Database;

use super::local_day_start;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let sessions = db.session_stats(local_day_start())?;
    let profile = db.load_profile()?;
    let tasks = db.list_tasks()?;
    let completed = tasks.iter().filter(|t| t.completed).count();

    let output = json!({
        "sessions": sessions,
        "streak": StreakTracker::current(&profile, Local::now().date_naive()),
        "tasks_total": tasks.len(),
        "tasks_completed": completed,
        "tasks_pending": tasks.len() - completed,
        "badges_earned": profile.badges.len(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
