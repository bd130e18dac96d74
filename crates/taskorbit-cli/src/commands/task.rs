use chrono::{Local, Utc};
use clap::Subcommand;
use serde_json::json;
use taskorbit_core::error::DatabaseError;
use taskorbit_core::gamification::{new_badges, StreakTracker};
use taskorbit_core::{Config, Database, Task};

use super::local_now;

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a task from a natural-language phrase
    Add {
        /// Phrase, e.g. "Urgent: finish report by 5pm today"
        #[arg(required = true, num_args = 1..)]
        phrase: Vec<String>,
        /// Print the interpretation without saving
        #[arg(long)]
        dry_run: bool,
    },
    /// List tasks, newest first
    List {
        /// Ignore the display limit
        #[arg(long)]
        all: bool,
        /// Only incomplete tasks
        #[arg(long)]
        pending: bool,
    },
    /// Toggle a task's completion
    Done {
        /// Task ID
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

fn not_found(id: &str) -> DatabaseError {
    DatabaseError::NotFound {
        entity: "task",
        id: id.to_string(),
    }
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    match action {
        TaskAction::Add { phrase, dry_run } => {
            let parser = config.task_parser()?;
            let parsed = parser.parse(&phrase.join(" "), local_now())?;
            if dry_run {
                println!("{}", serde_json::to_string_pretty(&parsed)?);
                return Ok(());
            }
            let db = Database::open()?;
            let task = Task::from_parsed(parsed, Utc::now());
            db.insert_task(&task)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List { all, pending } => {
            let db = Database::open()?;
            let mut tasks = db.list_tasks()?;
            if pending {
                tasks.retain(|t| !t.completed);
            }
            if !all {
                let limit = match config.ui.task_display_limit {
                    Some(limit) => limit,
                    None => db.load_profile()?.mood.task_display_limit(),
                };
                tasks.truncate(limit);
            }
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
        TaskAction::Done { id } => {
            let db = Database::open()?;
            let mut task = db.get_task(&id)?.ok_or_else(|| not_found(&id))?;
            let completed = task.toggle(Utc::now());
            db.update_task(&task)?;

            let mut profile = db.load_profile()?;
            let mut earned = Vec::new();
            if completed {
                StreakTracker::record_activity(&mut profile, Local::now().date_naive());
                let completed_tasks = db.count_completed_tasks()?;
                earned = profile.award(&new_badges(
                    &profile.badges,
                    profile.streak_count,
                    completed_tasks,
                ));
                db.save_profile(&profile)?;
            }

            let output = json!({
                "task": task,
                "streak": StreakTracker::current(&profile, Local::now().date_naive()),
                "new_badges": earned,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        TaskAction::Delete { id } => {
            let db = Database::open()?;
            if !db.delete_task(&id)? {
                return Err(not_found(&id).into());
            }
            println!("{}", json!({ "deleted": id }));
        }
    }
    Ok(())
}
