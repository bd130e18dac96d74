//! Task record and its value types.
//!
//! A [`Task`] is what the host persists after the phrase interpreter has
//! produced a [`ParsedTask`](crate::parser::ParsedTask).

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::parser::ParsedTask;

/// Life area a task belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Work,
    Health,
    Learning,
    Shopping,
    Social,
    Personal,
    Travel,
    Finance,
    #[default]
    General,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Work,
        Category::Health,
        Category::Learning,
        Category::Shopping,
        Category::Social,
        Category::Personal,
        Category::Travel,
        Category::Finance,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Health => "Health",
            Category::Learning => "Learning",
            Category::Shopping => "Shopping",
            Category::Social => "Social",
            Category::Personal => "Personal",
            Category::Travel => "Travel",
            Category::Finance => "Finance",
            Category::General => "General",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "category".into(),
                message: format!("unknown category '{s}'"),
            })
    }
}

/// Task priority, 1 (minimal) through 5 (urgent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const MINIMAL: Priority = Priority(1);
    pub const LOW: Priority = Priority(2);
    pub const NORMAL: Priority = Priority(3);
    pub const HIGH: Priority = Priority(4);
    pub const URGENT: Priority = Priority(5);

    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if (1..=5).contains(&value) {
            Ok(Priority(value))
        } else {
            Err(ValidationError::OutOfRange {
                field: "priority",
                min: 1,
                max: 5,
                value: value as i64,
            })
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::NORMAL
    }
}

impl TryFrom<u8> for Priority {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Priority::new(value)
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> Self {
        p.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub due_date: Option<DateTime<FixedOffset>>,
    pub category: Category,
    pub priority: Priority,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Build a fresh, incomplete task from an interpreter result.
    pub fn from_parsed(parsed: ParsedTask, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: parsed.title,
            due_date: parsed.due_date,
            category: parsed.category,
            priority: parsed.priority,
            completed: false,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Flip completion. Returns true when the task became completed.
    pub fn toggle(&mut self, now: DateTime<Utc>) -> bool {
        self.completed = !self.completed;
        self.updated_at = now;
        self.completed_at = self.completed.then_some(now);
        self.completed
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("work".parse::<Category>().unwrap(), Category::Work);
        assert_eq!(" FINANCE ".parse::<Category>().unwrap(), Category::Finance);
        assert!("chores".parse::<Category>().is_err());
        assert_eq!(Category::default(), Category::General);
    }

    #[test]
    fn priority_rejects_out_of_range() {
        assert!(Priority::new(0).is_err());
        assert!(Priority::new(6).is_err());
        assert_eq!(Priority::new(5).unwrap(), Priority::URGENT);
        assert!(serde_json::from_str::<Priority>("9").is_err());
        assert_eq!(serde_json::to_string(&Priority::HIGH).unwrap(), "4");
    }

    #[test]
    fn toggle_tracks_completion_time() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let mut task = Task::from_parsed(
            ParsedTask {
                title: "Write notes".into(),
                due_date: None,
                category: Category::Learning,
                priority: Priority::NORMAL,
            },
            now,
        );
        assert!(task.toggle(now));
        assert_eq!(task.completed_at, Some(now));
        assert!(!task.toggle(now));
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn overdue_only_when_incomplete_and_past_due() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let past = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 4, 30, 9, 0, 0)
            .unwrap();
        let mut task = Task::from_parsed(
            ParsedTask {
                title: "Pay rent".into(),
                due_date: Some(past),
                category: Category::Finance,
                priority: Priority::HIGH,
            },
            now,
        );
        assert!(task.is_overdue(now));
        task.toggle(now);
        assert!(!task.is_overdue(now));
    }
}
