//! Streaks, badges and achievements.
//!
//! A streak counts consecutive calendar days with at least one completed
//! task. Badges unlock when the streak or the number of completed tasks
//! crosses a fixed threshold; achievements report progress towards the
//! next one.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::mood::Mood;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeKind {
    Streak,
    Tasks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub requirement: u32,
    pub kind: BadgeKind,
    pub rarity: Rarity,
}

const fn badge(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    requirement: u32,
    kind: BadgeKind,
    rarity: Rarity,
) -> Badge {
    Badge {
        id,
        name,
        description,
        icon,
        requirement,
        kind,
        rarity,
    }
}

/// Every badge, streak badges first, each group in ascending threshold.
pub const BADGES: &[Badge] = &[
    badge("streak-3", "Momentum Builder", "Complete tasks for 3 consecutive days", "🔥", 3, BadgeKind::Streak, Rarity::Common),
    badge("streak-5", "Consistency Champion", "Complete tasks for 5 consecutive days", "⚡", 5, BadgeKind::Streak, Rarity::Common),
    badge("streak-7", "Weekly Warrior", "Complete tasks for 7 consecutive days", "🏆", 7, BadgeKind::Streak, Rarity::Rare),
    badge("streak-14", "Fortnight Force", "Complete tasks for 14 consecutive days", "💎", 14, BadgeKind::Streak, Rarity::Rare),
    badge("streak-21", "Habit Architect", "Complete tasks for 21 consecutive days", "🌟", 21, BadgeKind::Streak, Rarity::Epic),
    badge("streak-30", "Monthly Master", "Complete tasks for 30 consecutive days", "👑", 30, BadgeKind::Streak, Rarity::Epic),
    badge("streak-50", "Unstoppable Force", "Complete tasks for 50 consecutive days", "🚀", 50, BadgeKind::Streak, Rarity::Legendary),
    badge("streak-100", "Centurion Legend", "Complete tasks for 100 consecutive days", "🌈", 100, BadgeKind::Streak, Rarity::Legendary),
    badge("tasks-10", "Getting Started", "Complete 10 tasks", "✅", 10, BadgeKind::Tasks, Rarity::Common),
    badge("tasks-25", "Task Tackler", "Complete 25 tasks", "📋", 25, BadgeKind::Tasks, Rarity::Common),
    badge("tasks-50", "Productivity Pro", "Complete 50 tasks", "⚡", 50, BadgeKind::Tasks, Rarity::Rare),
    badge("tasks-100", "Task Terminator", "Complete 100 tasks", "🎯", 100, BadgeKind::Tasks, Rarity::Epic),
    badge("tasks-250", "Completion Conqueror", "Complete 250 tasks", "🏅", 250, BadgeKind::Tasks, Rarity::Legendary),
];

pub fn find_badge(id: &str) -> Option<&'static Badge> {
    BADGES.iter().find(|b| b.id == id)
}

fn milestones(kind: BadgeKind) -> impl Iterator<Item = u32> {
    BADGES
        .iter()
        .filter(move |b| b.kind == kind)
        .map(|b| b.requirement)
}

fn next_milestone(kind: BadgeKind, current: u32) -> u32 {
    milestones(kind)
        .find(|&m| m > current)
        .or_else(|| milestones(kind).max())
        .unwrap_or(0)
}

/// Smallest streak milestone above `current`, or the top one.
pub fn next_streak_milestone(current: u32) -> u32 {
    next_milestone(BadgeKind::Streak, current)
}

/// Smallest task-count milestone above `current`, or the top one.
pub fn next_task_milestone(current: u32) -> u32 {
    next_milestone(BadgeKind::Tasks, current)
}

/// Badges whose threshold is met and that are not in `earned`.
pub fn new_badges(earned: &[String], streak: u32, completed_tasks: u32) -> Vec<&'static Badge> {
    BADGES
        .iter()
        .filter(|b| {
            let progress = match b.kind {
                BadgeKind::Streak => streak,
                BadgeKind::Tasks => completed_tasks,
            };
            progress >= b.requirement && !earned.iter().any(|e| e == b.id)
        })
        .collect()
}

/// Progress towards the next badge of one kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub progress: u32,
    pub max_progress: u32,
    pub completed: bool,
    pub badge: Option<&'static Badge>,
}

pub fn achievements(streak: u32, completed_tasks: u32) -> Vec<Achievement> {
    let entry = |id, title, description, kind, progress| {
        let max_progress = next_milestone(kind, progress);
        Achievement {
            id,
            title,
            description,
            progress,
            max_progress,
            completed: progress >= max_progress,
            badge: BADGES
                .iter()
                .find(|b| b.kind == kind && b.requirement == max_progress),
        }
    };
    vec![
        entry(
            "streak-progress",
            "Daily Consistency",
            "Build your daily task completion streak",
            BadgeKind::Streak,
            streak,
        ),
        entry(
            "task-progress",
            "Task Completion",
            "Complete more tasks to unlock badges",
            BadgeKind::Tasks,
            completed_tasks,
        ),
    ]
}

/// The single user's gamification state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub streak_count: u32,
    pub last_active_on: Option<NaiveDate>,
    /// Earned badge ids in the order they were earned.
    pub badges: Vec<String>,
    pub mood: Mood,
}

impl Profile {
    /// Record newly earned badges. Returns the ones actually added.
    pub fn award(&mut self, badges: &[&'static Badge]) -> Vec<&'static Badge> {
        let mut added = Vec::new();
        for badge in badges {
            if !self.badges.iter().any(|id| id == badge.id) {
                self.badges.push(badge.id.to_string());
                info!(badge = badge.id, name = badge.name, "badge earned");
                added.push(*badge);
            }
        }
        added
    }

    pub fn earned_badges(&self) -> Vec<&'static Badge> {
        self.badges.iter().filter_map(|id| find_badge(id)).collect()
    }

    pub fn available_badges(&self) -> Vec<&'static Badge> {
        BADGES
            .iter()
            .filter(|b| !self.badges.iter().any(|id| id == b.id))
            .collect()
    }
}

/// Daily streak bookkeeping.
pub struct StreakTracker;

impl StreakTracker {
    /// Count activity on `today`. Returns the new streak.
    ///
    /// Same day (or an earlier one): unchanged. The day after the last
    /// activity: +1.
    /// Anything else: the streak restarts at 1.
    pub fn record_activity(profile: &mut Profile, today: NaiveDate) -> u32 {
        let next = match profile.last_active_on {
            Some(last) if today <= last => profile.streak_count.max(1),
            Some(last) if last.succ_opt() == Some(today) => profile.streak_count + 1,
            _ => 1,
        };
        if next != profile.streak_count {
            info!(from = profile.streak_count, to = next, "streak updated");
        }
        profile.streak_count = next;
        profile.last_active_on = Some(profile.last_active_on.map_or(today, |d| d.max(today)));
        next
    }

    /// Streak as seen on `today`: zero once a whole day was missed.
    pub fn current(profile: &Profile, today: NaiveDate) -> u32 {
        match profile.last_active_on {
            Some(last) if today <= last || last.succ_opt() == Some(today) => profile.streak_count,
            _ => 0,
        }
    }
}
