//! # TaskOrbit Core Library
//!
//! Core logic for TaskOrbit, a personal productivity companion. Every
//! operation is available through the standalone `taskorbit` CLI, which is
//! a thin layer over this library.
//!
//! ## Architecture
//!
//! - **Phrase interpreter**: Turns free-form text such as
//!   "Urgent: finish report by 5pm today" into a title, due date, category
//!   and priority, using an ordered table of regex rules
//! - **Session engine**: A tick-driven focus/break state machine; the caller
//!   invokes `tick()` once per second (or lets [`TickDriver`] catch up from
//!   the wall clock)
//! - **Gamification**: Daily streaks, badges and progress towards the next one
//! - **Storage**: SQLite persistence and TOML configuration
//!
//! ## Key Components
//!
//! - [`TaskParser`]: Phrase interpretation
//! - [`SessionEngine`]: Focus/break state machine
//! - [`Database`]: Tasks, profile and interval persistence
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod gamification;
pub mod mood;
pub mod motivation;
pub mod parser;
pub mod storage;
pub mod task;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError, ParseError, ValidationError};
pub use events::{CompletionKind, Event};
pub use gamification::{Badge, Profile, StreakTracker};
pub use mood::Mood;
pub use motivation::{Motivator, PepTalk};
pub use parser::{parse_task, ParsedTask, TaskParser};
pub use storage::{Config, Database, SessionStats};
pub use task::{Category, Priority, Task};
pub use timer::{SessionDurations, SessionEngine, SessionMode, SessionSnapshot, TickDriver};
