mod driver;
mod durations;
mod engine;

pub use driver::TickDriver;
pub use durations::SessionDurations;
pub use engine::{format_time, RunState, SessionEngine, SessionMode, SessionSnapshot};
