pub mod badges;
pub mod config;
pub mod mood;
pub mod stats;
pub mod task;
pub mod timer;

use chrono::{DateTime, Local, NaiveTime, Utc};

/// Current time in the system zone, used as the interpreter's reference.
///
/// Kept zone-aware so "tomorrow" picks up the offset in force tomorrow.
pub fn local_now() -> DateTime<Local> {
    Local::now()
}

/// Start of the local calendar day, in UTC.
pub fn local_day_start() -> DateTime<Utc> {
    let now = Local::now();
    now.with_time(NaiveTime::MIN)
        .earliest()
        .map_or_else(|| now.with_timezone(&Utc), |start| start.with_timezone(&Utc))
}
