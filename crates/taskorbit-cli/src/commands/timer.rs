use std::time::Duration;

use chrono::Utc;
use clap::Subcommand;
use serde::{Deserialize, Serialize};
use serde_json::json;
use taskorbit_core::timer::SessionDurations;
use taskorbit_core::{Config, Database, Event, Motivator, PepTalk, SessionEngine, TickDriver};
use tracing::{debug, warn};

const ENGINE_KEY: &str = "timer_engine";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a focus interval, or resume a paused one
    Start,
    /// Pause the running interval
    Pause,
    /// Back to idle; completed-session counters are kept
    Reset,
    /// Print current timer state as JSON
    Status,
    /// Run in the foreground until the current cycle ends
    Run,
}

/// Engine plus its wall-clock anchor, persisted between invocations.
#[derive(Debug, Default, Serialize, Deserialize)]
struct TimerState {
    engine: SessionEngine,
    #[serde(default)]
    driver: TickDriver,
}

fn load_state(db: &Database, durations: SessionDurations) -> TimerState {
    let restored = match db.kv_get(ENGINE_KEY) {
        Ok(Some(json)) => match serde_json::from_str::<TimerState>(&json) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!(error = %e, "discarding unreadable timer state");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, "could not read timer state");
            None
        }
    };
    restored.unwrap_or_else(|| TimerState {
        engine: SessionEngine::new(durations),
        driver: TickDriver::new(),
    })
}

fn save_state(db: &Database, state: &TimerState) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(state)?;
    db.kv_set(ENGINE_KEY, &json)?;
    Ok(())
}

/// Record completed intervals and collect pep talks for them.
fn handle_events(
    db: &Database,
    config: &Config,
    events: &[Event],
    motivator: &mut Motivator,
) -> Result<Vec<PepTalk>, Box<dyn std::error::Error>> {
    let mut rng = rand::thread_rng();
    let mut talks = Vec::new();
    for event in events {
        if db.record_completion(event, Utc::now())?.is_none() {
            continue;
        }
        if config.ui.show_motivation {
            talks.extend(motivator.on_event(event, &mut rng));
        }
    }
    Ok(talks)
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let durations = config.durations()?;
    let db = Database::open()?;
    let mut state = load_state(&db, durations);
    let mut motivator = Motivator::new();

    // Settle intervals that ran out since the last command before new
    // lengths apply; completions carry the length each interval ran with.
    let now = Utc::now();
    let mut events = state.driver.catch_up(&mut state.engine, now);
    let talks = handle_events(&db, &config, &events, &mut motivator)?;
    state.engine.set_durations(durations);

    let command_event = match action {
        TimerAction::Start => state.engine.start(),
        TimerAction::Pause => state.engine.pause(),
        TimerAction::Reset => Some(state.engine.reset()),
        TimerAction::Status => None,
        TimerAction::Run => {
            for event in &events {
                println!("{}", serde_json::to_string(event)?);
            }
            for talk in &talks {
                println!("{}", serde_json::to_string(talk)?);
            }
            return run_foreground(&db, &config, state, motivator);
        }
    };
    events.extend(command_event);
    state.driver.sync(&state.engine, now);
    save_state(&db, &state)?;

    let output = json!({
        "snapshot": state.engine.snapshot(),
        "events": events,
        "pep_talks": talks,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Tick once a second until the engine stops, printing one JSON line per event.
fn run_foreground(
    db: &Database,
    config: &Config,
    mut state: TimerState,
    mut motivator: Motivator,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(event) = state.engine.start() {
        println!("{}", serde_json::to_string(&event)?);
    }
    state.driver.sync(&state.engine, Utc::now());
    save_state(db, &state)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    runtime.block_on(async {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        while state.engine.is_running() {
            interval.tick().await;
            let events = state.driver.catch_up(&mut state.engine, Utc::now());
            if events.is_empty() {
                continue;
            }
            let talks = handle_events(db, config, &events, &mut motivator)?;
            for event in &events {
                println!("{}", serde_json::to_string(event)?);
            }
            for talk in &talks {
                println!("{}", serde_json::to_string(talk)?);
            }
            save_state(db, &state)?;
        }
        debug!("foreground timer finished");
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    save_state(db, &state)?;
    println!("{}", serde_json::to_string(&state.engine.snapshot())?);
    Ok(())
}
