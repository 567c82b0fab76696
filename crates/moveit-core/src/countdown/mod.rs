mod engine;
mod tick;

pub use engine::{
    Countdown, CountdownPhase, CountdownView, CycleListener, DEFAULT_DURATION_SECS,
};
pub use tick::{wait_for_tick, TickHandle, TICK_INTERVAL};
