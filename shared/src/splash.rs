//! Startup counter shown over the page while the app gets ready.

pub const TICK_MS: u32 = 25;
pub const COMPLETE: u8 = 100;

/// Counter value after `elapsed_ms`: one percent per tick, capped at 100.
pub fn progress_at(elapsed_ms: f64) -> u8 {
    if elapsed_ms.is_nan() || elapsed_ms <= 0.0 {
        return 0;
    }
    if elapsed_ms.is_infinite() {
        return COMPLETE;
    }
    let ticks = (elapsed_ms / f64::from(TICK_MS)).floor();
    ticks.min(f64::from(COMPLETE)) as u8
}

/// The overlay lifts once the counter is full and the app can take uploads.
pub fn should_dismiss(progress: u8, ready: bool) -> bool {
    progress >= COMPLETE && ready
}
