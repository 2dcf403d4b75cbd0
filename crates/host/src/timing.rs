use std::time::Duration;

use types::SPEED_MS_RANGE;

/// Fixed interval of the worker's periodic driver.
pub const BASE_TICK: Duration = Duration::from_millis(10);

/// Down-samples base ticks into generations. One generation runs every
/// `speed_ms / 10` base ticks while unpaused.
pub struct GenerationClock {
    tick_count: u64,
    counter: u32,
    speed_ms: u32,
    paused: bool,
}

impl GenerationClock {
    pub fn new(speed_ms: u32) -> Self {
        Self {
            tick_count: 0,
            counter: 0,
            speed_ms: speed_ms.clamp(SPEED_MS_RANGE.0, SPEED_MS_RANGE.1),
            paused: false,
        }
    }

    /// Base ticks seen, paused or not.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn speed_ms(&self) -> u32 {
        self.speed_ms
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Base ticks per generation, never below one.
    pub fn ticks_per_generation(&self) -> u32 {
        (self.speed_ms / BASE_TICK.as_millis() as u32).max(1)
    }

    /// Advance one base tick. Returns true when a generation is due.
    pub fn generation_due(&mut self) -> bool {
        self.tick_count += 1;
        if self.paused {
            return false;
        }

        self.counter += 1;
        if self.counter < self.ticks_per_generation() {
            return false;
        }
        self.counter = 0;
        true
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn set_speed(&mut self, speed_ms: u32) {
        self.speed_ms = speed_ms.clamp(SPEED_MS_RANGE.0, SPEED_MS_RANGE.1);
    }

    pub fn reset(&mut self) {
        self.counter = 0;
        self.paused = false;
    }
}
