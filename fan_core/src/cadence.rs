//! Cycle counter that paces actuator updates.

/// Counts control cycles between actuator updates.
///
/// A tick fires when the counter, checked before it is incremented, exceeds
/// `update_every`; the counter then restarts from zero. With `update_every = N`
/// the first tick happens on cycle `N + 2` and then every `N + 1` cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cadence {
    counter: u32,
}

impl Cadence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cycles counted since the last tick.
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Account for one cycle; returns true when this cycle is a tick.
    pub fn poll(&mut self, update_every: u32) -> bool {
        let tick = self.counter > update_every;
        if tick {
            self.counter = 0;
        }
        self.counter = self.counter.saturating_add(1);
        tick
    }
}
