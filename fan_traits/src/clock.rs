use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Time source for the control loop.
///
/// The loop only ever sleeps a fixed period between cycles, so the trait stays
/// small: a monotonic `now()` and a `sleep()` that implementations may simulate.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    /// Milliseconds elapsed since `epoch`, saturating at 0.
    fn ms_since(&self, epoch: Instant) -> u64 {
        let elapsed = self.now().saturating_duration_since(epoch);
        u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Wall-clock implementation backed by `Instant` and `thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if !d.is_zero() {
            thread::sleep(d);
        }
    }
}

#[derive(Debug, Default)]
struct ManualState {
    elapsed: Duration,
    sleeps: u64,
}

/// Deterministic clock for tests and simulation.
///
/// `sleep()` advances virtual time instantly. Clones share the same timeline,
/// so a test can keep a handle while the loop owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    state: Arc<Mutex<ManualState>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            state: Arc::new(Mutex::new(ManualState::default())),
        }
    }

    /// Move virtual time forward without counting a sleep.
    pub fn advance(&self, d: Duration) {
        if let Ok(mut st) = self.state.lock() {
            st.elapsed = st.elapsed.saturating_add(d);
        }
    }

    /// Total virtual time elapsed since construction.
    pub fn elapsed(&self) -> Duration {
        self.state.lock().map(|st| st.elapsed).unwrap_or_default()
    }

    /// Number of `sleep()` calls observed so far.
    pub fn sleeps(&self) -> u64 {
        self.state.lock().map(|st| st.sleeps).unwrap_or(0)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn sleep(&self, d: Duration) {
        if let Ok(mut st) = self.state.lock() {
            st.elapsed = st.elapsed.saturating_add(d);
            st.sleeps = st.sleeps.saturating_add(1);
        }
    }
}
