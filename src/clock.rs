//! Time sources. The playback clock is the only authority for "now" inside a
//! session; audio position is never consulted.

use std::cell::Cell;
use std::rc::Rc;

use web_sys::window;

/// Millisecond wall clock. Must be monotonic non-decreasing in practice.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// `performance.now()` in the browser. Reads 0 where no window exists.
#[derive(Clone, Copy, Debug, Default)]
pub struct PerformanceClock;

impl Clock for PerformanceClock {
    fn now_ms(&self) -> f64 {
        window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0)
    }
}

/// Hand-driven clock for tests and replays. Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now_ms(&self) -> f64 {
        (**self).now_ms()
    }
}

/// Elapsed time since session start, captured once.
#[derive(Clone, Copy, Debug)]
pub struct PlaybackClock {
    start_ms: f64,    // clock reading at session start
    last_elapsed: f64, // highest elapsed value handed out
}

impl PlaybackClock {
    pub fn start(now: f64) -> Self {
        Self {
            start_ms: now,
            last_elapsed: 0.0,
        }
    }

    /// Elapsed ms at `now`. Never goes backwards: a regressing source is held
    /// at the last value.
    pub fn elapsed(&mut self, now: f64) -> f64 {
        let raw = now - self.start_ms;
        if raw < self.last_elapsed {
            log::debug!(
                "clock regressed by {:.3}ms; holding elapsed at {:.3}ms",
                self.last_elapsed - raw,
                self.last_elapsed
            );
            return self.last_elapsed;
        }
        self.last_elapsed = raw;
        raw
    }
}
