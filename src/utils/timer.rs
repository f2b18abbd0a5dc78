//! Scoped phase timing
//!
//! The pipeline measures its export and upload phases separately. `timed`
//! runs a closure against a monotonic clock and returns the value together
//! with the elapsed duration, on every exit path the closure can take.

use std::time::{Duration, Instant};

/// Run `f` and measure how long it took.
pub fn timed<T, F: FnOnce() -> T>(f: F) -> (T, Duration) {
    let start = Instant::now();
    let value = f();
    (value, start.elapsed())
}
