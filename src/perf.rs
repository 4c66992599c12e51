//! Stage timing for the data pipeline.
//!
//! Every re-derivation runs ingestion, filtering, paging and chart building
//! from scratch, so a slow stage is worth a log line. Timers are cheap enough
//! to leave on in release builds; with the `profiling` feature every stage is
//! traced, not just the slow ones.
//!
//! ```ignore
//! use csvscope::perf::ScopedTimer;
//!
//! fn filter_rows() {
//!     let _timer = ScopedTimer::new("filter", 50.0);
//!     // ... work ...
//! }
//! ```

use std::time::Instant;
use tracing::warn;
#[cfg(feature = "profiling")]
use tracing::trace;

/// Time a scope, logging when it exceeds a threshold.
///
/// Expands to nothing but the name evaluation when the `profiling` feature
/// is off.
#[macro_export]
macro_rules! profile_scope {
    ($name:expr) => {
        #[cfg(feature = "profiling")]
        let _timer = $crate::perf::ScopedTimer::new($name, 0.0);
        #[cfg(not(feature = "profiling"))]
        let _ = $name;
    };
}

pub use crate::profile_scope;

/// RAII timer: logs on drop when the scope took longer than `threshold_ms`
pub struct ScopedTimer {
    name: &'static str,
    start: Instant,
    threshold_ms: f64,
}

impl ScopedTimer {
    pub fn new(name: &'static str, threshold_ms: f64) -> Self {
        Self {
            name,
            start: Instant::now(),
            threshold_ms,
        }
    }

    /// Milliseconds since the timer started
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();

        #[cfg(feature = "profiling")]
        trace!("[PERF] {}: {:.2}ms", self.name, elapsed_ms);

        if elapsed_ms > self.threshold_ms {
            warn!(
                stage = self.name,
                elapsed_ms = format!("{:.2}", elapsed_ms),
                threshold_ms = format!("{:.2}", self.threshold_ms),
                "Slow stage"
            );
        }
    }
}

/// Run `f` and return its result with the elapsed milliseconds
#[inline]
pub fn measure<T, F: FnOnce() -> T>(f: F) -> (T, f64) {
    let start = Instant::now();
    let result = f();
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    (result, elapsed_ms)
}

/// Run `f`, warning if it exceeds `threshold_ms`
#[inline]
pub fn measure_and_log<T, F: FnOnce() -> T>(name: &str, threshold_ms: f64, f: F) -> T {
    let (result, elapsed_ms) = measure(f);
    if elapsed_ms > threshold_ms {
        warn!(
            stage = name,
            elapsed_ms = format!("{:.2}", elapsed_ms),
            threshold_ms = format!("{:.2}", threshold_ms),
            "Slow stage"
        );
    }
    result
}
