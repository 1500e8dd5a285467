//! Time unit helpers.
//!
//! Generators and the controller work in milliseconds; the public control
//! surface reports seconds.

use std::sync::OnceLock;
use std::time::Instant;

#[inline]
pub fn seconds_to_millis(seconds: f64) -> f64 {
    seconds * 1000.0
}

#[inline]
pub fn millis_to_seconds(millis: f64) -> f64 {
    millis / 1000.0
}

/// Milliseconds since the first call in this process. Monotonic; shared by
/// every [`crate::SystemClock`] driver so their timestamps are comparable.
pub fn performance_now() -> f64 {
    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    let origin = ORIGIN.get_or_init(Instant::now);
    origin.elapsed().as_secs_f64() * 1000.0
}

/// Round to the nearest integer with ties going toward +∞.
///
/// Timestamps and start times are subtracted before comparing against
/// durations (3000.367 - 1000.367 = 2000.0000000000002), so elapsed time is
/// snapped to whole milliseconds.
#[inline]
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Velocity in units per second from a delta over `frame_ms`.
#[inline]
pub(crate) fn velocity_per_second(delta: f64, frame_ms: f64) -> f64 {
    if frame_ms != 0.0 {
        delta * (1000.0 / frame_ms)
    } else {
        0.0
    }
}
