//! Frame drivers.
//!
//! A driver supplies monotonic timestamps (ms) and is started/stopped by the
//! controller that owns it. Drivers are passive: the host pumps frames with
//! [`crate::Animation::frame`], which reads `now()` from the driver it holds.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::time::performance_now;

/// Per-animation driver instance.
pub trait Driver {
    fn start(&mut self);
    fn stop(&mut self);
    /// Current timestamp in ms.
    fn now(&self) -> f64;
}

/// Creates a fresh driver for each controller that needs one.
pub trait DriverFactory: fmt::Debug {
    fn create(&self) -> Box<dyn Driver>;
}

/// Ambient driver backed by the process-wide monotonic clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

struct SystemDriver;

// The clock always runs; start/stop have nothing to schedule.
impl Driver for SystemDriver {
    fn start(&mut self) {}

    fn stop(&mut self) {}

    fn now(&self) -> f64 {
        performance_now()
    }
}

impl DriverFactory for SystemClock {
    fn create(&self) -> Box<dyn Driver> {
        Box::new(SystemDriver)
    }
}

#[derive(Debug, Default)]
struct ClockState {
    now: Cell<f64>,
    running: Cell<usize>,
}

/// Host-advanced clock shared by every driver it creates.
///
/// Cloning shares the same timeline.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    state: Rc<ClockState>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(now_ms: f64) -> Self {
        let clock = Self::default();
        clock.set(now_ms);
        clock
    }

    #[inline]
    pub fn now(&self) -> f64 {
        self.state.now.get()
    }

    pub fn set(&self, now_ms: f64) {
        self.state.now.set(now_ms);
    }

    pub fn advance(&self, delta_ms: f64) {
        self.state.now.set(self.state.now.get() + delta_ms);
    }

    /// Number of drivers from this clock that are started and not stopped.
    pub fn running_drivers(&self) -> usize {
        self.state.running.get()
    }

    pub fn factory(&self) -> Rc<dyn DriverFactory> {
        Rc::new(self.clone())
    }
}

struct ManualDriver {
    state: Rc<ClockState>,
    running: bool,
}

impl ManualDriver {
    fn set_running(&mut self, running: bool) {
        if self.running == running {
            return;
        }
        self.running = running;
        let count = self.state.running.get();
        self.state
            .running
            .set(if running { count + 1 } else { count.saturating_sub(1) });
    }
}

impl Driver for ManualDriver {
    fn start(&mut self) {
        self.set_running(true);
    }

    fn stop(&mut self) {
        self.set_running(false);
    }

    fn now(&self) -> f64 {
        self.state.now.get()
    }
}

impl Drop for ManualDriver {
    fn drop(&mut self) {
        self.set_running(false);
    }
}

impl DriverFactory for ManualClock {
    fn create(&self) -> Box<dyn Driver> {
        Box::new(ManualDriver {
            state: Rc::clone(&self.state),
            running: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_drivers_share_the_clock() {
        let clock = ManualClock::starting_at(100.0);
        let a = clock.create();
        let b = clock.create();
        clock.advance(16.0);
        assert_eq!(a.now(), 116.0);
        assert_eq!(b.now(), 116.0);
    }

    #[test]
    fn running_count_tracks_start_stop_and_drop() {
        let clock = ManualClock::new();
        let mut a = clock.create();
        let mut b = clock.create();
        a.start();
        a.start();
        b.start();
        assert_eq!(clock.running_drivers(), 2);
        a.stop();
        assert_eq!(clock.running_drivers(), 1);
        drop(b);
        assert_eq!(clock.running_drivers(), 0);
    }

    #[test]
    fn system_clock_advances() {
        let driver = SystemClock.create();
        let t0 = driver.now();
        assert!(driver.now() >= t0);
    }
}
