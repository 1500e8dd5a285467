//! Single-value playback controller.
//!
//! [`Animation`] turns driver timestamps into generator-local elapsed time
//! (delay, repeat with loop/reverse/mirror, signed speed, scrubbing and
//! pause/resume), samples the active generator and reports the value to the
//! update hook. All state is owned here and only changes through `&mut self`
//! methods.

use std::rc::Rc;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::completion::{CompletionSignal, Finished};
use crate::config::Config;
use crate::driver::{Driver, DriverFactory, SystemClock};
use crate::duration::calc_generator_duration;
use crate::error::{ensure_finite, MotionError};
use crate::generators::{AnimationState, Generator};
use crate::options::{AnimationOptions, Hooks, RepeatType};
use crate::time::{millis_to_seconds, round_half_up, seconds_to_millis};
use crate::value::Animatable;

/// Playback state of an [`Animation`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayState {
    #[default]
    Idle,
    Running,
    Paused,
    Finished,
}

impl PlayState {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Finished => "finished",
        }
    }
}

/// Whether a step comes from the driver (hooks and completion apply) or from
/// [`Animation::sample`] (pure evaluation at a time).
#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Frame,
    Sample,
}

/// Playback controller for one animated value.
///
/// Owns the generator(s), hooks and driver; the host advances it with
/// [`Animation::frame`] or [`Animation::tick`].
pub struct Animation<V: Animatable> {
    generator: Box<dyn Generator<V>>,
    mirrored: Option<Box<dyn Generator<V>>>,
    first_keyframe: V,
    hooks: Hooks<V>,
    config: Config,

    driver_factory: Rc<dyn DriverFactory>,
    driver: Option<Box<dyn Driver>>,

    delay: f64,
    /// `f64::INFINITY` when repeating forever.
    repeat: f64,
    repeat_delay: f64,
    repeat_type: RepeatType,

    /// Single-iteration duration as known at construction.
    calculated_duration: Option<f64>,
    resolved_duration: f64,
    total_duration: f64,

    speed: f64,
    has_stopped: bool,
    play_state: PlayState,
    start_time: Option<f64>,
    hold_time: Option<f64>,
    cancel_time: Option<f64>,
    current_time: f64,

    completion: CompletionSignal,
}

impl<V: Animatable> Animation<V> {
    /// Build with the default [`Config`]. Starts playing if `options.autoplay`.
    pub fn new(options: AnimationOptions<V>, hooks: Hooks<V>) -> Result<Self, MotionError> {
        Self::with_config(options, hooks, Config::default())
    }

    pub fn with_config(
        options: AnimationOptions<V>,
        hooks: Hooks<V>,
        config: Config,
    ) -> Result<Self, MotionError> {
        let generator = options.generator.build(&options.keyframes)?;
        let mirrored = if options.repeat_type == RepeatType::Mirror {
            let reversed: Vec<V> = options.keyframes.iter().rev().cloned().collect();
            Some(options.generator.with_negated_velocity().build(&reversed)?)
        } else {
            None
        };
        Self::from_generators(options, hooks, config, generator, mirrored)
    }

    /// Build around caller-supplied generators. `options.generator` is
    /// ignored; `mirrored` is required when repeating in mirror mode.
    pub fn from_generators(
        options: AnimationOptions<V>,
        hooks: Hooks<V>,
        config: Config,
        mut generator: Box<dyn Generator<V>>,
        mirrored: Option<Box<dyn Generator<V>>>,
    ) -> Result<Self, MotionError> {
        let first_keyframe = options
            .keyframes
            .first()
            .cloned()
            .ok_or(MotionError::EmptyKeyframes)?;
        let delay = ensure_finite("delay", options.delay)?;
        let repeat_delay = ensure_finite("repeatDelay", options.repeat_delay)?;
        if options.repeat_type == RepeatType::Mirror && mirrored.is_none() {
            return Err(MotionError::invalid(
                "repeatType",
                "mirror requires a mirrored generator",
            ));
        }

        let repeat = options.repeat.as_f64();
        if generator.calculated_duration().is_none() && repeat > 0.0 {
            let duration = calc_generator_duration(generator.as_mut(), &config);
            generator.set_calculated_duration(duration);
        }
        let calculated_duration = generator.calculated_duration();
        let (resolved_duration, total_duration) = match calculated_duration {
            Some(duration) => {
                let resolved = duration + repeat_delay;
                let total = if repeat.is_infinite() {
                    f64::INFINITY
                } else {
                    resolved * (repeat + 1.0) - repeat_delay
                };
                (resolved, total)
            }
            None => (f64::INFINITY, f64::INFINITY),
        };

        let mut animation = Self {
            generator,
            mirrored,
            first_keyframe,
            hooks,
            config,
            driver_factory: options
                .driver
                .unwrap_or_else(|| Rc::new(SystemClock) as Rc<dyn DriverFactory>),
            driver: None,
            delay,
            repeat,
            repeat_delay,
            repeat_type: options.repeat_type,
            calculated_duration,
            resolved_duration,
            total_duration,
            speed: 1.0,
            has_stopped: false,
            play_state: PlayState::Idle,
            start_time: None,
            hold_time: None,
            cancel_time: None,
            current_time: 0.0,
            completion: CompletionSignal::new(),
        };
        debug!(
            "animation built: duration={:?}ms total={}ms repeat={} ({:?})",
            animation.calculated_duration, animation.total_duration, animation.repeat, animation.repeat_type
        );
        if options.autoplay {
            animation.play();
        }
        Ok(animation)
    }

    /// Advance to `timestamp` (driver ms). `None` until the first `play`.
    pub fn tick(&mut self, timestamp: f64) -> Option<AnimationState<V>> {
        self.step(timestamp, Mode::Frame)
    }

    /// Tick at the held driver's current time. `None` when no driver is held
    /// (idle, stopped or finished).
    pub fn frame(&mut self) -> Option<AnimationState<V>> {
        let now = self.driver.as_ref()?.now();
        self.tick(now)
    }

    /// Evaluate the animation at `elapsed_ms` without hooks, hold time or
    /// state transitions. Playback timing is left as it was.
    pub fn sample(&mut self, elapsed_ms: f64) -> AnimationState<V> {
        let (start_time, current_time) = (self.start_time, self.current_time);
        self.start_time = Some(0.0);
        let state = self.step(elapsed_ms, Mode::Sample);
        self.start_time = start_time;
        self.current_time = current_time;
        match state {
            Some(state) => state,
            // Start time was set above.
            None => AnimationState::new(self.first_keyframe.clone(), false),
        }
    }

    fn step(&mut self, timestamp: f64, mode: Mode) -> Option<AnimationState<V>> {
        let mut start_time = self.start_time?;

        // Timestamps may arrive earlier than the recorded start.
        if self.speed > 0.0 {
            start_time = start_time.min(timestamp);
        }
        if self.speed < 0.0 {
            start_time = start_time.min(timestamp - self.total_duration / self.speed);
        }
        self.start_time = Some(start_time);

        let hold_time = match mode {
            Mode::Frame => self.hold_time,
            Mode::Sample => None,
        };
        self.current_time = match hold_time {
            Some(hold) => hold,
            None => round_half_up(timestamp - start_time) * self.speed,
        };

        let forward = self.speed >= 0.0;
        let time_without_delay = self.current_time - if forward { self.delay } else { -self.delay };
        let in_delay = if forward {
            time_without_delay < 0.0
        } else {
            time_without_delay > self.total_duration
        };
        self.current_time = time_without_delay.max(0.0);

        if mode == Mode::Frame && self.play_state == PlayState::Finished && hold_time.is_none() {
            self.current_time = self.total_duration;
        }

        let (elapsed, mirror) = self.iteration_time();

        let sampled = if in_delay {
            AnimationState::new(self.first_keyframe.clone(), false)
        } else {
            match (mirror, self.mirrored.as_mut()) {
                (true, Some(mirrored)) => mirrored.next(elapsed),
                _ => self.generator.next(elapsed),
            }
        };

        let mut done = sampled.done;
        if !in_delay && self.calculated_duration.is_some() && !self.generator.reports_own_completion() {
            done = if forward {
                self.current_time >= self.total_duration
            } else {
                self.current_time <= 0.0
            };
        }
        let state = AnimationState::new(sampled.value, done);
        trace!(
            "step t={} elapsed={} delay_phase={} done={}",
            self.current_time,
            elapsed,
            in_delay,
            done
        );

        if mode == Mode::Frame {
            let finished = hold_time.is_none()
                && (self.play_state == PlayState::Finished
                    || (self.play_state == PlayState::Running && done));
            self.hooks.emit_update(&state.value);
            if finished {
                self.finish();
            }
        }
        Some(state)
    }

    /// Generator-local elapsed time for `current_time`, and whether the
    /// mirrored generator should be sampled.
    fn iteration_time(&self) -> (f64, bool) {
        if self.repeat == 0.0 {
            return (self.current_time, false);
        }
        let progress = self.current_time / self.resolved_duration;
        let mut iteration = progress.floor();
        let mut iteration_progress = progress % 1.0;

        // Exactly on a boundary counts as the end of the previous iteration.
        if iteration_progress == 0.0 && progress >= 1.0 {
            iteration_progress = 1.0;
        }
        if iteration_progress == 1.0 {
            iteration -= 1.0;
        }
        iteration = iteration.min(self.repeat + 1.0);

        let odd = iteration % 2.0 != 0.0;
        let mut mirror = false;
        if odd {
            match self.repeat_type {
                RepeatType::Reverse => {
                    iteration_progress = 1.0 - iteration_progress;
                    if self.repeat_delay != 0.0 {
                        iteration_progress -= self.repeat_delay / self.resolved_duration;
                    }
                }
                RepeatType::Mirror => mirror = true,
                RepeatType::Loop => {}
            }
        }

        let mut p = iteration_progress.clamp(0.0, 1.0);
        if self.current_time > self.total_duration {
            p = if self.repeat_type == RepeatType::Reverse && odd { 1.0 } else { 0.0 };
        }
        (p * self.resolved_duration, mirror)
    }

    pub fn play(&mut self) {
        if self.has_stopped {
            return;
        }
        let factory = &self.driver_factory;
        let driver = self.driver.get_or_insert_with(|| factory.create());
        let now = driver.now();

        self.hooks.emit_play();

        if let Some(hold) = self.hold_time {
            self.start_time = Some(now - hold);
        } else if self.start_time.is_none() || self.play_state == PlayState::Finished {
            self.start_time = Some(now);
        }

        if self.play_state == PlayState::Finished {
            debug!("replaying finished animation");
            self.completion.rearm();
        }

        self.cancel_time = self.start_time;
        self.hold_time = None;
        self.play_state = PlayState::Running;
        debug!("play at {now}ms (start={:?})", self.start_time);

        if let Some(driver) = self.driver.as_mut() {
            driver.start();
        }
    }

    /// Freeze at the current time. The driver keeps ticking but reads the
    /// held time.
    pub fn pause(&mut self) {
        self.play_state = PlayState::Paused;
        self.hold_time = Some(self.current_time);
        debug!("pause at {}ms", self.current_time);
    }

    /// Tear down permanently; later `play` calls are ignored.
    pub fn stop(&mut self) {
        self.has_stopped = true;
        if self.play_state == PlayState::Idle {
            return;
        }
        self.play_state = PlayState::Idle;
        debug!("stop");
        self.hooks.emit_stop();
        self.reset();
    }

    /// Report the frame at the recorded cancel time, then reset to idle.
    pub fn cancel(&mut self) {
        if let Some(cancel_time) = self.cancel_time {
            self.tick(cancel_time);
        }
        debug!("cancel");
        self.reset();
    }

    /// Mark finished; the next tick samples the end state and completes.
    pub fn complete(&mut self) {
        self.play_state = PlayState::Finished;
        self.hold_time = None;
    }

    fn reset(&mut self) {
        self.play_state = PlayState::Idle;
        self.stop_driver();
        self.completion.resolve();
        self.completion.rearm();
        self.start_time = None;
        self.cancel_time = None;
        self.hold_time = None;
        self.current_time = 0.0;
    }

    fn finish(&mut self) {
        self.play_state = PlayState::Finished;
        debug!("finished at {}ms", self.current_time);
        self.hooks.emit_complete();
        self.stop_driver();
        self.completion.resolve();
    }

    fn stop_driver(&mut self) {
        if let Some(mut driver) = self.driver.take() {
            driver.stop();
        }
    }

    /// Current time in seconds.
    pub fn time(&self) -> f64 {
        millis_to_seconds(self.current_time)
    }

    /// Scrub to `seconds`. Held animations move their hold; running ones are
    /// rebased so the driver clock lands on the new time.
    pub fn set_time(&mut self, seconds: f64) {
        let time = seconds_to_millis(seconds);
        self.current_time = time;
        match self.driver.as_ref() {
            Some(driver) if self.hold_time.is_none() && self.speed != 0.0 => {
                self.start_time = Some(driver.now() - time / self.speed);
            }
            _ => self.hold_time = Some(time),
        }
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Change playback rate (negative plays backwards) without a visible jump.
    pub fn set_speed(&mut self, speed: f64) {
        if speed == self.speed {
            return;
        }
        self.speed = speed;
        if self.driver.is_some() {
            self.set_time(millis_to_seconds(self.current_time));
        }
    }

    /// Single-iteration duration in seconds, resolving and caching it on the
    /// generator if unknown. Timing already in use is not changed.
    pub fn duration(&mut self) -> f64 {
        let duration = match self.generator.calculated_duration() {
            Some(duration) => duration,
            None => {
                let duration = calc_generator_duration(self.generator.as_mut(), &self.config);
                self.generator.set_calculated_duration(duration);
                duration
            }
        };
        millis_to_seconds(duration)
    }

    pub fn state(&self) -> PlayState {
        self.play_state
    }

    /// Future for the current completion arm.
    pub fn finished(&self) -> Finished {
        self.completion.listen()
    }
}

impl<V: Animatable> std::fmt::Debug for Animation<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animation")
            .field("state", &self.play_state)
            .field("current_time", &self.current_time)
            .field("speed", &self.speed)
            .field("calculated_duration", &self.calculated_duration)
            .field("total_duration", &self.total_duration)
            .field("repeat", &self.repeat)
            .field("repeat_type", &self.repeat_type)
            .field("hooks", &self.hooks)
            .finish()
    }
}
