//! Damped harmonic spring.
//!
//! Closed-form solution of a mass on a spring, either from physical
//! parameters (stiffness/damping/mass) or from a perceptual duration/bounce
//! pair that is converted to physical parameters by root finding.

use serde::{Deserialize, Serialize};

use super::{AnimationState, Generator};
use crate::error::{ensure_finite, MotionError};
use crate::time::{millis_to_seconds, seconds_to_millis, velocity_per_second};

const DEFAULT_STIFFNESS: f64 = 100.0;
const DEFAULT_DAMPING: f64 = 10.0;
const DEFAULT_MASS: f64 = 1.0;
const DEFAULT_DURATION_MS: f64 = 800.0;
const DEFAULT_BOUNCE: f64 = 0.25;

const SAFE_MIN: f64 = 0.001;
const MIN_DURATION_S: f64 = 0.01;
const MAX_DURATION_S: f64 = 10.0;
const MIN_DAMPING_RATIO: f64 = 0.05;
const MAX_DAMPING_RATIO: f64 = 1.0;
const ROOT_ITERATIONS: usize = 12;

/// Window used to estimate instantaneous velocity.
pub(crate) const VELOCITY_SAMPLE_MS: f64 = 5.0;

/// Spring parameters.
///
/// Setting any of `stiffness`/`damping`/`mass` selects the physical model.
/// Otherwise, setting `duration` or `bounce` derives the physics from those.
/// With nothing set the physical defaults (100/10/1) apply.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpringParams {
    pub stiffness: Option<f64>,
    pub damping: Option<f64>,
    pub mass: Option<f64>,
    /// Perceived duration in ms.
    pub duration: Option<f64>,
    /// 0 = no overshoot, 1 = very bouncy.
    pub bounce: Option<f64>,
    /// Incoming velocity in units per second.
    pub velocity: f64,
    pub rest_delta: Option<f64>,
    pub rest_speed: Option<f64>,
}

impl SpringParams {
    pub fn physics(stiffness: f64, damping: f64, mass: f64) -> Self {
        Self {
            stiffness: Some(stiffness),
            damping: Some(damping),
            mass: Some(mass),
            ..Self::default()
        }
    }

    pub fn from_duration(duration_ms: f64, bounce: f64) -> Self {
        Self {
            duration: Some(duration_ms),
            bounce: Some(bounce),
            ..Self::default()
        }
    }

    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = velocity;
        self
    }

    fn has_physics(&self) -> bool {
        self.stiffness.is_some() || self.damping.is_some() || self.mass.is_some()
    }

    fn has_duration(&self) -> bool {
        self.duration.is_some() || self.bounce.is_some()
    }
}

/// Physical parameters derived from a duration/bounce pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DerivedSpring {
    pub stiffness: f64,
    pub damping: f64,
    /// Clamped duration in ms.
    pub duration: f64,
}

#[inline]
fn angular_freq(undamped_freq: f64, damping_ratio: f64) -> f64 {
    undamped_freq * (1.0 - damping_ratio * damping_ratio).sqrt()
}

/// Newton's method on the settle envelope.
fn approximate_root(envelope: impl Fn(f64) -> f64, derivative: impl Fn(f64) -> f64, guess: f64) -> f64 {
    let mut result = guess;
    for _ in 1..ROOT_ITERATIONS {
        result -= envelope(result) / derivative(result);
    }
    result
}

/// Find stiffness/damping (mass 1 unless given) that settle in `duration_ms`
/// with the given `bounce`.
pub fn find_spring(duration_ms: f64, bounce: f64, velocity: f64, mass: f64) -> DerivedSpring {
    let damping_ratio = (1.0 - bounce).clamp(MIN_DAMPING_RATIO, MAX_DAMPING_RATIO);
    let duration = millis_to_seconds(duration_ms).clamp(MIN_DURATION_S, MAX_DURATION_S);

    let undamped_freq = if damping_ratio < 1.0 {
        let envelope = |w: f64| {
            let decay = w * damping_ratio;
            let a = decay - velocity;
            let b = angular_freq(w, damping_ratio);
            SAFE_MIN - (a / b) * (-decay * duration).exp()
        };
        let derivative = |w: f64| {
            let decay = w * damping_ratio;
            let delta = decay * duration;
            let d = delta * velocity + velocity;
            let e = damping_ratio.powi(2) * w.powi(2) * duration;
            let f = (-delta).exp();
            let g = angular_freq(w.powi(2), damping_ratio);
            let factor = if -envelope(w) + SAFE_MIN > 0.0 { -1.0 } else { 1.0 };
            factor * ((d - e) * f) / g
        };
        approximate_root(envelope, derivative, 5.0 / duration)
    } else {
        let envelope = |w: f64| -SAFE_MIN + (-w * duration).exp() * ((w - velocity) * duration + 1.0);
        let derivative = |w: f64| (-w * duration).exp() * (velocity - w) * duration * duration;
        approximate_root(envelope, derivative, 5.0 / duration)
    };

    let duration = seconds_to_millis(duration);
    if undamped_freq.is_nan() {
        DerivedSpring {
            stiffness: DEFAULT_STIFFNESS,
            damping: DEFAULT_DAMPING,
            duration,
        }
    } else {
        let stiffness = undamped_freq.powi(2) * mass;
        DerivedSpring {
            stiffness,
            damping: damping_ratio * 2.0 * (mass * stiffness).sqrt(),
            duration,
        }
    }
}

/// Estimate velocity (units/s) of `resolve` at `t` from the last few ms.
pub(crate) fn calc_generator_velocity(resolve: impl Fn(f64) -> f64, t: f64, current: f64) -> f64 {
    let prev_t = (t - VELOCITY_SAMPLE_MS).max(0.0);
    velocity_per_second(current - resolve(prev_t), t - prev_t)
}

#[derive(Clone, Copy, Debug)]
enum Damping {
    Under { angular_freq: f64 },
    Critical,
    Over { damped_freq: f64 },
}

#[derive(Clone, Debug)]
pub struct SpringGenerator {
    origin: f64,
    target: f64,
    /// Units per ms, sign-flipped to match the displacement convention.
    initial_velocity: f64,
    damping_ratio: f64,
    undamped_freq: f64,
    damping: Damping,
    rest_speed: f64,
    rest_delta: f64,
    /// Set when resolved from duration: completion is time based.
    resolved_duration: Option<f64>,
    calculated_duration: Option<f64>,
}

impl SpringGenerator {
    /// Spring from the first to the last keyframe.
    pub fn new(keyframes: &[f64], params: &SpringParams) -> Result<Self, MotionError> {
        let (origin, target) = match (keyframes.first(), keyframes.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Err(MotionError::EmptyKeyframes),
        };
        let velocity = ensure_finite("velocity", params.velocity)?;

        let (stiffness, damping, mass, velocity, resolved_duration) =
            if !params.has_physics() && params.has_duration() {
                let duration = ensure_finite("duration", params.duration.unwrap_or(DEFAULT_DURATION_MS))?;
                let bounce = ensure_finite("bounce", params.bounce.unwrap_or(DEFAULT_BOUNCE))?;
                let derived = find_spring(duration, bounce, velocity, DEFAULT_MASS);
                (derived.stiffness, derived.damping, DEFAULT_MASS, 0.0, Some(derived.duration))
            } else {
                (
                    ensure_finite("stiffness", params.stiffness.unwrap_or(DEFAULT_STIFFNESS))?,
                    ensure_finite("damping", params.damping.unwrap_or(DEFAULT_DAMPING))?,
                    ensure_finite("mass", params.mass.unwrap_or(DEFAULT_MASS))?,
                    velocity,
                    None,
                )
            };
        if stiffness <= 0.0 {
            return Err(MotionError::invalid("stiffness", "must be > 0"));
        }
        if mass <= 0.0 {
            return Err(MotionError::invalid("mass", "must be > 0"));
        }
        if damping < 0.0 {
            return Err(MotionError::invalid("damping", "must be >= 0"));
        }

        let initial_delta = target - origin;
        let granular = initial_delta.abs() < 5.0;
        let rest_speed = params
            .rest_speed
            .filter(|v| *v > 0.0)
            .unwrap_or(if granular { 0.01 } else { 2.0 });
        let rest_delta = params
            .rest_delta
            .filter(|v| *v > 0.0)
            .unwrap_or(if granular { 0.005 } else { 0.5 });

        let damping_ratio = damping / (2.0 * (stiffness * mass).sqrt());
        let undamped_freq = millis_to_seconds((stiffness / mass).sqrt());
        let damping = if damping_ratio < 1.0 {
            Damping::Under {
                angular_freq: angular_freq(undamped_freq, damping_ratio),
            }
        } else if damping_ratio == 1.0 {
            Damping::Critical
        } else {
            Damping::Over {
                damped_freq: undamped_freq * (damping_ratio * damping_ratio - 1.0).sqrt(),
            }
        };

        Ok(Self {
            origin,
            target,
            initial_velocity: -millis_to_seconds(velocity),
            damping_ratio,
            undamped_freq,
            damping,
            rest_speed,
            rest_delta,
            resolved_duration,
            calculated_duration: resolved_duration,
        })
    }

    /// Position at `t` ms.
    fn resolve(&self, t: f64) -> f64 {
        let delta = self.target - self.origin;
        let v0 = self.initial_velocity;
        let (zeta, w0) = (self.damping_ratio, self.undamped_freq);
        match self.damping {
            Damping::Under { angular_freq } => {
                let envelope = (-zeta * w0 * t).exp();
                self.target
                    - envelope
                        * (((v0 + zeta * w0 * delta) / angular_freq) * (angular_freq * t).sin()
                            + delta * (angular_freq * t).cos())
            }
            Damping::Critical => self.target - (-w0 * t).exp() * (delta + (v0 + w0 * delta) * t),
            Damping::Over { damped_freq } => {
                let envelope = (-zeta * w0 * t).exp();
                // sinh/cosh overflow past this.
                let freq_t = (damped_freq * t).min(300.0);
                self.target
                    - (envelope
                        * ((v0 + zeta * w0 * delta) * freq_t.sinh()
                            + damped_freq * delta * freq_t.cosh()))
                        / damped_freq
            }
        }
    }
}

impl Generator<f64> for SpringGenerator {
    fn next(&mut self, elapsed_ms: f64) -> AnimationState<f64> {
        let t = elapsed_ms;
        if t == f64::INFINITY {
            return AnimationState::new(self.target, true);
        }
        let current = self.resolve(t);
        let done = match self.resolved_duration {
            Some(duration) => t >= duration,
            None => {
                let velocity = if t == 0.0 {
                    self.initial_velocity
                } else if matches!(self.damping, Damping::Under { .. }) {
                    calc_generator_velocity(|at| self.resolve(at), t, current)
                } else {
                    0.0
                };
                velocity.abs() <= self.rest_speed && (self.target - current).abs() <= self.rest_delta
            }
        };
        AnimationState::new(if done { self.target } else { current }, done)
    }

    fn calculated_duration(&self) -> Option<f64> {
        self.calculated_duration
    }

    fn set_calculated_duration(&mut self, duration_ms: f64) {
        self.calculated_duration = Some(duration_ms);
    }
}
