//! Inertia (decay): exponential glide from an incoming velocity, with optional
//! `min`/`max` bounds that bounce back through a spring.

use serde::{Deserialize, Serialize};

use super::spring::{calc_generator_velocity, SpringGenerator, SpringParams};
use super::{AnimationState, Generator};
use crate::error::{ensure_finite, MotionError};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InertiaParams {
    /// Units per second.
    pub velocity: f64,
    /// Scales velocity into travel distance.
    pub power: f64,
    /// Decay time constant in ms.
    pub time_constant: f64,
    pub bounce_damping: f64,
    pub bounce_stiffness: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub rest_delta: f64,
    pub rest_speed: Option<f64>,
}

impl Default for InertiaParams {
    fn default() -> Self {
        Self {
            velocity: 0.0,
            power: 0.8,
            time_constant: 325.0,
            bounce_damping: 10.0,
            bounce_stiffness: 500.0,
            min: None,
            max: None,
            rest_delta: 0.5,
            rest_speed: None,
        }
    }
}

impl InertiaParams {
    pub fn with_velocity(velocity: f64) -> Self {
        Self {
            velocity,
            ..Self::default()
        }
    }

    pub fn bounded(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }
}

#[derive(Clone, Debug)]
pub struct InertiaGenerator {
    target: f64,
    amplitude: f64,
    time_constant: f64,
    rest_delta: f64,
    rest_speed: Option<f64>,
    min: Option<f64>,
    max: Option<f64>,
    bounce_stiffness: f64,
    bounce_damping: f64,
    value: f64,
    done: bool,
    /// Bounce spring and the elapsed time it took over.
    bounce: Option<(f64, SpringGenerator)>,
    calculated_duration: Option<f64>,
}

impl InertiaGenerator {
    /// Decay starting from the first keyframe.
    pub fn new(keyframes: &[f64], params: &InertiaParams) -> Result<Self, MotionError> {
        let origin = *keyframes.first().ok_or(MotionError::EmptyKeyframes)?;
        let velocity = ensure_finite("velocity", params.velocity)?;
        let power = ensure_finite("power", params.power)?;
        let time_constant = ensure_finite("timeConstant", params.time_constant)?;
        if time_constant <= 0.0 {
            return Err(MotionError::invalid("timeConstant", "must be > 0"));
        }
        if ensure_finite("bounceStiffness", params.bounce_stiffness)? <= 0.0 {
            return Err(MotionError::invalid("bounceStiffness", "must be > 0"));
        }
        if ensure_finite("bounceDamping", params.bounce_damping)? < 0.0 {
            return Err(MotionError::invalid("bounceDamping", "must be >= 0"));
        }

        let amplitude = power * velocity;
        let mut gen = Self {
            target: origin + amplitude,
            amplitude,
            time_constant,
            rest_delta: ensure_finite("restDelta", params.rest_delta)?,
            rest_speed: params.rest_speed,
            min: params.min,
            max: params.max,
            bounce_stiffness: params.bounce_stiffness,
            bounce_damping: params.bounce_damping,
            value: origin,
            done: false,
            bounce: None,
            calculated_duration: None,
        };
        gen.catch_boundary(0.0);
        Ok(gen)
    }

    #[inline]
    fn delta(&self, t: f64) -> f64 {
        -self.amplitude * (-t / self.time_constant).exp()
    }

    #[inline]
    fn latest(&self, t: f64) -> f64 {
        self.target + self.delta(t)
    }

    fn apply_friction(&mut self, t: f64) {
        self.done = self.delta(t).abs() <= self.rest_delta;
        self.value = if self.done { self.target } else { self.latest(t) };
    }

    fn is_out_of_bounds(&self, v: f64) -> bool {
        self.min.is_some_and(|min| v < min) || self.max.is_some_and(|max| v > max)
    }

    fn nearest_boundary(&self, v: f64) -> Option<f64> {
        match (self.min, self.max) {
            (Some(min), Some(max)) => Some(if (min - v).abs() < (max - v).abs() { min } else { max }),
            (min, max) => min.or(max),
        }
    }

    /// Switch to a bounce spring once the glide leaves the bounds.
    fn catch_boundary(&mut self, t: f64) {
        if !self.is_out_of_bounds(self.value) {
            return;
        }
        let Some(boundary) = self.nearest_boundary(self.value) else {
            return;
        };
        let params = SpringParams {
            stiffness: Some(self.bounce_stiffness),
            damping: Some(self.bounce_damping),
            rest_delta: Some(self.rest_delta),
            rest_speed: self.rest_speed,
            velocity: calc_generator_velocity(|at| self.latest(at), t, self.value),
            ..SpringParams::default()
        };
        match SpringGenerator::new(&[self.value, boundary], &params) {
            Ok(spring) => {
                log::trace!("inertia: hit boundary {boundary} at {t}ms");
                self.bounce = Some((t, spring));
            }
            Err(err) => log::debug!("inertia: bounce spring rejected: {err}"),
        }
    }
}

impl Generator<f64> for InertiaGenerator {
    fn next(&mut self, elapsed_ms: f64) -> AnimationState<f64> {
        let t = elapsed_ms;
        let mut updated = false;
        if self.bounce.is_none() {
            updated = true;
            self.apply_friction(t);
            self.catch_boundary(t);
        }
        if let Some((reached_at, spring)) = self.bounce.as_mut() {
            if t >= *reached_at {
                return spring.next(t - *reached_at);
            }
        }
        if !updated {
            self.apply_friction(t);
        }
        AnimationState::new(self.value, self.done)
    }

    fn calculated_duration(&self) -> Option<f64> {
        self.calculated_duration
    }

    fn set_calculated_duration(&mut self, duration_ms: f64) {
        self.calculated_duration = Some(duration_ms);
    }
}
