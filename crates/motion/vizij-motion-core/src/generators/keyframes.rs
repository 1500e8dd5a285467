//! Keyframes (tween) generator: eased interpolation through keyframes over a
//! fixed duration.

use serde::{Deserialize, Serialize};

use super::{AnimationState, Generator};
use crate::easing::Easing;
use crate::error::{ensure_finite, MotionError};
use crate::interpolate::{default_offsets, Interpolator};
use crate::value::Animatable;

/// One easing for every segment, or one per segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EaseSpec {
    Single(Easing),
    PerSegment(Vec<Easing>),
}

impl Default for EaseSpec {
    fn default() -> Self {
        EaseSpec::Single(Easing::EaseInOut)
    }
}

impl EaseSpec {
    fn as_slice(&self) -> &[Easing] {
        match self {
            EaseSpec::Single(e) => std::slice::from_ref(e),
            EaseSpec::PerSegment(list) => list,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyframesParams {
    /// Duration in ms.
    pub duration: f64,
    pub ease: EaseSpec,
    /// Keyframe offsets in [0, 1]; ignored unless one per keyframe.
    pub times: Option<Vec<f64>>,
}

impl Default for KeyframesParams {
    fn default() -> Self {
        Self {
            duration: 300.0,
            ease: EaseSpec::default(),
            times: None,
        }
    }
}

impl KeyframesParams {
    pub fn with_duration(duration_ms: f64) -> Self {
        Self {
            duration: duration_ms,
            ..Self::default()
        }
    }

    pub fn linear(duration_ms: f64) -> Self {
        Self {
            duration: duration_ms,
            ease: EaseSpec::Single(Easing::Linear),
            times: None,
        }
    }
}

#[derive(Debug)]
pub struct KeyframesGenerator<V> {
    duration: f64,
    map_time_to_keyframe: Interpolator<V>,
    calculated_duration: f64,
}

impl<V: Animatable> KeyframesGenerator<V> {
    pub fn new(keyframes: Vec<V>, params: &KeyframesParams) -> Result<Self, MotionError> {
        if keyframes.is_empty() {
            return Err(MotionError::EmptyKeyframes);
        }
        let duration = ensure_finite("duration", params.duration)?;
        if duration < 0.0 {
            return Err(MotionError::invalid("duration", "must be >= 0"));
        }

        let offsets = match &params.times {
            Some(times) if times.len() == keyframes.len() => times.clone(),
            _ => default_offsets(keyframes.len()),
        };
        let absolute_times = offsets.into_iter().map(|o| o * duration).collect();
        let map_time_to_keyframe =
            Interpolator::new(absolute_times, keyframes, params.ease.as_slice(), true)?;

        Ok(Self {
            duration,
            map_time_to_keyframe,
            calculated_duration: duration,
        })
    }
}

impl<V: Animatable> Generator<V> for KeyframesGenerator<V> {
    fn next(&mut self, elapsed_ms: f64) -> AnimationState<V> {
        AnimationState::new(
            self.map_time_to_keyframe.sample(elapsed_ms),
            elapsed_ms >= self.duration,
        )
    }

    fn calculated_duration(&self) -> Option<f64> {
        Some(self.calculated_duration)
    }

    fn set_calculated_duration(&mut self, duration_ms: f64) {
        self.calculated_duration = duration_ms;
    }
}
