//! Generators: elapsed time → `{ value, done }`.
//!
//! The playback controller only ever talks to [`Generator`]. The built-in
//! kinds are a closed enum ([`GeneratorKind`]) dispatched by match; custom
//! generators can be handed to [`crate::Animation::from_generators`].
//!
//! Physics generators are numeric. When their keyframes are not plain numbers
//! they run over a `[0, 100]` proxy and a [`MappedGenerator`] maps the output
//! back into value space.

pub mod inertia;
pub mod keyframes;
pub mod spring;

use serde::{Deserialize, Serialize};

use crate::error::MotionError;
use crate::interpolate::Interpolator;
use crate::value::Animatable;

pub use inertia::{InertiaGenerator, InertiaParams};
pub use keyframes::{EaseSpec, KeyframesGenerator, KeyframesParams};
pub use spring::{SpringGenerator, SpringParams};

/// One sample of a generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationState<V> {
    pub value: V,
    pub done: bool,
}

impl<V> AnimationState<V> {
    #[inline]
    pub fn new(value: V, done: bool) -> Self {
        Self { value, done }
    }

    /// Transform the value, keeping `done`.
    #[inline]
    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> AnimationState<U> {
        AnimationState {
            value: f(self.value),
            done: self.done,
        }
    }
}

/// A curve sampled by elapsed milliseconds.
///
/// `next` takes `&mut self` so generators may cache lazily derived state
/// (e.g. inertia switching to a bounce spring), but for a given elapsed time
/// the result must be deterministic.
pub trait Generator<V> {
    fn next(&mut self, elapsed_ms: f64) -> AnimationState<V>;

    /// Single-iteration duration in ms if known up front. `None` means the
    /// generator runs until it reports `done`.
    fn calculated_duration(&self) -> Option<f64>;

    /// Cache a duration resolved by [`crate::calc_generator_duration`].
    fn set_calculated_duration(&mut self, duration_ms: f64);

    /// When true the controller keeps this generator's `done` flag instead of
    /// deriving completion from its own duration/repeat math.
    fn reports_own_completion(&self) -> bool {
        false
    }
}

/// Built-in generator kinds with their parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GeneratorKind {
    #[serde(alias = "tween")]
    Keyframes(KeyframesParams),
    Spring(SpringParams),
    #[serde(alias = "decay")]
    Inertia(InertiaParams),
}

impl Default for GeneratorKind {
    fn default() -> Self {
        GeneratorKind::Keyframes(KeyframesParams::default())
    }
}

impl GeneratorKind {
    pub fn name(&self) -> &'static str {
        match self {
            GeneratorKind::Keyframes(_) => "keyframes",
            GeneratorKind::Spring(_) => "spring",
            GeneratorKind::Inertia(_) => "inertia",
        }
    }

    /// Incoming velocity, for the kinds that have one.
    pub fn velocity(&self) -> f64 {
        match self {
            GeneratorKind::Keyframes(_) => 0.0,
            GeneratorKind::Spring(p) => p.velocity,
            GeneratorKind::Inertia(p) => p.velocity,
        }
    }

    /// Same parameters with the incoming velocity negated; used to build the
    /// mirrored generator.
    pub fn with_negated_velocity(&self) -> Self {
        let mut kind = self.clone();
        match &mut kind {
            GeneratorKind::Keyframes(_) => {}
            GeneratorKind::Spring(p) => p.velocity = -p.velocity,
            GeneratorKind::Inertia(p) => p.velocity = -p.velocity,
        }
        kind
    }

    /// Build a generator for `keyframes`.
    pub fn build<V: Animatable>(&self, keyframes: &[V]) -> Result<Box<dyn Generator<V>>, MotionError> {
        if keyframes.is_empty() {
            return Err(MotionError::EmptyKeyframes);
        }
        match self {
            GeneratorKind::Keyframes(params) => {
                Ok(Box::new(KeyframesGenerator::new(keyframes.to_vec(), params)?))
            }
            physics => {
                let (numeric, map) = match scalar_keyframes(keyframes) {
                    Some(values) => (
                        values,
                        ValueMap::Scalar {
                            fallback: keyframes[0].clone(),
                        },
                    ),
                    None => (
                        vec![0.0, 100.0],
                        ValueMap::Proxy(Interpolator::spread(0.0, 100.0, keyframes.to_vec())?),
                    ),
                };
                let inner = physics.build_numeric(&numeric)?;
                Ok(Box::new(MappedGenerator { inner, map }))
            }
        }
    }

    fn build_numeric(&self, keyframes: &[f64]) -> Result<Box<dyn Generator<f64>>, MotionError> {
        Ok(match self {
            GeneratorKind::Keyframes(params) => {
                Box::new(KeyframesGenerator::new(keyframes.to_vec(), params)?)
            }
            GeneratorKind::Spring(params) => Box::new(SpringGenerator::new(keyframes, params)?),
            GeneratorKind::Inertia(params) => Box::new(InertiaGenerator::new(keyframes, params)?),
        })
    }
}

/// All keyframes as scalars, if every one is a plain number.
fn scalar_keyframes<V: Animatable>(keyframes: &[V]) -> Option<Vec<f64>> {
    V::from_scalar(0.0)?;
    keyframes.iter().map(Animatable::as_scalar).collect()
}

/// How a numeric generator's output becomes a `V`.
#[derive(Debug)]
enum ValueMap<V> {
    /// Keyframes were plain numbers; rebuild with `from_scalar`.
    Scalar { fallback: V },
    /// Keyframes were mapped onto 0..100; interpolate back.
    Proxy(Interpolator<V>),
}

/// Numeric generator composed with a value-space mapping.
pub struct MappedGenerator<V> {
    inner: Box<dyn Generator<f64>>,
    map: ValueMap<V>,
}

impl<V: Animatable> MappedGenerator<V> {
    fn map_value(&self, numeric: f64) -> V {
        match &self.map {
            ValueMap::Scalar { fallback } => {
                V::from_scalar(numeric).unwrap_or_else(|| fallback.clone())
            }
            ValueMap::Proxy(interp) => interp.sample(numeric),
        }
    }
}

impl<V: Animatable> Generator<V> for MappedGenerator<V> {
    fn next(&mut self, elapsed_ms: f64) -> AnimationState<V> {
        let state = self.inner.next(elapsed_ms);
        AnimationState::new(self.map_value(state.value), state.done)
    }

    fn calculated_duration(&self) -> Option<f64> {
        self.inner.calculated_duration()
    }

    fn set_calculated_duration(&mut self, duration_ms: f64) {
        self.inner.set_calculated_duration(duration_ms)
    }

    fn reports_own_completion(&self) -> bool {
        self.inner.reports_own_completion()
    }
}
