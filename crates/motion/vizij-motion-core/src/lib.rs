//! Vizij Motion Core (engine-agnostic)
//!
//! Drives a single animated value over time. A [`Generator`] describes the curve
//! (keyframes, spring, inertia); the [`Animation`] controller turns driver
//! timestamps into generator-local elapsed time under delay, repeat
//! (loop/reverse/mirror), signed speed, scrubbing and pause/resume, and reports
//! each sampled value to the caller's [`Hooks`].
//!
//! Time is tracked in milliseconds internally; the public `time`/`duration`
//! accessors speak seconds.

pub mod completion;
pub mod config;
pub mod controller;
pub mod driver;
pub mod duration;
pub mod easing;
pub mod error;
pub mod generators;
pub mod handoff;
pub mod interpolate;
pub mod options;
pub mod time;
pub mod value;

// Re-exports for consumers (adapters)
pub use completion::{CompletionSignal, Finished};
pub use config::Config;
pub use controller::{Animation, PlayState};
pub use driver::{Driver, DriverFactory, ManualClock, SystemClock};
pub use duration::calc_generator_duration;
pub use easing::Easing;
pub use error::MotionError;
pub use generators::{
    AnimationState, Generator, GeneratorKind, InertiaParams, KeyframesParams, SpringParams,
};
pub use handoff::{ExternalAnimation, HandoffStore};
pub use interpolate::Interpolator;
pub use options::{AnimationOptions, Hooks, Repeat, RepeatType};
pub use value::{Animatable, Value, ValueKind};

/// Motion core result type
pub type Result<T> = core::result::Result<T, MotionError>;
