//! Piecewise mapping from a numeric input range onto keyframe values.
//!
//! Used by the keyframes generator (time → value) and by the numeric proxy
//! that lets physics generators drive non-numeric values (0..100 → value).

use crate::easing::Easing;
use crate::error::MotionError;
use crate::value::Animatable;

/// Maps `input[i]..input[i+1]` onto `output[i]..output[i+1]` with one easing
/// per segment.
#[derive(Clone, Debug)]
pub struct Interpolator<V> {
    input: Vec<f64>,
    output: Vec<V>,
    easings: Vec<Easing>,
    clamp: bool,
}

impl<V: Animatable> Interpolator<V> {
    /// Build an interpolator. `input` and `output` must have equal, non-zero
    /// length. `easings` may be empty (linear), a single entry applied to
    /// every segment, or one entry per segment.
    pub fn new(
        mut input: Vec<f64>,
        mut output: Vec<V>,
        easings: &[Easing],
        clamp: bool,
    ) -> Result<Self, MotionError> {
        if output.is_empty() {
            return Err(MotionError::EmptyKeyframes);
        }
        if input.len() != output.len() {
            return Err(MotionError::invalid(
                "times",
                format!(
                    "expected {} offsets to match keyframes, got {}",
                    output.len(),
                    input.len()
                ),
            ));
        }
        let segments = output.len().saturating_sub(1);
        let mut easings = match easings.len() {
            0 => vec![Easing::Linear; segments],
            1 => vec![easings[0]; segments],
            n if n >= segments => easings[..segments].to_vec(),
            n => {
                return Err(MotionError::invalid(
                    "ease",
                    format!("expected {segments} easings, got {n}"),
                ))
            }
        };

        // Descending input ranges are walked in reverse.
        if input.len() > 1 && input[0] > input[input.len() - 1] {
            input.reverse();
            output.reverse();
            easings.reverse();
        }

        Ok(Self {
            input,
            output,
            easings,
            clamp,
        })
    }

    /// Evenly spaced `[from, to]` input over all keyframes, linear, unclamped.
    pub fn spread(from: f64, to: f64, output: Vec<V>) -> Result<Self, MotionError> {
        let input = default_offsets(output.len())
            .into_iter()
            .map(|o| from + (to - from) * o)
            .collect();
        Self::new(input, output, &[], false)
    }

    pub fn sample(&self, v: f64) -> V {
        let n = self.input.len();
        if n == 1 {
            return self.output[0].clone();
        }
        let v = if self.clamp {
            v.clamp(self.input[0], self.input[n - 1])
        } else {
            v
        };

        let mut i = 0;
        while i < n - 2 && v >= self.input[i + 1] {
            i += 1;
        }
        let p = progress(self.input[i], self.input[i + 1], v);
        let eased = self.easings[i].apply(p);
        self.output[i].mix(&self.output[i + 1], eased)
    }
}

/// Progress of `value` through `[from, to]`; a zero-width range reports 1.
#[inline]
pub fn progress(from: f64, to: f64, value: f64) -> f64 {
    let span = to - from;
    if span == 0.0 {
        1.0
    } else {
        (value - from) / span
    }
}

/// `n` offsets evenly spread over [0, 1].
pub fn default_offsets(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => (0..n).map(|i| i as f64 / (n - 1) as f64).collect(),
    }
}
