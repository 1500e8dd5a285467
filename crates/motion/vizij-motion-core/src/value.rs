//! Animatable values.
//!
//! Anything the controller reports must be able to blend between two
//! keyframes. Plain numbers additionally expose a scalar view so physics
//! generators (spring, inertia) can drive them directly; everything else goes
//! through the 0..100 numeric proxy (see [`crate::generators`]).

use serde::{Deserialize, Serialize};

/// A value that can be blended between two keyframes.
pub trait Animatable: Clone + std::fmt::Debug + 'static {
    /// Blend from `self` toward `to`. `progress` is usually in [0, 1] but may
    /// overshoot (back easings, unclamped proxy mapping).
    fn mix(&self, to: &Self, progress: f64) -> Self;

    /// Scalar view for plain numbers; `None` for anything else.
    fn as_scalar(&self) -> Option<f64> {
        None
    }

    /// Rebuild a value from a scalar produced by a numeric generator.
    fn from_scalar(_value: f64) -> Option<Self> {
        None
    }
}

impl Animatable for f64 {
    #[inline]
    fn mix(&self, to: &Self, progress: f64) -> Self {
        self + (to - self) * progress
    }

    #[inline]
    fn as_scalar(&self) -> Option<f64> {
        Some(*self)
    }

    #[inline]
    fn from_scalar(value: f64) -> Option<Self> {
        Some(value)
    }
}

impl Animatable for f32 {
    #[inline]
    fn mix(&self, to: &Self, progress: f64) -> Self {
        lerp_f32(*self, *to, progress as f32)
    }

    #[inline]
    fn as_scalar(&self) -> Option<f64> {
        Some(f64::from(*self))
    }

    #[inline]
    fn from_scalar(value: f64) -> Option<Self> {
        Some(value as f32)
    }
}

/// Lightweight kind enum for quick dispatch.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Float,
    Bool,
    Vec2,
    Vec3,
    Vec4,
    Quat,
    ColorRgba,
    Text,
}

/// Dynamically typed animatable value.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Value {
    /// Scalar float
    Float(f32),

    /// Boolean (step)
    Bool(bool),

    /// 2D vector
    Vec2([f32; 2]),

    /// 3D vector
    Vec3([f32; 3]),

    /// 4D vector
    Vec4([f32; 4]),

    /// Quaternion (x, y, z, w)
    Quat([f32; 4]),

    /// RGBA color (linear by convention)
    #[serde(rename = "color")]
    ColorRgba([f32; 4]),

    /// Text / string; step-only for interpolation
    Text(String),
}

impl Value {
    /// Return the coarse kind of this value.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::Bool(_) => ValueKind::Bool,
            Value::Vec2(_) => ValueKind::Vec2,
            Value::Vec3(_) => ValueKind::Vec3,
            Value::Vec4(_) => ValueKind::Vec4,
            Value::Quat(_) => ValueKind::Quat,
            Value::ColorRgba(_) => ValueKind::ColorRgba,
            Value::Text(_) => ValueKind::Text,
        }
    }

    pub fn f(v: f32) -> Self {
        Value::Float(v)
    }

    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Value::ColorRgba([r, g, b, a])
    }
}

impl Animatable for Value {
    fn mix(&self, to: &Self, progress: f64) -> Self {
        linear_value(self, to, progress as f32)
    }

    fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(f64::from(*v)),
            _ => None,
        }
    }

    fn from_scalar(value: f64) -> Option<Self> {
        Some(Value::Float(value as f32))
    }
}

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
fn lerp_array<const N: usize>(a: [f32; N], b: [f32; N], t: f32) -> [f32; N] {
    let mut out = a;
    for (o, (x, y)) in out.iter_mut().zip(a.iter().zip(b.iter())) {
        *o = lerp_f32(*x, *y, t);
    }
    out
}

#[inline]
fn dot4(a: [f32; 4], b: [f32; 4]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

#[inline]
fn normalize4(mut q: [f32; 4]) -> [f32; 4] {
    let len2 = dot4(q, q);
    if len2 > 0.0 {
        let inv_len = len2.sqrt().recip();
        for c in &mut q {
            *c *= inv_len;
        }
    }
    q
}

/// Quaternion NLERP with shortest-arc correction.
/// If dot < 0, negate the second quaternion to ensure the shortest path.
#[inline]
pub fn nlerp_quat(a: [f32; 4], mut b: [f32; 4], t: f32) -> [f32; 4] {
    if dot4(a, b) < 0.0 {
        b = [-b[0], -b[1], -b[2], -b[3]];
    }
    normalize4(lerp_array(a, b, t))
}

/// Linear interpolation across Value kinds.
///
/// Bool/Text hold the left value until the segment completes. Mismatched
/// kinds prefer the left value (fail-soft).
pub fn linear_value(a: &Value, b: &Value, t: f32) -> Value {
    match (a, b) {
        (Value::Float(va), Value::Float(vb)) => Value::Float(lerp_f32(*va, *vb, t)),
        (Value::Vec2(va), Value::Vec2(vb)) => Value::Vec2(lerp_array(*va, *vb, t)),
        (Value::Vec3(va), Value::Vec3(vb)) => Value::Vec3(lerp_array(*va, *vb, t)),
        (Value::Vec4(va), Value::Vec4(vb)) => Value::Vec4(lerp_array(*va, *vb, t)),
        (Value::Quat(qa), Value::Quat(qb)) => Value::Quat(nlerp_quat(*qa, *qb, t)),
        (Value::ColorRgba(ca), Value::ColorRgba(cb)) => {
            Value::ColorRgba(lerp_array(*ca, *cb, t))
        }
        (Value::Bool(_), Value::Bool(_)) | (Value::Text(_), Value::Text(_)) => {
            if t >= 1.0 {
                b.clone()
            } else {
                a.clone()
            }
        }
        _ => a.clone(),
    }
}
