//! Easing curves.
//!
//! Named presets plus arbitrary cubic-bezier timing. In JSON an easing is
//! either a name (`"easeInOut"`) or a 4-number bezier array
//! (`[0.42, 0, 0.58, 1]`).

use serde::{Deserialize, Serialize};

/// Progress-remapping curve applied per keyframe segment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "EasingRepr", into = "EasingRepr")]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    CircIn,
    CircOut,
    CircInOut,
    BackIn,
    BackOut,
    BackInOut,
    Anticipate,
    /// Control points (x1, y1, x2, y2).
    CubicBezier(f64, f64, f64, f64),
}

impl Default for Easing {
    fn default() -> Self {
        Easing::EaseInOut
    }
}

const BACK_OUT: (f64, f64, f64, f64) = (0.33, 1.53, 0.69, 0.99);

impl Easing {
    /// Remap linear progress `t`.
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Easing::Linear => t,
            Easing::EaseIn => cubic_bezier_ease(t, 0.42, 0.0, 1.0, 1.0),
            Easing::EaseOut => cubic_bezier_ease(t, 0.0, 0.0, 0.58, 1.0),
            Easing::EaseInOut => cubic_bezier_ease(t, 0.42, 0.0, 0.58, 1.0),
            Easing::CircIn => circ_in(t),
            Easing::CircOut => reverse(circ_in, t),
            Easing::CircInOut => mirror(circ_in, t),
            Easing::BackIn => back_in(t),
            Easing::BackOut => back_out(t),
            Easing::BackInOut => mirror(back_in, t),
            Easing::Anticipate => anticipate(t),
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier_ease(t, x1, y1, x2, y2),
        }
    }
}

fn circ_in(p: f64) -> f64 {
    1.0 - p.clamp(-1.0, 1.0).acos().sin()
}

fn back_out(p: f64) -> f64 {
    let (x1, y1, x2, y2) = BACK_OUT;
    cubic_bezier_ease(p, x1, y1, x2, y2)
}

fn back_in(p: f64) -> f64 {
    reverse(back_out, p)
}

fn anticipate(p: f64) -> f64 {
    let p = p * 2.0;
    if p < 1.0 {
        0.5 * back_in(p)
    } else {
        0.5 * (2.0 - 2f64.powf(-10.0 * (p - 1.0)))
    }
}

/// Turn an ease-in into an ease-out (and vice versa).
#[inline]
fn reverse(ease: fn(f64) -> f64, p: f64) -> f64 {
    1.0 - ease(1.0 - p)
}

/// Turn an ease-in into an ease-in-out.
#[inline]
fn mirror(ease: fn(f64) -> f64, p: f64) -> f64 {
    if p <= 0.5 {
        ease(2.0 * p) / 2.0
    } else {
        (2.0 - ease(2.0 * (1.0 - p))) / 2.0
    }
}

/// Cubic Bezier basis function
#[inline]
fn cubic_bezier(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Given control points (x1, y1, x2, y2) and an input t in [0,1], compute the
/// eased y by inverting the x bezier via binary search.
fn cubic_bezier_ease(t: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    // Straight diagonal: identity.
    if x1 == y1 && x2 == y2 {
        return t;
    }
    let t = t.clamp(0.0, 1.0);
    if t == 0.0 || t == 1.0 {
        return t;
    }
    // Monotonic X in [0,1] assumed for x1/x2 ∈ [0,1]
    let mut lo = 0.0f64;
    let mut hi = 1.0f64;
    let mut mid = t;
    for _ in 0..32 {
        let x = cubic_bezier(0.0, x1, x2, 1.0, mid);
        if (x - t).abs() < 1e-7 {
            break;
        }
        if x < t {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(0.0, y1, y2, 1.0, mid)
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum EasingRepr {
    Named(NamedEasing),
    Bezier([f64; 4]),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum NamedEasing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    CircIn,
    CircOut,
    CircInOut,
    BackIn,
    BackOut,
    BackInOut,
    Anticipate,
}

impl From<EasingRepr> for Easing {
    fn from(repr: EasingRepr) -> Self {
        match repr {
            EasingRepr::Bezier([x1, y1, x2, y2]) => Easing::CubicBezier(x1, y1, x2, y2),
            EasingRepr::Named(named) => match named {
                NamedEasing::Linear => Easing::Linear,
                NamedEasing::EaseIn => Easing::EaseIn,
                NamedEasing::EaseOut => Easing::EaseOut,
                NamedEasing::EaseInOut => Easing::EaseInOut,
                NamedEasing::CircIn => Easing::CircIn,
                NamedEasing::CircOut => Easing::CircOut,
                NamedEasing::CircInOut => Easing::CircInOut,
                NamedEasing::BackIn => Easing::BackIn,
                NamedEasing::BackOut => Easing::BackOut,
                NamedEasing::BackInOut => Easing::BackInOut,
                NamedEasing::Anticipate => Easing::Anticipate,
            },
        }
    }
}

impl From<Easing> for EasingRepr {
    fn from(easing: Easing) -> Self {
        let named = match easing {
            Easing::CubicBezier(x1, y1, x2, y2) => return EasingRepr::Bezier([x1, y1, x2, y2]),
            Easing::Linear => NamedEasing::Linear,
            Easing::EaseIn => NamedEasing::EaseIn,
            Easing::EaseOut => NamedEasing::EaseOut,
            Easing::EaseInOut => NamedEasing::EaseInOut,
            Easing::CircIn => NamedEasing::CircIn,
            Easing::CircOut => NamedEasing::CircOut,
            Easing::CircInOut => NamedEasing::CircInOut,
            Easing::BackIn => NamedEasing::BackIn,
            Easing::BackOut => NamedEasing::BackOut,
            Easing::BackInOut => NamedEasing::BackInOut,
            Easing::Anticipate => NamedEasing::Anticipate,
        };
        EasingRepr::Named(named)
    }
}
