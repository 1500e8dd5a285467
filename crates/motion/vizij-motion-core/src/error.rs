//! Error types for the motion core.
//!
//! Errors are only produced while building an animation (generator factories
//! and option parsing). Playback itself never fails: out-of-order calls are
//! no-ops and floating-point drift is corrected by rounding.

/// Error raised while constructing generators or parsing options.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum MotionError {
    /// Keyframe list was empty
    #[error("Keyframes must contain at least one value")]
    EmptyKeyframes,

    /// A generator or option parameter was out of range
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Options could not be (de)serialized
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl MotionError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::EmptyKeyframes | Self::InvalidParameter { .. } => "validation",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for MotionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

/// Reject NaN/infinite parameters.
pub(crate) fn ensure_finite(name: &'static str, value: f64) -> Result<f64, MotionError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MotionError::invalid(name, format!("expected a finite number, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(MotionError::EmptyKeyframes.category(), "validation");
        let err: MotionError = serde_json::from_str::<f64>("nope").unwrap_err().into();
        assert_eq!(err.category(), "serialization");
    }

    #[test]
    fn non_finite_is_rejected() {
        assert!(ensure_finite("duration", 10.0).is_ok());
        let err = ensure_finite("duration", f64::NAN).unwrap_err();
        assert!(matches!(err, MotionError::InvalidParameter { name: "duration", .. }));
    }
}
