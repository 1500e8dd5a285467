//! Core configuration for vizij-motion-core.

use serde::{Deserialize, Serialize};

/// Tuning knobs shared by every animation built from the same config.
/// Keep this minimal; expand as needed without breaking API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Sampling step used when resolving the duration of a generator that
    /// does not know it up front.
    pub duration_step_ms: f64,
    /// Generators that have not settled by this point are treated as never
    /// finishing (resolved duration becomes `f64::INFINITY`).
    pub max_generator_duration_ms: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            duration_step_ms: 50.0,
            max_generator_duration_ms: 20_000.0,
        }
    }
}

impl Config {
    /// Parse a config from JSON, filling missing fields with defaults.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = Config::from_json(r#"{ "durationStepMs": 10 }"#).unwrap();
        assert_eq!(cfg.duration_step_ms, 10.0);
        assert_eq!(cfg.max_generator_duration_ms, 20_000.0);
    }
}
