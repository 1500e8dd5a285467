//! Construction options and update hooks.

use std::fmt;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::driver::DriverFactory;
use crate::generators::GeneratorKind;

/// How iterations after the first are played.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RepeatType {
    /// Restart from the first keyframe.
    #[default]
    Loop,
    /// Odd iterations play backwards.
    Reverse,
    /// Odd iterations sample a generator built from the reversed keyframes.
    Mirror,
}

/// How many times the animation plays after the first iteration.
///
/// In JSON either a count (`2`) or `"infinite"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RepeatRepr", into = "RepeatRepr")]
pub enum Repeat {
    Count(u32),
    Infinite,
}

impl Default for Repeat {
    fn default() -> Self {
        Repeat::Count(0)
    }
}

impl Repeat {
    /// Repeat count as a float; `f64::INFINITY` for [`Repeat::Infinite`].
    #[inline]
    pub fn as_f64(self) -> f64 {
        match self {
            Repeat::Count(n) => f64::from(n),
            Repeat::Infinite => f64::INFINITY,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RepeatRepr {
    Count(u32),
    Keyword(RepeatKeyword),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum RepeatKeyword {
    #[serde(alias = "infinity", alias = "Infinity")]
    Infinite,
}

impl From<RepeatRepr> for Repeat {
    fn from(repr: RepeatRepr) -> Self {
        match repr {
            RepeatRepr::Count(n) => Repeat::Count(n),
            RepeatRepr::Keyword(RepeatKeyword::Infinite) => Repeat::Infinite,
        }
    }
}

impl From<Repeat> for RepeatRepr {
    fn from(repeat: Repeat) -> Self {
        match repeat {
            Repeat::Count(n) => RepeatRepr::Count(n),
            Repeat::Infinite => RepeatRepr::Keyword(RepeatKeyword::Infinite),
        }
    }
}

/// Everything needed to build an [`crate::Animation`] apart from its hooks.
///
/// Times are in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationOptions<V> {
    pub keyframes: Vec<V>,
    #[serde(default)]
    pub generator: GeneratorKind,
    #[serde(default)]
    pub delay: f64,
    #[serde(default)]
    pub repeat: Repeat,
    #[serde(default)]
    pub repeat_delay: f64,
    #[serde(default)]
    pub repeat_type: RepeatType,
    #[serde(default = "default_autoplay")]
    pub autoplay: bool,
    /// `None` uses [`crate::SystemClock`].
    #[serde(skip)]
    pub driver: Option<Rc<dyn DriverFactory>>,
}

fn default_autoplay() -> bool {
    true
}

impl<V> AnimationOptions<V> {
    pub fn new(keyframes: Vec<V>) -> Self {
        Self {
            keyframes,
            generator: GeneratorKind::default(),
            delay: 0.0,
            repeat: Repeat::Count(0),
            repeat_delay: 0.0,
            repeat_type: RepeatType::Loop,
            autoplay: true,
            driver: None,
        }
    }

    #[inline]
    pub fn with_generator(mut self, generator: GeneratorKind) -> Self {
        self.generator = generator;
        self
    }

    #[inline]
    pub fn with_delay(mut self, delay_ms: f64) -> Self {
        self.delay = delay_ms;
        self
    }

    #[inline]
    pub fn with_repeat(mut self, repeat: u32, repeat_type: RepeatType) -> Self {
        self.repeat = Repeat::Count(repeat);
        self.repeat_type = repeat_type;
        self
    }

    /// Repeat forever; the animation never finishes on its own.
    #[inline]
    pub fn with_infinite_repeat(mut self, repeat_type: RepeatType) -> Self {
        self.repeat = Repeat::Infinite;
        self.repeat_type = repeat_type;
        self
    }

    #[inline]
    pub fn with_repeat_delay(mut self, repeat_delay_ms: f64) -> Self {
        self.repeat_delay = repeat_delay_ms;
        self
    }

    /// Build idle; call [`crate::Animation::play`] to start.
    #[inline]
    pub fn paused(mut self) -> Self {
        self.autoplay = false;
        self
    }

    #[inline]
    pub fn with_driver(mut self, driver: Rc<dyn DriverFactory>) -> Self {
        self.driver = Some(driver);
        self
    }
}

impl<V: DeserializeOwned> AnimationOptions<V> {
    /// Parse options from JSON. The driver is left unset.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

type Callback = Box<dyn FnMut()>;
type UpdateCallback<V> = Box<dyn FnMut(&V)>;

/// Optional lifecycle callbacks, invoked synchronously by the controller.
pub struct Hooks<V> {
    pub on_play: Option<Callback>,
    pub on_stop: Option<Callback>,
    pub on_complete: Option<Callback>,
    pub on_update: Option<UpdateCallback<V>>,
}

impl<V> Default for Hooks<V> {
    fn default() -> Self {
        Self {
            on_play: None,
            on_stop: None,
            on_complete: None,
            on_update: None,
        }
    }
}

impl<V> Hooks<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_play(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_play = Some(Box::new(f));
        self
    }

    pub fn on_stop(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_stop = Some(Box::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn on_update(mut self, f: impl FnMut(&V) + 'static) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }

    pub(crate) fn emit_play(&mut self) {
        if let Some(f) = self.on_play.as_mut() {
            f();
        }
    }

    pub(crate) fn emit_stop(&mut self) {
        if let Some(f) = self.on_stop.as_mut() {
            f();
        }
    }

    pub(crate) fn emit_complete(&mut self) {
        if let Some(f) = self.on_complete.as_mut() {
            f();
        }
    }

    pub(crate) fn emit_update(&mut self, value: &V) {
        if let Some(f) = self.on_update.as_mut() {
            f(value);
        }
    }
}

impl<V> fmt::Debug for Hooks<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_play", &self.on_play.is_some())
            .field("on_stop", &self.on_stop.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .field("on_update", &self.on_update.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::SpringParams;

    #[test]
    fn json_fills_defaults() {
        let opts = AnimationOptions::<f64>::from_json(r#"{ "keyframes": [0, 100] }"#).unwrap();
        assert_eq!(opts.keyframes, vec![0.0, 100.0]);
        assert_eq!(opts.generator.name(), "keyframes");
        assert_eq!(opts.delay, 0.0);
        assert_eq!(opts.repeat, Repeat::Count(0));
        assert_eq!(opts.repeat_type, RepeatType::Loop);
        assert!(opts.autoplay);
        assert!(opts.driver.is_none());
    }

    #[test]
    fn json_reads_generator_and_repeat() {
        let opts = AnimationOptions::<f64>::from_json(
            r#"{
                "keyframes": [0, 1],
                "generator": { "type": "spring", "stiffness": 300 },
                "repeat": 2,
                "repeatType": "mirror",
                "repeatDelay": 100,
                "autoplay": false
            }"#,
        )
        .unwrap();
        assert_eq!(
            opts.generator,
            GeneratorKind::Spring(SpringParams {
                stiffness: Some(300.0),
                ..SpringParams::default()
            })
        );
        assert_eq!(opts.repeat, Repeat::Count(2));
        assert_eq!(opts.repeat_type, RepeatType::Mirror);
        assert_eq!(opts.repeat_delay, 100.0);
        assert!(!opts.autoplay);
    }

    #[test]
    fn infinite_repeat_from_json() {
        for text in [r#""infinite""#, r#""Infinity""#] {
            let json = format!(r#"{{ "keyframes": [0, 1], "repeat": {text} }}"#);
            let opts = AnimationOptions::<f64>::from_json(&json).unwrap();
            assert_eq!(opts.repeat, Repeat::Infinite);
            assert_eq!(opts.repeat.as_f64(), f64::INFINITY);
        }
        assert_eq!(serde_json::to_string(&Repeat::Infinite).unwrap(), r#""infinite""#);
        assert_eq!(serde_json::to_string(&Repeat::Count(3)).unwrap(), "3");
        assert!(AnimationOptions::<f64>::from_json(r#"{ "keyframes": [0], "repeat": "often" }"#).is_err());
    }

    #[test]
    fn missing_keyframes_is_a_serialization_error() {
        let err = AnimationOptions::<f64>::from_json("{}").unwrap_err();
        assert_eq!(err.category(), "serialization");
    }

    #[test]
    fn hooks_debug_lists_installed_callbacks() {
        let hooks = Hooks::<f64>::new().on_play(|| {});
        let text = format!("{hooks:?}");
        assert!(text.contains("on_play: true"));
        assert!(text.contains("on_update: false"));
    }
}
