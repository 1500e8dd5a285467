//! Hand-off from externally driven animations.
//!
//! An animation started outside this engine (e.g. by a compositor before the
//! controller was ready) is registered under `(element id, property)`. When
//! the controller takes over it asks for the elapsed time so it can continue
//! without a visual jump; the external animation is cancelled on the next
//! frame flush so it keeps rendering until then.

use std::fmt;
use std::rc::Rc;

use hashbrown::HashMap;
use log::debug;

use crate::driver::{Driver, DriverFactory, SystemClock};

/// Every independent transform shares the element's single `transform`
/// animation.
const TRANSFORM_PROPS: [&str; 17] = [
    "transformPerspective",
    "x",
    "y",
    "z",
    "translateX",
    "translateY",
    "translateZ",
    "scale",
    "scaleX",
    "scaleY",
    "rotate",
    "rotateX",
    "rotateY",
    "rotateZ",
    "skew",
    "skewX",
    "skewY",
];

/// An animation owned by another engine.
pub trait ExternalAnimation {
    /// May fail (e.g. already torn down); failures are logged and ignored.
    fn cancel(&mut self) -> anyhow::Result<()>;
}

impl<F> ExternalAnimation for F
where
    F: FnMut() -> anyhow::Result<()>,
{
    fn cancel(&mut self) -> anyhow::Result<()> {
        self()
    }
}

struct Entry {
    animation: Box<dyn ExternalAnimation>,
    start_time: Option<f64>,
    cancel_scheduled: bool,
}

pub struct HandoffStore {
    entries: HashMap<(String, String), Entry>,
    clock: Box<dyn Driver>,
    /// Frame time of the first hand-off; shared by all later ones so they stay
    /// in sync.
    handoff_frame_time: Option<f64>,
}

impl Default for HandoffStore {
    fn default() -> Self {
        Self::new()
    }
}

fn store_key(id: &str, property: &str) -> (String, String) {
    let property = if TRANSFORM_PROPS.contains(&property) {
        "transform"
    } else {
        property
    };
    (id.to_owned(), property.to_owned())
}

impl HandoffStore {
    pub fn new() -> Self {
        Self::with_clock(Rc::new(SystemClock))
    }

    pub fn with_clock(clock: Rc<dyn DriverFactory>) -> Self {
        Self {
            entries: HashMap::new(),
            clock: clock.create(),
            handoff_frame_time: None,
        }
    }

    /// Register an external animation. `start_time` is on the store's clock;
    /// `None` means it has not started yet.
    pub fn insert(
        &mut self,
        id: &str,
        property: &str,
        animation: Box<dyn ExternalAnimation>,
        start_time: Option<f64>,
    ) {
        self.entries.insert(
            store_key(id, property),
            Entry {
                animation,
                start_time,
                cancel_scheduled: false,
            },
        );
    }

    pub fn contains(&self, id: &str, property: &str) -> bool {
        self.entries.contains_key(&store_key(id, property))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Take over `property` of `id`, returning how far (ms) the external
    /// animation had progressed. Unknown keys return 0.
    pub fn handoff(&mut self, id: &str, property: &str) -> f64 {
        let key = store_key(id, property);
        let Some(entry) = self.entries.get_mut(&key) else {
            return 0.0;
        };

        match entry.start_time {
            Some(start_time) => {
                entry.cancel_scheduled = true;
                let clock = &self.clock;
                let frame_time = *self.handoff_frame_time.get_or_insert_with(|| clock.now());
                let elapsed = frame_time - start_time;
                debug!("handoff {}/{}: {elapsed}ms elapsed", key.0, key.1);
                if elapsed.is_nan() {
                    0.0
                } else {
                    elapsed.max(0.0)
                }
            }
            None => {
                if let Some(entry) = self.entries.remove(&key) {
                    cancel_quietly(&key, entry);
                }
                0.0
            }
        }
    }

    /// Cancel and drop every animation handed off since the last flush.
    /// Returns how many were cancelled.
    pub fn flush_frame(&mut self) -> usize {
        let scheduled: Vec<(String, String)> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.cancel_scheduled)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &scheduled {
            if let Some(entry) = self.entries.remove(key) {
                cancel_quietly(key, entry);
            }
        }
        scheduled.len()
    }
}

fn cancel_quietly(key: &(String, String), mut entry: Entry) {
    if let Err(err) = entry.animation.cancel() {
        debug!("ignoring cancel failure for {}/{}: {err:#}", key.0, key.1);
    }
}

impl fmt::Debug for HandoffStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandoffStore")
            .field("entries", &self.entries.len())
            .field("handoff_frame_time", &self.handoff_frame_time)
            .finish()
    }
}
