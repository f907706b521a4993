//! Multi-key shortcut registry and matcher.
//!
//! A shortcut is a set of keys that must all be held at the same time. Keys
//! may be pressed in any order and at any pace: pressed state accumulates
//! per shortcut and is re-checked on every keydown and keyup.
//!
//! The registry never calls user code itself. [`ShortcutRegistry::handle`]
//! returns the callbacks that became due as [`Fired`] values, which the
//! dispatcher invokes once its lock is released.

use crate::error::{Error, Result};
use crate::event::EventType;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "recorder")]
use serde::{Deserialize, Serialize};

static NEXT_SHORTCUT_ID: AtomicU64 = AtomicU64::new(1);

/// Callback invoked with the key identifiers of a shortcut.
pub type ShortcutCallback = Arc<dyn Fn(&[KeyId]) + Send + Sync>;

/// Unique handle of a registered shortcut.
///
/// Ids come from a process-wide counter and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShortcutId(u64);

impl ShortcutId {
    fn next() -> Self {
        Self(NEXT_SHORTCUT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ShortcutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A key identifier.
///
/// Identifiers compare by their string form, so `KeyId::from(42u16)` and
/// `KeyId::from("42")` name the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "recorder", derive(Serialize, Deserialize))]
pub struct KeyId(String);

impl KeyId {
    /// The string form of this identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! key_id_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for KeyId {
                fn from(code: $t) -> Self {
                    KeyId(code.to_string())
                }
            }
        )*
    };
}

key_id_from_int!(u8, u16, u32, u64, usize, i16, i32, i64);

impl From<&str> for KeyId {
    fn from(s: &str) -> Self {
        KeyId(s.trim().to_owned())
    }
}

impl From<String> for KeyId {
    fn from(s: String) -> Self {
        KeyId::from(s.as_str())
    }
}

impl From<&KeyId> for KeyId {
    fn from(id: &KeyId) -> Self {
        id.clone()
    }
}

/// Which keyboard field identifies a key for shortcut matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "recorder", derive(Serialize, Deserialize))]
pub enum EventProperty {
    /// The translated virtual keycode.
    #[default]
    Keycode,
    /// The platform-specific rawcode.
    Rawcode,
}

/// Whether a fired callback is the press or the release side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// All keys became pressed.
    Press,
    /// The fully-pressed interval ended.
    Release,
}

/// A shortcut callback that became due.
pub struct Fired {
    /// The shortcut that fired.
    pub id: ShortcutId,
    /// Press or release.
    pub trigger: Trigger,
    /// The shortcut's keys, passed to the callback.
    pub keys: Vec<KeyId>,
    callback: ShortcutCallback,
}

impl Fired {
    /// Run the callback.
    pub fn invoke(&self) {
        (self.callback)(&self.keys);
    }
}

impl fmt::Debug for Fired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fired")
            .field("id", &self.id)
            .field("trigger", &self.trigger)
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

/// Inspectable state of one shortcut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutState {
    /// Shortcut id.
    pub id: ShortcutId,
    /// Keys in registration order.
    pub keys: Vec<KeyId>,
    /// Keys currently marked pressed, in registration order.
    pub pressed: Vec<KeyId>,
    /// Whether the press callback fired and the release has not yet.
    pub activated: bool,
}

struct Shortcut {
    id: ShortcutId,
    keys: Vec<KeyId>,
    pressed: HashMap<KeyId, bool>,
    on_press: ShortcutCallback,
    on_release: Option<ShortcutCallback>,
    activated: bool,
}

impl Shortcut {
    fn all_pressed(&self) -> bool {
        self.pressed.values().all(|p| *p)
    }

    fn fired(&self, trigger: Trigger, callback: ShortcutCallback) -> Fired {
        Fired {
            id: self.id,
            trigger,
            keys: self.keys.clone(),
            callback,
        }
    }

    fn state(&self) -> ShortcutState {
        ShortcutState {
            id: self.id,
            keys: self.keys.clone(),
            pressed: self
                .keys
                .iter()
                .filter(|k| self.pressed.get(*k).copied().unwrap_or(false))
                .cloned()
                .collect(),
            activated: self.activated,
        }
    }
}

/// Registered shortcuts, in registration order.
#[derive(Default)]
pub struct ShortcutRegistry {
    shortcuts: Vec<Shortcut>,
}

/// Collect keys into a de-duplicated list keeping first occurrences.
fn key_list<I>(keys: I) -> Vec<KeyId>
where
    I: IntoIterator,
    I::Item: Into<KeyId>,
{
    let mut out: Vec<KeyId> = Vec::new();
    for key in keys {
        let key = key.into();
        if !out.contains(&key) {
            out.push(key);
        }
    }
    out
}

impl ShortcutRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a shortcut and return its id.
    ///
    /// Duplicate keys collapse into one. An empty key set is rejected.
    pub fn register<I>(
        &mut self,
        keys: I,
        on_press: ShortcutCallback,
        on_release: Option<ShortcutCallback>,
    ) -> Result<ShortcutId>
    where
        I: IntoIterator,
        I::Item: Into<KeyId>,
    {
        let keys = key_list(keys);
        if keys.is_empty() {
            return Err(Error::InvalidShortcut("shortcut needs at least one key".into()));
        }

        let id = ShortcutId::next();
        let pressed = keys.iter().map(|k| (k.clone(), false)).collect();
        log::debug!("registered shortcut {} for keys {:?}", id, keys);
        self.shortcuts.push(Shortcut {
            id,
            keys,
            pressed,
            on_press,
            on_release,
            activated: false,
        });
        Ok(id)
    }

    /// Remove the shortcut with the given id. Returns `false` if there was
    /// none.
    pub fn unregister(&mut self, id: ShortcutId) -> bool {
        let before = self.shortcuts.len();
        self.shortcuts.retain(|s| s.id != id);
        before != self.shortcuts.len()
    }

    /// Remove the first shortcut whose key set equals `keys`, in any order.
    /// Returns `false` if none matched.
    pub fn unregister_keys<I>(&mut self, keys: I) -> bool
    where
        I: IntoIterator,
        I::Item: Into<KeyId>,
    {
        let mut wanted = key_list(keys);
        wanted.sort();
        let position = self.shortcuts.iter().position(|s| {
            let mut have = s.keys.clone();
            have.sort();
            have == wanted
        });
        match position {
            Some(index) => {
                let removed = self.shortcuts.remove(index);
                log::debug!("unregistered shortcut {} by keys", removed.id);
                true
            }
            None => false,
        }
    }

    /// Remove every shortcut.
    pub fn clear(&mut self) {
        self.shortcuts.clear();
    }

    /// Mark every key released and every shortcut inactive, without firing
    /// release callbacks.
    pub fn reset_pressed(&mut self) {
        for shortcut in &mut self.shortcuts {
            shortcut.pressed.values_mut().for_each(|p| *p = false);
            shortcut.activated = false;
        }
    }

    /// Number of registered shortcuts.
    pub fn len(&self) -> usize {
        self.shortcuts.len()
    }

    /// Check if no shortcut is registered.
    pub fn is_empty(&self) -> bool {
        self.shortcuts.is_empty()
    }

    /// Update pressed state for a key event and return the callbacks that
    /// became due, in registration order.
    ///
    /// Only `KeyDown` and `KeyUp` change state; other event types return
    /// nothing.
    pub fn handle(&mut self, event_type: EventType, key: &KeyId) -> Vec<Fired> {
        let mut fired = Vec::new();
        match event_type {
            EventType::KeyDown => {
                for shortcut in &mut self.shortcuts {
                    let Some(pressed) = shortcut.pressed.get_mut(key) else {
                        continue;
                    };
                    *pressed = true;
                    if !shortcut.activated && shortcut.all_pressed() {
                        shortcut.activated = true;
                        fired.push(shortcut.fired(Trigger::Press, shortcut.on_press.clone()));
                    }
                }
            }
            EventType::KeyUp => {
                for shortcut in &mut self.shortcuts {
                    if let Some(pressed) = shortcut.pressed.get_mut(key) {
                        *pressed = false;
                    }
                }
                for shortcut in &mut self.shortcuts {
                    if !shortcut.activated || shortcut.all_pressed() {
                        continue;
                    }
                    shortcut.activated = false;
                    if let Some(on_release) = shortcut.on_release.clone() {
                        fired.push(shortcut.fired(Trigger::Release, on_release));
                    }
                }
            }
            _ => {}
        }
        fired
    }

    /// Snapshot of every shortcut's state, in registration order.
    pub fn snapshot(&self) -> Vec<ShortcutState> {
        self.shortcuts.iter().map(Shortcut::state).collect()
    }
}
