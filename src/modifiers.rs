//! Modifier flags and the sticky modifier latch.
//!
//! Native hooks report modifier state per event, and not always reliably
//! (a mouse event fired while Shift is held may arrive with the flag
//! cleared). The [`ModifierLatch`] keeps one flag per modifier that is set by
//! the keydown asserting it and cleared by the keyup releasing it, and forces
//! that state onto every event in between.

use crate::event::{Event, EventType};

#[cfg(feature = "recorder")]
use serde::{Deserialize, Serialize};

// Native mask bits (libuiohook layout)
/// Left Shift mask.
pub const MASK_SHIFT_L: u16 = 1 << 0;
/// Left Control mask.
pub const MASK_CTRL_L: u16 = 1 << 1;
/// Left Meta/Command/Windows mask.
pub const MASK_META_L: u16 = 1 << 2;
/// Left Alt/Option mask.
pub const MASK_ALT_L: u16 = 1 << 3;
/// Right Shift mask.
pub const MASK_SHIFT_R: u16 = 1 << 4;
/// Right Control mask.
pub const MASK_CTRL_R: u16 = 1 << 5;
/// Right Meta/Command/Windows mask.
pub const MASK_META_R: u16 = 1 << 6;
/// Right Alt/Option mask.
pub const MASK_ALT_R: u16 = 1 << 7;

/// Either Shift key.
pub const MASK_SHIFT: u16 = MASK_SHIFT_L | MASK_SHIFT_R;
/// Either Control key.
pub const MASK_CTRL: u16 = MASK_CTRL_L | MASK_CTRL_R;
/// Either Meta key.
pub const MASK_META: u16 = MASK_META_L | MASK_META_R;
/// Either Alt key.
pub const MASK_ALT: u16 = MASK_ALT_L | MASK_ALT_R;

/// Left mouse button mask.
pub const MASK_BUTTON1: u16 = 1 << 8;
/// Right mouse button mask.
pub const MASK_BUTTON2: u16 = 1 << 9;
/// Middle mouse button mask.
pub const MASK_BUTTON3: u16 = 1 << 10;
/// Extra button 1 (X1) mask.
pub const MASK_BUTTON4: u16 = 1 << 11;
/// Extra button 2 (X2) mask.
pub const MASK_BUTTON5: u16 = 1 << 12;

/// Num Lock mask.
pub const MASK_NUM_LOCK: u16 = 1 << 13;
/// Caps Lock mask.
pub const MASK_CAPS_LOCK: u16 = 1 << 14;
/// Scroll Lock mask.
pub const MASK_SCROLL_LOCK: u16 = 1 << 15;

/// The four modifier flags attached to keyboard and mouse events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "recorder", derive(Serialize, Deserialize))]
pub struct Modifiers {
    /// Shift is held.
    pub shift_key: bool,
    /// Alt/Option is held.
    pub alt_key: bool,
    /// Control is held.
    pub ctrl_key: bool,
    /// Meta/Command/Windows is held.
    pub meta_key: bool,
}

impl Modifiers {
    /// No modifier held.
    pub const NONE: Modifiers = Modifiers {
        shift_key: false,
        alt_key: false,
        ctrl_key: false,
        meta_key: false,
    };

    /// Derive the flags from a native modifier mask. Left and right keys are
    /// folded together.
    pub fn from_mask(mask: u16) -> Self {
        Self {
            shift_key: mask & MASK_SHIFT != 0,
            alt_key: mask & MASK_ALT != 0,
            ctrl_key: mask & MASK_CTRL != 0,
            meta_key: mask & MASK_META != 0,
        }
    }

    /// Only Shift held.
    pub fn shift() -> Self {
        Self {
            shift_key: true,
            ..Self::NONE
        }
    }

    /// Only Control held.
    pub fn ctrl() -> Self {
        Self {
            ctrl_key: true,
            ..Self::NONE
        }
    }

    /// Only Alt held.
    pub fn alt() -> Self {
        Self {
            alt_key: true,
            ..Self::NONE
        }
    }

    /// Only Meta held.
    pub fn meta() -> Self {
        Self {
            meta_key: true,
            ..Self::NONE
        }
    }

    /// Check if no modifier is held.
    pub fn is_empty(&self) -> bool {
        !(self.shift_key || self.alt_key || self.ctrl_key || self.meta_key)
    }
}

/// Sticky modifier state carried across the event stream.
///
/// Each modifier is tracked on its own; Shift and Control held together are
/// two unrelated latches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierLatch {
    shift: bool,
    alt: bool,
    ctrl: bool,
    meta: bool,
}

impl ModifierLatch {
    /// Create a latch with every modifier released.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the latch from `event` and annotate the event with the
    /// latched state.
    pub fn apply(&mut self, event: &mut Event) {
        let kind = event.event_type;
        let flags = &mut event.modifiers;
        latch_one(&mut self.shift, &mut flags.shift_key, kind);
        latch_one(&mut self.alt, &mut flags.alt_key, kind);
        latch_one(&mut self.ctrl, &mut flags.ctrl_key, kind);
        latch_one(&mut self.meta, &mut flags.meta_key, kind);
    }

    /// Current latched state.
    pub fn state(&self) -> Modifiers {
        Modifiers {
            shift_key: self.shift,
            alt_key: self.alt,
            ctrl_key: self.ctrl,
            meta_key: self.meta,
        }
    }

    /// Release every modifier.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[inline]
fn latch_one(latched: &mut bool, flag: &mut bool, kind: EventType) {
    match kind {
        EventType::KeyUp if *flag => *latched = false,
        EventType::KeyDown if *flag => *latched = true,
        _ => {}
    }
    if *latched {
        *flag = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Event, EventType, KeyboardData, MouseData};

    fn key(kind: EventType, modifiers: Modifiers) -> Event {
        let mut event = Event::new(kind);
        event.modifiers = modifiers;
        event.keyboard = Some(KeyboardData {
            keycode: 30,
            rawcode: 0x41,
            keychar: None,
        });
        event
    }

    fn mouse_move() -> Event {
        let mut event = Event::new(EventType::MouseMove);
        event.mouse = Some(MouseData {
            button: 0,
            clicks: 0,
            x: 10,
            y: 20,
        });
        event
    }

    #[test]
    fn test_from_mask() {
        assert_eq!(Modifiers::from_mask(0), Modifiers::NONE);
        assert_eq!(Modifiers::from_mask(MASK_SHIFT_R), Modifiers::shift());
        assert_eq!(Modifiers::from_mask(MASK_CTRL_L), Modifiers::ctrl());
        assert_eq!(Modifiers::from_mask(MASK_ALT_R), Modifiers::alt());
        assert_eq!(Modifiers::from_mask(MASK_META_L), Modifiers::meta());

        let both = Modifiers::from_mask(MASK_SHIFT_L | MASK_ALT_L | MASK_BUTTON1);
        assert!(both.shift_key && both.alt_key);
        assert!(!both.ctrl_key && !both.meta_key);
    }

    #[test]
    fn test_keydown_latches_until_keyup() {
        let mut latch = ModifierLatch::new();

        let mut down = key(EventType::KeyDown, Modifiers::shift());
        latch.apply(&mut down);
        assert!(latch.state().shift_key);

        // Unrelated key without the raw flag still reports shift.
        let mut other = key(EventType::KeyDown, Modifiers::NONE);
        latch.apply(&mut other);
        assert!(other.modifiers.shift_key);

        // Mouse events are annotated too.
        let mut mv = mouse_move();
        latch.apply(&mut mv);
        assert!(mv.modifiers.shift_key);

        // A keyup without the raw flag does not release.
        let mut up = key(EventType::KeyUp, Modifiers::NONE);
        latch.apply(&mut up);
        assert!(up.modifiers.shift_key);

        let mut release = key(EventType::KeyUp, Modifiers::shift());
        latch.apply(&mut release);
        assert!(!latch.state().shift_key);

        let mut after = mouse_move();
        latch.apply(&mut after);
        assert!(!after.modifiers.shift_key);
    }

    #[test]
    fn test_modifiers_are_independent() {
        let mut latch = ModifierLatch::new();

        latch.apply(&mut key(EventType::KeyDown, Modifiers::shift()));
        latch.apply(&mut key(EventType::KeyDown, Modifiers::ctrl()));
        assert_eq!(
            latch.state(),
            Modifiers {
                shift_key: true,
                ctrl_key: true,
                ..Modifiers::NONE
            }
        );

        latch.apply(&mut key(EventType::KeyUp, Modifiers::ctrl()));
        assert_eq!(latch.state(), Modifiers::shift());

        let mut probe = key(EventType::KeyPress, Modifiers::NONE);
        latch.apply(&mut probe);
        assert_eq!(probe.modifiers, Modifiers::shift());
    }

    #[test]
    fn test_non_key_events_never_change_latch() {
        let mut latch = ModifierLatch::new();
        let mut mv = mouse_move();
        mv.modifiers = Modifiers::meta();
        latch.apply(&mut mv);
        assert!(latch.state().is_empty());
        // The raw flag itself is left alone.
        assert!(mv.modifiers.meta_key);

        let mut press = key(EventType::KeyPress, Modifiers::alt());
        latch.apply(&mut press);
        assert!(latch.state().is_empty());
    }

    #[test]
    fn test_reset() {
        let mut latch = ModifierLatch::new();
        latch.apply(&mut key(EventType::KeyDown, Modifiers::meta()));
        assert!(!latch.state().is_empty());
        latch.reset();
        assert!(latch.state().is_empty());
    }
}
