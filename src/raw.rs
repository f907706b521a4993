//! Raw records as delivered by the native hook.
//!
//! A [`RawEvent`] is what the hook thread hands over: a numeric type tag and
//! exactly one populated sub-record. Nothing is interpreted here; see
//! [`crate::normalize`] for the mapping onto [`crate::Event`].

use crate::event::{EventType, WheelData};
use crate::modifiers::Modifiers;

#[cfg(feature = "recorder")]
use serde::{Deserialize, Serialize};

/// Native tag for "hook enabled" notifications. Not dispatched.
pub const TAG_HOOK_ENABLED: u16 = 1;
/// Native tag for "hook disabled" notifications. Not dispatched.
pub const TAG_HOOK_DISABLED: u16 = 2;

/// Raw keyboard record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "recorder", derive(Serialize, Deserialize))]
pub struct RawKeyboard {
    /// Virtual key code.
    pub keycode: u16,
    /// Platform-specific key code.
    pub rawcode: u16,
    /// Typed character (keypress only).
    pub keychar: Option<char>,
    /// Modifier flags reported by the platform.
    pub modifiers: Modifiers,
}

/// Raw mouse record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "recorder", derive(Serialize, Deserialize))]
pub struct RawMouse {
    /// Button number.
    pub button: u16,
    /// Click count.
    pub clicks: u16,
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
    /// Modifier flags reported by the platform.
    pub modifiers: Modifiers,
}

/// A raw event record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "recorder", derive(Serialize, Deserialize))]
pub struct RawEvent {
    /// Native type tag.
    pub type_tag: u16,
    /// Native timestamp in milliseconds.
    pub time: u64,
    /// Native modifier/button mask.
    pub mask: u16,
    /// Keyboard sub-record.
    pub keyboard: Option<RawKeyboard>,
    /// Mouse sub-record.
    pub mouse: Option<RawMouse>,
    /// Wheel sub-record.
    pub wheel: Option<WheelData>,
}

impl RawEvent {
    /// Create a record with the given tag and no payload.
    pub fn new(type_tag: u16) -> Self {
        Self {
            type_tag,
            time: 0,
            mask: 0,
            keyboard: None,
            mouse: None,
            wheel: None,
        }
    }

    fn keyboard(kind: EventType, keycode: u16, rawcode: u16, keychar: Option<char>) -> Self {
        let mut raw = Self::new(kind.tag());
        raw.keyboard = Some(RawKeyboard {
            keycode,
            rawcode,
            keychar,
            modifiers: Modifiers::NONE,
        });
        raw
    }

    fn mouse(kind: EventType, button: u16, clicks: u16, x: i32, y: i32) -> Self {
        let mut raw = Self::new(kind.tag());
        raw.mouse = Some(RawMouse {
            button,
            clicks,
            x,
            y,
            modifiers: Modifiers::NONE,
        });
        raw
    }

    /// Create a key down record.
    pub fn key_down(keycode: u16, rawcode: u16) -> Self {
        Self::keyboard(EventType::KeyDown, keycode, rawcode, None)
    }

    /// Create a key up record.
    pub fn key_up(keycode: u16, rawcode: u16) -> Self {
        Self::keyboard(EventType::KeyUp, keycode, rawcode, None)
    }

    /// Create a key typed record.
    pub fn key_press(keycode: u16, rawcode: u16, keychar: char) -> Self {
        Self::keyboard(EventType::KeyPress, keycode, rawcode, Some(keychar))
    }

    /// Create a mouse button down record.
    pub fn mouse_down(button: u16, x: i32, y: i32) -> Self {
        Self::mouse(EventType::MouseDown, button, 1, x, y)
    }

    /// Create a mouse button up record.
    pub fn mouse_up(button: u16, x: i32, y: i32) -> Self {
        Self::mouse(EventType::MouseUp, button, 1, x, y)
    }

    /// Create a mouse click record.
    pub fn mouse_click(button: u16, clicks: u16, x: i32, y: i32) -> Self {
        Self::mouse(EventType::MouseClick, button, clicks, x, y)
    }

    /// Create a mouse move record.
    pub fn mouse_move(x: i32, y: i32) -> Self {
        Self::mouse(EventType::MouseMove, 0, 0, x, y)
    }

    /// Create a mouse drag record.
    pub fn mouse_drag(x: i32, y: i32) -> Self {
        Self::mouse(EventType::MouseDrag, 0, 0, x, y)
    }

    /// Create a vertical wheel record.
    pub fn wheel(rotation: i32, x: i32, y: i32) -> Self {
        let mut raw = Self::new(EventType::MouseWheel.tag());
        raw.wheel = Some(WheelData {
            amount: 3,
            clicks: 1,
            direction: 3,
            rotation,
            scroll_type: 1,
            x,
            y,
        });
        raw
    }

    /// Set the native timestamp.
    pub fn at(mut self, time: u64) -> Self {
        self.time = time;
        self
    }

    /// Set the native mask and derive the record's modifier flags from it.
    pub fn with_mask(mut self, mask: u16) -> Self {
        self.mask = mask;
        self.with_modifiers(Modifiers::from_mask(mask))
    }

    /// Set the record's modifier flags directly.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        if let Some(kb) = self.keyboard.as_mut() {
            kb.modifiers = modifiers;
        }
        if let Some(mouse) = self.mouse.as_mut() {
            mouse.modifiers = modifiers;
        }
        self
    }

    /// Check if this record is a mouse click/press/release, the records
    /// affected by click propagation suppression.
    pub fn is_click(&self) -> bool {
        matches!(
            EventType::from_tag(self.type_tag),
            Some(EventType::MouseClick | EventType::MouseDown | EventType::MouseUp)
        )
    }
}
