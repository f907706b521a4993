//! Normalized event types handed to listeners.

use crate::modifiers::Modifiers;
use crate::shortcut::{EventProperty, KeyId};
use std::fmt;

#[cfg(feature = "recorder")]
use serde::{Deserialize, Serialize};

/// The semantic type of a normalized event.
///
/// Each variant corresponds to one native type tag; tags outside `3..=11`
/// (including the hook enabled/disabled notifications) have no variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "recorder", derive(Serialize, Deserialize))]
#[repr(u16)]
pub enum EventType {
    /// A character was typed.
    KeyPress = 3,
    /// A key was pressed down.
    KeyDown = 4,
    /// A key was released.
    KeyUp = 5,
    /// A mouse button was clicked (press + release without movement).
    MouseClick = 6,
    /// A mouse button was pressed.
    MouseDown = 7,
    /// A mouse button was released.
    MouseUp = 8,
    /// The mouse was moved with no button held.
    MouseMove = 9,
    /// The mouse was moved while a button was held.
    MouseDrag = 10,
    /// The mouse wheel was scrolled.
    MouseWheel = 11,
}

impl EventType {
    /// Every event type, in tag order.
    pub const ALL: [EventType; 9] = [
        EventType::KeyPress,
        EventType::KeyDown,
        EventType::KeyUp,
        EventType::MouseClick,
        EventType::MouseDown,
        EventType::MouseUp,
        EventType::MouseMove,
        EventType::MouseDrag,
        EventType::MouseWheel,
    ];

    /// Look up the event type for a native type tag.
    pub fn from_tag(tag: u16) -> Option<Self> {
        match tag {
            3 => Some(EventType::KeyPress),
            4 => Some(EventType::KeyDown),
            5 => Some(EventType::KeyUp),
            6 => Some(EventType::MouseClick),
            7 => Some(EventType::MouseDown),
            8 => Some(EventType::MouseUp),
            9 => Some(EventType::MouseMove),
            10 => Some(EventType::MouseDrag),
            11 => Some(EventType::MouseWheel),
            _ => None,
        }
    }

    /// The native type tag.
    pub fn tag(self) -> u16 {
        self as u16
    }

    /// The event name listeners subscribe to, e.g. `"keydown"`.
    pub fn name(self) -> &'static str {
        match self {
            EventType::KeyPress => "keypress",
            EventType::KeyDown => "keydown",
            EventType::KeyUp => "keyup",
            EventType::MouseClick => "mouseclick",
            EventType::MouseDown => "mousedown",
            EventType::MouseUp => "mouseup",
            EventType::MouseMove => "mousemove",
            EventType::MouseDrag => "mousedrag",
            EventType::MouseWheel => "mousewheel",
        }
    }

    /// Look up an event type by its name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Check if this is a keyboard event type.
    pub fn is_keyboard(self) -> bool {
        matches!(
            self,
            EventType::KeyPress | EventType::KeyDown | EventType::KeyUp
        )
    }

    /// Check if this is a mouse event type (wheel included).
    pub fn is_mouse(self) -> bool {
        !self.is_keyboard()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Keyboard event data.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "recorder", derive(Serialize, Deserialize))]
pub struct KeyboardData {
    /// The virtual key code (see [`crate::keycode::Key`]).
    pub keycode: u16,
    /// The raw platform-specific keycode.
    pub rawcode: u16,
    /// The typed character, for keypress events.
    pub keychar: Option<char>,
}

/// Mouse event data.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "recorder", derive(Serialize, Deserialize))]
pub struct MouseData {
    /// Button number (1 = left, 2 = right, 3 = middle, 0 = none).
    pub button: u16,
    /// Click count.
    pub clicks: u16,
    /// X coordinate (screen coordinates).
    pub x: i32,
    /// Y coordinate (screen coordinates).
    pub y: i32,
}

/// Mouse wheel event data.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "recorder", derive(Serialize, Deserialize))]
pub struct WheelData {
    /// Scroll amount per notch.
    pub amount: u16,
    /// Number of wheel clicks.
    pub clicks: u16,
    /// Wheel axis (3 = vertical, 4 = horizontal).
    pub direction: u8,
    /// Signed rotation; negative is up/left.
    pub rotation: i32,
    /// Scroll unit (1 = unit, 2 = block).
    pub scroll_type: u8,
    /// X coordinate (screen coordinates).
    pub x: i32,
    /// Y coordinate (screen coordinates).
    pub y: i32,
}

/// A normalized input event.
///
/// Exactly one of `keyboard`, `mouse` or `wheel` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "recorder", derive(Serialize, Deserialize))]
pub struct Event {
    /// The type of event.
    pub event_type: EventType,
    /// Native timestamp in milliseconds.
    pub time: u64,
    /// Native modifier/button mask.
    pub mask: u16,
    /// Modifier flags, with latched modifiers forced on.
    pub modifiers: Modifiers,
    /// Keyboard-specific data.
    pub keyboard: Option<KeyboardData>,
    /// Mouse-specific data.
    pub mouse: Option<MouseData>,
    /// Wheel-specific data.
    pub wheel: Option<WheelData>,
}

impl Event {
    /// Create an empty event of the given type.
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            time: 0,
            mask: 0,
            modifiers: Modifiers::NONE,
            keyboard: None,
            mouse: None,
            wheel: None,
        }
    }

    /// Check if this is a keyboard event.
    pub fn is_keyboard(&self) -> bool {
        self.event_type.is_keyboard()
    }

    /// Check if this is a mouse event.
    pub fn is_mouse(&self) -> bool {
        self.event_type.is_mouse()
    }

    /// The key identifier used for shortcut matching, if this is a keyboard
    /// event.
    pub fn key_id(&self, property: EventProperty) -> Option<KeyId> {
        let kb = self.keyboard.as_ref()?;
        Some(match property {
            EventProperty::Keycode => KeyId::from(kb.keycode),
            EventProperty::Rawcode => KeyId::from(kb.rawcode),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip_names() {
        for kind in EventType::ALL {
            assert_eq!(EventType::from_tag(kind.tag()), Some(kind));
            assert_eq!(EventType::from_name(kind.name()), Some(kind));
        }
        assert_eq!(EventType::KeyDown.tag(), 4);
        assert_eq!(EventType::MouseWheel.name(), "mousewheel");
    }

    #[test]
    fn test_unknown_tags() {
        for tag in [0, 1, 2, 12, 255, u16::MAX] {
            assert_eq!(EventType::from_tag(tag), None);
        }
        assert_eq!(EventType::from_name("hookenabled"), None);
    }

    #[test]
    fn test_classification() {
        assert!(EventType::KeyPress.is_keyboard());
        assert!(EventType::KeyUp.is_keyboard());
        assert!(EventType::MouseClick.is_mouse());
        assert!(EventType::MouseWheel.is_mouse());
        assert!(!EventType::MouseDrag.is_keyboard());
    }

    #[test]
    fn test_key_id_by_property() {
        let mut event = Event::new(EventType::KeyDown);
        assert_eq!(event.key_id(EventProperty::Keycode), None);

        event.keyboard = Some(KeyboardData {
            keycode: 30,
            rawcode: 65,
            keychar: None,
        });
        assert_eq!(event.key_id(EventProperty::Keycode), Some(KeyId::from(30u16)));
        assert_eq!(event.key_id(EventProperty::Rawcode), Some(KeyId::from("65")));
    }
}
