//! Virtual key code definitions.
//!
//! Key codes follow the libuiohook virtual code table, which is what native
//! hooks report in [`crate::event::KeyboardData::keycode`]. Any [`Key`] can
//! be used as a shortcut key through its [`KeyId`] conversion.

use crate::shortcut::KeyId;

#[cfg(feature = "recorder")]
use serde::{Deserialize, Serialize};

macro_rules! key_table {
    ($($(#[$doc:meta])* $name:ident = $code:literal),* $(,)?) => {
        /// Virtual key codes for keyboard keys.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "recorder", derive(Serialize, Deserialize))]
        pub enum Key {
            $($(#[$doc])* $name,)*
            /// Code with no named key.
            Unknown(u16),
        }

        impl Key {
            /// The virtual key code.
            pub fn code(self) -> u16 {
                match self {
                    $(Key::$name => $code,)*
                    Key::Unknown(code) => code,
                }
            }

            /// Look up the key for a virtual key code.
            pub fn from_code(code: u16) -> Self {
                match code {
                    $($code => Key::$name,)*
                    other => Key::Unknown(other),
                }
            }
        }
    };
}

key_table! {
    Escape = 0x0001,

    F1 = 0x003B,
    F2 = 0x003C,
    F3 = 0x003D,
    F4 = 0x003E,
    F5 = 0x003F,
    F6 = 0x0040,
    F7 = 0x0041,
    F8 = 0x0042,
    F9 = 0x0043,
    F10 = 0x0044,
    F11 = 0x0057,
    F12 = 0x0058,
    F13 = 0x005B,
    F14 = 0x005C,
    F15 = 0x005D,
    F16 = 0x0063,
    F17 = 0x0064,
    F18 = 0x0065,
    F19 = 0x0066,
    F20 = 0x0067,
    F21 = 0x0068,
    F22 = 0x0069,
    F23 = 0x006A,
    F24 = 0x006B,

    /// ` ~
    Grave = 0x0029,
    Num1 = 0x0002,
    Num2 = 0x0003,
    Num3 = 0x0004,
    Num4 = 0x0005,
    Num5 = 0x0006,
    Num6 = 0x0007,
    Num7 = 0x0008,
    Num8 = 0x0009,
    Num9 = 0x000A,
    Num0 = 0x000B,
    /// - _
    Minus = 0x000C,
    /// = +
    Equal = 0x000D,
    Backspace = 0x000E,

    Tab = 0x000F,
    CapsLock = 0x003A,

    KeyA = 0x001E,
    KeyB = 0x0030,
    KeyC = 0x002E,
    KeyD = 0x0020,
    KeyE = 0x0012,
    KeyF = 0x0021,
    KeyG = 0x0022,
    KeyH = 0x0023,
    KeyI = 0x0017,
    KeyJ = 0x0024,
    KeyK = 0x0025,
    KeyL = 0x0026,
    KeyM = 0x0032,
    KeyN = 0x0031,
    KeyO = 0x0018,
    KeyP = 0x0019,
    KeyQ = 0x0010,
    KeyR = 0x0013,
    KeyS = 0x001F,
    KeyT = 0x0014,
    KeyU = 0x0016,
    KeyV = 0x002F,
    KeyW = 0x0011,
    KeyX = 0x002D,
    KeyY = 0x0015,
    KeyZ = 0x002C,

    /// [ {
    BracketLeft = 0x001A,
    /// ] }
    BracketRight = 0x001B,
    /// \ |
    Backslash = 0x002B,
    /// ; :
    Semicolon = 0x0027,
    /// ' "
    Quote = 0x0028,
    Enter = 0x001C,
    /// , <
    Comma = 0x0033,
    /// . >
    Period = 0x0034,
    /// / ?
    Slash = 0x0035,
    Space = 0x0039,

    PrintScreen = 0x0E37,
    ScrollLock = 0x0046,
    Pause = 0x0E45,

    Insert = 0x0E52,
    Delete = 0x0E53,
    Home = 0x0E47,
    End = 0x0E4F,
    PageUp = 0x0E49,
    PageDown = 0x0E51,

    ArrowUp = 0xE048,
    ArrowLeft = 0xE04B,
    ArrowRight = 0xE04D,
    ArrowDown = 0xE050,

    NumLock = 0x0045,
    NumpadDivide = 0x0E35,
    NumpadMultiply = 0x0037,
    NumpadSubtract = 0x004A,
    NumpadEqual = 0x0E0D,
    NumpadAdd = 0x004E,
    NumpadEnter = 0x0E1C,
    NumpadDecimal = 0x0053,
    Numpad1 = 0x004F,
    Numpad2 = 0x0050,
    Numpad3 = 0x0051,
    Numpad4 = 0x004B,
    Numpad5 = 0x004C,
    Numpad6 = 0x004D,
    Numpad7 = 0x0047,
    Numpad8 = 0x0048,
    Numpad9 = 0x0049,
    Numpad0 = 0x0052,

    ShiftLeft = 0x002A,
    ShiftRight = 0x0036,
    ControlLeft = 0x001D,
    ControlRight = 0x0E1D,
    AltLeft = 0x0038,
    AltRight = 0x0E38,
    /// Windows/Command/Super
    MetaLeft = 0x0E5B,
    MetaRight = 0x0E5C,
    ContextMenu = 0x0E5D,

    VolumeMute = 0xE020,
    VolumeDown = 0xE02E,
    VolumeUp = 0xE030,
    MediaPlayPause = 0xE022,
    MediaStop = 0xE024,
    MediaPrevious = 0xE010,
    MediaNext = 0xE019,
}

impl Key {
    /// Check if this is a modifier key.
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            Key::ShiftLeft
                | Key::ShiftRight
                | Key::ControlLeft
                | Key::ControlRight
                | Key::AltLeft
                | Key::AltRight
                | Key::MetaLeft
                | Key::MetaRight
        )
    }

    /// Check if this is a function key.
    pub fn is_function_key(&self) -> bool {
        (0x003B..=0x0044).contains(&self.code())
            || matches!(
                self,
                Key::F11
                    | Key::F12
                    | Key::F13
                    | Key::F14
                    | Key::F15
                    | Key::F16
                    | Key::F17
                    | Key::F18
                    | Key::F19
                    | Key::F20
                    | Key::F21
                    | Key::F22
                    | Key::F23
                    | Key::F24
            )
    }

    /// Check if this is a navigation key.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Key::ArrowUp
                | Key::ArrowDown
                | Key::ArrowLeft
                | Key::ArrowRight
                | Key::Home
                | Key::End
                | Key::PageUp
                | Key::PageDown
        )
    }
}

impl Default for Key {
    fn default() -> Self {
        Key::Unknown(0)
    }
}

impl From<Key> for KeyId {
    fn from(key: Key) -> Self {
        KeyId::from(key.code())
    }
}
