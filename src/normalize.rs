//! Mapping from raw hook records onto normalized events.

use crate::event::{Event, EventType, KeyboardData, MouseData};
use crate::modifiers::Modifiers;
use crate::raw::RawEvent;

/// Convert a raw record into an [`Event`].
///
/// Returns `None` for unrecognized type tags and for records carrying no
/// sub-record; both are logged at debug level and otherwise ignored. When
/// more than one sub-record is set, the mouse record wins over the keyboard
/// record, which wins over the wheel record.
pub fn normalize(raw: RawEvent) -> Option<Event> {
    let Some(event_type) = EventType::from_tag(raw.type_tag) else {
        log::debug!("unregistered hook event type {}: {:?}", raw.type_tag, raw);
        return None;
    };

    let mut event = Event::new(event_type);
    event.time = raw.time;
    event.mask = raw.mask;

    if let Some(mouse) = raw.mouse {
        event.modifiers = mouse.modifiers;
        event.mouse = Some(MouseData {
            button: mouse.button,
            clicks: mouse.clicks,
            x: mouse.x,
            y: mouse.y,
        });
    } else if let Some(kb) = raw.keyboard {
        event.modifiers = kb.modifiers;
        event.keyboard = Some(KeyboardData {
            keycode: kb.keycode,
            rawcode: kb.rawcode,
            keychar: kb.keychar,
        });
    } else if let Some(wheel) = raw.wheel {
        event.modifiers = Modifiers::NONE;
        event.wheel = Some(wheel);
    } else {
        log::debug!("{} event without payload dropped", event_type);
        return None;
    }

    Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{RawKeyboard, TAG_HOOK_DISABLED, TAG_HOOK_ENABLED};

    #[test]
    fn test_keyboard_record() {
        let raw = RawEvent::key_down(42, 50)
            .at(1234)
            .with_modifiers(Modifiers::shift());
        let event = normalize(raw).expect("keydown is known");

        assert_eq!(event.event_type, EventType::KeyDown);
        assert_eq!(event.time, 1234);
        assert!(event.modifiers.shift_key);
        assert_eq!(
            event.keyboard,
            Some(KeyboardData {
                keycode: 42,
                rawcode: 50,
                keychar: None,
            })
        );
        assert!(event.mouse.is_none() && event.wheel.is_none());
    }

    #[test]
    fn test_mouse_and_wheel_records() {
        let event = normalize(RawEvent::mouse_click(1, 2, 100, 200)).expect("known");
        assert_eq!(event.event_type, EventType::MouseClick);
        let mouse = event.mouse.expect("mouse data");
        assert_eq!((mouse.button, mouse.clicks, mouse.x, mouse.y), (1, 2, 100, 200));

        let event = normalize(RawEvent::wheel(-3, 7, 8)).expect("known");
        assert_eq!(event.event_type, EventType::MouseWheel);
        assert_eq!(event.wheel.map(|w| w.rotation), Some(-3));
        assert!(event.modifiers.is_empty());
    }

    #[test]
    fn test_unknown_tags_dropped() {
        for tag in [0, TAG_HOOK_ENABLED, TAG_HOOK_DISABLED, 12, 99] {
            let mut raw = RawEvent::key_down(30, 30);
            raw.type_tag = tag;
            assert!(normalize(raw).is_none(), "tag {tag} must be dropped");
        }
    }

    #[test]
    fn test_empty_record_dropped() {
        assert!(normalize(RawEvent::new(EventType::KeyDown.tag())).is_none());
    }

    #[test]
    fn test_mouse_record_preferred() {
        let mut raw = RawEvent::mouse_down(1, 3, 4);
        raw.keyboard = Some(RawKeyboard {
            keycode: 1,
            rawcode: 1,
            keychar: None,
            modifiers: Modifiers::ctrl(),
        });
        let event = normalize(raw).expect("known");
        assert!(event.mouse.is_some());
        assert!(event.keyboard.is_none());
        assert!(!event.modifiers.ctrl_key);
    }
}
