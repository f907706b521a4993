//! Basic example demonstrating event listening.
//!
//! Run with: cargo run --example basic
//!
//! A producer thread plays the part of a native hook, pushing a short
//! scripted burst of raw input through a `ChannelSource`.

use hookshot::channel::ChannelSource;
use hookshot::{Dispatcher, Event, EventType, Key, RawEvent};
use std::thread;
use std::time::Duration;

fn main() {
    println!("hookshot basic example\n");

    let source = ChannelSource::new();
    let sender = source.sender();
    let dispatcher = Dispatcher::new(source);

    dispatcher.on_many(&EventType::ALL, |event: &Event| match event.event_type {
        EventType::KeyDown => {
            if let Some(kb) = &event.keyboard {
                println!(
                    "Key down: {:?} (raw: {}) shift={}",
                    Key::from_code(kb.keycode),
                    kb.rawcode,
                    event.modifiers.shift_key
                );
            }
        }
        EventType::KeyUp => {
            if let Some(kb) = &event.keyboard {
                println!("Key up: {:?}", Key::from_code(kb.keycode));
            }
        }
        EventType::KeyPress => {
            if let Some(ch) = event.keyboard.as_ref().and_then(|kb| kb.keychar) {
                println!("Typed: {:?}", ch);
            }
        }
        EventType::MouseDown | EventType::MouseUp | EventType::MouseClick => {
            if let Some(mouse) = &event.mouse {
                println!(
                    "{}: button {} at ({}, {})",
                    event.event_type, mouse.button, mouse.x, mouse.y
                );
            }
        }
        EventType::MouseMove => {
            if let Some(mouse) = &event.mouse {
                println!("Mouse moved to ({}, {})", mouse.x, mouse.y);
            }
        }
        EventType::MouseDrag => {
            if let Some(mouse) = &event.mouse {
                println!("Mouse DRAGGED to ({}, {})", mouse.x, mouse.y);
            }
        }
        EventType::MouseWheel => {
            if let Some(wheel) = &event.wheel {
                println!("Wheel: rotation={} direction={}", wheel.rotation, wheel.direction);
            }
        }
    });

    if let Err(e) = dispatcher.start(false) {
        eprintln!("Error: {}", e);
        return;
    }

    let shift = Key::ShiftLeft.code();
    let a = Key::KeyA.code();
    let script = [
        RawEvent::mouse_move(10, 10),
        RawEvent::mouse_down(1, 10, 10),
        RawEvent::mouse_drag(40, 25),
        RawEvent::mouse_up(1, 40, 25),
        RawEvent::mouse_click(1, 1, 40, 25),
        RawEvent::key_down(shift, shift).with_mask(hookshot::modifiers::MASK_SHIFT_L),
        RawEvent::key_down(a, a),
        RawEvent::key_press(0, 0, 'A'),
        RawEvent::key_up(a, a),
        RawEvent::key_up(shift, shift),
        RawEvent::wheel(-3, 40, 25),
    ];
    let producer = thread::spawn(move || {
        for raw in script {
            sender.send(raw);
            thread::sleep(Duration::from_millis(50));
        }
    });

    if producer.join().is_err() {
        eprintln!("producer thread panicked");
    }
    thread::sleep(Duration::from_millis(100));

    if let Err(e) = dispatcher.stop() {
        eprintln!("Error: {}", e);
    }
}
