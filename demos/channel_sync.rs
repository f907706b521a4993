//! Sync channel example - receive events in the background.
//!
//! Run with: cargo run --example channel_sync
//!
//! This example shows how to use channels to receive events
//! without blocking your main thread.

use hookshot::channel::ChannelSource;
use hookshot::{Dispatcher, EventType, RawEvent};
use std::sync::mpsc::RecvTimeoutError;
use std::thread;
use std::time::Duration;

fn main() {
    println!("hookshot channel example (sync)");
    println!("================================\n");

    let source = ChannelSource::new();
    let sender = source.sender();
    let dispatcher = Dispatcher::new(source);

    // Bounded channel (capacity 100); events are dropped if we fall behind.
    let (_id, rx) = dispatcher.subscribe_channel(&EventType::ALL, 100);
    dispatcher.start(false).expect("Failed to start hook");

    println!("Hook started, waiting for events...\n");

    thread::spawn(move || {
        for i in 0..200 {
            sender.send(RawEvent::mouse_drag(i, i / 2));
            if i % 50 == 0 {
                sender.send(RawEvent::key_down(30, 30));
                sender.send(RawEvent::key_up(30, 30));
            }
            thread::sleep(Duration::from_millis(5));
        }
    });

    let mut event_count = 0u32;
    loop {
        // Non-blocking receive with timeout
        match rx.recv_timeout(Duration::from_millis(500)) {
            Ok(event) => {
                event_count += 1;

                match event.event_type {
                    EventType::KeyDown | EventType::KeyUp => {
                        if let Some(kb) = &event.keyboard {
                            println!("[{}] {}: {}", event_count, event.event_type, kb.keycode);
                        }
                    }
                    EventType::MouseDrag => {
                        // Only print every 20th drag event to reduce spam
                        if event_count % 20 == 0 {
                            if let Some(mouse) = &event.mouse {
                                println!("[{}] Dragging at ({}, {})", event_count, mouse.x, mouse.y);
                            }
                        }
                    }
                    _ => {}
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                println!("No events for a while, stopping.");
                break;
            }
            Err(RecvTimeoutError::Disconnected) => {
                println!("Channel disconnected, hook stopped.");
                break;
            }
        }
    }

    let _ = dispatcher.stop();
}
