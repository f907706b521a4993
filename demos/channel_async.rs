//! Async channel example with Tokio.
//!
//! Run with: cargo run --example channel_async --features tokio
//!
//! This example shows how to use async channels with Tokio
//! to receive events in an async context.

use hookshot::channel::ChannelSource;
use hookshot::{Dispatcher, EventType, RawEvent};
use std::time::Duration;
use tokio::time::{interval, sleep};

#[tokio::main]
async fn main() {
    println!("hookshot channel example (async/tokio)");
    println!("======================================\n");

    let source = ChannelSource::new();
    let sender = source.sender();
    let dispatcher = Dispatcher::new(source);

    let (_id, mut rx) = dispatcher.subscribe_async(&EventType::ALL, 100);
    dispatcher.start(false).expect("Failed to start hook");

    println!("Hook started, waiting for events...\n");

    std::thread::spawn(move || {
        for i in 0..100 {
            sender.send(RawEvent::mouse_move(i * 3, i));
            if i % 25 == 0 {
                sender.send(RawEvent::mouse_click(1, 1, i * 3, i));
            }
            std::thread::sleep(Duration::from_millis(20));
        }
    });

    let mut event_count = 0u32;
    let mut heartbeat = interval(Duration::from_millis(500));
    let deadline = sleep(Duration::from_secs(3));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else {
                    println!("Channel closed, hook stopped.");
                    break;
                };
                event_count += 1;

                match event.event_type {
                    EventType::MouseClick => {
                        if let Some(mouse) = &event.mouse {
                            println!(
                                "[{}] Click {} at ({}, {})",
                                event_count, mouse.button, mouse.x, mouse.y
                            );
                        }
                    }
                    EventType::MouseMove => {
                        // Only print every 20th move event
                        if event_count % 20 == 0 {
                            if let Some(mouse) = &event.mouse {
                                println!("[{}] Moved to ({}, {})", event_count, mouse.x, mouse.y);
                            }
                        }
                    }
                    _ => {}
                }
            }

            // Periodic heartbeat to show the async loop is responsive
            _ = heartbeat.tick() => {
                println!("... heartbeat (received {} events so far)", event_count);
            }

            _ = &mut deadline => break,
        }
    }

    let _ = dispatcher.stop();
}
