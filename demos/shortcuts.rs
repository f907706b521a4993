//! Shortcut example: press and release callbacks for key combinations.
//!
//! Run with: cargo run --example shortcuts

use hookshot::channel::ChannelSource;
use hookshot::{Dispatcher, Key, RawEvent};
use std::thread;
use std::time::Duration;

fn main() {
    let source = ChannelSource::new();
    let sender = source.sender();
    let dispatcher = Dispatcher::new(source);

    let save = dispatcher
        .register_shortcut_with_release(
            [Key::ControlLeft, Key::KeyS],
            |keys| println!("Ctrl+S pressed ({} keys)", keys.len()),
            |_| println!("Ctrl+S released"),
        )
        .expect("valid shortcut");
    dispatcher
        .register_shortcut(["56", "62"], |keys| {
            println!("Alt+F4 pressed: {:?}", keys);
        })
        .expect("valid shortcut");

    for state in dispatcher.shortcuts() {
        println!("registered {} -> {:?}", state.id, state.keys);
    }

    dispatcher.start(false).expect("Failed to start hook");

    let ctrl = Key::ControlLeft.code();
    let s = Key::KeyS.code();
    let script = [
        RawEvent::key_down(ctrl, ctrl),
        RawEvent::key_down(s, s),
        // Autorepeat does not fire again.
        RawEvent::key_down(s, s),
        RawEvent::key_up(s, s),
        RawEvent::key_up(ctrl, ctrl),
        RawEvent::key_down(56, 56),
        RawEvent::key_down(62, 62),
        RawEvent::key_up(62, 62),
        RawEvent::key_up(56, 56),
    ];
    for raw in script {
        sender.send(raw);
    }
    thread::sleep(Duration::from_millis(200));

    dispatcher.unregister_shortcut(save);
    println!("{} shortcut(s) left", dispatcher.shortcuts().len());
    let _ = dispatcher.stop();
}
