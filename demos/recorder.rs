//! Record raw input, save it, and replay it into a fresh dispatcher.
//!
//! Run with: cargo run --example recorder --features recorder

use hookshot::channel::ChannelSource;
use hookshot::recorder::{Recording, RecordingBackend};
use hookshot::{Dispatcher, Event, EventType, RawEvent};
use std::thread;
use std::time::Duration;

fn main() -> hookshot::Result<()> {
    let source = ChannelSource::new();
    let sender = source.sender();
    let recorder = RecordingBackend::new(source);
    let live = Dispatcher::new(recorder.clone());

    recorder.start_recording()?;
    live.start(false)?;
    for i in 0..10 {
        sender.send(RawEvent::mouse_move(i * 10, i * 5));
        thread::sleep(Duration::from_millis(30));
    }
    sender.send(RawEvent::key_down(30, 30));
    sender.send(RawEvent::key_up(30, 30));
    thread::sleep(Duration::from_millis(100));
    live.stop()?;

    let recording = recorder
        .stop_recording()?
        .with_description("mouse sweep and a keystroke");
    println!(
        "Recorded {} events over {:?}",
        recording.event_count(),
        recording.duration()
    );

    let path = std::env::temp_dir().join("hookshot_demo_recording.json");
    recording.save(&path)?;
    println!("Saved to {}", path.display());

    let loaded = Recording::load(&path)?;
    let replay = Dispatcher::new(ChannelSource::new());
    replay.on_many(&EventType::ALL, |event: &Event| {
        println!("replayed {}", event.event_type);
    });
    replay.start(false)?;
    loaded.replay_with_speed(&replay.sink(), 2.0)?;
    replay.stop()?;

    std::fs::remove_file(&path)?;
    Ok(())
}
