//! Raw event recording and replay.
//!
//! [`RecordingBackend`] wraps any [`HookBackend`] and copies every raw record
//! it delivers into a [`Recording`], timestamped relative to the start of the
//! recording. A recording can be saved as JSON and later replayed through a
//! dispatcher's [`RawEventSink`], which exercises listeners and shortcuts
//! exactly as the live hook did. Useful for:
//! - Automated testing
//! - Macro scripts
//! - Reproducing bug reports
//!
//! # Example
//!
//! ```no_run
//! use hookshot::channel::ChannelSource;
//! use hookshot::recorder::{Recording, RecordingBackend};
//! use hookshot::Dispatcher;
//!
//! let recorder = RecordingBackend::new(ChannelSource::new());
//! let dispatcher = Dispatcher::new(recorder.clone());
//!
//! recorder.start_recording().unwrap();
//! dispatcher.start(false).unwrap();
//! // ... input arrives ...
//! let recording = recorder.stop_recording().unwrap();
//! recording.save("macro.json").unwrap();
//!
//! // Later, against any dispatcher
//! let recording = Recording::load("macro.json").unwrap();
//! recording.replay(&dispatcher.sink());
//! ```

use crate::dispatch::RawEventSink;
use crate::error::{Error, Result};
use crate::hook::{HookBackend, RawEventHandler};
use crate::raw::{RawEvent, TAG_HOOK_DISABLED, TAG_HOOK_ENABLED};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant, SystemTime};

/// A recorded raw event with its offset from the recording start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedEvent {
    /// Time elapsed since recording start.
    pub elapsed: Duration,
    /// The raw record as the backend delivered it.
    pub event: RawEvent,
}

/// A complete recording of raw input events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    /// Recorded events in delivery order.
    pub events: Vec<RecordedEvent>,
    /// When the recording was created.
    pub created_at: SystemTime,
    /// Optional description.
    pub description: Option<String>,
}

impl Recording {
    /// Create a new empty recording.
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            created_at: SystemTime::now(),
            description: None,
        }
    }

    /// Set a description for this recording.
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Get the duration of this recording.
    pub fn duration(&self) -> Duration {
        self.events
            .last()
            .map(|e| e.elapsed)
            .unwrap_or(Duration::ZERO)
    }

    /// Get the number of events in this recording.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Save the recording to a file (JSON format).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a recording from a file (JSON format).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Feed every event into `sink` as fast as possible.
    ///
    /// Hook enabled/disabled records are skipped.
    pub fn replay(&self, sink: &RawEventSink) {
        for recorded in self.replayable() {
            sink.deliver(recorded.event.clone());
        }
    }

    /// Feed every event into `sink`, keeping the recorded intervals.
    ///
    /// # Arguments
    ///
    /// * `speed` - Speed multiplier (1.0 = normal speed, 2.0 = double speed, 0.5 = half speed)
    pub fn replay_with_speed(&self, sink: &RawEventSink, speed: f64) -> Result<()> {
        if !(speed > 0.0 && speed.is_finite()) {
            return Err(Error::Other("replay speed must be positive".into()));
        }

        let start = Instant::now();
        for recorded in self.replayable() {
            let target = Duration::from_secs_f64(recorded.elapsed.as_secs_f64() / speed);
            let elapsed = start.elapsed();
            if target > elapsed {
                std::thread::sleep(target - elapsed);
            }
            sink.deliver(recorded.event.clone());
        }
        Ok(())
    }

    fn replayable(&self) -> impl Iterator<Item = &RecordedEvent> {
        self.events
            .iter()
            .filter(|e| !matches!(e.event.type_tag, TAG_HOOK_ENABLED | TAG_HOOK_DISABLED))
    }
}

impl Default for Recording {
    fn default() -> Self {
        Self::new()
    }
}

struct Session {
    recording: Recording,
    started: Instant,
}

/// A backend wrapper that records the raw events it delivers.
///
/// Recording is off until [`RecordingBackend::start_recording`]. Cloning
/// yields another handle to the same recorder, so one clone can be handed to
/// a [`crate::Dispatcher`] while another controls the recording.
pub struct RecordingBackend<B> {
    inner: Arc<B>,
    session: Arc<Mutex<Option<Session>>>,
}

impl<B> Clone for RecordingBackend<B> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            session: self.session.clone(),
        }
    }
}

impl<B: HookBackend> RecordingBackend<B> {
    /// Wrap `backend`.
    pub fn new(backend: B) -> Self {
        Self {
            inner: Arc::new(backend),
            session: Arc::new(Mutex::new(None)),
        }
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &B {
        &self.inner
    }

    /// Begin a new recording.
    pub fn start_recording(&self) -> Result<()> {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if session.is_some() {
            return Err(Error::Other("recording already in progress".into()));
        }
        *session = Some(Session {
            recording: Recording::new(),
            started: Instant::now(),
        });
        log::debug!("recording started");
        Ok(())
    }

    /// Finish the current recording and return it.
    pub fn stop_recording(&self) -> Result<Recording> {
        let session = self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(|| Error::Other("no recording in progress".into()))?;
        log::debug!(
            "recording stopped with {} events",
            session.recording.event_count()
        );
        Ok(session.recording)
    }

    /// Check if currently recording.
    pub fn is_recording(&self) -> bool {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl<B: HookBackend> HookBackend for RecordingBackend<B> {
    fn install(&self, handler: Arc<dyn RawEventHandler>, debug: bool) -> Result<()> {
        let session = self.session.clone();
        let tee = move |event: RawEvent| {
            if let Some(active) = session
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .as_mut()
            {
                let elapsed = active.started.elapsed();
                active.recording.events.push(RecordedEvent {
                    elapsed,
                    event: event.clone(),
                });
            }
            handler.on_raw_event(event);
        };
        self.inner.install(Arc::new(tee), debug)
    }

    fn uninstall(&self) -> Result<()> {
        self.inner.uninstall()
    }

    fn set_click_propagation(&self, suppress: bool) -> Result<()> {
        self.inner.set_click_propagation(suppress)
    }

    fn set_debug(&self, enabled: bool) {
        self.inner.set_debug(enabled)
    }

    fn unload(&self) -> Result<()> {
        self.inner.unload()
    }

    fn load(&self) -> Result<()> {
        self.inner.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Dispatcher;
    use crate::event::{Event, EventType};
    use crate::hook::testing::MockBackend;

    #[test]
    fn test_recording_new() {
        let recording = Recording::new();
        assert!(recording.events.is_empty());
        assert_eq!(recording.duration(), Duration::ZERO);
        assert_eq!(recording.event_count(), 0);
    }

    #[test]
    fn test_recording_duration() {
        let mut recording = Recording::new().with_description("Test macro");
        recording.events.push(RecordedEvent {
            elapsed: Duration::from_secs(5),
            event: RawEvent::key_down(30, 30),
        });
        assert_eq!(recording.duration(), Duration::from_secs(5));
        assert_eq!(recording.description.as_deref(), Some("Test macro"));
    }

    #[test]
    fn test_save_load() {
        let mut recording = Recording::new().with_description("Test");
        recording.events.push(RecordedEvent {
            elapsed: Duration::from_millis(100),
            event: RawEvent::key_press(30, 30, 'a'),
        });

        let temp_path = std::env::temp_dir().join("hookshot_test_recording.json");
        recording.save(&temp_path).unwrap();

        let loaded = Recording::load(&temp_path).unwrap();
        assert_eq!(loaded.description, recording.description);
        assert_eq!(loaded.events, recording.events);

        std::fs::remove_file(&temp_path).unwrap();
    }

    #[test]
    fn test_load_missing_and_malformed() {
        let missing = std::env::temp_dir().join("hookshot_test_missing.json");
        assert!(matches!(Recording::load(&missing), Err(Error::Io(_))));

        let bad = std::env::temp_dir().join("hookshot_test_malformed.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(Recording::load(&bad), Err(Error::Serialization(_))));
        std::fs::remove_file(&bad).unwrap();
    }

    #[test]
    fn test_records_and_replays_through_dispatcher() {
        let mock = MockBackend::new();
        let recorder = RecordingBackend::new(mock.clone());
        let dispatcher = Dispatcher::new(recorder.clone());
        let (_, events) = dispatcher.subscribe_channel(&EventType::ALL, 32);

        dispatcher.start(false).unwrap();
        mock.emit(RawEvent::key_down(1, 1));
        recorder.start_recording().unwrap();
        assert!(recorder.is_recording());
        mock.emit(RawEvent::new(TAG_HOOK_ENABLED));
        mock.emit(RawEvent::key_down(30, 30));
        mock.emit(RawEvent::mouse_move(5, 6));
        let recording = recorder.stop_recording().unwrap();
        mock.emit(RawEvent::key_up(30, 30));

        assert_eq!(recording.event_count(), 3);
        assert_eq!(recording.events[1].event, RawEvent::key_down(30, 30));
        assert!(recording.events[1].elapsed <= recording.events[2].elapsed);
        assert_eq!(events.try_iter().count(), 4);

        recording.replay(&dispatcher.sink());
        let replayed: Vec<Event> = events.try_iter().collect();
        let types: Vec<EventType> = replayed.iter().map(|e| e.event_type).collect();
        assert_eq!(types, vec![EventType::KeyDown, EventType::MouseMove]);
    }

    #[test]
    fn test_start_stop_errors() {
        let recorder = RecordingBackend::new(MockBackend::new());
        assert!(recorder.stop_recording().is_err());
        recorder.start_recording().unwrap();
        assert!(recorder.start_recording().is_err());
        assert!(recorder.stop_recording().unwrap().events.is_empty());
        assert!(!recorder.is_recording());
    }

    #[test]
    fn test_replay_with_speed() {
        let mock = MockBackend::new();
        let dispatcher = Dispatcher::new(mock.clone());
        let (_, events) = dispatcher.subscribe_channel(&[EventType::KeyDown], 8);
        dispatcher.start(false).unwrap();

        let mut recording = Recording::new();
        for (ms, code) in [(0, 1u16), (20, 2), (40, 3)] {
            recording.events.push(RecordedEvent {
                elapsed: Duration::from_millis(ms),
                event: RawEvent::key_down(code, code),
            });
        }

        assert!(recording.replay_with_speed(&dispatcher.sink(), 0.0).is_err());
        assert!(recording.replay_with_speed(&dispatcher.sink(), -1.0).is_err());

        let start = Instant::now();
        recording.replay_with_speed(&dispatcher.sink(), 2.0).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(20));

        let codes: Vec<u16> = events
            .try_iter()
            .filter_map(|e| e.keyboard.map(|k| k.keycode))
            .collect();
        assert_eq!(codes, vec![1, 2, 3]);
    }
}
