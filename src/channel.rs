//! A channel-fed hook backend with its own delivery thread.
//!
//! [`ChannelSource`] stands in for a native hook: producers push
//! [`RawEvent`]s through a [`RawEventSender`], and a dedicated worker thread
//! hands them to the installed handler, just as an OS hook thread would.
//! This is the integration point for platform capture code, and what the
//! demos and tests drive.
//!
//! # Example
//!
//! ```no_run
//! use hookshot::channel::ChannelSource;
//! use hookshot::{Dispatcher, Event, EventType, RawEvent};
//!
//! let source = ChannelSource::new();
//! let sender = source.sender();
//! let dispatcher = Dispatcher::new(source);
//!
//! dispatcher.on(EventType::KeyDown, |event: &Event| {
//!     println!("{:?}", event.keyboard);
//! });
//! dispatcher.start(false).expect("Failed to start hook");
//!
//! // Typically called from the platform hook thread.
//! sender.send(RawEvent::key_down(30, 65));
//! ```

use crate::error::{Error, Result};
use crate::hook::{HookBackend, RawEventHandler};
use crate::raw::RawEvent;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

/// How often an idle worker re-checks its stop flag.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

struct Worker {
    handle: JoinHandle<()>,
    thread: ThreadId,
    stop: Arc<AtomicBool>,
}

/// A queued event, tagged with the install session it was sent in.
type Queued = (u64, RawEvent);

struct Shared {
    sender: Sender<Queued>,
    receiver: Arc<Mutex<Receiver<Queued>>>,
    running: AtomicBool,
    session: AtomicU64,
    suppress_clicks: AtomicBool,
    debug: AtomicBool,
    worker: Mutex<Option<Worker>>,
}

/// Backend that delivers raw events from a queue on a worker thread.
///
/// Cloning yields another handle to the same source.
#[derive(Clone)]
pub struct ChannelSource {
    shared: Arc<Shared>,
}

impl Default for ChannelSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelSource {
    /// Create an idle source.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            shared: Arc::new(Shared {
                sender,
                receiver: Arc::new(Mutex::new(receiver)),
                running: AtomicBool::new(false),
                session: AtomicU64::new(0),
                suppress_clicks: AtomicBool::new(false),
                debug: AtomicBool::new(false),
                worker: Mutex::new(None),
            }),
        }
    }

    /// A producer handle for pushing raw events into this source.
    pub fn sender(&self) -> RawEventSender {
        RawEventSender {
            shared: self.shared.clone(),
        }
    }

    /// Check if the worker thread is delivering events.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Check if mouse clicks are currently swallowed.
    pub fn suppresses_clicks(&self) -> bool {
        self.shared.suppress_clicks.load(Ordering::SeqCst)
    }
}

impl HookBackend for ChannelSource {
    fn install(&self, handler: Arc<dyn RawEventHandler>, debug: bool) -> Result<()> {
        let mut worker = self
            .shared
            .worker
            .lock()
            .map_err(|_| Error::ThreadError("worker lock poisoned".into()))?;
        if worker.is_some() {
            return Err(Error::HookInstallFailed("source is already installed".into()));
        }

        self.shared.debug.store(debug, Ordering::SeqCst);
        // Events still queued from an earlier session are skipped by the new
        // worker; they may have been sent after a stop issued from a handler.
        let session = self.shared.session.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.running.store(true, Ordering::SeqCst);

        // Each install gets its own stop flag, so a worker told to stop from
        // inside its handler cannot be revived by a later install.
        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = stop.clone();
        let receiver = self.shared.receiver.clone();
        let handle = thread::Builder::new()
            .name("hookshot-source".into())
            .spawn(move || deliver_loop(session, &worker_stop, &receiver, handler.as_ref()))
            .map_err(|e| {
                self.shared.running.store(false, Ordering::SeqCst);
                Error::HookInstallFailed(format!("failed to spawn worker: {}", e))
            })?;

        log::debug!("channel source worker started");
        *worker = Some(Worker {
            thread: handle.thread().id(),
            handle,
            stop,
        });
        Ok(())
    }

    fn uninstall(&self) -> Result<()> {
        let worker = self
            .shared
            .worker
            .lock()
            .map_err(|_| Error::ThreadError("worker lock poisoned".into()))?
            .take();
        self.shared.running.store(false, Ordering::SeqCst);

        let Some(worker) = worker else {
            return Ok(());
        };
        worker.stop.store(true, Ordering::SeqCst);

        // Uninstalling from a handler runs on the worker itself; it exits
        // on its own once the current event returns.
        if worker.thread == thread::current().id() {
            return Ok(());
        }

        worker
            .handle
            .join()
            .map_err(|_| Error::ThreadError("failed to join source worker".into()))?;
        log::debug!("channel source worker stopped");
        Ok(())
    }

    fn set_click_propagation(&self, suppress: bool) -> Result<()> {
        self.shared.suppress_clicks.store(suppress, Ordering::SeqCst);
        Ok(())
    }

    fn set_debug(&self, enabled: bool) {
        self.shared.debug.store(enabled, Ordering::SeqCst);
    }
}

fn deliver_loop(
    session: u64,
    stop: &AtomicBool,
    receiver: &Mutex<Receiver<Queued>>,
    handler: &dyn RawEventHandler,
) {
    let Ok(receiver) = receiver.lock() else {
        log::error!("channel source receiver poisoned");
        return;
    };

    while !stop.load(Ordering::SeqCst) {
        match receiver.recv_timeout(POLL_INTERVAL) {
            Ok((sent_in, event)) => {
                if sent_in == session && !stop.load(Ordering::SeqCst) {
                    handler.on_raw_event(event);
                }
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

/// Producer side of a [`ChannelSource`].
#[derive(Clone)]
pub struct RawEventSender {
    shared: Arc<Shared>,
}

impl RawEventSender {
    /// Queue a raw event for delivery.
    ///
    /// Returns `false` (and drops the event) when the source is not
    /// installed. Never blocks.
    pub fn send(&self, event: RawEvent) -> bool {
        if !self.shared.running.load(Ordering::SeqCst) {
            return false;
        }
        let session = self.shared.session.load(Ordering::SeqCst);
        if self.shared.debug.load(Ordering::Relaxed) {
            log::trace!("queued raw event type {}", event.type_tag);
        }
        self.shared.sender.send((session, event)).is_ok()
    }

    /// Whether the native event should continue to the OS window chain.
    ///
    /// Clicks are held back while click propagation is disabled; everything
    /// else always propagates.
    pub fn propagates(&self, event: &RawEvent) -> bool {
        !(event.is_click() && self.shared.suppress_clicks.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Dispatcher;
    use crate::event::{Event, EventType};
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(2);

    #[test]
    fn test_send_before_install_is_dropped() {
        let source = ChannelSource::new();
        let sender = source.sender();
        assert!(!sender.send(RawEvent::key_down(1, 1)));
        assert!(!source.is_running());
    }

    #[test]
    fn test_events_arrive_on_worker_thread() {
        let source = ChannelSource::new();
        let sender = source.sender();
        let (tx, rx) = mpsc::channel();
        let handler: Arc<dyn RawEventHandler> = Arc::new(move |event: RawEvent| {
            let _ = tx.send((event.type_tag, thread::current().name().map(String::from)));
        });

        source.install(handler, false).unwrap();
        assert!(source.is_running());
        assert!(sender.send(RawEvent::key_down(1, 1)));
        assert!(sender.send(RawEvent::mouse_move(1, 1)));

        let first = rx.recv_timeout(TIMEOUT).unwrap();
        let second = rx.recv_timeout(TIMEOUT).unwrap();
        assert_eq!(first.0, 4);
        assert_eq!(second.0, 9);
        assert_eq!(first.1.as_deref(), Some("hookshot-source"));

        source.uninstall().unwrap();
        assert!(!source.is_running());
        assert!(!sender.send(RawEvent::key_down(1, 1)));
    }

    #[test]
    fn test_double_install_fails() {
        let source = ChannelSource::new();
        let handler: Arc<dyn RawEventHandler> = Arc::new(|_: RawEvent| {});
        source.install(handler.clone(), false).unwrap();
        assert!(matches!(
            source.install(handler, false),
            Err(Error::HookInstallFailed(_))
        ));
        source.uninstall().unwrap();
        source.uninstall().unwrap();
    }

    #[test]
    fn test_click_propagation_flag() {
        let source = ChannelSource::new();
        let sender = source.sender();
        assert!(sender.propagates(&RawEvent::mouse_click(1, 1, 0, 0)));

        source.set_click_propagation(true).unwrap();
        assert!(source.suppresses_clicks());
        assert!(!sender.propagates(&RawEvent::mouse_down(1, 0, 0)));
        assert!(sender.propagates(&RawEvent::mouse_move(0, 0)));
        assert!(sender.propagates(&RawEvent::key_down(1, 1)));
    }

    #[test]
    fn test_dispatcher_end_to_end() {
        let source = ChannelSource::new();
        let sender = source.sender();
        let dispatcher = Dispatcher::new(source.clone());
        let (_, events) = dispatcher.subscribe_channel(&[EventType::KeyDown], 16);
        let (tx, presses) = mpsc::channel();
        dispatcher
            .register_shortcut_with_release(
                [42u16, 30],
                {
                    let tx = tx.clone();
                    move |keys| {
                        let _ = tx.send(("press", keys.len()));
                    }
                },
                move |keys| {
                    let _ = tx.send(("release", keys.len()));
                },
            )
            .unwrap();

        dispatcher.start(false).unwrap();
        assert!(source.is_running());

        sender.send(RawEvent::key_down(42, 50).with_mask(crate::modifiers::MASK_SHIFT_L));
        sender.send(RawEvent::key_down(30, 38));
        sender.send(RawEvent::key_up(30, 38));

        let first: Event = events.recv_timeout(TIMEOUT).unwrap();
        let second: Event = events.recv_timeout(TIMEOUT).unwrap();
        assert!(first.modifiers.shift_key);
        assert!(second.modifiers.shift_key);
        assert_eq!(presses.recv_timeout(TIMEOUT).unwrap(), ("press", 2));
        assert_eq!(presses.recv_timeout(TIMEOUT).unwrap(), ("release", 2));

        dispatcher.stop().unwrap();
        assert!(!source.is_running());
        assert!(!sender.send(RawEvent::key_down(42, 50)));
    }

    #[test]
    fn test_stop_from_listener() {
        let source = ChannelSource::new();
        let sender = source.sender();
        let dispatcher = Arc::new(Dispatcher::new(source.clone()));
        let (tx, rx) = mpsc::channel();
        let weak = Arc::downgrade(&dispatcher);
        dispatcher.on(EventType::KeyUp, move |_: &Event| {
            if let Some(d) = weak.upgrade() {
                let _ = tx.send(d.stop().is_ok());
            }
        });

        dispatcher.start(false).unwrap();
        sender.send(RawEvent::key_up(1, 1));
        assert!(rx.recv_timeout(TIMEOUT).unwrap());
        assert!(!dispatcher.is_started());

        // The worker exits on its own; a fresh start spawns a new one.
        dispatcher.start(false).unwrap();
        assert!(source.is_running());
        dispatcher.stop().unwrap();
    }

    #[test]
    fn test_stop_during_delivery() {
        let source = ChannelSource::new();
        let sender = source.sender();
        let dispatcher = Arc::new(Dispatcher::new(source.clone()));
        let (entered_tx, entered) = mpsc::channel();
        let (seen_tx, seen) = mpsc::channel();
        let weak = Arc::downgrade(&dispatcher);
        dispatcher.on(EventType::KeyDown, move |_: &Event| {
            let _ = entered_tx.send(());
            thread::sleep(Duration::from_millis(200));
            if let Some(d) = weak.upgrade() {
                let _ = seen_tx.send((d.is_started(), d.start(false).is_err()));
            }
        });

        dispatcher.start(false).unwrap();
        sender.send(RawEvent::key_down(1, 1));
        entered.recv_timeout(TIMEOUT).unwrap();

        let (done_tx, done) = mpsc::channel();
        let stopper = {
            let dispatcher = dispatcher.clone();
            thread::spawn(move || {
                let _ = done_tx.send(dispatcher.stop().is_ok());
            })
        };

        // The listener still runs while stop waits for the worker, and may
        // query the dispatcher; restarting mid-stop is refused.
        assert_eq!(seen.recv_timeout(TIMEOUT).unwrap(), (false, true));
        assert!(done.recv_timeout(TIMEOUT).unwrap());
        stopper.join().unwrap();
        assert!(!dispatcher.is_started());
        assert!(!source.is_running());

        dispatcher.start(false).unwrap();
        assert!(dispatcher.is_active());
        dispatcher.stop().unwrap();
    }

    #[test]
    fn test_events_queued_before_stop_do_not_reach_next_session() {
        let source = ChannelSource::new();
        let sender = source.sender();
        let dispatcher = Arc::new(Dispatcher::new(source.clone()));
        let (_, downs) = dispatcher.subscribe_channel(&[EventType::KeyDown], 16);
        let weak = Arc::downgrade(&dispatcher);
        dispatcher.on(EventType::KeyUp, move |_: &Event| {
            thread::sleep(Duration::from_millis(50));
            if let Some(d) = weak.upgrade() {
                let _ = d.stop();
            }
        });

        dispatcher.start(false).unwrap();
        sender.send(RawEvent::key_up(1, 1));
        sender.send(RawEvent::key_down(77, 77));
        thread::sleep(Duration::from_millis(200));
        assert!(!dispatcher.is_started());

        dispatcher.start(false).unwrap();
        assert!(downs.recv_timeout(Duration::from_millis(200)).is_err());

        sender.send(RawEvent::key_down(78, 78));
        let event = downs.recv_timeout(TIMEOUT).unwrap();
        assert_eq!(event.keyboard.map(|k| k.keycode), Some(78));
        dispatcher.stop().unwrap();
    }
}
