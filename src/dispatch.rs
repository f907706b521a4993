//! The dispatch core: lifecycle gate, listener fan-out and shortcut matching.
//!
//! A [`Dispatcher`] owns all of its state, so several independent instances
//! can coexist in one process. Raw events arrive through a [`RawEventSink`]
//! on the hook backend's thread; control calls (start, stop, registration)
//! come from any other thread. All pipeline state sits behind one mutex and
//! whole deliveries are serialized, so events are processed in a single
//! total order and no shortcut ever observes a half-applied update.
//!
//! User code (listeners and shortcut callbacks) always runs with no internal
//! lock held. It may call back into the dispatcher, and a panic in one
//! callback is logged and does not stop the others.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::event::{Event, EventType};
use crate::hook::{HookBackend, RawEventHandler};
use crate::listener::{EventHandler, ListenerId, ListenerRegistry};
use crate::modifiers::{ModifierLatch, Modifiers};
use crate::normalize::normalize;
use crate::raw::RawEvent;
use crate::shortcut::{EventProperty, KeyId, ShortcutId, ShortcutRegistry, ShortcutState};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Run user code, logging instead of propagating a panic.
fn isolate(what: &str, f: impl FnOnce()) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(f)) {
        log::error!("{} panicked: {}", what, panic_message(payload.as_ref()));
    }
}

/// Hook lifecycle, guarded separately from the event pipeline.
struct Control {
    loaded: bool,
    installed: bool,
    /// Set while `stop` waits on the backend with this lock released.
    stopping: bool,
    click_propagation: bool,
}

/// Everything an event delivery reads or mutates.
struct Pipeline {
    active: bool,
    latch: ModifierLatch,
    shortcuts: ShortcutRegistry,
    event_property: EventProperty,
}

struct Inner {
    backend: Box<dyn HookBackend>,
    control: Mutex<Control>,
    pipeline: Mutex<Pipeline>,
    listeners: RwLock<ListenerRegistry>,
    delivery: Mutex<()>,
    debug: AtomicBool,
}

impl Inner {
    fn deliver(&self, raw: RawEvent) {
        let _serial = lock(&self.delivery);

        // Latch and shortcut state are updated together at admission, so a
        // listener that pauses or stops cannot leave them half-applied.
        let (event, fired) = {
            let mut pipeline = lock(&self.pipeline);
            if !pipeline.active {
                return;
            }
            let Some(mut event) = normalize(raw) else {
                return;
            };
            pipeline.latch.apply(&mut event);
            let fired = match event.key_id(pipeline.event_property) {
                Some(key) if !pipeline.shortcuts.is_empty() => {
                    pipeline.shortcuts.handle(event.event_type, &key)
                }
                _ => Vec::new(),
            };
            (event, fired)
        };

        if self.debug.load(Ordering::Relaxed) {
            log::trace!("dispatching {}: {:?}", event.event_type, event);
        }

        let handlers = read(&self.listeners).handlers(event.event_type);
        for handler in handlers {
            isolate("event listener", || handler.handle_event(&event));
        }

        // A listener may have stopped or paused the pipeline.
        if fired.is_empty() || !lock(&self.pipeline).active {
            return;
        }

        for shortcut in fired {
            log::debug!("shortcut {} {:?}", shortcut.id, shortcut.trigger);
            isolate("shortcut callback", || shortcut.invoke());
        }
    }
}

/// The inbound end of a dispatcher, handed to hook backends.
///
/// Holds only a weak reference: once the dispatcher is dropped, delivered
/// events are ignored.
#[derive(Clone)]
pub struct RawEventSink {
    inner: Weak<Inner>,
}

impl RawEventSink {
    /// Feed one raw event through the pipeline on the calling thread.
    pub fn deliver(&self, event: RawEvent) {
        if let Some(inner) = self.inner.upgrade() {
            inner.deliver(event);
        }
    }
}

impl RawEventHandler for RawEventSink {
    fn on_raw_event(&self, event: RawEvent) {
        self.deliver(event);
    }
}

/// Normalizes raw hook events and dispatches them to listeners and
/// shortcuts.
///
/// # Example
///
/// ```no_run
/// use hookshot::channel::ChannelSource;
/// use hookshot::{Dispatcher, Event, EventType, Key};
///
/// let source = ChannelSource::new();
/// let dispatcher = Dispatcher::new(source.clone());
///
/// dispatcher.on(EventType::KeyDown, |event: &Event| {
///     println!("{:?}", event.keyboard);
/// });
/// dispatcher
///     .register_shortcut([Key::ControlLeft, Key::KeyS], |keys| {
///         println!("save: {:?}", keys);
///     })
///     .expect("valid shortcut");
///
/// dispatcher.start(false).expect("failed to install hook");
/// ```
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    /// Create an inactive dispatcher driving `backend` with default settings.
    pub fn new<B: HookBackend + 'static>(backend: B) -> Self {
        Self::with_config(backend, Config::default())
    }

    /// Create an inactive dispatcher driving `backend`.
    pub fn with_config<B: HookBackend + 'static>(backend: B, config: Config) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend: Box::new(backend),
                control: Mutex::new(Control {
                    loaded: true,
                    installed: false,
                    stopping: false,
                    click_propagation: config.click_propagation,
                }),
                pipeline: Mutex::new(Pipeline {
                    active: false,
                    latch: ModifierLatch::new(),
                    shortcuts: ShortcutRegistry::new(),
                    event_property: config.event_property,
                }),
                listeners: RwLock::new(ListenerRegistry::new()),
                delivery: Mutex::new(()),
                debug: AtomicBool::new(config.debug),
            }),
        }
    }

    /// A handle that feeds raw events into this dispatcher.
    pub fn sink(&self) -> RawEventSink {
        RawEventSink {
            inner: Arc::downgrade(&self.inner),
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Install the hook if needed and start dispatching.
    ///
    /// `debug` applies only when this call installs the hook; calling `start`
    /// while installed just resumes dispatching and leaves the debug flag
    /// alone (use [`Dispatcher::set_debug`]). On a fresh install the modifier
    /// latch and shortcut key state are reset. If the backend fails to
    /// install, the dispatcher stays inactive.
    pub fn start(&self, debug: bool) -> Result<()> {
        let mut control = lock(&self.inner.control);
        if !control.loaded {
            return Err(Error::NotLoaded);
        }
        if control.stopping {
            return Err(Error::HookInstallFailed("hook is being uninstalled".into()));
        }

        if !control.installed {
            self.set_debug(debug);
            let handler: Arc<dyn RawEventHandler> = Arc::new(self.sink());
            self.inner.backend.install(handler, debug)?;
            control.installed = true;

            if !control.click_propagation {
                if let Err(e) = self.inner.backend.set_click_propagation(true) {
                    log::warn!("could not suppress click propagation: {}", e);
                }
            }

            let mut pipeline = lock(&self.inner.pipeline);
            pipeline.latch.reset();
            pipeline.shortcuts.reset_pressed();
            log::info!("input hook installed");
        }

        lock(&self.inner.pipeline).active = true;
        Ok(())
    }

    /// Stop dispatching and uninstall the hook.
    ///
    /// Events delivered once this takes effect are discarded. Calling `stop`
    /// while stopped does nothing. If the backend fails to uninstall, the
    /// dispatcher is left as it was.
    ///
    /// The backend is uninstalled without holding any dispatcher lock, so a
    /// listener still running on the hook thread may call back into the
    /// dispatcher while `stop` waits for it.
    pub fn stop(&self) -> Result<()> {
        let was_active = {
            let mut control = lock(&self.inner.control);
            let was_active = std::mem::replace(&mut lock(&self.inner.pipeline).active, false);
            if !control.installed {
                return Ok(());
            }
            control.installed = false;
            control.stopping = true;
            was_active
        };

        let result = self.inner.backend.uninstall();

        let mut control = lock(&self.inner.control);
        control.stopping = false;
        if let Err(e) = result {
            control.installed = true;
            lock(&self.inner.pipeline).active = was_active;
            return Err(e);
        }
        log::info!("input hook uninstalled");
        Ok(())
    }

    /// Stop delivering events without touching the hook.
    pub fn pause(&self) {
        lock(&self.inner.pipeline).active = false;
    }

    /// Resume delivering events after [`Dispatcher::pause`].
    ///
    /// Does nothing unless the hook is installed.
    pub fn resume(&self) {
        let control = lock(&self.inner.control);
        if control.installed {
            lock(&self.inner.pipeline).active = true;
        }
    }

    /// Re-acquire backend resources after [`Dispatcher::unload`]. A new
    /// dispatcher starts out loaded.
    pub fn load(&self) -> Result<()> {
        let mut control = lock(&self.inner.control);
        if !control.loaded {
            self.inner.backend.load()?;
            control.loaded = true;
        }
        Ok(())
    }

    /// Stop, uninstall and release backend resources. `start` fails with
    /// [`Error::NotLoaded`] until [`Dispatcher::load`] is called.
    pub fn unload(&self) -> Result<()> {
        self.stop()?;
        let mut control = lock(&self.inner.control);
        if control.stopping {
            return Err(Error::HookUninstallFailed("hook is being uninstalled".into()));
        }
        if control.loaded {
            self.inner.backend.unload()?;
            control.loaded = false;
            log::debug!("hook backend unloaded");
        }
        Ok(())
    }

    /// Check if events are currently dispatched.
    pub fn is_active(&self) -> bool {
        lock(&self.inner.pipeline).active
    }

    /// Check if the hook is installed (started and not stopped).
    pub fn is_started(&self) -> bool {
        lock(&self.inner.control).installed
    }

    /// Check if backend resources are loaded.
    pub fn is_loaded(&self) -> bool {
        lock(&self.inner.control).loaded
    }

    /// Toggle verbose logging here and in the backend.
    pub fn set_debug(&self, enabled: bool) {
        self.inner.debug.store(enabled, Ordering::Relaxed);
        self.inner.backend.set_debug(enabled);
    }

    /// Let mouse clicks reach the OS window chain.
    pub fn enable_click_propagation(&self) -> Result<()> {
        self.set_click_propagation(true)
    }

    /// Swallow mouse clicks after dispatching them.
    pub fn disable_click_propagation(&self) -> Result<()> {
        self.set_click_propagation(false)
    }

    fn set_click_propagation(&self, enabled: bool) -> Result<()> {
        let mut control = lock(&self.inner.control);
        self.inner.backend.set_click_propagation(!enabled)?;
        control.click_propagation = enabled;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Listeners
    // ------------------------------------------------------------------

    /// Subscribe `handler` to one event type.
    pub fn on<H: EventHandler + 'static>(&self, event_type: EventType, handler: H) -> ListenerId {
        self.on_many(&[event_type], handler)
    }

    /// Subscribe one `handler` to several event types under a single id.
    pub fn on_many<H: EventHandler + 'static>(&self, types: &[EventType], handler: H) -> ListenerId {
        let id = ListenerId::next();
        write(&self.inner.listeners).add(id, types, Arc::new(handler));
        id
    }

    /// Unsubscribe `id` from one event type. Returns `false` if it was not
    /// subscribed to that type.
    pub fn off(&self, event_type: EventType, id: ListenerId) -> bool {
        write(&self.inner.listeners).remove(event_type, id)
    }

    /// Unsubscribe `id` from every event type.
    pub fn off_all(&self, id: ListenerId) -> bool {
        write(&self.inner.listeners).remove_all(id)
    }

    /// Unsubscribe every listener, including channel subscriptions.
    pub fn clear_listeners(&self) {
        write(&self.inner.listeners).clear();
    }

    /// Number of listeners subscribed to `event_type`.
    pub fn listener_count(&self, event_type: EventType) -> usize {
        read(&self.inner.listeners).count(event_type)
    }

    /// Subscribe a bounded channel to the given event types.
    ///
    /// Events are sent with `try_send`: if the receiver falls behind, new
    /// events are dropped rather than stalling the hook thread.
    pub fn subscribe_channel(
        &self,
        types: &[EventType],
        capacity: usize,
    ) -> (ListenerId, Receiver<Event>) {
        let (sender, receiver) = mpsc::sync_channel(capacity);
        let id = self.on_many(types, move |event: &Event| {
            let _ = sender.try_send(event.clone());
        });
        (id, receiver)
    }

    /// Subscribe a tokio channel to the given event types.
    ///
    /// Same dropping behavior as [`Dispatcher::subscribe_channel`].
    #[cfg(feature = "tokio")]
    pub fn subscribe_async(
        &self,
        types: &[EventType],
        capacity: usize,
    ) -> (ListenerId, tokio::sync::mpsc::Receiver<Event>) {
        let (sender, receiver) = tokio::sync::mpsc::channel(capacity);
        let id = self.on_many(types, move |event: &Event| {
            let _ = sender.try_send(event.clone());
        });
        (id, receiver)
    }

    // ------------------------------------------------------------------
    // Shortcuts
    // ------------------------------------------------------------------

    /// Register a shortcut whose `on_press` runs when all `keys` are held.
    pub fn register_shortcut<I, F>(&self, keys: I, on_press: F) -> Result<ShortcutId>
    where
        I: IntoIterator,
        I::Item: Into<KeyId>,
        F: Fn(&[KeyId]) + Send + Sync + 'static,
    {
        lock(&self.inner.pipeline)
            .shortcuts
            .register(keys, Arc::new(on_press), None)
    }

    /// Register a shortcut with both a press and a release callback.
    ///
    /// `on_release` runs once the first key of a fully-pressed shortcut is
    /// let go.
    pub fn register_shortcut_with_release<I, F, G>(
        &self,
        keys: I,
        on_press: F,
        on_release: G,
    ) -> Result<ShortcutId>
    where
        I: IntoIterator,
        I::Item: Into<KeyId>,
        F: Fn(&[KeyId]) + Send + Sync + 'static,
        G: Fn(&[KeyId]) + Send + Sync + 'static,
    {
        lock(&self.inner.pipeline)
            .shortcuts
            .register(keys, Arc::new(on_press), Some(Arc::new(on_release)))
    }

    /// Remove a shortcut by id. Unknown ids are ignored.
    pub fn unregister_shortcut(&self, id: ShortcutId) -> bool {
        lock(&self.inner.pipeline).shortcuts.unregister(id)
    }

    /// Remove the first shortcut registered with exactly `keys`.
    pub fn unregister_shortcut_by_keys<I>(&self, keys: I) -> bool
    where
        I: IntoIterator,
        I::Item: Into<KeyId>,
    {
        lock(&self.inner.pipeline).shortcuts.unregister_keys(keys)
    }

    /// Remove every shortcut.
    pub fn unregister_all_shortcuts(&self) {
        lock(&self.inner.pipeline).shortcuts.clear();
    }

    /// Match shortcuts on rawcodes (`true`) or keycodes (`false`).
    pub fn use_rawcode(&self, enabled: bool) {
        lock(&self.inner.pipeline).event_property = if enabled {
            EventProperty::Rawcode
        } else {
            EventProperty::Keycode
        };
    }

    /// The key identifier space used for shortcut matching.
    pub fn event_property(&self) -> EventProperty {
        lock(&self.inner.pipeline).event_property
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Current latched modifier state.
    pub fn modifiers(&self) -> Modifiers {
        lock(&self.inner.pipeline).latch.state()
    }

    /// State of every registered shortcut, in registration order.
    pub fn shortcuts(&self) -> Vec<ShortcutState> {
        lock(&self.inner.pipeline).shortcuts.snapshot()
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        if self.is_started() {
            let _ = self.stop();
        }
    }
}
