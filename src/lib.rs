//! # hookshot
//!
//! An event dispatch runtime for global keyboard and mouse hooks.
//!
//! A native hook (anything implementing [`HookBackend`]) delivers raw
//! records; the [`Dispatcher`] normalizes them into [`Event`]s, keeps
//! modifier keys latched across events, fans events out to listeners, and
//! tracks multi-key shortcuts.
//!
//! ## Features
//!
//! - Per-type listeners with registration-order delivery
//! - Shortcut detection with press and release callbacks
//! - Shortcut matching on keycodes or rawcodes
//! - Pause/resume without reinstalling the hook
//! - Listener panics are contained and logged
//! - Channel subscriptions (std, or tokio with the `tokio` feature)
//! - Record and replay raw input (with the `recorder` feature)
//!
//! ## Quick Start
//!
//! ```no_run
//! use hookshot::channel::ChannelSource;
//! use hookshot::{Dispatcher, Event, EventType, Key, RawEvent};
//!
//! let source = ChannelSource::new();
//! let sender = source.sender();
//! let dispatcher = Dispatcher::new(source);
//!
//! dispatcher.on(EventType::MouseDrag, |event: &Event| {
//!     if let Some(mouse) = &event.mouse {
//!         println!("Dragging at ({}, {})", mouse.x, mouse.y);
//!     }
//! });
//! dispatcher
//!     .register_shortcut([Key::ShiftLeft, Key::KeyA], |keys| {
//!         println!("Shift+A: {:?}", keys);
//!     })
//!     .expect("valid shortcut");
//!
//! dispatcher.start(false).expect("Failed to start hook");
//! sender.send(RawEvent::mouse_drag(10, 20));
//! ```
//!
//! ## Threading
//!
//! Events are dispatched synchronously on the thread that delivers them,
//! one delivery at a time. Listeners and shortcut callbacks run without any
//! dispatcher lock held, so they may call back into the dispatcher,
//! including `stop`.

pub mod channel;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod hook;
pub mod keycode;
pub mod listener;
pub mod modifiers;
pub mod normalize;
pub mod raw;
#[cfg(feature = "recorder")]
pub mod recorder;
pub mod shortcut;

// Re-exports
pub use config::Config;
pub use dispatch::{Dispatcher, RawEventSink};
pub use error::{Error, Result};
pub use event::{Event, EventType, KeyboardData, MouseData, WheelData};
pub use hook::{HookBackend, RawEventHandler};
pub use keycode::Key;
pub use listener::{EventHandler, ListenerId};
pub use modifiers::{ModifierLatch, Modifiers};
pub use normalize::normalize;
pub use raw::RawEvent;
#[cfg(feature = "recorder")]
pub use recorder::{RecordedEvent, Recording, RecordingBackend};
pub use shortcut::{EventProperty, KeyId, ShortcutId, ShortcutState, Trigger};
