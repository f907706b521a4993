//! Listener trait and the per-type listener registry.

use crate::event::{Event, EventType};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Trait for handling normalized events.
///
/// Implement this trait to receive events from a [`crate::Dispatcher`].
pub trait EventHandler: Send + Sync {
    /// Called when an event of a subscribed type occurs.
    fn handle_event(&self, event: &Event);
}

/// Implement EventHandler for closures.
impl<F> EventHandler for F
where
    F: Fn(&Event) + Send + Sync,
{
    fn handle_event(&self, event: &Event) {
        self(event);
    }
}

/// Handle returned by listener registration, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn next() -> Self {
        Self(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Listeners keyed by event type, each list in registration order.
#[derive(Default)]
pub struct ListenerRegistry {
    by_type: HashMap<EventType, Vec<(ListenerId, Arc<dyn EventHandler>)>>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `handler` under `id` for every type in `types`.
    pub fn add(&mut self, id: ListenerId, types: &[EventType], handler: Arc<dyn EventHandler>) {
        for event_type in types {
            let list = self.by_type.entry(*event_type).or_default();
            if !list.iter().any(|(existing, _)| *existing == id) {
                list.push((id, handler.clone()));
            }
        }
    }

    /// Remove the registration of `id` for one type. Returns `false` if it
    /// was not registered for that type.
    pub fn remove(&mut self, event_type: EventType, id: ListenerId) -> bool {
        let Some(list) = self.by_type.get_mut(&event_type) else {
            return false;
        };
        let before = list.len();
        list.retain(|(existing, _)| *existing != id);
        let removed = before != list.len();
        if list.is_empty() {
            self.by_type.remove(&event_type);
        }
        removed
    }

    /// Remove `id` from every type. Returns `false` if it was not registered.
    pub fn remove_all(&mut self, id: ListenerId) -> bool {
        let mut removed = false;
        for event_type in EventType::ALL {
            removed |= self.remove(event_type, id);
        }
        removed
    }

    /// Handlers for `event_type`, in registration order.
    pub fn handlers(&self, event_type: EventType) -> Vec<Arc<dyn EventHandler>> {
        self.by_type
            .get(&event_type)
            .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default()
    }

    /// Number of listeners registered for `event_type`.
    pub fn count(&self, event_type: EventType) -> usize {
        self.by_type.get(&event_type).map_or(0, Vec::len)
    }

    /// Remove every listener.
    pub fn clear(&mut self) {
        self.by_type.clear();
    }
}
