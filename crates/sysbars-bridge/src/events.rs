// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Listener registry for plugin notifications.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex};

use serde_json::Value;

/// Zero-payload notification telling the host to query `getHeights` again.
pub const CONFIGURATION_CHANGED: &str = "configurationChanged";

/// Callback invoked with the event payload, if any.
pub type Listener = Arc<dyn Fn(Option<&Value>) + Send + Sync>;

/// Identifies one registration, for removal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListenerHandle {
    event: String,
    id: u64,
}

impl ListenerHandle {
    pub fn event(&self) -> &str {
        &self.event
    }
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: HashMap<String, Vec<(u64, Listener)>>,
}

/// Event name → listeners map shared by all clones.
#[derive(Clone, Default)]
pub struct EventHub {
    inner: Arc<Mutex<Registry>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `event`.
    pub fn add_listener<F>(&self, event: &str, listener: F) -> ListenerHandle
    where
        F: Fn(Option<&Value>) + Send + Sync + 'static,
    {
        let mut registry = self.inner.lock().expect("listener lock poisoned");
        let id = registry.next_id;
        registry.next_id += 1;
        registry
            .listeners
            .entry(event.to_owned())
            .or_default()
            .push((id, Arc::new(listener)));
        tracing::debug!(event, id, "listener added");

        ListenerHandle {
            event: event.to_owned(),
            id,
        }
    }

    /// Remove one registration. Returns false if it was already gone.
    pub fn remove_listener(&self, handle: &ListenerHandle) -> bool {
        let mut registry = self.inner.lock().expect("listener lock poisoned");
        let Some(list) = registry.listeners.get_mut(&handle.event) else {
            return false;
        };
        let before = list.len();
        list.retain(|(id, _)| *id != handle.id);
        let removed = list.len() != before;
        if list.is_empty() {
            registry.listeners.remove(&handle.event);
        }
        removed
    }

    pub fn remove_all_listeners(&self) {
        self.inner
            .lock()
            .expect("listener lock poisoned")
            .listeners
            .clear();
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.inner
            .lock()
            .expect("listener lock poisoned")
            .listeners
            .get(event)
            .map_or(0, Vec::len)
    }

    /// Whether `other` shares this hub's registry (i.e. is a clone of it).
    pub fn same_hub(&self, other: &EventHub) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Invoke every listener of `event`, returning how many were called.
    ///
    /// Listeners run outside the registry lock, so they may add or remove
    /// registrations themselves. A listener that panics is logged and the
    /// rest are still notified.
    pub fn notify_listeners(&self, event: &str, payload: Option<&Value>) -> usize {
        let listeners: Vec<Listener> = {
            let registry = self.inner.lock().expect("listener lock poisoned");
            registry
                .listeners
                .get(event)
                .map(|list| list.iter().map(|(_, l)| Arc::clone(l)).collect())
                .unwrap_or_default()
        };
        for listener in &listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(payload))).is_err() {
                tracing::error!(event, "listener panicked");
            }
        }
        tracing::debug!(event, listeners = listeners.len(), "notified listeners");
        listeners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter(hub: &EventHub, event: &str) -> (Arc<AtomicUsize>, ListenerHandle) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let handle = hub.add_listener(event, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        (count, handle)
    }

    #[test]
    fn notify_reaches_only_matching_event() {
        let hub = EventHub::new();
        let (config, _) = counter(&hub, CONFIGURATION_CHANGED);
        let (other, _) = counter(&hub, "somethingElse");

        assert_eq!(hub.notify_listeners(CONFIGURATION_CHANGED, None), 1);
        assert_eq!(config.load(Ordering::SeqCst), 1);
        assert_eq!(other.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn removed_listener_is_not_called() {
        let hub = EventHub::new();
        let (count, handle) = counter(&hub, CONFIGURATION_CHANGED);

        assert!(hub.remove_listener(&handle));
        assert!(!hub.remove_listener(&handle));
        assert_eq!(hub.notify_listeners(CONFIGURATION_CHANGED, None), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(hub.listener_count(CONFIGURATION_CHANGED), 0);
    }

    #[test]
    fn payload_is_passed_through() {
        let hub = EventHub::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        hub.add_listener("custom", move |payload| {
            s.lock().unwrap().push(payload.cloned());
        });

        hub.notify_listeners("custom", Some(&serde_json::json!({"x": 1})));
        hub.notify_listeners("custom", None);

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0], Some(serde_json::json!({"x": 1})));
        assert_eq!(seen[1], None);
    }

    #[test]
    fn listener_may_unregister_itself() {
        let hub = EventHub::new();
        let slot: Arc<Mutex<Option<ListenerHandle>>> = Arc::new(Mutex::new(None));
        let (h, s) = (hub.clone(), Arc::clone(&slot));
        let handle = hub.add_listener(CONFIGURATION_CHANGED, move |_| {
            if let Some(handle) = s.lock().unwrap().take() {
                h.remove_listener(&handle);
            }
        });
        *slot.lock().unwrap() = Some(handle);

        assert_eq!(hub.notify_listeners(CONFIGURATION_CHANGED, None), 1);
        assert_eq!(hub.notify_listeners(CONFIGURATION_CHANGED, None), 0);
    }

    #[test]
    fn panicking_listener_does_not_starve_the_rest() {
        let hub = EventHub::new();
        hub.add_listener(CONFIGURATION_CHANGED, |_| panic!("listener failure"));
        let (count, _) = counter(&hub, CONFIGURATION_CHANGED);

        assert_eq!(hub.notify_listeners(CONFIGURATION_CHANGED, None), 2);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // The registry is still usable afterwards.
        assert_eq!(hub.notify_listeners(CONFIGURATION_CHANGED, None), 2);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn clones_share_one_hub() {
        let hub = EventHub::new();
        let clone = hub.clone();

        assert!(hub.same_hub(&clone));
        assert!(!hub.same_hub(&EventHub::new()));
    }
}
