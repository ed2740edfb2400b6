//! Synchronous, ordered, exception-isolating event bus (spec.md §4.7, §8).
//!
//! This intentionally does not use `tokio::broadcast`: a broadcast channel
//! drops events for lagging receivers and gives no ordering or delivery
//! guarantee across listeners. The contract here requires every registered
//! listener to observe every event exactly once, in registration order,
//! and a panicking listener must not stop delivery to the rest.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use tracing::warn;

use super::types::Event;
use crate::error::PipelineError;

/// A listener invoked synchronously on every `emit`. Implementors must be
/// internally synchronized; the bus does not serialize calls across threads
/// beyond holding its own listener list lock during the fan-out. A listener
/// reports failure via `Err` rather than panicking; a panic is still caught
/// as a last resort so a buggy listener can never abort delivery.
pub trait EventListener: Send + Sync {
    fn on_event(&self, event: &Event) -> Result<(), PipelineError>;
}

impl<F> EventListener for F
where
    F: Fn(&Event) -> Result<(), PipelineError> + Send + Sync,
{
    fn on_event(&self, event: &Event) -> Result<(), PipelineError> {
        self(event)
    }
}

/// Opaque handle returned by `register`, used to `unregister` later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

struct Registration {
    id: ListenerId,
    listener: Arc<dyn EventListener>,
}

/// Shared reference to an `EventBus`.
pub type SharedEventBus = Arc<EventBus>;

/// Fan-out point for pipeline lifecycle events.
pub struct EventBus {
    listeners: Mutex<Vec<Registration>>,
    next_id: std::sync::atomic::AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            next_id: std::sync::atomic::AtomicU64::new(1),
        }
    }

    pub fn shared() -> SharedEventBus {
        Arc::new(Self::new())
    }

    /// Register a listener, returning an id for later `unregister`.
    pub fn register(&self, listener: Arc<dyn EventListener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, std::sync::atomic::Ordering::SeqCst));
        self.listeners
            .lock()
            .expect("event bus listener lock poisoned")
            .push(Registration { id, listener });
        id
    }

    pub fn unregister(&self, id: ListenerId) {
        self.listeners
            .lock()
            .expect("event bus listener lock poisoned")
            .retain(|r| r.id != id);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().expect("event bus listener lock poisoned").len()
    }

    /// Deliver `event` to every registered listener, in registration order.
    /// A listener that panics is caught and logged; later listeners still run.
    pub fn emit(&self, event: Event) {
        let listeners: Vec<_> = self
            .listeners
            .lock()
            .expect("event bus listener lock poisoned")
            .iter()
            .map(|r| r.listener.clone())
            .collect();

        for listener in listeners {
            let result = catch_unwind(AssertUnwindSafe(|| listener.on_event(&event)));
            match result {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    warn!(event_type = %event.event_type, error = %err, "event listener returned an error; continuing delivery");
                }
                Err(panic) => {
                    let message = panic_message(&panic);
                    warn!(event_type = %event.event_type, %message, "event listener panicked; continuing delivery");
                }
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::types::EventType;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample_event() -> Event {
        Event::new(EventType::Info, "topic", uuid::Uuid::new_v4(), "msg")
    }

    #[test]
    fn listeners_observe_events_in_registration_order() {
        let bus = EventBus::new();
        let order: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));

        for n in 0..3u32 {
            let order = order.clone();
            bus.register(Arc::new(move |_: &Event| {
                order.lock().unwrap().push(n);
                Ok(())
            }));
        }

        bus.emit(sample_event());
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn panicking_listener_does_not_block_others() {
        let bus = EventBus::new();
        let after_ran = Arc::new(AtomicUsize::new(0));

        bus.register(Arc::new(|_: &Event| -> Result<(), PipelineError> { panic!("boom") }));
        let flag = after_ran.clone();
        bus.register(Arc::new(move |_: &Event| {
            flag.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));

        bus.emit(sample_event());
        assert_eq!(after_ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failing_listener_does_not_block_others() {
        let bus = EventBus::new();
        let after_ran = Arc::new(AtomicUsize::new(0));

        bus.register(Arc::new(|_: &Event| {
            Err(PipelineError::ValidationFailed("listener refused".into()))
        }));
        let flag = after_ran.clone();
        bus.register(Arc::new(move |_: &Event| {
            flag.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));

        bus.emit(sample_event());
        assert_eq!(after_ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn each_listener_observes_event_exactly_once() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        bus.register(Arc::new(move |_: &Event| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));

        bus.emit(sample_event());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unregister_stops_future_delivery() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let id = bus.register(Arc::new(move |_: &Event| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));

        bus.emit(sample_event());
        bus.unregister(id);
        bus.emit(sample_event());

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
