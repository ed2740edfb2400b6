//! Synchronous lifecycle event bus (spec.md §4.7).
//!
//! Delivery is synchronous and ordered per `emit` call; a panicking
//! listener is isolated and does not prevent delivery to the rest.

pub mod bus;
pub mod types;

pub use bus::{EventBus, EventListener, ListenerId, SharedEventBus};
pub use types::{Event, EventType};
