//! An in-process broadcast bus for the lifecycle events a committee
//! process emits: poset inserts, forker detections, timing-unit elections,
//! and linear-order extensions. This is a side-channel fan-out for outer
//! observers (persistence, RPC); it is not the arbiter's own control-flow
//! queue, which is a dedicated `mpsc` internal to the scheduler.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{AlephEvent, EventFilter, EventTopic};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Protocol version for events carried on the bus.
pub const PROTOCOL_VERSION: u16 = 1;

/// Default buffer capacity per subscriber before lag drops events.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_version_is_one() {
        assert_eq!(PROTOCOL_VERSION, 1);
    }
}
