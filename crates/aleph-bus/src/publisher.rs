//! Publishing side of the event bus.

use crate::events::{AlephEvent, EventFilter};
use crate::subscriber::{EventStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Interface the poset/consensus services use to emit lifecycle events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes an event, returning the number of subscribers it reached.
    async fn publish(&self, event: AlephEvent) -> usize;

    /// Total events published since construction.
    fn events_published(&self) -> u64;
}

/// In-memory event bus backed by `tokio::sync::broadcast`. Suitable for a
/// single process's internal fan-out to an outer observability/persistence
/// layer; not a network transport.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<AlephEvent>,
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,
    events_published: AtomicU64,
    capacity: usize,
}

impl InMemoryEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        let topic_key = format!("{:?}", filter.topics);
        if let Ok(mut subs) = self.subscriptions.write() {
            *subs.entry(topic_key.clone()).or_insert(0) += 1;
        }
        debug!(topics = ?filter.topics, "new subscription");
        Subscription::new(receiver, filter, self.subscriptions.clone(), topic_key)
    }

    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.subscribe(filter))
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: AlephEvent) -> usize {
        let topic = event.topic();
        self.events_published.fetch_add(1, Ordering::Relaxed);
        match self.sender.send(event) {
            Ok(receiver_count) => {
                debug!(topic = ?topic, receivers = receiver_count, "event published");
                receiver_count
            }
            Err(e) => {
                warn!(topic = ?topic, error = %e, "event dropped, no receivers");
                0
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventTopic;

    fn sample() -> AlephEvent {
        AlephEvent::TimingUnitElected {
            level: 1,
            unit: [0u8; 32],
        }
    }

    #[tokio::test]
    async fn publish_no_subscribers() {
        let bus = InMemoryEventBus::new();
        assert_eq!(bus.publish(sample()).await, 0);
        assert_eq!(bus.events_published(), 1);
    }

    #[tokio::test]
    async fn publish_with_subscriber() {
        let bus = InMemoryEventBus::new();
        let _sub = bus.subscribe(EventFilter::all());
        assert_eq!(bus.publish(sample()).await, 1);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn multiple_subscribers_all_reached() {
        let bus = InMemoryEventBus::new();
        let _a = bus.subscribe(EventFilter::all());
        let _b = bus.subscribe(EventFilter::all());
        let _c = bus.subscribe(EventFilter::topics(vec![EventTopic::Consensus]));
        assert_eq!(bus.publish(sample()).await, 3);
    }

    #[test]
    fn default_bus_has_default_capacity() {
        let bus = InMemoryEventBus::default();
        assert_eq!(bus.capacity(), DEFAULT_CHANNEL_CAPACITY);
        assert_eq!(bus.events_published(), 0);
    }
}
