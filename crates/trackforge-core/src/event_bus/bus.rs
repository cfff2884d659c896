//! Model event bus implementation.
//!
//! Each segment model owns one bus; there is no global instance. Every
//! published event gets a sequence number, and the most recent events can
//! be kept in a bounded journal for late observers.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{EventCategory, ModelEvent};

/// Subscription handle for unsubscribing from events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.simple().to_string()[..8])
    }
}

/// Which events a handler receives
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    #[default]
    All,
    /// Events of any of these categories
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    pub fn matches(&self, event: &ModelEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

type EventHandler = Arc<dyn Fn(ModelEvent) + Send + Sync>;

/// Event bus sizing
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Capacity of the broadcast channel behind [`ModelEventBus::receiver`]
    pub channel_capacity: usize,
    /// Number of events kept in the journal; 0 disables it
    pub journal_size: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            journal_size: 0,
        }
    }
}

/// A published event with its sequence number
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    /// Starts at 1 and grows by one per published event
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
    pub event: ModelEvent,
}

/// Publish/subscribe hub for segment model changes
pub struct ModelEventBus {
    sender: broadcast::Sender<ModelEvent>,
    // subscription order is delivery order
    handlers: RwLock<Vec<(SubscriptionId, EventFilter, EventHandler)>>,
    journal: Mutex<VecDeque<RecordedEvent>>,
    sequence: AtomicU64,
    config: EventBusConfig,
}

impl ModelEventBus {
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            sender,
            handlers: RwLock::new(Vec::new()),
            journal: Mutex::new(VecDeque::new()),
            sequence: AtomicU64::new(0),
            config,
        }
    }

    /// Deliver an event to matching handlers and to async receivers
    ///
    /// Returns the number of async receivers reached; no listeners at all
    /// is normal. Handlers run after the handler list is released, so a
    /// handler may subscribe or unsubscribe.
    pub fn publish(&self, event: ModelEvent) -> usize {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::trace!("Model event #{}: {}", sequence, event.description());
        self.record(sequence, &event);

        let matching: Vec<EventHandler> = self
            .handlers
            .read()
            .iter()
            .filter(|(_, filter, _)| filter.matches(&event))
            .map(|(_, _, handler)| handler.clone())
            .collect();
        for handler in matching {
            handler(event.clone());
        }

        self.sender.send(event).unwrap_or(0)
    }

    /// Register a synchronous handler, called on the publishing task
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(ModelEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.handlers.write().push((id, filter, Arc::new(handler)));
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Receiver for async consumers
    pub fn receiver(&self) -> broadcast::Receiver<ModelEvent> {
        self.sender.subscribe()
    }

    /// Returns true if the subscription existed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|(existing, _, _)| *existing != id);
        let removed = handlers.len() != before;
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Sequence number of the last published event, 0 before the first
    pub fn last_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// Journaled events with a sequence number above `sequence`
    pub fn events_since(&self, sequence: u64) -> Vec<RecordedEvent> {
        self.journal
            .lock()
            .iter()
            .filter(|recorded| recorded.sequence > sequence)
            .cloned()
            .collect()
    }

    /// Everything still in the journal, oldest first
    pub fn journal(&self) -> Vec<RecordedEvent> {
        self.events_since(0)
    }

    pub fn clear_journal(&self) {
        self.journal.lock().clear();
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    fn record(&self, sequence: u64, event: &ModelEvent) {
        if self.config.journal_size == 0 {
            return;
        }
        let mut journal = self.journal.lock();
        journal.push_back(RecordedEvent {
            sequence,
            recorded_at: Utc::now(),
            event: event.clone(),
        });
        while journal.len() > self.config.journal_size {
            journal.pop_front();
        }
    }
}

impl Default for ModelEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ModelEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelEventBus")
            .field("subscribers", &self.subscriber_count())
            .field("last_sequence", &self.last_sequence())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{BuildDirection, PieceType};

    #[test]
    fn test_unsubscribe_twice() {
        let bus = ModelEventBus::new();
        let id = bus.subscribe(EventFilter::All, |_| {});
        assert_eq!(bus.subscriber_count(), 1);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_publish_without_listeners_is_fine() {
        let bus = ModelEventBus::new();
        assert_eq!(bus.publish(ModelEvent::Closed), 0);
        assert_eq!(bus.last_sequence(), 1);
    }

    #[test]
    fn test_filters_and_delivery_order() {
        let bus = ModelEventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let log = seen.clone();
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Selection]),
            move |event| log.lock().push(("selection", event.category())),
        );
        let log = seen.clone();
        bus.subscribe(EventFilter::All, move |event| {
            log.lock().push(("all", event.category()))
        });

        bus.publish(ModelEvent::BuildDirectionChanged {
            direction: Some(BuildDirection::Previous),
        });
        bus.publish(ModelEvent::PreviewSegmentChanged { segment: None });

        assert_eq!(
            *seen.lock(),
            vec![
                ("selection", EventCategory::Selection),
                ("all", EventCategory::Selection),
                ("all", EventCategory::Preview),
            ]
        );
    }

    #[test]
    fn test_handler_may_unsubscribe_itself() {
        let bus = Arc::new(ModelEventBus::new());
        let slot: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));

        let (inner_bus, inner_slot) = (bus.clone(), slot.clone());
        let id = bus.subscribe(EventFilter::All, move |_| {
            if let Some(id) = *inner_slot.lock() {
                inner_bus.unsubscribe(id);
            }
        });
        *slot.lock() = Some(id);

        bus.publish(ModelEvent::Closed);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_journal_is_bounded_and_sequenced() {
        let bus = ModelEventBus::with_config(EventBusConfig {
            journal_size: 3,
            ..Default::default()
        });

        for _ in 0..4 {
            bus.publish(ModelEvent::Closed);
        }
        bus.publish(ModelEvent::SelectedBuildChanged {
            piece: Some(PieceType::Flat),
        });

        let journal = bus.journal();
        let sequences: Vec<u64> = journal.iter().map(|recorded| recorded.sequence).collect();
        assert_eq!(sequences, vec![3, 4, 5]);
        assert_eq!(bus.events_since(4).len(), 1);

        bus.clear_journal();
        assert!(bus.journal().is_empty());
        assert_eq!(bus.last_sequence(), 5);
    }

    #[test]
    fn test_journal_disabled_by_default() {
        let bus = ModelEventBus::new();
        bus.publish(ModelEvent::Closed);
        assert!(bus.journal().is_empty());
    }

    #[tokio::test]
    async fn test_async_receiver() {
        let bus = ModelEventBus::new();
        let mut receiver = bus.receiver();

        assert_eq!(bus.publish(ModelEvent::Closed), 1);
        let received = receiver.recv().await.expect("event delivered");
        assert_eq!(received, ModelEvent::Closed);
    }
}
