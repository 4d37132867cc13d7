//! Broadcasting of entity changes to streaming clients.
//!
//! Every mutating operation publishes an [`Event`] on the [`EventsHandler`]. Clients subscribe
//! through `GET /events` and receive the events published after they subscribed, one JSON
//! object per line, until their `until` deadline passes, the handler closes them, or they
//! disconnect.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use chrono::{DateTime, Utc};
use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::{
    sync::broadcast::{self, error::RecvError},
    time::Instant,
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{config::DEFAULT_EVENT_CHANNEL_CAPACITY, models::EntityKind};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A change to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// The kind of entity that changed.
    pub kind: EntityKind,

    /// What happened to it.
    pub action: EventAction,

    /// The ID of the entity.
    pub id: String,

    /// When the change was made.
    pub time: DateTime<Utc>,
}

/// The kinds of change reported by events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventAction {
    /// The entity was created.
    Create,

    /// The specification of the entity was replaced.
    Update,

    /// The entity was removed.
    Remove,
}

/// Fans events out to the registered subscribers.
#[derive(Debug, Clone)]
pub struct EventsHandler {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    sender: broadcast::Sender<Event>,
    subscribers: Mutex<HashMap<String, CancellationToken>>,
}

/// A registered subscriber. Dropping it, or the stream made from it, unregisters it.
#[derive(Debug)]
pub struct Subscription {
    id: String,
    receiver: broadcast::Receiver<Event>,
    token: CancellationToken,
    deadline: Option<Instant>,
    inner: Arc<Inner>,
}

enum Step {
    Deliver(Event),
    Skip,
    Stop,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl EventsHandler {
    /// Creates a handler buffering up to `capacity` events per slow subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            inner: Arc::new(Inner {
                sender,
                subscribers: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Publishes an event to every current subscriber.
    pub fn publish(&self, kind: EntityKind, action: EventAction, id: impl Into<String>) {
        let event = Event {
            kind,
            action,
            id: id.into(),
            time: Utc::now(),
        };

        tracing::debug!(kind = %event.kind, action = ?event.action, id = %event.id, "publishing event");

        // No receivers is not an error.
        let _ = self.inner.sender.send(event);
    }

    /// Registers a subscriber. Its stream ends at `until` when one is given.
    pub fn subscribe(&self, until: Option<DateTime<Utc>>) -> Subscription {
        let id = Uuid::new_v4().simple().to_string();
        let token = CancellationToken::new();

        self.inner.registry().insert(id.clone(), token.clone());
        tracing::debug!(subscriber = %id, ?until, "events subscriber added");

        let deadline = until.map(|until| {
            let remaining = (until - Utc::now()).to_std().unwrap_or(Duration::ZERO);
            Instant::now() + remaining
        });

        Subscription {
            id,
            receiver: self.inner.sender.subscribe(),
            token,
            deadline,
            inner: Arc::clone(&self.inner),
        }
    }

    /// Ends the stream of one subscriber. Returns `false` if it is not registered.
    pub fn close(&self, id: &str) -> bool {
        match self.inner.registry().get(id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Ends the streams of every subscriber.
    pub fn close_all(&self) {
        let registry = self.inner.registry();
        tracing::info!(subscribers = registry.len(), "closing events subscribers");
        for token in registry.values() {
            token.cancel();
        }
    }

    /// Returns the number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.registry().len()
    }
}

impl Inner {
    fn registry(&self) -> std::sync::MutexGuard<'_, HashMap<String, CancellationToken>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Subscription {
    /// Returns the subscriber ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Turns the subscription into a stream of events.
    pub fn into_stream(mut self) -> impl Stream<Item = Event> + Send + 'static {
        async_stream::stream! {
            let deadline = self.deadline;
            let expired = async move {
                match deadline {
                    Some(deadline) => tokio::time::sleep_until(deadline).await,
                    None => std::future::pending().await,
                }
            };
            tokio::pin!(expired);

            loop {
                let step = tokio::select! {
                    biased;
                    _ = self.token.cancelled() => Step::Stop,
                    _ = &mut expired => Step::Stop,
                    received = self.receiver.recv() => match received {
                        Ok(event) => Step::Deliver(event),
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(subscriber = %self.id, skipped, "events subscriber lagging");
                            Step::Skip
                        }
                        Err(RecvError::Closed) => Step::Stop,
                    },
                };

                match step {
                    Step::Deliver(event) => yield event,
                    Step::Skip => continue,
                    Step::Stop => break,
                }
            }
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for EventsHandler {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CHANNEL_CAPACITY)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.inner.registry().remove(&self.id);
        tracing::debug!(subscriber = %self.id, "events subscriber removed");
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_events_delivered_until_closed() {
        let handler = EventsHandler::default();
        let subscription = handler.subscribe(None);
        let id = subscription.id().to_string();
        let mut stream = Box::pin(subscription.into_stream());

        handler.publish(EntityKind::Service, EventAction::Create, "svc-1");
        handler.publish(EntityKind::Service, EventAction::Remove, "svc-1");

        let first = stream.next().await.unwrap();
        assert_eq!((first.kind, first.action, first.id.as_str()), (EntityKind::Service, EventAction::Create, "svc-1"));
        assert_eq!(stream.next().await.unwrap().action, EventAction::Remove);

        assert!(handler.close(&id));
        assert_eq!(stream.next().await, None);
    }

    #[test_log::test(tokio::test)]
    async fn test_events_stream_ends_at_deadline() {
        let handler = EventsHandler::default();
        let until = Utc::now() + chrono::Duration::milliseconds(30);
        let mut stream = Box::pin(handler.subscribe(Some(until)).into_stream());

        assert_eq!(stream.next().await, None);
    }

    #[test_log::test(tokio::test)]
    async fn test_events_past_deadline_ends_immediately() {
        let handler = EventsHandler::default();
        let until = Utc::now() - chrono::Duration::seconds(10);
        let mut stream = Box::pin(handler.subscribe(Some(until)).into_stream());

        handler.publish(EntityKind::Node, EventAction::Update, "node-1");
        assert_eq!(stream.next().await, None);
    }

    #[test_log::test(tokio::test)]
    async fn test_events_registry_cleaned_up_on_drop() {
        let handler = EventsHandler::default();
        let first = handler.subscribe(None);
        let second = handler.subscribe(None);
        assert_eq!(handler.subscriber_count(), 2);

        drop(first);
        assert_eq!(handler.subscriber_count(), 1);

        let stream = second.into_stream();
        assert_eq!(handler.subscriber_count(), 1);
        drop(stream);
        assert_eq!(handler.subscriber_count(), 0);
        assert!(!handler.close("unknown"));
    }

    #[test_log::test(tokio::test)]
    async fn test_events_close_all_ends_every_stream() {
        let handler = EventsHandler::default();
        let mut a = Box::pin(handler.subscribe(None).into_stream());
        let mut b = Box::pin(handler.subscribe(None).into_stream());

        handler.close_all();

        assert_eq!(a.next().await, None);
        assert_eq!(b.next().await, None);
    }
}
