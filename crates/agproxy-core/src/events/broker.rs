//! Fan-out of recorded events to live stream subscribers.

use std::sync::Arc;
use std::task::{Context, Poll};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::mpsc;
use uuid::Uuid;

use agproxy_types::ProxyEvent;

/// A frame on the event stream wire.
#[derive(Debug, Clone)]
pub enum StreamFrame {
    /// One-shot greeting written on subscribe
    Connected { timestamp: DateTime<Utc> },
    /// Historical tail, sent as a single batch frame
    Backlog(Vec<ProxyEvent>),
    /// One live event
    Event(Box<ProxyEvent>),
}

impl StreamFrame {
    /// JSON payload for the `data:` line of an SSE frame.
    pub fn to_payload(&self) -> String {
        let result = match self {
            Self::Connected { timestamp } => {
                serde_json::to_string(&serde_json::json!({
                    "type": "connected",
                    "timestamp": timestamp,
                }))
            },
            Self::Backlog(events) => serde_json::to_string(events),
            Self::Event(event) => serde_json::to_string(event),
        };

        result.unwrap_or_else(|e| {
            tracing::error!("Failed to serialize stream frame: {e}");
            "{}".to_string()
        })
    }
}

struct SubscriberHandle {
    id: Uuid,
    tx: mpsc::UnboundedSender<StreamFrame>,
}

/// Live subscriber set with snapshot-based broadcast.
///
/// The set lock is never held across a channel send; dead subscribers are
/// reaped after each broadcast pass.
#[derive(Default)]
pub struct EventBroker {
    subscribers: RwLock<Vec<SubscriberHandle>>,
}

impl EventBroker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a live subscriber.
    ///
    /// Writes the `connected` frame, then the backlog batch when requested,
    /// then joins the live set, so a subscriber never sees a live event
    /// ordered before its history.
    pub fn subscribe(self: &Arc<Self>, backlog: Option<Vec<ProxyEvent>>) -> Subscription {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();

        let _ = tx.send(StreamFrame::Connected { timestamp: Utc::now() });
        if let Some(events) = backlog {
            let _ = tx.send(StreamFrame::Backlog(events));
        }

        self.subscribers.write().push(SubscriberHandle { id, tx });
        tracing::debug!("Event stream subscriber {id} connected");

        Subscription { id, rx, broker: Arc::clone(self) }
    }

    /// Fan a new event out to every live subscriber.
    pub fn broadcast(&self, event: &ProxyEvent) {
        let snapshot: Vec<(Uuid, mpsc::UnboundedSender<StreamFrame>)> =
            self.subscribers.read().iter().map(|s| (s.id, s.tx.clone())).collect();

        let mut dead = Vec::new();
        for (id, tx) in snapshot {
            if tx.send(StreamFrame::Event(Box::new(event.clone()))).is_err() {
                dead.push(id);
            }
        }

        if !dead.is_empty() {
            self.subscribers.write().retain(|s| !dead.contains(&s.id));
            tracing::debug!("Reaped {} dead event stream subscribers", dead.len());
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    fn unsubscribe(&self, id: Uuid) {
        self.subscribers.write().retain(|s| s.id != id);
        tracing::debug!("Event stream subscriber {id} disconnected");
    }
}

/// A live subscriber's receiving end; unregisters itself on drop.
pub struct Subscription {
    id: Uuid,
    rx: mpsc::UnboundedReceiver<StreamFrame>,
    broker: Arc<EventBroker>,
}

impl Subscription {
    /// Poll for the next frame; frames arrive in `record` order.
    pub fn poll_frame(&mut self, cx: &mut Context<'_>) -> Poll<Option<StreamFrame>> {
        self.rx.poll_recv(cx)
    }

    /// Await the next frame.
    pub async fn recv(&mut self) -> Option<StreamFrame> {
        self.rx.recv().await
    }

    /// Next frame if one is already queued.
    pub fn try_recv(&mut self) -> Option<StreamFrame> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.broker.unsubscribe(self.id);
    }
}
