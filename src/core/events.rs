//! Console event bus
//!
//! Controllers and filter panels publish what changed; views subscribe and
//! re-render. The bus uses `tokio::sync::broadcast` so any number of
//! subscribers can listen without the publishers knowing about them.
//!
//! ```text
//! ResourceController ──┐
//! RemoteController  ───┼──▶ EventBus::publish() ──▶ broadcast channel ──▶ subscribers
//! FilterPanel       ───┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! let bus = EventBus::new(256);
//! let mut rx = bus.subscribe();
//!
//! bus.publish(ConsoleEvent::Resource(ResourceEvent::Deleted {
//!     resource: "operator".to_string(),
//!     id: "42".to_string(),
//! }));
//!
//! if let Ok(envelope) = rx.recv().await {
//!     println!("{} {:?}", envelope.event.action(), envelope.event.resource());
//! }
//! ```

use crate::core::filter::FilterValue;
use chrono::{DateTime, Utc};
use futures::Stream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

/// Resource mutations applied to a controller's collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ResourceEvent {
    Created {
        resource: String,
        id: String,
        data: serde_json::Value,
    },
    Updated {
        resource: String,
        id: String,
        data: serde_json::Value,
    },
    Deleted {
        resource: String,
        id: String,
    },
    BulkDeleted {
        resource: String,
        ids: Vec<String>,
    },
    /// The remote cache was replaced by a list response
    Refreshed {
        resource: String,
        count: usize,
    },
}

/// A filter value changed; `None` means the filter was cleared
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterChange {
    pub filter_id: String,
    pub value: Option<FilterValue>,
}

impl FilterChange {
    pub fn new(filter_id: impl Into<String>, value: Option<FilterValue>) -> Self {
        Self {
            filter_id: filter_id.into(),
            value,
        }
    }
}

/// Top-level console event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsoleEvent {
    Resource(ResourceEvent),
    Filter(FilterChange),
}

impl ConsoleEvent {
    pub fn event_kind(&self) -> &str {
        match self {
            ConsoleEvent::Resource(_) => "resource",
            ConsoleEvent::Filter(_) => "filter",
        }
    }

    /// Resource name the event relates to
    pub fn resource(&self) -> Option<&str> {
        match self {
            ConsoleEvent::Resource(
                ResourceEvent::Created { resource, .. }
                | ResourceEvent::Updated { resource, .. }
                | ResourceEvent::Deleted { resource, .. }
                | ResourceEvent::BulkDeleted { resource, .. }
                | ResourceEvent::Refreshed { resource, .. },
            ) => Some(resource.as_str()),
            ConsoleEvent::Filter(_) => None,
        }
    }

    pub fn action(&self) -> &str {
        match self {
            ConsoleEvent::Resource(e) => match e {
                ResourceEvent::Created { .. } => "created",
                ResourceEvent::Updated { .. } => "updated",
                ResourceEvent::Deleted { .. } => "deleted",
                ResourceEvent::BulkDeleted { .. } => "bulk_deleted",
                ResourceEvent::Refreshed { .. } => "refreshed",
            },
            ConsoleEvent::Filter(change) if change.value.is_some() => "changed",
            ConsoleEvent::Filter(_) => "cleared",
        }
    }
}

/// Envelope wrapping an event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event: ConsoleEvent,
}

impl EventEnvelope {
    pub fn new(event: ConsoleEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Broadcast-based event bus
///
/// Cheap to clone; every clone publishes to the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per slow subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to all subscribers
    ///
    /// Never fails; returns the number of receivers that will see the event.
    pub fn publish(&self, event: ConsoleEvent) -> usize {
        // send() only errors when nobody listens
        self.sender.send(EventEnvelope::new(event)).unwrap_or(0)
    }

    /// Receive every event published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Stream view of [`subscribe`](Self::subscribe); lagged events are skipped
    pub fn stream(&self) -> impl Stream<Item = EventEnvelope> + Send + 'static {
        BroadcastStream::new(self.sender.subscribe()).filter_map(|item| async move {
            match item {
                Ok(envelope) => Some(envelope),
                Err(lagged) => {
                    tracing::warn!(error = %lagged, "event subscriber lagged");
                    None
                }
            }
        })
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
