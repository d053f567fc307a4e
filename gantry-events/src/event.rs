//! Event definitions and traits

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;
use uuid::Uuid;

/// Event trait
///
/// All events must implement this trait to be published through the
/// event bus. Events are immutable values; the bus never stores them
/// after publication.
pub trait Event: Send + Sync + Debug + 'static {
    /// Get event name
    fn event_name(&self) -> &str;

    /// Get event ID
    fn event_id(&self) -> Uuid;

    /// Get event creation timestamp
    fn timestamp(&self) -> DateTime<Utc>;

    /// Cast to Any for downcasting
    fn as_any(&self) -> &dyn Any;
}

/// Base event metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event ID
    pub id: Uuid,

    /// Event name/type
    pub name: String,

    /// Timestamp when event was created
    pub timestamp: DateTime<Utc>,
}

impl EventMetadata {
    /// Create new event metadata
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Event handler error
#[derive(Debug, thiserror::Error)]
pub enum EventHandlerError {
    #[error("Handler failed: {0}")]
    HandlerFailed(String),

    #[error("Event processing error: {0}")]
    ProcessingError(String),
}

/// Asynchronous event handler trait
#[async_trait]
pub trait EventHandler<E: Event>: Send + Sync {
    /// Handle the event
    async fn handle(&self, event: &E) -> Result<(), EventHandlerError>;
}

/// Type-erased synchronous handler stored by the bus.
pub(crate) type DynSyncHandler =
    Arc<dyn Fn(&dyn Event) -> Result<(), EventHandlerError> + Send + Sync>;

/// Type-erased asynchronous event handler
#[async_trait]
pub trait DynEventHandler: Send + Sync {
    /// Handle event (type-erased)
    async fn handle_dyn(&self, event: Arc<dyn Event>) -> Result<(), EventHandlerError>;
}

/// Wrapper for typed asynchronous handlers
pub struct TypedEventHandler<E: Event, H: EventHandler<E>> {
    handler: H,
    _phantom: std::marker::PhantomData<fn(&E)>,
}

impl<E: Event, H: EventHandler<E>> TypedEventHandler<E, H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _phantom: std::marker::PhantomData,
        }
    }
}

#[async_trait]
impl<E: Event, H: EventHandler<E> + 'static> DynEventHandler for TypedEventHandler<E, H> {
    async fn handle_dyn(&self, event: Arc<dyn Event>) -> Result<(), EventHandlerError> {
        if let Some(typed_event) = event.as_any().downcast_ref::<E>() {
            self.handler.handle(typed_event).await
        } else {
            Err(EventHandlerError::HandlerFailed(
                "Type mismatch".to_string(),
            ))
        }
    }
}
