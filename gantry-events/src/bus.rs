//! Event Bus implementation

use crate::event::{DynEventHandler, DynSyncHandler, Event, EventHandler, EventHandlerError, TypedEventHandler};
use futures::future::join_all;
use parking_lot::Mutex;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Handle returned by [`EventBus::subscribe`].
///
/// Pass it back to [`EventBus::unsubscribe`] to remove exactly that
/// handler; the match is by allocation identity. Dropping the handle
/// leaves the handler subscribed.
#[derive(Clone)]
pub struct SyncSubscription {
    pub(crate) handler: DynSyncHandler,
}

/// Handle returned by [`EventBus::subscribe_async`].
#[derive(Clone)]
pub struct AsyncSubscription {
    pub(crate) handler: Arc<dyn DynEventHandler>,
}

/// Handlers registered for one event type. The two lists are
/// independent: synchronous handlers run inline on the publisher's
/// thread, asynchronous handlers run as tokio tasks.
#[derive(Default)]
struct HandlerEntry {
    sync: Vec<DynSyncHandler>,
    asynchronous: Vec<Arc<dyn DynEventHandler>>,
}

impl HandlerEntry {
    fn is_empty(&self) -> bool {
        self.sync.is_empty() && self.asynchronous.is_empty()
    }
}

/// Event bus configuration
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Enable event logging
    pub log_events: bool,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self { log_events: true }
    }
}

impl EventBusConfig {
    /// Enable/disable event logging.
    pub fn with_log_events(mut self, enabled: bool) -> Self {
        self.log_events = enabled;
        self
    }
}

/// Event bus for in-process event publishing and handling.
///
/// Thread-safe: one mutex guards the handler table, and every publish
/// snapshots the relevant handler lists before releasing it, so handlers
/// may themselves subscribe or unsubscribe without deadlocking an
/// in-flight fan-out.
#[derive(Clone)]
pub struct EventBus {
    /// Handlers registered for each event type
    handlers: Arc<Mutex<HashMap<TypeId, HandlerEntry>>>,

    /// Configuration
    config: Arc<EventBusConfig>,
}

impl EventBus {
    /// Create new event bus
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    /// Create event bus with custom config
    pub fn with_config(config: EventBusConfig) -> Self {
        Self {
            handlers: Arc::new(Mutex::new(HashMap::new())),
            config: Arc::new(config),
        }
    }

    /// Subscribe a synchronous handler to an event type.
    ///
    /// Synchronous handlers run in registration order on the publisher's
    /// thread, before any asynchronous handler is scheduled.
    pub fn subscribe<E, F>(&self, handler: F) -> SyncSubscription
    where
        E: Event,
        F: Fn(&E) -> Result<(), EventHandlerError> + Send + Sync + 'static,
    {
        let erased: DynSyncHandler = Arc::new(move |event: &dyn Event| {
            match event.as_any().downcast_ref::<E>() {
                Some(typed) => handler(typed),
                None => Err(EventHandlerError::HandlerFailed(
                    "Type mismatch".to_string(),
                )),
            }
        });

        let type_id = TypeId::of::<E>();
        self.handlers
            .lock()
            .entry(type_id)
            .or_default()
            .sync
            .push(erased.clone());

        if self.config.log_events {
            debug!("Subscribed sync handler for event type: {:?}", type_id);
        }

        SyncSubscription { handler: erased }
    }

    /// Subscribe an asynchronous handler to an event type.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let bus = EventBus::new();
    /// bus.subscribe_async::<MyEvent, _>(MyHandler::new());
    /// ```
    pub fn subscribe_async<E, H>(&self, handler: H) -> AsyncSubscription
    where
        E: Event,
        H: EventHandler<E> + 'static,
    {
        let erased: Arc<dyn DynEventHandler> = Arc::new(TypedEventHandler::new(handler));

        let type_id = TypeId::of::<E>();
        self.handlers
            .lock()
            .entry(type_id)
            .or_default()
            .asynchronous
            .push(erased.clone());

        if self.config.log_events {
            debug!("Subscribed async handler for event type: {:?}", type_id);
        }

        AsyncSubscription { handler: erased }
    }

    /// Remove a previously registered synchronous handler.
    ///
    /// Removing a handler that is no longer registered is a no-op.
    pub fn unsubscribe<E: Event>(&self, subscription: &SyncSubscription) {
        let type_id = TypeId::of::<E>();
        let mut handlers = self.handlers.lock();
        if let Some(entry) = handlers.get_mut(&type_id) {
            entry
                .sync
                .retain(|handler| !Arc::ptr_eq(handler, &subscription.handler));
            if entry.is_empty() {
                handlers.remove(&type_id);
            }
        }
    }

    /// Remove a previously registered asynchronous handler.
    pub fn unsubscribe_async<E: Event>(&self, subscription: &AsyncSubscription) {
        let type_id = TypeId::of::<E>();
        let mut handlers = self.handlers.lock();
        if let Some(entry) = handlers.get_mut(&type_id) {
            entry
                .asynchronous
                .retain(|handler| !Arc::ptr_eq(handler, &subscription.handler));
            if entry.is_empty() {
                handlers.remove(&type_id);
            }
        }
    }

    /// Publish an event.
    ///
    /// Invokes all synchronous handlers for the event type in
    /// registration order on the caller's thread, then fires all
    /// asynchronous handlers as detached tasks — they run to completion
    /// independently and the caller does not wait. Completion order and
    /// errors of the detached tasks are independent of this call.
    ///
    /// Each handler is guarded individually: one handler's failure is
    /// logged and does not stop the remaining handlers.
    ///
    /// Must be called within a tokio runtime when asynchronous handlers
    /// are registered.
    pub fn publish<E: Event>(&self, event: E) {
        let event_name = event.event_name().to_string();
        let (sync_handlers, async_handlers) = self.snapshot(TypeId::of::<E>(), &event_name);

        let event = Arc::new(event);
        self.run_sync_handlers(&sync_handlers, event.as_ref(), &event_name);

        let event: Arc<dyn Event> = event;
        for handler in async_handlers {
            let event = event.clone();
            let name = event_name.clone();
            tokio::spawn(async move {
                if let Err(e) = handler.handle_dyn(event).await {
                    error!("Async handler failed for {}: {}", name, e);
                }
            });
        }
    }

    /// Publish an event, awaiting the asynchronous fan-out.
    ///
    /// Like [`EventBus::publish`], but all asynchronous handlers are
    /// awaited (executed concurrently) before the call returns. A
    /// failing or panicking handler is logged and does not cancel its
    /// siblings.
    pub async fn publish_async<E: Event>(&self, event: E) {
        let event_name = event.event_name().to_string();
        let (sync_handlers, async_handlers) = self.snapshot(TypeId::of::<E>(), &event_name);

        let event = Arc::new(event);
        self.run_sync_handlers(&sync_handlers, event.as_ref(), &event_name);

        let event: Arc<dyn Event> = event;
        let tasks: Vec<_> = async_handlers
            .into_iter()
            .map(|handler| {
                let event = event.clone();
                tokio::spawn(async move { handler.handle_dyn(event).await })
            })
            .collect();

        for result in join_all(tasks).await {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("Async handler failed for {}: {}", event_name, e),
                Err(e) => error!("Async handler panicked for {}: {}", event_name, e),
            }
        }

        if self.config.log_events {
            debug!("Event published: {}", event_name);
        }
    }

    /// Drop handler registrations for one event type.
    pub fn clear<E: Event>(&self) {
        let type_id = TypeId::of::<E>();
        self.handlers.lock().remove(&type_id);

        if self.config.log_events {
            debug!("Cleared handlers for event type: {:?}", type_id);
        }
    }

    /// Drop handler registrations for all event types.
    pub fn clear_all(&self) {
        self.handlers.lock().clear();
        if self.config.log_events {
            info!("Cleared all event handlers");
        }
    }

    /// Get synchronous handler count for an event type
    pub fn sync_handler_count<E: Event>(&self) -> usize {
        self.handlers
            .lock()
            .get(&TypeId::of::<E>())
            .map(|entry| entry.sync.len())
            .unwrap_or(0)
    }

    /// Get asynchronous handler count for an event type
    pub fn async_handler_count<E: Event>(&self) -> usize {
        self.handlers
            .lock()
            .get(&TypeId::of::<E>())
            .map(|entry| entry.asynchronous.len())
            .unwrap_or(0)
    }

    /// Snapshot the handler lists for a type, then release the lock so
    /// fan-out runs without holding it.
    fn snapshot(
        &self,
        type_id: TypeId,
        event_name: &str,
    ) -> (Vec<DynSyncHandler>, Vec<Arc<dyn DynEventHandler>>) {
        let handlers = self.handlers.lock();
        match handlers.get(&type_id) {
            Some(entry) => (entry.sync.clone(), entry.asynchronous.clone()),
            None => {
                if self.config.log_events {
                    debug!("No handlers registered for event: {}", event_name);
                }
                (Vec::new(), Vec::new())
            }
        }
    }

    fn run_sync_handlers(
        &self,
        handlers: &[DynSyncHandler],
        event: &dyn Event,
        event_name: &str,
    ) {
        for handler in handlers {
            if let Err(e) = handler(event) {
                error!("Sync handler failed for {}: {}", event_name, e);
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl gantry_core::Provider for EventBus {}
