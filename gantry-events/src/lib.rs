//! Event bus and pub/sub for Gantry applications.
//!
//! Thread-safe publish/subscribe keyed by event type:
//! - 🧵 Synchronous handlers run in registration order on the
//!   publisher's thread
//! - ⚡ Asynchronous handlers run as tokio tasks — fire-and-forget with
//!   [`EventBus::publish`], awaited with [`EventBus::publish_async`]
//! - 🛡️ Per-handler failure isolation: one bad subscriber never breaks
//!   publication for the others
//! - 📸 Publication operates on a snapshot of the handler lists, so
//!   handlers may re-enter the bus
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gantry_events::{Event, EventBus, EventMetadata};
//!
//! #[derive(Debug, Clone)]
//! struct GuessSubmitted {
//!     metadata: EventMetadata,
//!     guess: String,
//! }
//!
//! let bus = EventBus::new();
//! bus.subscribe::<GuessSubmitted, _>(|event| {
//!     println!("guessed: {}", event.guess);
//!     Ok(())
//! });
//! bus.publish(GuessSubmitted::new("crane"));
//! ```

pub mod bus;
pub mod event;

pub use bus::{AsyncSubscription, EventBus, EventBusConfig, SyncSubscription};
pub use event::{
    DynEventHandler, Event, EventHandler, EventHandlerError, EventMetadata, TypedEventHandler,
};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::bus::{AsyncSubscription, EventBus, EventBusConfig, SyncSubscription};
    pub use crate::event::{Event, EventHandler, EventHandlerError, EventMetadata};
}
