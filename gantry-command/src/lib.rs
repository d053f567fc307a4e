//! Command scheduling for Gantry applications.
//!
//! Provides a bounded, cancellable execution pipeline:
//! - 📦 [`Command`] — a named, prioritized, cancellable unit of
//!   asynchronous work with a guard and completion/failure hooks
//! - ⭐ [`CommandQueue`] — priority buckets with strict FIFO tie-breaking
//! - ⏱️ [`CommandProcessor`] — a tick-driven scheduler draining up to
//!   `max_commands_per_tick` commands per frame, one at a time
//! - 🛑 Cooperative cancellation tied to the processor's lifetime
//!
//! ## Priorities
//!
//! ```
//! use gantry_command::CommandPriority;
//!
//! // Lower ordinal is served first.
//! assert!(CommandPriority::High < CommandPriority::Normal);
//! assert!(CommandPriority::Normal < CommandPriority::Low);
//! assert_eq!(CommandPriority::High.ordinal(), 0);
//! ```
//!
//! ## Complete Example
//!
//! ```rust,ignore
//! use gantry_command::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let queue = CommandQueue::new();
//!     let processor = CommandProcessor::new(queue.clone());
//!     let ticks = TickSource::new();
//!
//!     processor.start(&ticks);
//!
//!     // Producers enqueue commands from anywhere.
//!     queue.enqueue(Arc::new(SubmitGuess::new("crane")));
//!
//!     // The engine fires one tick per rendering frame.
//!     ticks.tick();
//! }
//! ```

pub mod command;
pub mod error;
pub mod processor;
pub mod queue;
pub mod tick;

pub use command::{Command, CommandPriority};
pub use error::{CommandError, CommandResult};
pub use processor::{CommandProcessor, ProcessorConfig};
pub use queue::CommandQueue;
pub use tick::TickSource;

// Implementors of [`Command`] need the token type in their signatures.
pub use tokio_util::sync::CancellationToken;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::command::{Command, CommandPriority};
    pub use crate::error::{CommandError, CommandResult};
    pub use crate::processor::{CommandProcessor, ProcessorConfig};
    pub use crate::queue::CommandQueue;
    pub use crate::tick::TickSource;
    pub use tokio_util::sync::CancellationToken;
}
