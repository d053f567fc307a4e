// Gantry - an engine-agnostic application runtime
//
// Decouples presentation code from business logic in frame-driven,
// interactive applications: a dependency injection container, a
// publish/subscribe event bus, and a tick-driven command scheduler.

// Re-export the dependency injection container
pub use gantry_core::{Container, CoreError, CoreResult, Inject, Lifetime, Provider};

// Re-export the event bus
pub use gantry_events::{
    AsyncSubscription, DynEventHandler, Event, EventBus, EventBusConfig, EventHandler,
    EventHandlerError, EventMetadata, SyncSubscription, TypedEventHandler,
};

// Re-export command scheduling
pub use gantry_command::{
    CancellationToken, Command, CommandError, CommandPriority, CommandProcessor, CommandQueue,
    CommandResult, ProcessorConfig, TickSource,
};

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        CancellationToken,
        Command,
        CommandError,
        CommandPriority,
        CommandProcessor,
        CommandQueue,
        CommandResult,
        Container,
        CoreError,
        CoreResult,
        Event,
        EventBus,
        EventHandler,
        EventHandlerError,
        EventMetadata,
        Inject,
        ProcessorConfig,
        Provider,
        TickSource,
    };
}
