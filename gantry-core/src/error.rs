//! Error types for container operations.

use thiserror::Error;

/// Result type for container operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Container-specific errors.
///
/// All of these surface synchronously to the caller of
/// `resolve`/`build`/`inject` — a partially wired object never escapes.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No registration for the requested type in this container or any
    /// ancestor scope.
    #[error("Type not registered: {0}")]
    NotRegistered(&'static str),

    /// The registration exists but carries no provider closure, so a
    /// fresh instance cannot be built (instance-bound singletons).
    #[error("No provider registered for type: {0}")]
    NoProvider(&'static str),

    /// A provider closure failed while constructing an instance.
    #[error("Provider for {type_name} failed: {message}")]
    Provider {
        type_name: &'static str,
        message: String,
    },

    /// A required member could not be injected.
    #[error("Failed to inject member '{member}'")]
    Injection {
        member: String,
        #[source]
        source: Box<CoreError>,
    },
}
