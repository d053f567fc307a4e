//! Error types for command execution.

use thiserror::Error;

/// Result type for command execution.
pub type CommandResult<T> = Result<T, CommandError>;

/// Command-specific errors.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command observed its cancellation token and aborted cleanly.
    /// Treated by the processor as a clean abort, not a failure.
    #[error("Command cancelled")]
    Cancelled,

    /// Command execution failed
    #[error("Command execution failed: {0}")]
    Execution(String),
}
