//! Command definition and priority levels.

use crate::error::{CommandError, CommandResult};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Command priority levels.
///
/// The lower ordinal is served first: all `High` commands drain before
/// any `Normal`, which drain before any `Low`. The tie-break rule lives
/// in the explicit discriminants, not declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum CommandPriority {
    /// Served first
    High = 0,
    /// Default priority
    #[default]
    Normal = 1,
    /// Served last
    Low = 2,
}

impl CommandPriority {
    /// Numeric ordinal; lower values are served first.
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }
}

/// A named, prioritized, cancellable unit of asynchronous work.
///
/// Commands are created by producers, enqueued on a
/// [`crate::CommandQueue`], and executed one at a time by the
/// [`crate::CommandProcessor`]. A command instance is single-use: it
/// must not be enqueued twice concurrently.
///
/// # Examples
///
/// ```rust,ignore
/// struct SubmitGuess {
///     guess: String,
///     bus: EventBus,
/// }
///
/// #[async_trait]
/// impl Command for SubmitGuess {
///     fn name(&self) -> &str {
///         "submit_guess"
///     }
///
///     fn priority(&self) -> CommandPriority {
///         CommandPriority::High
///     }
///
///     async fn execute(&self, token: CancellationToken) -> CommandResult<()> {
///         let evaluation = self.evaluate(&self.guess, token).await?;
///         self.bus.publish(evaluation);
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Command: Send + Sync {
    /// Stable name, used for logging.
    fn name(&self) -> &str;

    /// Priority bucket this command is queued in.
    fn priority(&self) -> CommandPriority {
        CommandPriority::Normal
    }

    /// Guard predicate, evaluated just before execution. A command whose
    /// guard returns `false` is dropped, not requeued — retry is the
    /// producer's responsibility.
    fn can_execute(&self) -> bool {
        true
    }

    /// Asynchronous body. The command must check `token` at its own
    /// suspension points and return [`CommandError::Cancelled`] to react
    /// to cancellation — the processor provides the signal but cannot
    /// forcibly abort a non-cooperating body.
    async fn execute(&self, token: CancellationToken) -> CommandResult<()>;

    /// Called after `execute` returns `Ok`.
    fn on_complete(&self) {}

    /// Called after `execute` returns an error other than
    /// [`CommandError::Cancelled`].
    fn on_failed(&self, _error: &CommandError) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(CommandPriority::High < CommandPriority::Normal);
        assert!(CommandPriority::Normal < CommandPriority::Low);
    }

    #[test]
    fn test_priority_ordinals() {
        assert_eq!(CommandPriority::High.ordinal(), 0);
        assert_eq!(CommandPriority::Normal.ordinal(), 1);
        assert_eq!(CommandPriority::Low.ordinal(), 2);
    }

    #[test]
    fn test_priority_default_is_normal() {
        assert_eq!(CommandPriority::default(), CommandPriority::Normal);
    }

    #[tokio::test]
    async fn test_command_defaults() {
        struct Noop;

        #[async_trait]
        impl Command for Noop {
            fn name(&self) -> &str {
                "noop"
            }

            async fn execute(&self, _token: CancellationToken) -> CommandResult<()> {
                Ok(())
            }
        }

        let command = Noop;
        assert_eq!(command.priority(), CommandPriority::Normal);
        assert!(command.can_execute());
        assert!(command.execute(CancellationToken::new()).await.is_ok());
    }
}
