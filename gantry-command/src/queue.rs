//! Prioritized command queue.

use crate::command::{Command, CommandPriority};
use parking_lot::Mutex;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, trace};

#[derive(Default)]
struct QueueState {
    /// FIFO bucket per priority; the map is ordered by ordinal, so the
    /// first bucket is always the one served next. Emptied buckets are
    /// removed so the map never accumulates dead entries.
    buckets: BTreeMap<CommandPriority, VecDeque<Arc<dyn Command>>>,
    total: usize,
}

/// Thread-safe priority queue of pending commands.
///
/// Commands dequeue from the lowest-ordinal non-empty priority bucket,
/// strictly FIFO within a bucket. All operations serialize on a single
/// lock: command volume is input-rate-bounded, not high-throughput.
#[derive(Clone, Default)]
pub struct CommandQueue {
    state: Arc<Mutex<QueueState>>,
}

impl CommandQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a command at the tail of its priority bucket.
    pub fn enqueue(&self, command: Arc<dyn Command>) {
        let mut state = self.state.lock();
        trace!(
            command = command.name(),
            priority = ?command.priority(),
            "Enqueueing command"
        );
        state
            .buckets
            .entry(command.priority())
            .or_default()
            .push_back(command);
        state.total += 1;
    }

    /// Remove and return the head of the lowest-ordinal non-empty
    /// bucket, or `None` if the queue is empty.
    pub fn dequeue(&self) -> Option<Arc<dyn Command>> {
        let mut state = self.state.lock();
        let (&priority, bucket) = state.buckets.iter_mut().next()?;
        let command = bucket.pop_front()?;
        if bucket.is_empty() {
            state.buckets.remove(&priority);
        }
        state.total -= 1;
        trace!(command = command.name(), "Dequeued command");
        Some(command)
    }

    /// Read-only equivalent of [`CommandQueue::dequeue`]'s selection.
    pub fn peek(&self) -> Option<Arc<dyn Command>> {
        let state = self.state.lock();
        state
            .buckets
            .values()
            .next()
            .and_then(|bucket| bucket.front().cloned())
    }

    /// Priority-ordered, FIFO-within-priority snapshot of pending
    /// commands. Diagnostic use; does not mutate the queue.
    pub fn snapshot(&self) -> Vec<Arc<dyn Command>> {
        let state = self.state.lock();
        state
            .buckets
            .values()
            .flat_map(|bucket| bucket.iter().cloned())
            .collect()
    }

    /// Discard all pending commands.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        let count = state.total;
        state.buckets.clear();
        state.total = 0;
        debug!(command_count = count, "Cleared command queue");
    }

    /// Whether any command is pending.
    pub fn has_commands(&self) -> bool {
        self.state.lock().total > 0
    }

    /// Number of pending commands.
    pub fn len(&self) -> usize {
        self.state.lock().total
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        !self.has_commands()
    }

    #[cfg(test)]
    fn bucket_count(&self) -> usize {
        self.state.lock().buckets.len()
    }
}

impl gantry_core::Provider for CommandQueue {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommandResult;
    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    struct TestCommand {
        name: String,
        priority: CommandPriority,
    }

    impl TestCommand {
        fn new(name: impl Into<String>, priority: CommandPriority) -> Arc<dyn Command> {
            Arc::new(Self {
                name: name.into(),
                priority,
            })
        }
    }

    #[async_trait]
    impl Command for TestCommand {
        fn name(&self) -> &str {
            &self.name
        }

        fn priority(&self) -> CommandPriority {
            self.priority
        }

        async fn execute(&self, _token: CancellationToken) -> CommandResult<()> {
            Ok(())
        }
    }

    fn names(commands: &[Arc<dyn Command>]) -> Vec<String> {
        commands.iter().map(|c| c.name().to_string()).collect()
    }

    #[test]
    fn test_dequeue_serves_priority_then_fifo() {
        let queue = CommandQueue::new();
        queue.enqueue(TestCommand::new("A", CommandPriority::Normal));
        queue.enqueue(TestCommand::new("B", CommandPriority::Low));
        queue.enqueue(TestCommand::new("C", CommandPriority::High));

        assert_eq!(queue.dequeue().unwrap().name(), "C");
        assert_eq!(queue.dequeue().unwrap().name(), "A");
        assert_eq!(queue.dequeue().unwrap().name(), "B");
        assert!(queue.dequeue().is_none());
    }

    #[test]
    fn test_fifo_within_each_bucket_across_interleavings() {
        let queue = CommandQueue::new();
        queue.enqueue(TestCommand::new("low-1", CommandPriority::Low));
        queue.enqueue(TestCommand::new("high-1", CommandPriority::High));
        queue.enqueue(TestCommand::new("normal-1", CommandPriority::Normal));
        queue.enqueue(TestCommand::new("high-2", CommandPriority::High));
        queue.enqueue(TestCommand::new("low-2", CommandPriority::Low));
        queue.enqueue(TestCommand::new("normal-2", CommandPriority::Normal));

        let mut drained = Vec::new();
        while let Some(command) = queue.dequeue() {
            drained.push(command);
        }

        assert_eq!(
            names(&drained),
            vec!["high-1", "high-2", "normal-1", "normal-2", "low-1", "low-2"]
        );
    }

    #[test]
    fn test_count_tracks_enqueue_and_dequeue() {
        let queue = CommandQueue::new();
        assert_eq!(queue.len(), 0);
        assert!(!queue.has_commands());

        queue.enqueue(TestCommand::new("one", CommandPriority::Normal));
        assert_eq!(queue.len(), 1);
        queue.enqueue(TestCommand::new("two", CommandPriority::High));
        assert_eq!(queue.len(), 2);

        queue.dequeue();
        assert_eq!(queue.len(), 1);
        queue.dequeue();
        assert_eq!(queue.len(), 0);
        assert!(!queue.has_commands());
    }

    #[test]
    fn test_emptied_buckets_are_pruned() {
        let queue = CommandQueue::new();
        queue.enqueue(TestCommand::new("high", CommandPriority::High));
        queue.enqueue(TestCommand::new("low", CommandPriority::Low));
        assert_eq!(queue.bucket_count(), 2);

        queue.dequeue();
        assert_eq!(queue.bucket_count(), 1);
        queue.dequeue();
        assert_eq!(queue.bucket_count(), 0);
    }

    #[test]
    fn test_peek_does_not_mutate() {
        let queue = CommandQueue::new();
        queue.enqueue(TestCommand::new("only", CommandPriority::Normal));

        assert_eq!(queue.peek().unwrap().name(), "only");
        assert_eq!(queue.peek().unwrap().name(), "only");
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_peek_selects_like_dequeue() {
        let queue = CommandQueue::new();
        queue.enqueue(TestCommand::new("normal", CommandPriority::Normal));
        queue.enqueue(TestCommand::new("high", CommandPriority::High));

        assert_eq!(queue.peek().unwrap().name(), "high");
        assert_eq!(queue.dequeue().unwrap().name(), "high");
    }

    #[test]
    fn test_snapshot_is_priority_ordered_and_non_destructive() {
        let queue = CommandQueue::new();
        queue.enqueue(TestCommand::new("normal", CommandPriority::Normal));
        queue.enqueue(TestCommand::new("low", CommandPriority::Low));
        queue.enqueue(TestCommand::new("high", CommandPriority::High));

        let snapshot = queue.snapshot();
        assert_eq!(names(&snapshot), vec!["high", "normal", "low"]);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_clear_discards_everything() {
        let queue = CommandQueue::new();
        queue.enqueue(TestCommand::new("a", CommandPriority::Normal));
        queue.enqueue(TestCommand::new("b", CommandPriority::High));

        queue.clear();

        assert!(queue.is_empty());
        assert_eq!(queue.bucket_count(), 0);
        assert!(queue.dequeue().is_none());
    }

    #[test]
    fn test_empty_queue_behaviour() {
        let queue = CommandQueue::new();
        assert!(queue.dequeue().is_none());
        assert!(queue.peek().is_none());
        assert!(queue.snapshot().is_empty());
    }

    #[test]
    fn test_concurrent_enqueue_preserves_count() {
        let queue = CommandQueue::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let queue = queue.clone();
                std::thread::spawn(move || {
                    for j in 0..50 {
                        queue.enqueue(TestCommand::new(
                            format!("{i}-{j}"),
                            CommandPriority::Normal,
                        ));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(queue.len(), 400);
    }
}
