//! Integration tests for common Gantry workflows.
//!
//! Wires the three services together the way a composition root would:
//! container bootstrap, command production, tick-driven execution, and
//! event fan-out.

use std::any::Any;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use gantry::prelude::*;
use tokio::time::sleep;

// =============================================================================
// Fixtures
// =============================================================================

#[derive(Debug, Clone)]
struct GuessSubmitted {
    metadata: EventMetadata,
    guess: String,
}

impl GuessSubmitted {
    fn new(guess: &str) -> Self {
        Self {
            metadata: EventMetadata::new("guess_submitted"),
            guess: guess.to_string(),
        }
    }
}

impl Event for GuessSubmitted {
    fn event_name(&self) -> &str {
        &self.metadata.name
    }

    fn event_id(&self) -> uuid::Uuid {
        self.metadata.id
    }

    fn timestamp(&self) -> chrono::DateTime<chrono::Utc> {
        self.metadata.timestamp
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct SubmitGuess {
    guess: String,
    bus: EventBus,
}

#[async_trait]
impl Command for SubmitGuess {
    fn name(&self) -> &str {
        "submit_guess"
    }

    async fn execute(&self, _token: CancellationToken) -> CommandResult<()> {
        self.bus.publish(GuessSubmitted::new(&self.guess));
        Ok(())
    }
}

struct Recorded {
    name: String,
    priority: CommandPriority,
    order: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Command for Recorded {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> CommandPriority {
        self.priority
    }

    async fn execute(&self, _token: CancellationToken) -> CommandResult<()> {
        self.order.lock().unwrap().push(self.name.clone());
        Ok(())
    }
}

// =============================================================================
// Bootstrap flow
// =============================================================================

#[tokio::test]
async fn bootstrap_wires_runtime_from_container() {
    let container = Container::new();
    container.register_singleton(EventBus::new());
    container.register_singleton(CommandQueue::new());
    container.register_singleton(TickSource::new());
    container.register_singleton_with(|c| {
        Ok(CommandProcessor::new(
            c.resolve::<CommandQueue>()?.as_ref().clone(),
        ))
    });

    let bus = container.resolve::<EventBus>().unwrap();
    let queue = container.resolve::<CommandQueue>().unwrap();
    let ticks = container.resolve::<TickSource>().unwrap();
    let processor = container.resolve::<CommandProcessor>().unwrap();

    let received = Arc::new(AtomicU32::new(0));
    let tracked = received.clone();
    bus.subscribe::<GuessSubmitted, _>(move |event| {
        assert_eq!(event.guess, "crane");
        tracked.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    processor.start(&ticks);
    queue.enqueue(Arc::new(SubmitGuess {
        guess: "crane".to_string(),
        bus: bus.as_ref().clone(),
    }));

    ticks.tick();
    sleep(Duration::from_millis(100)).await;

    assert_eq!(received.load(Ordering::SeqCst), 1);
    assert!(queue.is_empty());
    processor.stop();
}

// =============================================================================
// Priority scheduling
// =============================================================================

#[tokio::test]
async fn commands_drain_priority_first_through_the_processor() {
    let queue = CommandQueue::new();
    let processor = CommandProcessor::with_config(
        queue.clone(),
        ProcessorConfig::default().with_max_commands_per_tick(3),
    );
    let ticks = TickSource::new();
    processor.start(&ticks);

    let order = Arc::new(Mutex::new(Vec::new()));
    for (name, priority) in [
        ("A", CommandPriority::Normal),
        ("B", CommandPriority::Low),
        ("C", CommandPriority::High),
    ] {
        queue.enqueue(Arc::new(Recorded {
            name: name.to_string(),
            priority,
            order: order.clone(),
        }));
    }

    ticks.tick();
    sleep(Duration::from_millis(100)).await;

    assert_eq!(*order.lock().unwrap(), vec!["C", "A", "B"]);
    processor.stop();
}

// =============================================================================
// Scoped overrides
// =============================================================================

#[test]
fn scoped_overrides_shadow_bootstrap_registrations() {
    struct WordLength(usize);
    impl Provider for WordLength {}

    let root = Container::new();
    root.register_singleton(WordLength(5));

    let test_scope = root.create_scope();
    test_scope.register_singleton(WordLength(6));

    assert_eq!(test_scope.resolve::<WordLength>().unwrap().0, 6);
    assert_eq!(root.resolve::<WordLength>().unwrap().0, 5);
    assert!(root.is_registered::<WordLength>());
}

// =============================================================================
// Awaited event fan-out
// =============================================================================

#[tokio::test]
async fn awaited_fanout_completes_before_returning() {
    struct SlowHandler {
        counter: Arc<AtomicU32>,
    }

    #[async_trait]
    impl EventHandler<GuessSubmitted> for SlowHandler {
        async fn handle(&self, _event: &GuessSubmitted) -> Result<(), EventHandlerError> {
            sleep(Duration::from_millis(50)).await;
            self.counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    let bus = EventBus::new();
    let counter = Arc::new(AtomicU32::new(0));
    bus.subscribe_async::<GuessSubmitted, _>(SlowHandler {
        counter: counter.clone(),
    });

    bus.publish_async(GuessSubmitted::new("slate")).await;
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}
