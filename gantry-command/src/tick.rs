//! Frame tick signal.

use tokio::sync::broadcast;
use tracing::trace;

const TICK_CHANNEL_CAPACITY: usize = 16;

/// The external per-frame signal the [`crate::CommandProcessor`]
/// subscribes to.
///
/// An engine adapter calls [`TickSource::tick`] once per rendering
/// frame; the processor drains its queue on each notification. Ticks
/// carry no payload and are coalesceable — a subscriber that lags simply
/// misses notifications and catches up on the next one.
#[derive(Clone)]
pub struct TickSource {
    sender: broadcast::Sender<()>,
}

impl TickSource {
    /// Create a new tick source.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(TICK_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Fire one tick. A tick with no subscribers is silently dropped.
    pub fn tick(&self) {
        if self.sender.send(()).is_err() {
            trace!("Tick fired with no subscribers");
        }
    }

    /// Subscribe to tick notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for TickSource {
    fn default() -> Self {
        Self::new()
    }
}

impl gantry_core::Provider for TickSource {}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tick_reaches_subscriber() {
        let source = TickSource::new();
        let mut receiver = source.subscribe();

        source.tick();
        assert!(receiver.recv().await.is_ok());
    }

    #[test]
    fn test_tick_without_subscribers_is_harmless() {
        let source = TickSource::new();
        source.tick();
        assert_eq!(source.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_subscriber_count_tracks_subscriptions() {
        let source = TickSource::new();
        let first = source.subscribe();
        let second = source.subscribe();
        assert_eq!(source.subscriber_count(), 2);

        drop(first);
        drop(second);
        assert_eq!(source.subscriber_count(), 0);
    }
}
