//! Change notifications for store observers.
//!
//! Stores publish a [`StoreEvent`] after every persisted mutation. Header
//! badges, open cart drawers and the like subscribe and re-read whatever they
//! display. Publishing never blocks and never fails: with no subscribers the
//! event is simply dropped, and a slow subscriber loses old events (it sees
//! `RecvError::Lagged`) rather than stalling the store.

use tokio::sync::broadcast;

/// Buffered events per subscriber before the oldest are dropped.
const CHANNEL_CAPACITY: usize = 64;

/// A persisted state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// The cart was written; `count` is the new total quantity.
    CartUpdated { count: u32 },
    /// The wishlist was written; `count` is the new number of items.
    WishlistUpdated { count: usize },
    /// New credentials or user profile were stored.
    SessionUpdated,
    /// All credentials were removed and the user must sign in again.
    SessionCleared,
}

/// Fan-out publisher shared by all stores.
///
/// Cloning yields another handle to the same channel.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<StoreEvent>,
}

impl ChangeNotifier {
    /// Create a notifier with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Receive every event published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    /// Publish `event` to current subscribers.
    pub fn notify(&self, event: StoreEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!(?event, "No subscribers for store event");
        }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribers_receive_events_in_order() {
        let notifier = ChangeNotifier::new();
        let mut rx = notifier.subscribe();

        notifier.notify(StoreEvent::CartUpdated { count: 2 });
        notifier.notify(StoreEvent::SessionCleared);

        assert_eq!(rx.try_recv().unwrap(), StoreEvent::CartUpdated { count: 2 });
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::SessionCleared);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_notify_without_subscribers_is_silent() {
        let notifier = ChangeNotifier::new();
        notifier.notify(StoreEvent::WishlistUpdated { count: 0 });
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn test_clones_share_the_channel() {
        let notifier = ChangeNotifier::new();
        let mut rx = notifier.subscribe();

        notifier.clone().notify(StoreEvent::SessionUpdated);
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::SessionUpdated);
    }
}
