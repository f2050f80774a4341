//! Fan-out of sync notifications to registered subscribers.
//!
//! Messages are transient signals ("a sync generation committed", "the sync
//! moved to a new stage"); the local store remains the source of truth, so
//! observers re-query it rather than reconstruct state from messages.

use std::sync::{Mutex, mpsc};
use std::time::Duration;

/// One subscriber's stream of notifications.
///
/// Carries a copy of every message published after `subscribe` was called,
/// nothing from before. One subscription per consumer.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: mpsc::Receiver<M>,
}

impl<M> Subscription<M> {
    /// Block until the next message.
    pub fn recv(&self) -> Result<M, mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Take a pending message, if one is queued.
    pub fn try_recv(&self) -> Result<M, mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for at most `timeout` for the next message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Set of live subscribers to one kind of notification.
///
/// Publishing is best-effort and never blocks on a consumer: each subscriber
/// has its own unbounded queue, and a subscriber whose receiving end is gone
/// is forgotten on the next publish. There is deliberately no error surface;
/// a notification that reaches nobody is not a failure.
#[derive(Debug)]
pub struct SubscriberList<M> {
    senders: Mutex<Vec<mpsc::Sender<M>>>,
}

impl<M> Default for SubscriberList<M> {
    fn default() -> Self {
        Self {
            senders: Mutex::new(Vec::new()),
        }
    }
}

impl<M: Clone> SubscriberList<M> {
    pub fn new() -> Self {
        Self {
            senders: Mutex::new(Vec::new()),
        }
    }

    /// Hand a copy of `message` to every live subscriber.
    pub fn publish(&self, message: M) {
        let Ok(mut senders) = self.senders.lock() else {
            // Poisoned by a panicking publisher; the process is already on
            // its way down, so skip delivery rather than propagate.
            return;
        };
        senders.retain(|tx| tx.send(message.clone()).is_ok());
    }

    /// Register a new subscriber and return its receiving end.
    pub fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut senders) = self.senders.lock() {
            senders.push(tx);
        }
        Subscription { receiver: rx }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subscriber_gets_a_copy() {
        let list: SubscriberList<u32> = SubscriberList::new();
        let a = list.subscribe();
        let b = list.subscribe();

        list.publish(7);

        assert_eq!(a.try_recv().unwrap(), 7);
        assert_eq!(b.try_recv().unwrap(), 7);
    }

    #[test]
    fn publishing_to_nobody_is_fine() {
        let list: SubscriberList<u32> = SubscriberList::new();
        list.publish(1);
    }

    #[test]
    fn dropped_subscribers_are_forgotten() {
        let list: SubscriberList<u32> = SubscriberList::new();
        let a = list.subscribe();
        drop(list.subscribe());

        list.publish(1);
        list.publish(2);

        assert_eq!(a.try_recv().unwrap(), 1);
        assert_eq!(a.try_recv().unwrap(), 2);
    }

    #[test]
    fn late_subscribers_miss_earlier_messages() {
        let list: SubscriberList<u32> = SubscriberList::new();
        list.publish(1);

        let late = list.subscribe();
        list.publish(2);

        assert_eq!(late.try_recv().unwrap(), 2);
        assert!(late.try_recv().is_err());
    }
}
