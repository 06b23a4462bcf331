//! Broadcast state holder with a last-value cache.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

/// Fan-out publish/subscribe cell. Publishing delivers to every live
/// subscriber and caches the value; subscribing delivers the cached
/// value immediately. Dead subscribers are pruned on publish.
pub struct StateBus<T: Clone> {
    inner: Arc<Mutex<BusInner<T>>>,
}

struct BusInner<T> {
    subscribers: Vec<Sender<T>>,
    last: Option<T>,
}

impl<T: Clone> StateBus<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(BusInner {
                subscribers: Vec::new(),
                last: None,
            })),
        }
    }

    pub fn subscribe(&self) -> Receiver<T> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut inner) = self.inner.lock() {
            if let Some(last) = inner.last.clone() {
                let _ = tx.send(last);
            }
            inner.subscribers.push(tx);
        }
        rx
    }

    pub fn publish(&self, value: T) {
        if let Ok(mut inner) = self.inner.lock() {
            inner
                .subscribers
                .retain(|tx| tx.send(value.clone()).is_ok());
            inner.last = Some(value);
        }
    }

    pub fn last(&self) -> Option<T> {
        self.inner.lock().ok().and_then(|inner| inner.last.clone())
    }
}

impl<T: Clone> Clone for StateBus<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone> Default for StateBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribers_receive_published_values() {
        let bus = StateBus::new();
        let rx_a = bus.subscribe();
        let rx_b = bus.subscribe();

        bus.publish(7u32);
        assert_eq!(rx_a.try_recv(), Ok(7));
        assert_eq!(rx_b.try_recv(), Ok(7));
    }

    #[test]
    fn late_subscriber_gets_cached_last_value() {
        let bus = StateBus::new();
        bus.publish("first");
        bus.publish("second");

        let rx = bus.subscribe();
        assert_eq!(rx.try_recv(), Ok("second"));
        assert!(rx.try_recv().is_err());
        assert_eq!(bus.last(), Some("second"));
    }

    #[test]
    fn publish_survives_dropped_subscribers() {
        let bus = StateBus::new();
        let dead = bus.subscribe();
        drop(dead);

        bus.publish(1u32);
        let rx = bus.subscribe();
        assert_eq!(rx.try_recv(), Ok(1));
        bus.publish(2u32);
        assert_eq!(rx.try_recv(), Ok(2));
    }
}
