//! Snapshot subscriptions.
//!
//! Every component publishes immutable `Arc` snapshots through a
//! [`tokio::sync::watch`] channel. A [`Subscription`] is the receiving end:
//! it sees the current snapshot immediately and then every later one, except
//! that a slow reader skips straight to the newest value. Snapshots are never
//! observed out of order.

use std::sync::Arc;

use tokio::sync::watch;

/// Receiver for a stream of published snapshots.
#[derive(Debug)]
pub struct Subscription<T> {
    rx: watch::Receiver<Arc<T>>,
    /// Current value not yet handed out by `next`/`try_next`.
    primed: bool,
}

impl<T> Subscription<T> {
    pub(crate) fn new(rx: watch::Receiver<Arc<T>>) -> Self {
        Self { rx, primed: true }
    }

    /// Most recent snapshot, without waiting or marking it seen.
    pub fn latest(&self) -> Arc<T> {
        self.rx.borrow().clone()
    }

    /// Wait for the next snapshot.
    ///
    /// The first call returns the snapshot current at subscribe time without
    /// waiting. Returns `None` once the publishing component has been dropped.
    pub async fn next(&mut self) -> Option<Arc<T>> {
        if !self.primed {
            self.rx.changed().await.ok()?;
        }
        self.primed = false;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Newest snapshot if one is pending, without waiting.
    pub fn try_next(&mut self) -> Option<Arc<T>> {
        let pending = self.primed || self.rx.has_changed().unwrap_or(false);
        if !pending {
            return None;
        }
        self.primed = false;
        Some(self.rx.borrow_and_update().clone())
    }
}

impl<T> Clone for Subscription<T> {
    fn clone(&self) -> Self {
        Self { rx: self.rx.clone(), primed: self.primed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_next_returns_current_value() {
        let tx = watch::Sender::new(Arc::new(1u32));
        let mut sub = Subscription::new(tx.subscribe());

        assert_eq!(sub.next().await.as_deref(), Some(&1));
        assert!(sub.try_next().is_none());

        let _ = tx.send_replace(Arc::new(2));
        assert_eq!(sub.try_next().as_deref(), Some(&2));
    }

    #[tokio::test]
    async fn slow_reader_sees_latest() {
        let tx = watch::Sender::new(Arc::new(0u32));
        let mut sub = Subscription::new(tx.subscribe());
        let _ = sub.try_next();

        for i in 1..=5 {
            let _ = tx.send_replace(Arc::new(i));
        }

        assert_eq!(sub.next().await.as_deref(), Some(&5));
        assert_eq!(sub.latest().as_ref(), &5);
    }

    #[tokio::test]
    async fn closed_publisher_ends_stream() {
        let tx = watch::Sender::new(Arc::new(0u32));
        let mut sub = Subscription::new(tx.subscribe());
        let _ = sub.next().await;

        drop(tx);
        assert!(sub.next().await.is_none());
    }
}
