//! Cooperative cancellation shared by the scheduler and the jobs.
//!
//! Jobs poll the signal at their natural boundaries: the ingestion run
//! before each feed, the backfill before its batch. Work already started
//! at those boundaries finishes normally, so a shutdown never tears a
//! transaction in half.

use tokio::sync::watch;

/// Cancellation signal. Cheap to clone; every clone observes the same
/// state.
#[derive(Clone)]
pub struct Cancel {
    rx: watch::Receiver<bool>,
}

impl Cancel {
    /// Create a linked sender/signal pair. Sending `true` fires the
    /// signal for all clones.
    pub fn channel() -> (watch::Sender<bool>, Self) {
        let (tx, rx) = watch::channel(false);
        (tx, Self { rx })
    }

    /// A signal that never fires, for manual one-shot runs.
    pub fn never() -> Self {
        Self::channel().1
    }

    /// Whether the signal has fired.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until the signal fires. Also completes when the sender is
    /// dropped, so an abandoned handle stops its scheduler loop.
    pub async fn cancelled(&mut self) {
        while !*self.rx.borrow() {
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_fires_for_all_clones() {
        let (tx, cancel) = Cancel::channel();
        let clone = cancel.clone();
        assert!(!cancel.is_cancelled());

        tx.send(true).unwrap();
        assert!(cancel.is_cancelled());
        assert!(clone.is_cancelled());
    }

    #[tokio::test]
    async fn test_never_stays_unfired() {
        assert!(!Cancel::never().is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_wakes_on_send() {
        let (tx, mut cancel) = Cancel::channel();
        let waiter = tokio::spawn(async move {
            cancel.cancelled().await;
        });
        tx.send(true).unwrap();
        waiter.await.unwrap();
    }
}
