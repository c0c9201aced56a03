//! Module to control shutdown in bacgen.
//!
//! A run ends when its configured duration elapses, when the operator
//! interrupts it or when the publish loop fails outright. The middle case is
//! coordinated by the code in this module, specifically [`Shutdown`]:
//! everything that participates in controlled shutdown holds a clone of it.

use std::sync::Arc;

use tokio::sync::broadcast;

/// Errors produced by [`Shutdown`]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The mechanism underlaying [`Shutdown`] failed catastrophically.
    #[error("shutdown broadcast failed: {0}")]
    Tokio(#[from] broadcast::error::SendError<()>),
}

#[derive(Debug)]
/// Mechanism to control shutdown in bacgen.
///
/// The signal handler owns the root instance and every task that must stop
/// on interrupt holds a clone derived from it.
pub struct Shutdown {
    /// The broadcast sender, shared by all `Shutdown` instances derived
    /// from the same root `Shutdown`.
    sender: Arc<broadcast::Sender<()>>,

    /// The receive half of the channel used to listen for shutdown. One per
    /// instance.
    notify: broadcast::Receiver<()>,

    /// `true` if the shutdown signal has been received
    shutdown: bool,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    /// Create a new `Shutdown` instance. There should be only one call to this
    /// function and all subsequent instances should be created through clones.
    #[must_use]
    pub fn new() -> Self {
        let (shutdown_snd, shutdown_rcv) = broadcast::channel(1);

        Self {
            sender: Arc::new(shutdown_snd),
            notify: shutdown_rcv,
            shutdown: false,
        }
    }

    /// Receive the shutdown notice. This function will block if a notice has
    /// not already been sent.
    pub async fn recv(&mut self) {
        // If the shutdown signal has already been received, then return
        // immediately.
        if self.shutdown {
            return;
        }

        // Cannot receive a "lag error" as only one value is ever sent.
        let _ = self.notify.recv().await;

        // Remember that the signal has been received.
        self.shutdown = true;
    }

    /// Send the shutdown signal through to this and all derived `Shutdown`
    /// instances. Returns the number of active instances, or error.
    ///
    /// # Errors
    ///
    /// Function will return an error if the underlying tokio broadcast
    /// mechanism fails.
    pub fn signal(&self) -> Result<usize, Error> {
        self.sender.send(()).map_err(Error::Tokio)
    }
}

impl Clone for Shutdown {
    fn clone(&self) -> Self {
        let notify = self.sender.subscribe();

        Self {
            shutdown: self.shutdown,
            notify,
            sender: Arc::clone(&self.sender),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Shutdown;

    #[tokio::test]
    async fn signal_reaches_a_clone() {
        let root = Shutdown::new();
        let mut derived = root.clone();

        let listeners = root.signal().expect("failed to signal");
        assert!(listeners >= 1);

        // Must complete, not block.
        derived.recv().await;
    }

    #[tokio::test]
    async fn recv_is_sticky() {
        let root = Shutdown::new();
        let mut derived = root.clone();
        root.signal().expect("failed to signal");

        derived.recv().await;
        // A second receive returns immediately even though the single
        // broadcast value has been consumed.
        derived.recv().await;
    }

    #[tokio::test]
    async fn all_clones_observe_one_signal() {
        let root = Shutdown::new();
        let mut first = root.clone();
        let mut second = root.clone();
        root.signal().expect("failed to signal");

        first.recv().await;
        second.recv().await;
    }
}
