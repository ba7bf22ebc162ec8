//! Broadcast-based shutdown propagation.
//!
//! One coordinator is created at startup; the server loop and the signal
//! task each hold a handle and stop when the signal lands.

use tokio::sync::broadcast;

/// Hands out shutdown receivers and fans the stop signal out to all of them.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// A receiver that resolves once `trigger` has been called.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Ask every subscriber to stop. Idempotent.
    pub fn trigger(&self) {
        // Send only fails when no receiver is live; nothing left to stop then.
        let _ = self.tx.send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trigger_reaches_every_subscriber() {
        let shutdown = Shutdown::new();
        let mut server = shutdown.subscribe();
        let mut signals = shutdown.clone().subscribe();

        shutdown.trigger();

        server.recv().await.unwrap();
        signals.recv().await.unwrap();
    }

    #[tokio::test]
    async fn trigger_without_subscribers_is_harmless() {
        Shutdown::new().trigger();
    }
}
