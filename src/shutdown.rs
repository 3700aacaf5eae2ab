use tokio::sync::watch;
use tracing::{info, warn};

/// Graceful shutdown coordinator for the approval host
///
/// Owns the sending half of a watch channel. Every [`ShutdownSignal`] handed out
/// observes the same flag, so one Ctrl-C interrupts any in-progress invoice
/// generation retries.
#[derive(Debug)]
pub struct ShutdownCoordinator {
    sender: watch::Sender<bool>,
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(false);
        Self { sender }
    }

    /// Hand out a signal that resolves once shutdown is triggered
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            receiver: Some(self.sender.subscribe()),
        }
    }

    /// Trigger shutdown for every outstanding signal
    pub fn trigger(&self) {
        info!("Shutdown requested, cancelling in-flight generation retries");
        self.sender.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.sender.borrow()
    }

    /// Install a Ctrl-C handler that triggers shutdown
    pub fn install_signal_handlers(self: std::sync::Arc<Self>) {
        info!("Installing signal handlers for graceful shutdown");

        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => self.trigger(),
                Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
            }
        });
    }
}

/// Receiving side of the shutdown flag
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    receiver: Option<watch::Receiver<bool>>,
}

impl ShutdownSignal {
    /// A signal that never fires
    pub fn never() -> Self {
        Self { receiver: None }
    }

    pub fn is_triggered(&self) -> bool {
        self.receiver
            .as_ref()
            .map(|receiver| *receiver.borrow())
            .unwrap_or(false)
    }

    /// Resolve once shutdown has been triggered.
    ///
    /// Pends forever for [`ShutdownSignal::never`] or when the coordinator is
    /// dropped without triggering.
    pub async fn triggered(&mut self) {
        let Some(receiver) = self.receiver.as_mut() else {
            return std::future::pending().await;
        };

        loop {
            let fired = *receiver.borrow_and_update();
            if fired {
                return;
            }
            if receiver.changed().await.is_err() {
                return std::future::pending().await;
            }
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::never()
    }
}
