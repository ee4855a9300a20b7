//! Process-wide signal for unrecoverable faults.
//!
//! A broken execution host is not a per-request problem. The handler raises
//! the fault, answers the current request with a generic 500, and the server
//! shuts down so the process can exit non-zero.

use std::sync::Arc;

use tokio::sync::watch;

/// Raised once when the deployment is found to be broken.
#[derive(Debug, Clone)]
pub struct FaultSignal {
    tx: Arc<watch::Sender<Option<String>>>,
}

impl Default for FaultSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl FaultSignal {
    /// Creates a signal that has not been raised.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Records a fault. The first message wins.
    pub fn raise(&self, message: impl Into<String>) {
        let message = message.into();
        self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(message);
            true
        });
    }

    /// Returns the fault message, if one was raised.
    pub fn current(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    /// Completes with the fault message once a fault is raised.
    pub async fn raised(&self) -> String {
        let mut rx = self.tx.subscribe();
        loop {
            let current = rx.borrow_and_update().clone();
            if let Some(message) = current {
                return message;
            }
            if rx.changed().await.is_err() {
                // Unreachable while `self` holds the sender.
                std::future::pending::<()>().await;
            }
        }
    }
}
