// Cancellation Channel

use tokio::sync::watch;

/// Cancellation signal observed by waiting queue operations
///
/// Tokens are cheap to clone; every clone observes the same source. A token
/// also reports cancelled once its [`CancelSource`] has been dropped, so a
/// source falling out of scope releases every waiter.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// Check whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Wait until cancellation is requested
    ///
    /// Resolves immediately if the token is already cancelled, so late
    /// subscribers never miss the signal.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        // Err means the source was dropped, which counts as cancellation.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// Cancellation sender
#[derive(Debug)]
pub struct CancelSource {
    tx: watch::Sender<bool>,
}

impl CancelSource {
    /// Signal cancellation to all tokens
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    /// Create another token observing this source
    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
        }
    }
}

/// Create a cancellation channel
pub fn cancel_channel() -> (CancelSource, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelSource { tx }, CancelToken { rx })
}
