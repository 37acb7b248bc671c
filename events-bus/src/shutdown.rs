//! Shutdown signalling for bus workers.

use tokio::sync::watch;

/// Fires a shutdown signal to every [`ShutdownWatcher`] cloned from it.
#[derive(Clone)]
pub struct ShutdownToken {
    notify: watch::Sender<bool>,
}

impl ShutdownToken {
    pub fn new() -> (Self, ShutdownWatcher) {
        let (tx, rx) = watch::channel(false);
        (Self { notify: tx }, ShutdownWatcher { notify: rx })
    }

    /// Request shutdown. Calling it more than once is harmless.
    pub fn cancel(&self) {
        self.notify.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.notify.borrow()
    }

    /// A new watcher for this token.
    pub fn watcher(&self) -> ShutdownWatcher {
        ShutdownWatcher {
            notify: self.notify.subscribe(),
        }
    }
}

/// Observes a [`ShutdownToken`].
#[derive(Clone)]
pub struct ShutdownWatcher {
    notify: watch::Receiver<bool>,
}

impl ShutdownWatcher {
    pub fn is_cancelled(&self) -> bool {
        *self.notify.borrow()
    }

    /// Resolves once shutdown was requested or every token was dropped.
    pub async fn cancelled(&mut self) {
        while !*self.notify.borrow_and_update() {
            if self.notify.changed().await.is_err() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Duration};

    #[tokio::test]
    async fn test_cancel_wakes_every_watcher() {
        let (token, mut first) = ShutdownToken::new();
        let mut second = token.watcher();
        assert!(!first.is_cancelled());

        token.cancel();
        token.cancel();

        timeout(Duration::from_millis(100), first.cancelled())
            .await
            .unwrap();
        timeout(Duration::from_millis(100), second.cancelled())
            .await
            .unwrap();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_watcher_stays_pending_until_cancelled() {
        let (_token, mut watcher) = ShutdownToken::new();
        let waited = timeout(Duration::from_millis(20), watcher.cancelled()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn test_dropping_token_releases_watchers() {
        let (token, mut watcher) = ShutdownToken::new();
        drop(token);
        timeout(Duration::from_millis(100), watcher.cancelled())
            .await
            .unwrap();
    }
}
