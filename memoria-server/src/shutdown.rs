//! Graceful shutdown coordination shared by both transports (spec
//! §4.11), grounded on `llmspell-kernel::daemon::shutdown`'s
//! `ShutdownConfig` shape but scaled down to what a stateless service
//! needs: wait for `Ctrl+C`, give in-flight requests a grace period to
//! drain, then let `main` move on to closing the pool.

use std::time::Duration;

use tokio::sync::broadcast;
use tracing::info;

/// How long in-flight requests get to finish once shutdown starts.
#[derive(Debug, Clone, Copy)]
pub struct ShutdownConfig {
    pub grace_period_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self { grace_period_secs: 30 }
    }
}

/// Fans one `Ctrl+C` out to both transports' graceful-shutdown hooks.
pub struct ShutdownCoordinator {
    config: ShutdownConfig,
    tx: broadcast::Sender<()>,
}

impl ShutdownCoordinator {
    #[must_use]
    pub fn new(config: ShutdownConfig) -> Self {
        let (tx, _rx) = broadcast::channel(1);
        Self { config, tx }
    }

    /// A future a transport server can pass to its graceful-shutdown
    /// hook; resolves once [`Self::wait_for_signal`] fires.
    pub fn signal(&self) -> impl std::future::Future<Output = ()> {
        let mut rx = self.tx.subscribe();
        async move {
            let _ = rx.recv().await;
        }
    }

    /// Blocks until `Ctrl+C`, then fans the signal out to every
    /// subscriber returned by [`Self::signal`].
    pub async fn wait_for_signal(&self) {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received, draining in-flight requests");
        let _ = self.tx.send(());
    }

    #[must_use]
    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.config.grace_period_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grace_period_is_thirty_seconds() {
        let coordinator = ShutdownCoordinator::new(ShutdownConfig::default());
        assert_eq!(coordinator.grace_period(), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn signal_fires_once_sender_sends() {
        let coordinator = ShutdownCoordinator::new(ShutdownConfig { grace_period_secs: 1 });
        let a = coordinator.signal();
        let b = coordinator.signal();
        let _ = coordinator.tx.send(());
        tokio::time::timeout(Duration::from_millis(100), a)
            .await
            .expect("subscriber a should observe the signal");
        tokio::time::timeout(Duration::from_millis(100), b)
            .await
            .expect("subscriber b should observe the signal");
    }
}
