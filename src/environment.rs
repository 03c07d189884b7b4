//! Detects whether the privileged AnDistro daemon is reachable

use crate::daemon::Daemon;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Result of pinging the daemon. `available == false` disables every
/// privileged action for the session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Environment {
    pub available: bool,
    pub distro: Option<String>,
    pub arch: Option<String>,
}

impl Environment {
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn available() -> Self {
        Self {
            available: true,
            ..Self::default()
        }
    }
}

pub async fn detect(daemon: &dyn Daemon) -> Environment {
    match daemon.ping().await {
        Ok(info) => {
            log::info!("daemon present: distro={:?} arch={:?}", info.distro, info.arch);
            Environment {
                available: true,
                distro: Some(info.distro).filter(|s| !s.is_empty()),
                arch: Some(info.arch).filter(|s| !s.is_empty()),
            }
        }
        Err(e) => {
            log::info!("daemon not available: {}", e);
            Environment::unavailable()
        }
    }
}

/// Write side of a value that becomes available exactly once
pub struct ReadySender<T> {
    tx: watch::Sender<Option<T>>,
}

/// Read side; any number of clones may wait on the same value
#[derive(Clone)]
pub struct Ready<T> {
    rx: watch::Receiver<Option<T>>,
}

pub fn ready_signal<T>() -> (ReadySender<T>, Ready<T>) {
    let (tx, rx) = watch::channel(None);
    (ReadySender { tx }, Ready { rx })
}

impl<T> ReadySender<T> {
    /// Consumes the sender, so the value can only be published once
    pub fn resolve(self, value: T) {
        let _ = self.tx.send(Some(value));
    }
}

impl<T: Clone> Ready<T> {
    /// Resolves with the published value, or `None` if the sender was
    /// dropped without publishing
    pub async fn wait(&mut self) -> Option<T> {
        match self.rx.wait_for(|value| value.is_some()).await {
            Ok(value) => value.clone(),
            Err(_) => None,
        }
    }

    pub async fn wait_timeout(&mut self, limit: Duration) -> Option<T> {
        tokio::time::timeout(limit, self.wait()).await.ok().flatten()
    }
}

/// Pings the daemon in the background and publishes the outcome once
pub fn spawn_detector(daemon: Arc<dyn Daemon>) -> Ready<Environment> {
    let (tx, rx) = ready_signal();
    tokio::spawn(async move {
        let env = detect(daemon.as_ref()).await;
        tx.resolve(env);
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDaemon;

    #[tokio::test]
    async fn reachable_daemon_sets_flag() {
        let daemon = FakeDaemon::new();
        let env = detect(&daemon).await;
        assert!(env.available);
        assert_eq!(env.distro.as_deref(), Some("AnDistro"));
    }

    #[tokio::test]
    async fn unreachable_daemon_clears_flag() {
        let daemon = FakeDaemon::offline();
        assert_eq!(detect(&daemon).await, Environment::unavailable());
    }

    #[tokio::test]
    async fn every_waiter_sees_the_single_published_value() {
        let (tx, mut ready) = ready_signal::<u32>();
        let mut first = ready.clone();
        let mut second = ready.clone();
        assert_eq!(ready.wait_timeout(Duration::from_millis(10)).await, None);

        let waiter = tokio::spawn(async move { first.wait().await });
        tx.resolve(7);
        assert_eq!(waiter.await.unwrap(), Some(7));
        assert_eq!(second.wait().await, Some(7));
        assert_eq!(ready.wait().await, Some(7));
    }

    #[tokio::test]
    async fn dropped_sender_releases_waiters() {
        let (tx, mut ready) = ready_signal::<bool>();
        drop(tx);
        assert_eq!(ready.wait().await, None);
    }

    #[tokio::test]
    async fn wait_timeout_gives_up() {
        let (_tx, mut ready) = ready_signal::<bool>();
        assert_eq!(ready.wait_timeout(Duration::from_millis(20)).await, None);
    }

    #[tokio::test]
    async fn detector_publishes_through_signal() {
        let daemon: Arc<dyn Daemon> = Arc::new(FakeDaemon::offline());
        let mut ready = spawn_detector(daemon);
        let env = ready.wait_timeout(Duration::from_secs(2)).await.unwrap();
        assert!(!env.available);
    }
}
