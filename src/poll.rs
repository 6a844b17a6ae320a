//! Cancellable fixed-interval polling.
//!
//! Dashboard-style auto-refresh runs as a spawned task holding a watch
//! channel for shutdown, so a refresh loop never outlives the view that
//! started it.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

/// Handle to a running poll loop. Dropping the handle without calling
/// [`Poller::stop`] also ends the loop, since the shutdown sender goes
/// away with it.
pub struct Poller {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Poller {
    /// Spawn a loop that runs `tick` immediately and then once per
    /// `period` until stopped. Overlap is prevented by construction: the
    /// next tick is not scheduled until the previous one finished.
    pub fn spawn<F, Fut>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let (shutdown, mut signal) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut timer = interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = timer.tick() => tick().await,
                    changed = signal.changed() => {
                        if changed.is_err() || *signal.borrow() {
                            debug!("poller shutting down");
                            break;
                        }
                    }
                }
            }
        });
        Self { shutdown, handle }
    }

    /// Signal shutdown and wait for the loop to finish its current tick.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn ticks_run_until_stopped() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let poller = Poller::spawn(Duration::from_millis(10), move || {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(60)).await;
        poller.stop().await;
        let after_stop = count.load(Ordering::SeqCst);
        assert!(after_stop >= 2, "expected several ticks, got {}", after_stop);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(count.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test]
    async fn first_tick_fires_immediately() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let poller = Poller::spawn(Duration::from_secs(3600), move || {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        poller.stop().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
