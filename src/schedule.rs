//! Periodic refresh for embedders that want one.
//!
//! Nothing in the library schedules work on its own. A UI that wants live weather refreshed
//! every few minutes spawns a [`RefreshTicker`] and owns its lifetime; dropping the handle
//! or calling [`RefreshTicker::stop`] ends the loop.

use log::debug;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub const LIVE_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const AIR_QUALITY_REFRESH_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// A background task that runs `task` once immediately and then once per period.
pub struct RefreshTicker {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl RefreshTicker {
    /// Spawns the loop on the current tokio runtime.
    ///
    /// A run that overruns the period delays the next tick rather than queuing extra ones.
    pub fn spawn<F, Fut>(period: Duration, mut task: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let child = token.child_token();
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = ticker.tick() => {
                        tokio::select! {
                            _ = child.cancelled() => break,
                            _ = task() => {}
                        }
                    }
                }
            }
            debug!("Refresh loop stopped");
        });
        Self {
            token,
            handle: Some(handle),
        }
    }

    /// Requests cancellation without waiting for the loop to exit.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancels and waits for the loop to exit. An in-flight run is abandoned.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for RefreshTicker {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting(counter: &Arc<AtomicUsize>) -> impl FnMut() -> std::future::Ready<()> + Send {
        let counter = counter.clone();
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn runs_immediately_then_every_period() {
        let runs = Arc::new(AtomicUsize::new(0));
        let ticker = RefreshTicker::spawn(LIVE_REFRESH_INTERVAL, counting(&runs));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        tokio::time::sleep(LIVE_REFRESH_INTERVAL * 2).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);

        ticker.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_the_loop() {
        let runs = Arc::new(AtomicUsize::new(0));
        let ticker = RefreshTicker::spawn(Duration::from_secs(60), counting(&runs));
        tokio::time::sleep(Duration::from_secs(1)).await;
        ticker.cancel();
        assert!(ticker.is_cancelled());
        ticker.stop().await;

        let after_stop = runs.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(runs.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_cancels() {
        let runs = Arc::new(AtomicUsize::new(0));
        drop(RefreshTicker::spawn(Duration::from_secs(60), counting(&runs)));
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert!(runs.load(Ordering::SeqCst) <= 1);
    }
}
