use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

/// Timer that paces the tick loop.
#[async_trait]
pub trait Ticker: Send + Sync {
    async fn wait(&self, period: Duration);
}

/// Wall-clock ticker backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioTicker;

#[async_trait]
impl Ticker for TokioTicker {
    async fn wait(&self, period: Duration) {
        tokio::time::sleep(period).await;
    }
}

/// Ticker that only fires when told to. Each `advance` releases that many
/// waits, regardless of the requested period.
#[derive(Debug)]
pub struct ManualTicker {
    permits: Semaphore,
    waiting: AtomicUsize,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self {
            permits: Semaphore::new(0),
            waiting: AtomicUsize::new(0),
        }
    }

    pub fn advance(&self, ticks: usize) {
        self.permits.add_permits(ticks);
    }

    /// Number of callers currently blocked in `wait`.
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }
}

impl Default for ManualTicker {
    fn default() -> Self {
        Self::new()
    }
}

struct WaitGuard<'a>(&'a AtomicUsize);

impl Drop for WaitGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Ticker for ManualTicker {
    async fn wait(&self, _period: Duration) {
        self.waiting.fetch_add(1, Ordering::SeqCst);
        let _guard = WaitGuard(&self.waiting);
        if let Ok(permit) = self.permits.acquire().await {
            permit.forget();
        }
    }
}
