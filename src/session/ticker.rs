use std::future::Future;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant};

static NEXT_TICKER_ID: AtomicU64 = AtomicU64::new(1);

/// Periodic callback task, aborted when dropped
///
/// Each ticker carries a unique id that is passed to every tick, so the tick
/// handler can check it is still the ticker the session is holding. An abort
/// cannot stop a tick that is already past its last await point.
pub(crate) struct Ticker {
    id: u64,
    task: JoinHandle<()>,
}

impl Ticker {
    /// First tick fires one period after spawning
    pub(crate) fn spawn<F, Fut>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut(u64) -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let id = NEXT_TICKER_ID.fetch_add(1, Ordering::Relaxed);

        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if on_tick(id).await.is_break() {
                    break;
                }
            }
        });

        Self { id, task }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
