use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::AbortHandle;

struct Scheduled {
    handle: AbortHandle,
    fired: Arc<AtomicBool>,
}

/// Trailing-edge debounce over tokio tasks.
///
/// Scheduling a job replaces a job whose delay has not elapsed yet. A job that
/// already started running is left alone and only stopped by [`cancel_all`].
///
/// [`cancel_all`]: Debouncer::cancel_all
pub struct Debouncer {
    delay: Duration,
    pending: Option<Scheduled>,
    in_flight: Vec<AbortHandle>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            in_flight: Vec::new(),
        }
    }

    /// Run `job` once `delay` passes without another call to `schedule`.
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.supersede();

        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            flag.store(true, Ordering::Release);
            job.await;
        })
        .abort_handle();

        self.pending = Some(Scheduled { handle, fired });
    }

    /// Abort the waiting job and every running one.
    pub fn cancel_all(&mut self) {
        if let Some(scheduled) = self.pending.take() {
            scheduled.handle.abort();
        }
        for handle in self.in_flight.drain(..) {
            handle.abort();
        }
    }

    fn supersede(&mut self) {
        self.in_flight.retain(|h| !h.is_finished());
        if let Some(prev) = self.pending.take() {
            if prev.fired.load(Ordering::Acquire) {
                self.in_flight.push(prev.handle);
            } else {
                prev.handle.abort();
            }
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
