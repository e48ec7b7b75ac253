use std::{
    fmt,
    future::Future,
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    task::{Context, Poll},
};

use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

/// Operation-scoped cancellation signal.
///
/// Clones share the same signal. Once cancelled, it stays cancelled.
#[derive(Clone, Debug, Default)]
pub struct Cancellation {
    token: CancellationToken,
    waiters: Arc<AtomicUsize>,
}

impl Cancellation {
    /// Creates a new, not yet cancelled signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the operation and wakes everyone awaiting [`Cancellation::cancelled`].
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether [`Cancellation::cancel`] was called.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once the signal is cancelled.
    ///
    /// Dropping the returned future unregisters it from the signal.
    pub fn cancelled(&self) -> Cancelled {
        self.waiters.fetch_add(1, Ordering::SeqCst);
        Cancelled {
            future: Box::pin(self.token.clone().cancelled_owned()),
            waiters: Arc::clone(&self.waiters),
        }
    }

    /// Number of [`Cancelled`] futures currently alive for this signal.
    pub fn waiters(&self) -> usize {
        self.waiters.load(Ordering::SeqCst)
    }
}

/// Future returned by [`Cancellation::cancelled`].
#[must_use = "futures do nothing unless polled"]
pub struct Cancelled {
    future: Pin<Box<WaitForCancellationFutureOwned>>,
    waiters: Arc<AtomicUsize>,
}

impl Future for Cancelled {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        self.future.as_mut().poll(cx)
    }
}

impl Drop for Cancelled {
    fn drop(&mut self) {
        self.waiters.fetch_sub(1, Ordering::SeqCst);
    }
}

impl fmt::Debug for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cancelled").finish_non_exhaustive()
    }
}
