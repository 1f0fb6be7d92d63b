use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// Creates a linked abort handle/signal pair for one invocation.
///
/// The embedder keeps the [`AbortHandle`] and fires it when the client
/// disconnects; the shim waits on the [`AbortSignal`]. The signal is
/// advisory: it does not terminate in-flight handler work, it only lets the
/// abort continuation compete for completion.
pub fn abort_channel() -> (AbortHandle, AbortSignal) {
    let shared = Arc::new(Shared { aborted: AtomicBool::new(false), notify: Notify::new() });
    (AbortHandle { shared: Arc::clone(&shared) }, AbortSignal { shared })
}

#[derive(Debug)]
struct Shared {
    aborted: AtomicBool,
    notify: Notify,
}

#[derive(Debug, Clone)]
pub struct AbortHandle {
    shared: Arc<Shared>,
}

impl AbortHandle {
    pub fn abort(&self) {
        self.shared.aborted.store(true, Ordering::Release);
        self.shared.notify.notify_waiters();
    }
}

#[derive(Debug, Clone)]
pub struct AbortSignal {
    shared: Arc<Shared>,
}

impl AbortSignal {
    /// A signal that can never fire, for invocations with no abort source.
    pub fn never() -> Self {
        Self { shared: Arc::new(Shared { aborted: AtomicBool::new(false), notify: Notify::new() }) }
    }

    pub fn is_aborted(&self) -> bool {
        self.shared.aborted.load(Ordering::Acquire)
    }

    /// Resolves once the handle fires; pends forever on a [`Self::never`]
    /// signal or when the handle is dropped unfired.
    pub async fn aborted(&self) {
        // register the waiter before checking the flag, so a concurrent
        // abort() cannot slip between the check and the await
        let mut notified = pin!(self.shared.notify.notified());
        notified.as_mut().enable();
        if self.is_aborted() {
            return;
        }
        notified.await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::abort::{AbortSignal, abort_channel};

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn signal_resolves_after_abort() {
        let (handle, signal) = abort_channel();
        assert!(!signal.is_aborted());

        handle.abort();
        assert!(signal.is_aborted());

        // resolves even though the abort fired before the await
        signal.aborted().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn signal_resolves_while_awaited() {
        let (handle, signal) = abort_channel();
        let waiter = tokio::spawn(async move { signal.aborted().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.abort();

        waiter.await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn never_signal_pends() {
        let signal = AbortSignal::never();
        let waited =
            tokio::time::timeout(Duration::from_millis(20), signal.aborted()).await;
        assert!(waited.is_err());
    }
}
