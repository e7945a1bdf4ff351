//! Background loads owned by the page that started them

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::runtime::Handle;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::task::JoinHandle;

/// Where a background load stands
#[derive(Debug, PartialEq, Eq)]
pub enum TaskStatus<T> {
    /// Still running
    Pending,
    /// Finished with a result
    Done(T),
    /// Ended without producing a result (the future panicked)
    Failed,
}

/// A future running on the runtime whose result is picked up by polling.
///
/// Dropping the task aborts the future, so a page that goes away never
/// receives a late result.
pub struct LoadTask<T> {
    handle: JoinHandle<()>,
    receiver: oneshot::Receiver<T>,
}

impl<T: Send + 'static> LoadTask<T> {
    /// Spawn `future` on `runtime`; `on_done` runs once it has ended,
    /// whether or not it produced a result
    pub fn spawn<F, D>(runtime: &Handle, future: F, on_done: D) -> Self
    where
        F: Future<Output = T> + Send + 'static,
        D: FnOnce() + Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        let handle = runtime.spawn(async move {
            match AssertUnwindSafe(future).catch_unwind().await {
                Ok(result) => {
                    let _ = sender.send(result);
                }
                Err(_) => tracing::error!("Background load panicked"),
            }
            on_done();
        });
        Self { handle, receiver }
    }

    /// Take the result if the future has finished
    pub fn poll(&mut self) -> TaskStatus<T> {
        match self.receiver.try_recv() {
            Ok(result) => TaskStatus::Done(result),
            Err(TryRecvError::Empty) => TaskStatus::Pending,
            Err(TryRecvError::Closed) => TaskStatus::Failed,
        }
    }

    /// Whether the future is still running
    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl<T> Drop for LoadTask<T> {
    fn drop(&mut self) {
        if !self.handle.is_finished() {
            tracing::debug!("Cancelling in-flight load");
            self.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    async fn wait_for<T: Send + 'static>(task: &mut LoadTask<T>) -> TaskStatus<T> {
        for _ in 0..100 {
            match task.poll() {
                TaskStatus::Pending => tokio::time::sleep(Duration::from_millis(10)).await,
                status => return status,
            }
        }
        TaskStatus::Pending
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_result_is_delivered() {
        let notified = Arc::new(AtomicBool::new(false));
        let flag = notified.clone();
        let mut task = LoadTask::spawn(&Handle::current(), async { 42 }, move || {
            flag.store(true, Ordering::SeqCst)
        });

        assert_eq!(wait_for(&mut task).await, TaskStatus::Done(42));
        assert!(notified.load(Ordering::SeqCst));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_panicking_future_reports_failure() {
        let notified = Arc::new(AtomicBool::new(false));
        let flag = notified.clone();
        let mut task: LoadTask<u32> = LoadTask::spawn(
            &Handle::current(),
            async { panic!("backend bug") },
            move || flag.store(true, Ordering::SeqCst),
        );

        assert_eq!(wait_for(&mut task).await, TaskStatus::Failed);
        assert!(notified.load(Ordering::SeqCst));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_drop_aborts_pending_future() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();
        let task = LoadTask::spawn(
            &Handle::current(),
            async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                flag.store(true, Ordering::SeqCst);
            },
            || {},
        );
        assert!(task.is_running());

        drop(task);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_poll_before_completion_is_pending() {
        let mut task: LoadTask<u32> =
            LoadTask::spawn(&Handle::current(), std::future::pending(), || {});
        assert_eq!(task.poll(), TaskStatus::Pending);
    }
}
