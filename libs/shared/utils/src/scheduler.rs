use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Handle to a periodic background job.
///
/// The job first runs one full period after spawning, then once per period.
/// Cancelling (or dropping the handle) stops the loop, including a run that
/// is still in flight.
pub struct ScheduledTask {
    name: String,
    period: Duration,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    pub fn every<F, Fut>(name: impl Into<String>, period: Duration, job: F) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let cancel = CancellationToken::new();

        if period.is_zero() {
            warn!("Scheduled task '{}' has a zero period, not starting it", name);
            cancel.cancel();
            return Self { name, period, cancel, handle: None };
        }

        let task_cancel = cancel.clone();
        let task_name = name.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval.tick().await; // consume the immediate first tick

            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    _ = interval.tick() => {}
                }

                debug!("Running scheduled task '{}'", task_name);
                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    _ = job() => {}
                }
            }

            debug!("Scheduled task '{}' stopped", task_name);
        });

        info!("Scheduled task '{}' every {:?}", name, period);
        Self { name, period, cancel, handle: Some(handle) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Cancels the task and waits for its loop to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("Scheduled task '{}' ended abnormally: {}", self.name, e);
            }
        }
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_task(period: Duration) -> (ScheduledTask, Arc<AtomicUsize>) {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let task = ScheduledTask::every("counter", period, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        (task, runs)
    }

    #[tokio::test]
    async fn test_runs_repeatedly_until_shutdown() {
        let (task, runs) = counting_task(Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(150)).await;
        task.shutdown().await;

        let after_shutdown = runs.load(Ordering::SeqCst);
        assert!(after_shutdown >= 3, "expected at least 3 runs, got {}", after_shutdown);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(runs.load(Ordering::SeqCst), after_shutdown);
    }

    #[tokio::test]
    async fn test_waits_one_period_before_first_run() {
        let (task, runs) = counting_task(Duration::from_millis(200));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        task.cancel();
        assert!(task.is_cancelled());
    }

    #[tokio::test]
    async fn test_drop_cancels() {
        let (task, runs) = counting_task(Duration::from_millis(20));
        drop(task);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_period_is_disabled() {
        let (task, runs) = counting_task(Duration::ZERO);

        assert!(task.is_cancelled());
        assert_eq!(task.name(), "counter");
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        task.shutdown().await;
    }
}
