//! Debounced Scheduler
//!
//! Collapses bursts of calls into one trailing invocation once the caller
//! has been quiet for the configured window.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::trace;

type Action<A> = Arc<dyn Fn(A) -> BoxFuture<'static, ()> + Send + Sync>;

/// Runs an async action with the arguments of the latest `schedule` call
/// after `delay` has passed without another call.
///
/// At most one countdown is armed at a time. Actions that already started
/// keep running when a new countdown is armed, so two invocations can be in
/// flight together.
///
/// Countdowns and actions run on the runtime the debouncer was created in,
/// so `schedule` may be called from any thread.
pub struct Debouncer<A> {
    delay: Duration,
    action: Action<A>,
    runtime: Handle,
    pending: Mutex<Option<JoinHandle<()>>>,
    in_flight: Arc<AtomicUsize>,
}

/// Counts one running action until dropped
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<A: Send + 'static> Debouncer<A> {
    /// Create a debouncer around `action`.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn new<F, Fut>(delay: Duration, action: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            delay,
            action: Arc::new(move |args| action(args).boxed()),
            runtime: Handle::current(),
            pending: Mutex::new(None),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Quiescence window
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Restart the countdown with `args`, discarding any pending arguments
    pub fn schedule(&self, args: A) {
        let mut pending = self.pending.lock();
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        let action = Arc::clone(&self.action);
        let in_flight = Arc::clone(&self.in_flight);
        let delay = self.delay;
        *pending = Some(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            trace!("debounce window elapsed");
            // Counted before the countdown task finishes, so `is_busy` never
            // sees a gap between the two.
            let guard = InFlight::enter(&in_flight);
            // Own task: aborting the next countdown must not cancel this run.
            tokio::spawn(async move {
                let _guard = guard;
                action(args).await;
            });
        }));
    }

    /// Whether a countdown is armed and has not fired yet
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .map_or(false, |handle| !handle.is_finished())
    }

    /// Number of actions that have started and not yet completed
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Pending countdown or running action
    pub fn is_busy(&self) -> bool {
        self.is_pending() || self.in_flight() > 0
    }

    /// Drop the armed countdown without running the action
    pub fn cancel(&self) {
        if let Some(handle) = self.pending.lock().take() {
            handle.abort();
        }
    }
}

impl<A> Drop for Debouncer<A> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, Instant};

    fn recording(delay_ms: u64) -> (Debouncer<u32>, Arc<Mutex<Vec<(u32, Duration)>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let start = Instant::now();
        let sink = Arc::clone(&calls);
        let debouncer = Debouncer::new(Duration::from_millis(delay_ms), move |value: u32| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().push((value, start.elapsed()));
            }
        });
        (debouncer, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_latest_call() {
        let (debouncer, calls) = recording(600);

        debouncer.schedule(1);
        sleep(Duration::from_millis(100)).await;
        debouncer.schedule(2);
        sleep(Duration::from_millis(100)).await;
        debouncer.schedule(3);
        assert!(debouncer.is_pending());

        sleep(Duration::from_millis(2000)).await;

        assert_eq!(*calls.lock(), vec![(3, Duration::from_millis(800))]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_quiet_periods_each_fire() {
        let (debouncer, calls) = recording(600);

        debouncer.schedule(1);
        sleep(Duration::from_millis(700)).await;
        debouncer.schedule(2);
        sleep(Duration::from_millis(700)).await;

        let values: Vec<u32> = calls.lock().iter().map(|(v, _)| *v).collect();
        assert_eq!(values, vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_and_drop_discard_pending() {
        let (debouncer, calls) = recording(600);

        debouncer.schedule(1);
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        sleep(Duration::from_millis(1000)).await;
        assert!(calls.lock().is_empty());

        debouncer.schedule(2);
        drop(debouncer);
        sleep(Duration::from_millis(1000)).await;
        assert!(calls.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_action_survives_new_schedule() {
        let finished = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&finished);
        let debouncer = Debouncer::new(Duration::from_millis(600), move |value: u32| {
            let sink = Arc::clone(&sink);
            async move {
                sleep(Duration::from_millis(1000)).await;
                sink.lock().push(value);
            }
        });

        debouncer.schedule(1);
        sleep(Duration::from_millis(700)).await;
        // First action is now sleeping inside its own task.
        debouncer.schedule(2);
        sleep(Duration::from_millis(3000)).await;

        assert_eq!(*finished.lock(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_until_action_completes() {
        let debouncer = Debouncer::new(Duration::from_millis(600), |_: u32| async {
            sleep(Duration::from_millis(1000)).await;
        });
        assert!(!debouncer.is_busy());

        debouncer.schedule(1);
        assert!(debouncer.is_busy());
        assert_eq!(debouncer.in_flight(), 0);

        sleep(Duration::from_millis(700)).await;
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.in_flight(), 1);
        assert!(debouncer.is_busy());

        sleep(Duration::from_millis(1000)).await;
        assert_eq!(debouncer.in_flight(), 0);
        assert!(!debouncer.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_from_thread_outside_runtime() {
        let (debouncer, calls) = recording(600);
        let debouncer = Arc::new(debouncer);

        let remote = Arc::clone(&debouncer);
        std::thread::spawn(move || remote.schedule(7))
            .join()
            .expect("schedule from a plain thread");
        assert!(debouncer.is_pending());

        sleep(Duration::from_millis(1000)).await;
        let values: Vec<u32> = calls.lock().iter().map(|(v, _)| *v).collect();
        assert_eq!(values, vec![7]);
    }
}
