//! One-shot timers on the async runtime.
//!
//! [`TimerManager`] schedules callbacks to run after a delay as tasks on a
//! captured tokio runtime handle. Each timer is tracked in a slot map so it
//! can be stopped before it fires; a stopped timer never runs its callback.
//!
//! Timer deadlines use `tokio::time`, so tests running with a paused clock
//! (`#[tokio::test(start_paused = true)]`) observe deterministic firing.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::Instant;

use crate::error::{CoreError, Result};
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// Internal timer data.
#[derive(Debug)]
struct TimerData {
    /// When this timer fires.
    deadline: Instant,
    /// Abort handle of the task driving the timer, set right after spawn.
    abort: Option<AbortHandle>,
}

type TimerTable = Arc<Mutex<SlotMap<TimerId, TimerData>>>;

/// Manages one-shot timers for a single owner.
///
/// Cloning a `TimerManager` yields another handle to the same timer table.
#[derive(Clone)]
pub struct TimerManager {
    handle: Handle,
    timers: TimerTable,
}

impl TimerManager {
    /// Create a timer manager bound to the runtime of the calling context.
    ///
    /// Fails with [`CoreError::NoRuntime`] outside a tokio runtime.
    pub fn new() -> Result<Self> {
        let handle = Handle::try_current().map_err(|_| CoreError::NoRuntime)?;
        Ok(Self::with_handle(handle))
    }

    /// Create a timer manager that spawns on the given runtime handle.
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle,
            timers: Arc::new(Mutex::new(SlotMap::with_key())),
        }
    }

    /// The runtime handle timers are spawned on.
    pub fn runtime(&self) -> &Handle {
        &self.handle
    }

    /// Start a one-shot timer that runs `callback` after `delay`.
    ///
    /// Returns the timer ID that can be used to stop the timer.
    pub fn start_one_shot<F>(&self, delay: Duration, callback: F) -> TimerId
    where
        F: FnOnce() + Send + 'static,
    {
        let deadline = Instant::now() + delay;
        let id = self.timers.lock().insert(TimerData {
            deadline,
            abort: None,
        });

        let timers = Arc::clone(&self.timers);
        let task = self.handle.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            // A timer stopped after the sleep completed is already gone.
            if timers.lock().remove(id).is_none() {
                return;
            }
            tracing::trace!(target: targets::TIMER, ?id, "timer fired");
            callback();
        });

        if let Some(data) = self.timers.lock().get_mut(id) {
            data.abort = Some(task.abort_handle());
        }

        tracing::trace!(target: targets::TIMER, ?id, ?delay, "timer started");
        id
    }

    /// Stop a timer before it fires.
    ///
    /// Returns an error if the timer already fired or was stopped.
    pub fn stop(&self, id: TimerId) -> Result<()> {
        let data = self
            .timers
            .lock()
            .remove(id)
            .ok_or(CoreError::InvalidTimerId)?;
        if let Some(abort) = data.abort {
            abort.abort();
        }
        tracing::trace!(target: targets::TIMER, ?id, "timer stopped");
        Ok(())
    }

    /// Stop every pending timer.
    pub fn stop_all(&self) {
        let drained: Vec<TimerData> = self.timers.lock().drain().map(|(_, d)| d).collect();
        crate::trellis_debug!(count = drained.len(), "stopping all timers");
        for data in drained {
            if let Some(abort) = data.abort {
                abort.abort();
            }
        }
    }

    /// Check if a timer is still pending.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.lock().contains_key(id)
    }

    /// Time remaining until a pending timer fires.
    pub fn remaining(&self, id: TimerId) -> Option<Duration> {
        self.timers
            .lock()
            .get(id)
            .map(|data| data.deadline.saturating_duration_since(Instant::now()))
    }

    /// Number of pending timers.
    pub fn active_count(&self) -> usize {
        self.timers.lock().len()
    }
}

impl std::fmt::Debug for TimerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerManager")
            .field("active", &self.active_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_new_outside_runtime_fails() {
        assert!(matches!(TimerManager::new(), Err(CoreError::NoRuntime)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_shot_fires_once() {
        let timers = TimerManager::new().unwrap();
        let fired = Arc::new(AtomicUsize::new(0));

        let fired_clone = fired.clone();
        let id = timers.start_one_shot(Duration::from_millis(100), move || {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert!(timers.is_active(id));
        assert_eq!(timers.remaining(id), Some(Duration::from_millis(100)));

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!timers.is_active(id));
        assert_eq!(timers.active_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_timer_never_fires() {
        let timers = TimerManager::new().unwrap();
        let fired = Arc::new(AtomicUsize::new(0));

        let fired_clone = fired.clone();
        let id = timers.start_one_shot(Duration::from_millis(100), move || {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });
        timers.stop(id).unwrap();
        assert!(matches!(timers.stop(id), Err(CoreError::InvalidTimerId)));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_all() {
        let timers = TimerManager::new().unwrap();
        let fired = Arc::new(AtomicUsize::new(0));

        for ms in [10, 20, 30] {
            let fired_clone = fired.clone();
            timers.start_one_shot(Duration::from_millis(ms), move || {
                fired_clone.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(timers.active_count(), 3);
        timers.stop_all();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
