//! Heartbeat timer
//!
//! One repeating task per session. Each tick consumes the ack flag; the
//! heartbeat is only sent when the previous one was acknowledged.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;

/// Heartbeat timer and ack flag
#[derive(Debug, Default)]
pub struct Heartbeat {
    acked: AtomicBool,
    task: Mutex<Option<AbortHandle>>,
}

impl Heartbeat {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)arm the timer
    ///
    /// Cancels any running timer, marks the ack as received so the first tick
    /// fires, then calls `tick` immediately and every `interval` afterwards
    /// until it returns `false`.
    pub fn start<F>(&self, interval: Duration, mut tick: F)
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let interval = interval.max(Duration::from_millis(1));
        let mut task = self.task.lock();
        if let Some(previous) = task.take() {
            previous.abort();
        }
        self.acked.store(true, Ordering::SeqCst);

        let handle = tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                timer.tick().await;
                if !tick() {
                    break;
                }
            }
        });
        *task = Some(handle.abort_handle());
    }

    /// Cancel the timer and forget any pending ack
    pub fn stop(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
        self.acked.store(false, Ordering::SeqCst);
    }

    /// Atomically read and clear the ack flag
    pub fn take_ack(&self) -> bool {
        self.acked.swap(false, Ordering::SeqCst)
    }

    /// Record a heartbeat ack from the gateway
    pub fn acknowledge(&self) {
        self.acked.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_acked(&self) -> bool {
        self.acked.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.lock().as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}
