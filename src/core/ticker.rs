//! Fixed-interval polling task.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Runs a callback on a fixed interval until the callback breaks or the
/// ticker is dropped. A ticker can be started once.
#[derive(Debug, Default)]
pub struct PollingTicker {
    handle: Option<JoinHandle<()>>,
}

impl PollingTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Spawns the loop on the current tokio runtime. Returns false if it was already started.
    pub fn start<F>(&mut self, interval: Duration, mut on_tick: F) -> bool
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        if self.handle.is_some() {
            return false;
        }
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if on_tick().is_break() {
                    tracing::debug!("polling loop finished");
                    break;
                }
            }
        });
        self.handle = Some(handle);
        true
    }
}

impl Drop for PollingTicker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
