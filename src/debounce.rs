//! Trailing-edge debouncer
//!
//! Values pushed in quick succession collapse into the last one, emitted once
//! the input has been quiet for the configured delay. Each push restarts the
//! timer. Dropping the debouncer cancels any pending emission.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Handle feeding a background debounce task
pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<T>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn a debouncer; settled values arrive on the returned receiver
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (input, mut pushed) = mpsc::unbounded_channel::<T>();
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            let mut pending: Option<T> = None;
            loop {
                tokio::select! {
                    value = pushed.recv() => match value {
                        Some(value) => pending = Some(value),
                        None => break,
                    },
                    _ = sleep(delay), if pending.is_some() => {
                        if let Some(value) = pending.take() {
                            if settled_tx.send(value).is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        });

        (Self { input, task }, settled_rx)
    }

    /// Replace the pending value and restart the quiet period
    pub fn push(&self, value: T) {
        if self.input.send(value).is_err() {
            tracing::debug!("Debouncer already stopped, value dropped");
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}
