//! Recurring background tasks.
//!
//! Screens refresh by polling instead of push: every tick re-runs the task in
//! full. A poller runs on its own thread and is owned through a [`PollHandle`];
//! stopping or dropping the handle ends the loop, so no callback outlives the
//! consumer that registered it.

use std::fmt::Display;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

/// Spawns recurring tasks.
pub struct Poller;

impl Poller {
    /// Run `task` now and then every `interval` until the handle is stopped.
    ///
    /// A failing tick is logged and the loop carries on; there is no backoff.
    pub fn spawn<F, E>(name: &'static str, interval: Duration, mut task: F) -> PollHandle
    where
        F: FnMut() -> Result<(), E> + Send + 'static,
        E: Display,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = std::thread::spawn(move || {
            tracing::info!(poller = name, interval_ms = interval.as_millis() as u64, "Poller started");
            loop {
                if let Err(e) = task() {
                    tracing::debug!(poller = name, error = %e, "Poll tick failed");
                }

                // Stop wakes the wait early.
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            tracing::info!(poller = name, "Poller stopped");
        });

        PollHandle {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }
}

/// Disposer for a running poller.
///
/// Stops on [`PollHandle::stop`] or on drop. Either way the call blocks until
/// the current tick (if any) has finished.
pub struct PollHandle {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Stop the poller and wait for its thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    /// Whether the poller thread is still running.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map_or(false, |h| !h.is_finished())
    }

    fn shutdown(&mut self) {
        // Dropping the sender disconnects the channel and wakes the loop.
        self.stop_tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Poller thread panicked");
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
