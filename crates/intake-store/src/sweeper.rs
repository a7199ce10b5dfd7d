//! Periodic eviction of expired records on a background thread.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};

use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};
use crate::store::ContentStore;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Running sweeper. Stops when [`SweeperHandle::stop`] is called or the
/// handle is dropped.
#[derive(Debug)]
pub struct SweeperHandle {
    stop: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Signals the thread and waits for it to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Dropping the sender disconnects the channel, which ends the loop.
        drop(self.stop.take());
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            warn!("expiry sweeper thread panicked");
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl ContentStore {
    /// Runs [`ContentStore::sweep_expired`] every `interval` on a named
    /// background thread.
    pub fn spawn_sweeper(&self, interval: Duration) -> Result<SweeperHandle> {
        let interval = interval.max(MIN_INTERVAL);
        let store = self.clone();
        let (stop, stopped) = mpsc::channel::<()>();

        let thread = thread::Builder::new()
            .name("intake-store-sweeper".into())
            .spawn(move || {
                debug!(?interval, "expiry sweeper started");
                loop {
                    match stopped.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            let evicted = store.sweep_expired(SystemTime::now());
                            if evicted > 0 {
                                info!(evicted, remaining = store.count(), "expired files removed");
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("expiry sweeper stopped");
            })
            .map_err(StoreError::SpawnSweeper)?;

        Ok(SweeperHandle {
            stop: Some(stop),
            thread: Some(thread),
        })
    }
}
