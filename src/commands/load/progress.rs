use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::warn;

pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

/// Row counter shared between the load loop (single writer) and the monitor.
#[derive(Debug, Clone, Default)]
pub struct RowCounter(Arc<AtomicU64>);

impl RowCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, rows: u64) {
        self.0.store(rows, Ordering::Relaxed);
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Background thread that reports the row counter once per interval until
/// stopped, plus once more with the final value when stopped. Dropping the
/// monitor stops it and waits for the thread.
pub struct ProgressMonitor {
    shutdown: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressMonitor {
    pub fn spawn<F>(
        counter: RowCounter,
        interval: Duration,
        mut report: F,
    ) -> std::io::Result<Self>
    where
        F: FnMut(u64) + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name("load-progress".to_string())
            .spawn(move || {
                loop {
                    match shutdown_rx.recv_timeout(interval) {
                        Ok(()) => {
                            report(counter.current());
                            break;
                        }
                        Err(RecvTimeoutError::Disconnected) => break,
                        Err(RecvTimeoutError::Timeout) => report(counter.current()),
                    }
                }
            })?;

        Ok(Self {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    pub fn stop(mut self) {
        self.shutdown_and_join();
    }

    fn shutdown_and_join(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("progress monitor thread panicked");
        }
    }
}

impl Drop for ProgressMonitor {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}
