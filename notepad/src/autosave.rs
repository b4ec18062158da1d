//! Periodic autosave on a background thread
//!
//! The UI thread publishes the buffer after every change; the worker wakes
//! every interval and writes whatever was published last, unconditionally.
//! The buffer is shared behind a mutex so a write never sees a half-applied
//! edit.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[derive(Default)]
struct Shared {
    text: String,
    last_saved: Option<DateTime<Local>>,
}

/// Handle to the autosave thread; dropping it stops the thread.
pub struct Autosaver {
    shared: Arc<Mutex<Shared>>,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    interval: Duration,
}

impl Autosaver {
    /// Start writing to `path` every `interval`, beginning with `initial`.
    pub fn spawn(path: PathBuf, interval: Duration, initial: &str) -> Self {
        let shared = Arc::new(Mutex::new(Shared {
            text: initial.to_string(),
            last_saved: None,
        }));
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        tracing::info!(path = %path.display(), secs = interval.as_secs(), "starting autosave");
        let worker_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("autosave".into())
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => write_snapshot(&worker_shared, &path),
                    // Stop requested or the handle was dropped.
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            });

        let handle = match handle {
            Ok(h) => Some(h),
            Err(e) => {
                tracing::error!(error = %e, "could not start autosave thread");
                None
            }
        };

        Self {
            shared,
            stop_tx: Some(stop_tx),
            handle,
            interval,
        }
    }

    /// Hand the current buffer to the worker.
    pub fn publish(&self, text: &str) {
        if let Ok(mut shared) = self.shared.lock() {
            shared.text.clear();
            shared.text.push_str(text);
        }
    }

    /// Time of the last successful write
    pub fn last_saved(&self) -> Option<DateTime<Local>> {
        self.shared.lock().ok().and_then(|s| s.last_saved)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }
}

fn write_snapshot(shared: &Mutex<Shared>, path: &Path) {
    let text = match shared.lock() {
        Ok(s) => s.text.clone(),
        Err(_) => return,
    };
    match notecore::storage::write_text(path, &text) {
        Ok(()) => {
            let now = Local::now();
            if let Ok(mut s) = shared.lock() {
                s.last_saved = Some(now);
            }
            tracing::info!(path = %path.display(), at = %now.format("%a %b %e %H:%M:%S %Y"), "autosaved");
        }
        Err(e) => tracing::warn!(error = %e, path = %path.display(), "autosave failed"),
    }
}

impl Drop for Autosaver {
    fn drop(&mut self) {
        drop(self.stop_tx.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        tracing::debug!("autosave stopped");
    }
}
