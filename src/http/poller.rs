use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Sender, TrySendError};
use log::{debug, info, warn};

use super::client::ClientError;

/// Longest uninterrupted sleep, so a stop request is seen quickly.
const SLEEP_SLICE: Duration = Duration::from_millis(20);

/// Owns one polling thread. Dropping the handle signals the thread to stop;
/// any request still in flight finishes but its result is discarded.
#[derive(Debug)]
pub struct PollerHandle {
    name: String,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Signals the thread without waiting for it.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Signals the thread and waits for it to exit.
    pub fn join(mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Poller {} panicked", self.name);
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn sleep_until(deadline: Instant, stop: &AtomicBool) {
    loop {
        if stop.load(Ordering::Relaxed) {
            return;
        }
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        thread::sleep((deadline - now).min(SLEEP_SLICE));
    }
}

/// Calls `fetch` every `interval` on a dedicated thread and forwards each
/// success to `sender`. Failures are logged and skipped; there is no retry
/// beyond the next scheduled poll. A full channel drops the result.
pub fn spawn_poller<T, F>(
    name: &str,
    interval: Duration,
    sender: Sender<T>,
    mut fetch: F,
) -> std::io::Result<PollerHandle>
where
    T: Send + 'static,
    F: FnMut() -> Result<T, ClientError> + Send + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let thread_stop = Arc::clone(&stop);
    let thread_name = name.to_string();

    let handle = thread::Builder::new().name(format!("poll-{}", name)).spawn(move || {
        info!("Poller {} started ({} ms)", thread_name, interval.as_millis());
        while !thread_stop.load(Ordering::Relaxed) {
            let started = Instant::now();
            match fetch() {
                Ok(value) => {
                    // stopped while the request was in flight
                    if thread_stop.load(Ordering::Relaxed) {
                        break;
                    }
                    match sender.try_send(value) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => debug!("Poller {} channel full, dropping result", thread_name),
                        Err(TrySendError::Disconnected(_)) => {
                            info!("Poller {} channel disconnected, exiting", thread_name);
                            break;
                        }
                    }
                }
                Err(e) => debug!("Poller {} request failed: {}", thread_name, e),
            }
            sleep_until(started + interval, &thread_stop);
        }
        info!("Poller {} stopped", thread_name);
    })?;

    Ok(PollerHandle {
        name: name.to_string(),
        stop,
        handle: Some(handle),
    })
}
