//! Periodic maintenance: expiry, budget trimming and demotion, plus the
//! background thread that drives it.

use crate::cache::category::Category;
use crate::cache::core::{Runtime, Shared};
use crate::cache::metrics::CacheMetrics;
use crate::cache::policy::{evict_category_down_to, evict_down_to, purge_expired};
use crate::cache::protection::demote_idle;
use crate::cache::state::CacheState;
use crate::utils::num::fraction_of;
use log::{debug, warn};
use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Outcome of one maintenance tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MaintenanceReport {
    pub expired: usize,
    pub trimmed: usize,
    pub demoted: usize,
}

/// One maintenance pass over the locked state.
pub(crate) fn run_tick<V>(state: &mut CacheState<V>, rt: &Runtime) -> MaintenanceReport {
    let expired = purge_expired(state, rt);

    let mut trimmed = 0;
    for category in Category::ALL {
        let settings = state.settings(category);
        if settings.is_bounded() {
            let target = fraction_of(settings.max_size_bytes, 8, 10);
            trimmed += evict_category_down_to(state, category, target, rt);
        }
    }
    let global_target = state.config.cleanup_target_bytes();
    trimmed += evict_down_to(state, global_target, rt);

    let demoted = demote_idle(state, rt);
    CacheMetrics::bump(&rt.metrics.maintenance_ticks);
    MaintenanceReport { expired, trimmed, demoted }
}

#[derive(Default)]
struct Signal {
    stop: Mutex<bool>,
    wake: Condvar,
    done: Mutex<bool>,
    finished: Condvar,
}

/// Handle to the background maintenance thread.
pub(crate) struct MaintenanceHandle {
    signal: Arc<Signal>,
    thread: Option<JoinHandle<()>>,
}

impl MaintenanceHandle {
    pub(crate) fn spawn<V>(shared: Arc<Shared<V>>, interval: Duration) -> std::io::Result<Self>
    where
        V: Send + 'static,
    {
        let signal = Arc::new(Signal::default());
        let thread_signal = Arc::clone(&signal);
        let thread = std::thread::Builder::new().name("mediacache-maintenance".into()).spawn(move || {
            loop {
                if wait_or_stop(&thread_signal, interval) {
                    break;
                }
                shared.maintain();
            }
            *thread_signal.done.lock() = true;
            thread_signal.finished.notify_all();
        })?;
        Ok(Self { signal, thread: Some(thread) })
    }

    /// Asks the thread to exit and waits up to `timeout` for it.
    /// Returns false if the thread was still busy when the timeout elapsed.
    pub(crate) fn stop(&mut self, timeout: Duration) -> bool {
        {
            let mut stop = self.signal.stop.lock();
            *stop = true;
            self.signal.wake.notify_all();
        }
        let deadline = Instant::now().checked_add(timeout);
        let finished = {
            let mut done = self.signal.done.lock();
            while !*done {
                match deadline {
                    Some(deadline) => {
                        if self.signal.finished.wait_until(&mut done, deadline).timed_out() {
                            break;
                        }
                    }
                    None => self.signal.finished.wait(&mut done),
                }
            }
            *done
        };
        match self.thread.take() {
            Some(handle) if finished => {
                if handle.join().is_err() {
                    warn!("maintenance thread panicked");
                }
            }
            Some(_) => warn!("maintenance thread did not stop within {timeout:?}; detaching"),
            None => {}
        }
        finished
    }
}

/// Sleeps for `interval` unless stopped first. Returns true when stopping.
///
/// An interval too large to form a deadline waits for the stop signal alone.
fn wait_or_stop(signal: &Signal, interval: Duration) -> bool {
    let deadline = Instant::now().checked_add(interval);
    let mut stop = signal.stop.lock();
    while !*stop {
        match deadline {
            Some(deadline) => {
                if signal.wake.wait_until(&mut stop, deadline).timed_out() {
                    break;
                }
            }
            None => signal.wake.wait(&mut stop),
        }
    }
    if *stop {
        debug!("maintenance thread stopping");
    }
    *stop
}
