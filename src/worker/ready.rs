//! Waiting for `document.readyState` to reach `complete`.
//!
//! An explicit loop with a bounded number of polls; the pause between polls
//! is a condition-variable wait, so a [`CancelToken`] interrupts it at once.

use std::str::FromStr;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

use crate::error::WorkerError;

/// The document's `readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl FromStr for ReadyState {
    type Err = WorkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "loading" => Ok(ReadyState::Loading),
            "interactive" => Ok(ReadyState::Interactive),
            "complete" => Ok(ReadyState::Complete),
            other => Err(WorkerError::Engine(anyhow::anyhow!(
                "unexpected document.readyState `{other}`"
            ))),
        }
    }
}

/// Shared cancellation flag with an interruptible sleep.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (flag, cvar) = &*self.inner;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep for `timeout`. Returns `true` if cancelled before or during it.
    pub fn wait(&self, timeout: Duration) -> bool {
        let (flag, cvar) = &*self.inner;
        let guard = flag.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = cvar
            .wait_timeout_while(guard, timeout, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

/// Poll pacing for the ready-state loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_polls: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(50),
            max_polls: 600,
        }
    }
}

/// Call `probe` until it reports [`ReadyState::Complete`].
///
/// Returns the number of polls taken.
pub fn wait_until_complete<F>(
    mut probe: F,
    settings: PollSettings,
    cancel: &CancelToken,
) -> Result<u32, WorkerError>
where
    F: FnMut() -> Result<ReadyState, WorkerError>,
{
    for poll in 1..=settings.max_polls {
        if cancel.is_cancelled() {
            return Err(WorkerError::Cancelled);
        }
        let state = probe()?;
        log::debug!("readyState poll {poll}: {state:?}");
        if state == ReadyState::Complete {
            return Ok(poll);
        }
        if cancel.wait(settings.interval) {
            return Err(WorkerError::Cancelled);
        }
    }
    Err(WorkerError::NotReady {
        polls: settings.max_polls,
    })
}
