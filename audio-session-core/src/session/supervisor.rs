use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::models::error::SessionError;
use crate::traits::audio_driver::AudioStream;

/// Request to end a running capture or playback early.
///
/// Only the supervising thread observes it; the stream callback never does.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Why the supervisor stopped waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WaitOutcome {
    Inactive,
    Cancelled,
}

/// Poll `stream` every `interval` until the driver reports it inactive.
///
/// An abnormal stream status ends the wait with an error in both directions.
pub(crate) fn wait_until_inactive(
    stream: &dyn AudioStream,
    interval: Duration,
    cancel: &CancellationToken,
) -> Result<WaitOutcome, SessionError> {
    loop {
        if cancel.is_cancelled() {
            return Ok(WaitOutcome::Cancelled);
        }
        if !stream.is_active()? {
            return Ok(WaitOutcome::Inactive);
        }
        thread::sleep(interval);
    }
}
