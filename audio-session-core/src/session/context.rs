use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::error::SessionError;
use crate::processing::transfer::{self, FrameCursor, TransferSignal};
use crate::traits::audio_driver::StreamCallback;

/// Session state handed to the stream callback as its private context.
///
/// The controlling thread only touches it while the stream is stopped. The
/// callback never waits for the lock: a period that finds it held is aborted.
pub type SharedContext = Arc<Mutex<TransferContext>>;

/// Buffer, cursor, and target frame count for one operation.
#[derive(Debug, Default)]
pub struct TransferContext {
    buffer: Option<Vec<f64>>,
    cursor: FrameCursor,
    fault: Option<SessionError>,
}

impl TransferContext {
    /// Context for playing `samples`, owning a private copy of them.
    pub fn for_playback(samples: &[f64]) -> Self {
        Self {
            buffer: Some(samples.to_vec()),
            cursor: FrameCursor::new(samples.len()),
            fault: None,
        }
    }

    /// Prepare to record `frames` frames, reusing the previous allocation.
    ///
    /// Sizes the buffer up front so the callback never allocates.
    pub fn prepare_capture(&mut self, frames: usize) {
        let buffer = self.buffer.get_or_insert_with(Vec::new);
        buffer.clear();
        buffer.resize(frames, 0.0);
        self.cursor = FrameCursor::new(frames);
        self.fault = None;
    }

    /// Drop the buffer and zero the cursor.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn cursor(&self) -> FrameCursor {
        self.cursor
    }

    pub fn take_fault(&mut self) -> Option<SessionError> {
        self.fault.take()
    }

    /// Frames transferred so far.
    pub fn transferred(&self) -> &[f64] {
        match &self.buffer {
            Some(buffer) => &buffer[..self.cursor.frame_index()],
            None => &[],
        }
    }

    fn capture(&mut self, input: Option<&[f32]>) -> TransferSignal {
        let signal = transfer::capture_period(&mut self.cursor, input, self.buffer.as_deref_mut());
        if signal == TransferSignal::Abort {
            self.fault = Some(SessionError::NullBuffer);
        }
        signal
    }

    fn play(&mut self, output: Option<&mut [f32]>) -> TransferSignal {
        let signal = transfer::playback_period(&mut self.cursor, self.buffer.as_deref(), output);
        if signal == TransferSignal::Abort {
            self.fault = Some(SessionError::NullBuffer);
        }
        signal
    }
}

/// Input callback recording into `context`.
pub fn capture_callback(context: SharedContext) -> StreamCallback {
    StreamCallback::Input(Box::new(move |input: Option<&[f32]>| {
        match context.try_lock() {
            Some(mut ctx) => ctx.capture(input),
            None => TransferSignal::Abort,
        }
    }))
}

/// Output callback playing from `context`.
pub fn playback_callback(context: SharedContext) -> StreamCallback {
    StreamCallback::Output(Box::new(move |output: Option<&mut [f32]>| {
        match context.try_lock() {
            Some(mut ctx) => ctx.play(output),
            None => TransferSignal::Abort,
        }
    }))
}
