//! Per-period frame transfer between a driver I/O buffer and a session buffer.
//!
//! These functions run on the driver's real-time thread. They do bounded
//! arithmetic and a single copy loop: no blocking, no allocation, no logging.

/// Value returned to the driver from every stream callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferSignal {
    /// More periods are wanted.
    Continue,
    /// The target frame count has been reached; the driver should drain and stop.
    Complete,
    /// A buffer was missing; the driver should stop without further callbacks.
    Abort,
}

/// A driver-side sample type that widens to, and narrows from, `f64`.
pub trait NarrowSample: Copy + Send + 'static {
    fn to_f64(self) -> f64;

    fn from_f64(value: f64) -> Self;
}

impl NarrowSample for f32 {
    fn to_f64(self) -> f64 {
        self as f64
    }

    // Unclipped: out-of-range values pass through to the device.
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl NarrowSample for i16 {
    fn to_f64(self) -> f64 {
        self as f64 / i16::MAX as f64
    }

    fn from_f64(value: f64) -> Self {
        (value.clamp(-1.0, 1.0) * i16::MAX as f64).round() as i16
    }
}

/// Progress of one operation: frames already transferred out of the target.
///
/// Invariant: `frame_index <= max_frame_index`, and `frame_index` never decreases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameCursor {
    frame_index: usize,
    max_frame_index: usize,
}

impl FrameCursor {
    pub fn new(max_frame_index: usize) -> Self {
        Self {
            frame_index: 0,
            max_frame_index,
        }
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn max_frame_index(&self) -> usize {
        self.max_frame_index
    }

    pub fn remaining(&self) -> usize {
        self.max_frame_index - self.frame_index
    }

    /// Frames to move this period and the signal to hand back to the driver.
    ///
    /// Completion is signalled on the first period whose chunk is larger than
    /// what is left, so an exact multiple of the chunk size completes on one
    /// extra, empty period.
    fn plan(&self, chunk: usize) -> (usize, TransferSignal) {
        let remaining = self.remaining();
        if remaining < chunk {
            (remaining, TransferSignal::Complete)
        } else {
            (chunk, TransferSignal::Continue)
        }
    }
}

/// Direction A: copy one input period into the session buffer at the cursor.
///
/// Returns [`TransferSignal::Abort`] without touching the cursor if either
/// buffer is missing or the session buffer cannot hold the target.
pub fn capture_period<S: NarrowSample>(
    cursor: &mut FrameCursor,
    input: Option<&[S]>,
    session: Option<&mut [f64]>,
) -> TransferSignal {
    let (Some(input), Some(session)) = (input, session) else {
        return TransferSignal::Abort;
    };

    let (frames, signal) = cursor.plan(input.len());
    let start = cursor.frame_index;
    let Some(dst) = session.get_mut(start..start + frames) else {
        return TransferSignal::Abort;
    };

    for (d, s) in dst.iter_mut().zip(input) {
        *d = s.to_f64();
    }
    cursor.frame_index += frames;
    signal
}

/// Direction B: copy the session buffer at the cursor into one output period.
///
/// Output samples past the remaining frame count are left as the driver
/// handed them over.
pub fn playback_period<S: NarrowSample>(
    cursor: &mut FrameCursor,
    session: Option<&[f64]>,
    output: Option<&mut [S]>,
) -> TransferSignal {
    let (Some(session), Some(output)) = (session, output) else {
        return TransferSignal::Abort;
    };

    let (frames, signal) = cursor.plan(output.len());
    let start = cursor.frame_index;
    let Some(src) = session.get(start..start + frames) else {
        return TransferSignal::Abort;
    };

    for (d, s) in output.iter_mut().zip(src) {
        *d = S::from_f64(*s);
    }
    cursor.frame_index += frames;
    signal
}
