//! # audio-session-ffi
//!
//! C ABI for mono capture and playback over the cpal driver.
//!
//! ```c
//! void OpenCapture(int *sampleRate);
//! void Capture(int *numSamples, double buffer[]);
//! void CloseCapture(void);
//! void Playback(double buffer[], int *sampleRate, int *numSamples);
//! ```
//!
//! None of the entry points return a status. Failures are logged through
//! `log` (installed as `env_logger` on stderr, filtered by `RUST_LOG`) and the
//! call returns after tearing down whatever it opened. Callers detect failure
//! by the absence of recorded or played samples. Panics never cross the
//! boundary.

use std::os::raw::c_int;
use std::panic::{self, AssertUnwindSafe};
use std::slice;

use audio_session_core::{CaptureSession, PlaybackSession, SessionError};

mod args;
mod state;

use state::CAPTURE;

/// Run an entry point body, logging its error and containing any panic.
fn guarded(entry: &str, body: impl FnOnce() -> Result<(), SessionError>) {
    let _ = env_logger::try_init();
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => log::error!("{}: {}", entry, e),
        Err(_) => log::error!("{}: panicked", entry),
    }
}

unsafe fn open_capture(sample_rate: *const c_int) -> Result<(), SessionError> {
    let sample_rate = args::read_positive(sample_rate, "sample rate")?;
    let sample_rate = u32::try_from(sample_rate)
        .map_err(|_| SessionError::InvalidArgument("sample rate out of range".into()))?;

    let mut capture = CAPTURE.lock();
    capture
        .get_or_insert_with(|| CaptureSession::new(state::driver()))
        .open(sample_rate)
}

unsafe fn capture(num_samples: *const c_int, buffer: *mut f64) -> Result<(), SessionError> {
    let num_samples = args::read_positive(num_samples, "sample count")?;
    args::require_buffer(buffer)?;

    let mut capture = CAPTURE.lock();
    let session = capture.as_mut().ok_or(SessionError::NotOpen)?;
    let buffer = slice::from_raw_parts_mut(buffer, num_samples);
    session.capture(buffer).map(|_| ())
}

fn close_capture() -> Result<(), SessionError> {
    match CAPTURE.lock().take() {
        Some(mut session) => session.close(),
        None => Ok(()),
    }
}

unsafe fn playback(
    buffer: *const f64,
    sample_rate: *const c_int,
    num_samples: *const c_int,
) -> Result<(), SessionError> {
    args::require_buffer(buffer)?;
    let sample_rate = args::read_positive(sample_rate, "sample rate")?;
    let sample_rate = u32::try_from(sample_rate)
        .map_err(|_| SessionError::InvalidArgument("sample rate out of range".into()))?;
    let num_samples = args::read_positive(num_samples, "sample count")?;

    let samples = slice::from_raw_parts(buffer, num_samples);
    PlaybackSession::new(state::driver())
        .play(samples, sample_rate)
        .map(|_| ())
}

/// Prepare the default input device for mono capture at `*sampleRate` Hz.
///
/// # Safety
/// `sample_rate` must be null or point to a readable `int`.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "C" fn OpenCapture(sample_rate: *const c_int) {
    guarded("OpenCapture", || open_capture(sample_rate));
}

/// Record `*numSamples` frames into `buffer`, blocking until done.
///
/// # Safety
/// `num_samples` must be null or point to a readable `int`; `buffer` must be
/// null or valid for `*num_samples` writes of `double`.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "C" fn Capture(num_samples: *const c_int, buffer: *mut f64) {
    guarded("Capture", || capture(num_samples, buffer));
}

/// Close the capture stream. Safe to call any number of times.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "C" fn CloseCapture() {
    guarded("CloseCapture", close_capture);
}

/// Play `*numSamples` frames from `buffer` at `*sampleRate` Hz, blocking until done.
///
/// # Safety
/// `sample_rate` and `num_samples` must be null or point to readable `int`s;
/// `buffer` must be null or valid for `*num_samples` reads of `double`.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "C" fn Playback(
    buffer: *const f64,
    sample_rate: *const c_int,
    num_samples: *const c_int,
) {
    guarded("Playback", || playback(buffer, sample_rate, num_samples));
}
