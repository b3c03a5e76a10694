//! cpal-backed `AudioStream`.
//!
//! cpal streams have no notion of completion, so the data callback wrapper
//! clears an `active` flag once the transfer engine returns anything other
//! than `Continue`; later periods are ignored (inputs) or left silent
//! (outputs). A completed output stays active for a few silent drain periods
//! sized from the suggested latency, so the last samples reach the device
//! before the stream can be closed. Errors reported by cpal surface as an
//! abnormal status from `is_active`.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{BufferSize, StreamConfig};
use parking_lot::Mutex;

use audio_session_core::models::audio_models::StreamParameters;
use audio_session_core::models::error::SessionError;
use audio_session_core::processing::transfer::TransferSignal;
use audio_session_core::traits::audio_driver::{
    AudioStream, InputCallback, OutputCallback, StreamCallback,
};

/// State shared between a stream handle and its cpal callbacks.
#[derive(Debug, Default)]
pub(crate) struct StreamFlags {
    active: AtomicBool,
    /// Silent periods to play after completion before going inactive.
    drain_periods: usize,
    /// Drain periods still outstanding; zero until the transfer completes.
    draining: AtomicUsize,
    fault: Mutex<Option<String>>,
}

impl StreamFlags {
    fn with_drain(drain_periods: usize) -> Self {
        Self {
            drain_periods: drain_periods.max(1),
            ..Default::default()
        }
    }

    fn record_fault(&self, message: String) {
        *self.fault.lock() = Some(message);
        self.active.store(false, Ordering::SeqCst);
    }
}

/// Run one input period through the engine callback.
fn input_period(flags: &StreamFlags, callback: &mut InputCallback, data: &[f32]) {
    if !flags.active.load(Ordering::Acquire) {
        return;
    }
    if callback(Some(data)) != TransferSignal::Continue {
        flags.active.store(false, Ordering::Release);
    }
}

/// Run one output period through the engine callback, starting from silence.
fn output_period(flags: &StreamFlags, callback: &mut OutputCallback, data: &mut [f32]) {
    data.fill(0.0);
    if !flags.active.load(Ordering::Acquire) {
        return;
    }

    let pending = flags.draining.load(Ordering::Acquire);
    if pending > 0 {
        // The device has taken the previous period; count it off.
        flags.draining.store(pending - 1, Ordering::Release);
        if pending == 1 {
            flags.active.store(false, Ordering::Release);
        }
        return;
    }

    match callback(Some(data)) {
        TransferSignal::Continue => {}
        TransferSignal::Complete => flags.draining.store(flags.drain_periods, Ordering::Release),
        TransferSignal::Abort => flags.active.store(false, Ordering::Release),
    }
}

/// Periods needed to cover `latency` at `sample_rate`, plus the one in flight.
fn drain_periods(latency: Option<Duration>, sample_rate: u32, frames_per_buffer: u32) -> usize {
    let latency_frames = latency.map_or(0.0, |l| l.as_secs_f64() * sample_rate as f64);
    let per_period = frames_per_buffer.max(1) as f64;
    1 + (latency_frames / per_period).ceil() as usize
}

/// Mono f32 cpal stream with fixed-size periods.
pub struct CpalStream {
    stream: Option<cpal::Stream>,
    flags: Arc<StreamFlags>,
}

// SAFETY: The cpal stream handle is only touched by the controller that owns
// this value, which serializes start/poll/stop/close on one thread at a time.
// The callbacks communicate through `StreamFlags`, which is Sync.
unsafe impl Send for CpalStream {}

impl CpalStream {
    /// Build (but do not start) a stream on `device`.
    pub fn open(
        device: &cpal::Device,
        params: &StreamParameters,
        callback: StreamCallback,
    ) -> Result<Self, SessionError> {
        let config = StreamConfig {
            channels: params.channels,
            sample_rate: params.sample_rate,
            buffer_size: BufferSize::Fixed(params.frames_per_buffer),
        };

        let flags = Arc::new(StreamFlags::with_drain(drain_periods(
            params.suggested_latency,
            params.sample_rate,
            params.frames_per_buffer,
        )));
        let err_flags = Arc::clone(&flags);
        let err_callback = move |err: cpal::StreamError| {
            log::error!("audio stream error: {}", err);
            err_flags.record_fault(err.to_string());
        };

        let data_flags = Arc::clone(&flags);
        let stream = match callback {
            StreamCallback::Input(mut callback) => device.build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    input_period(&data_flags, &mut callback, data)
                },
                err_callback,
                None,
            ),
            StreamCallback::Output(mut callback) => device.build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    output_period(&data_flags, &mut callback, data)
                },
                err_callback,
                None,
            ),
        }
        .map_err(|e| SessionError::StreamOpen(e.to_string()))?;

        // Some hosts start streams on creation; keep it idle until `start`.
        if let Err(e) = stream.pause() {
            log::debug!("pause after build not supported: {}", e);
        }

        Ok(Self {
            stream: Some(stream),
            flags,
        })
    }
}

impl AudioStream for CpalStream {
    fn start(&mut self) -> Result<(), SessionError> {
        let stream = self
            .stream
            .as_ref()
            .ok_or_else(|| SessionError::StreamStart("stream is closed".into()))?;

        *self.flags.fault.lock() = None;
        self.flags.draining.store(0, Ordering::SeqCst);
        self.flags.active.store(true, Ordering::SeqCst);
        stream.play().map_err(|e| {
            self.flags.active.store(false, Ordering::SeqCst);
            SessionError::StreamStart(e.to_string())
        })
    }

    fn is_active(&self) -> Result<bool, SessionError> {
        if let Some(fault) = self.flags.fault.lock().as_ref() {
            return Err(SessionError::Driver(fault.clone()));
        }
        Ok(self.flags.active.load(Ordering::SeqCst))
    }

    fn stop(&mut self) -> Result<(), SessionError> {
        self.flags.active.store(false, Ordering::SeqCst);
        if let Some(stream) = self.stream.as_ref() {
            if let Err(e) = stream.pause() {
                log::warn!("failed to pause stream: {}", e);
            }
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), SessionError> {
        self.flags.active.store(false, Ordering::SeqCst);
        // Dropping the cpal stream releases the device.
        self.stream.take();
        Ok(())
    }
}
