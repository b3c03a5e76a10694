use std::sync::Arc;

use crate::models::audio_models::{DeviceInfo, StreamParameters};
use crate::models::error::SessionError;
use crate::processing::transfer::TransferSignal;

/// Input period callback. `None` means the driver had no input buffer this period.
pub type InputCallback = Box<dyn FnMut(Option<&[f32]>) -> TransferSignal + Send + 'static>;

/// Output period callback. `None` means the driver had no output buffer this period.
pub type OutputCallback = Box<dyn FnMut(Option<&mut [f32]>) -> TransferSignal + Send + 'static>;

/// Callback registered with a stream, one variant per direction.
pub enum StreamCallback {
    Input(InputCallback),
    Output(OutputCallback),
}

/// Interface for the audio driver runtime.
///
/// Implemented by:
/// - `CpalDriver` (audio-session-cpal)
///
/// Implementations invoke the registered callback on their own real-time
/// thread, once per period of `frames_per_buffer` frames. Output periods are
/// pre-filled with silence before the callback sees them. Once the callback
/// returns anything other than [`TransferSignal::Continue`] the driver stops
/// calling it and the stream reports inactive.
pub trait AudioDriver: Send + Sync {
    /// Human-readable backend name, used in diagnostics.
    fn name(&self) -> &str;

    /// Acquire the runtime. Calls nest; each must be paired with [`terminate`](Self::terminate).
    fn initialize(&self) -> Result<(), SessionError>;

    /// Release one runtime acquisition.
    fn terminate(&self);

    fn default_input_device(&self) -> Option<DeviceInfo>;

    fn default_output_device(&self) -> Option<DeviceInfo>;

    /// Open (but do not start) a stream that drives `callback`.
    fn open_stream(
        &self,
        params: &StreamParameters,
        callback: StreamCallback,
    ) -> Result<Box<dyn AudioStream>, SessionError>;
}

/// An open stream, exclusively owned by the controller that opened it.
pub trait AudioStream: Send {
    fn start(&mut self) -> Result<(), SessionError>;

    /// Whether the driver is still calling back.
    ///
    /// An `Err` is an abnormal stream status; the stream should be torn down.
    fn is_active(&self) -> Result<bool, SessionError>;

    fn stop(&mut self) -> Result<(), SessionError>;

    /// Release the stream. Calling it again is a no-op.
    fn close(&mut self) -> Result<(), SessionError>;
}

/// RAII guard for one driver runtime acquisition.
///
/// Terminates the runtime when dropped, so every exit path of an operation
/// releases it exactly once.
pub struct RuntimeGuard<D: AudioDriver + ?Sized> {
    driver: Arc<D>,
}

impl<D: AudioDriver + ?Sized> RuntimeGuard<D> {
    pub fn acquire(driver: Arc<D>) -> Result<Self, SessionError> {
        driver.initialize()?;
        Ok(Self { driver })
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }
}

impl<D: AudioDriver + ?Sized> Drop for RuntimeGuard<D> {
    fn drop(&mut self) {
        self.driver.terminate();
    }
}
