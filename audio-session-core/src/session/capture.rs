use std::sync::Arc;

use log::{debug, error, info, warn};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::models::audio_models::{StreamEnd, StreamParameters, TransferReport};
use crate::models::config::StreamConfiguration;
use crate::models::error::SessionError;
use crate::models::state::CaptureState;
use crate::session::context::{self, SharedContext, TransferContext};
use crate::session::supervisor::{self, CancellationToken, WaitOutcome};
use crate::traits::audio_driver::{AudioDriver, AudioStream, RuntimeGuard};

/// Mono capture from the default input device.
///
/// Owns at most one open input stream and the runtime acquisition that backs
/// it. The stream callback records into a context owned by this session, so
/// independent sessions never share state.
///
/// ```text
/// open(rate) → capture(buf) → capture(buf) → … → close()
/// ```
pub struct CaptureSession<D: AudioDriver> {
    id: Uuid,
    driver: Arc<D>,
    config: StreamConfiguration,
    state: CaptureState,
    context: SharedContext,
    stream: Option<Box<dyn AudioStream>>,
    runtime: Option<RuntimeGuard<D>>,
}

impl<D: AudioDriver> CaptureSession<D> {
    pub fn new(driver: Arc<D>) -> Self {
        Self {
            id: Uuid::new_v4(),
            driver,
            config: StreamConfiguration::default(),
            state: CaptureState::Closed,
            context: Arc::new(Mutex::new(TransferContext::default())),
            stream: None,
            runtime: None,
        }
    }

    pub fn with_config(driver: Arc<D>, config: StreamConfiguration) -> Result<Self, SessionError> {
        config.validate().map_err(SessionError::InvalidArgument)?;
        let mut session = Self::new(driver);
        session.config = config;
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Open an input stream at `sample_rate`. Transitions: closed → opened.
    ///
    /// An already-open stream is closed first. On failure the runtime is
    /// released and the session stays closed.
    pub fn open(&mut self, sample_rate: u32) -> Result<(), SessionError> {
        if !self.state.is_closed() {
            warn!("[capture {}] open while already open; closing previous stream", self.id);
            if let Err(e) = self.close() {
                warn!("[capture {}] closing previous stream failed: {}", self.id, e);
            }
        }

        self.open_inner(sample_rate).inspect_err(|e| {
            error!("[capture {}] open failed: {}", self.id, e);
        })
    }

    fn open_inner(&mut self, sample_rate: u32) -> Result<(), SessionError> {
        if sample_rate == 0 {
            return Err(SessionError::InvalidArgument("sample rate must be positive".into()));
        }

        self.context.lock().reset();

        let runtime = RuntimeGuard::acquire(Arc::clone(&self.driver))?;
        let device = runtime
            .driver()
            .default_input_device()
            .ok_or(SessionError::NoInputDevice)?;

        let params =
            StreamParameters::mono(device, sample_rate, self.config.frames_per_buffer);
        let stream = runtime
            .driver()
            .open_stream(&params, context::capture_callback(Arc::clone(&self.context)))?;

        info!(
            "[capture {}] opened '{}' via {} at {} Hz, {} frames per buffer",
            self.id,
            params.device.name,
            self.driver.name(),
            sample_rate,
            params.frames_per_buffer
        );

        self.stream = Some(stream);
        self.runtime = Some(runtime);
        self.state = CaptureState::Opened;
        Ok(())
    }

    /// Record `buffer.len()` frames, blocking until done.
    /// Transitions: opened → capturing → opened.
    pub fn capture(&mut self, buffer: &mut [f64]) -> Result<TransferReport, SessionError> {
        self.capture_until(buffer, &CancellationToken::new())
    }

    /// Like [`capture`](Self::capture), but stops early once `cancel` fires.
    ///
    /// Only the first `report.transferred` frames of `buffer` are written.
    pub fn capture_until(
        &mut self,
        buffer: &mut [f64],
        cancel: &CancellationToken,
    ) -> Result<TransferReport, SessionError> {
        self.capture_inner(buffer, cancel).inspect_err(|e| {
            error!("[capture {}] capture failed: {}", self.id, e);
        })
    }

    fn capture_inner(
        &mut self,
        buffer: &mut [f64],
        cancel: &CancellationToken,
    ) -> Result<TransferReport, SessionError> {
        if buffer.is_empty() {
            return Err(SessionError::InvalidArgument("capture buffer is empty".into()));
        }
        if !self.state.is_opened() {
            return Err(SessionError::NotOpen);
        }
        let Some(stream) = self.stream.as_mut() else {
            return Err(SessionError::NotOpen);
        };

        let requested = buffer.len();
        self.context.lock().prepare_capture(requested);

        stream.start()?;
        self.state = CaptureState::Capturing;
        debug!("[capture {}] started for {} frames", self.id, requested);

        let waited =
            supervisor::wait_until_inactive(&**stream, self.config.poll_interval, cancel);
        let stopped = stream.stop();
        self.state = CaptureState::Opened;

        // Stream is stopped: the cursor is final from here on.
        let mut ctx = self.context.lock();
        let recorded = ctx.transferred();
        buffer[..recorded.len()].copy_from_slice(recorded);
        let transferred = recorded.len();
        let fault = ctx.take_fault();
        drop(ctx);

        let outcome = waited?;
        stopped?;
        if let Some(fault) = fault {
            return Err(fault);
        }

        let end = match outcome {
            WaitOutcome::Cancelled => StreamEnd::Cancelled,
            WaitOutcome::Inactive if transferred == requested => StreamEnd::Completed,
            WaitOutcome::Inactive => StreamEnd::Stopped,
        };
        info!(
            "[capture {}] recorded {}/{} frames ({:?})",
            self.id, transferred, requested, end
        );

        Ok(TransferReport {
            requested,
            transferred,
            end,
        })
    }

    /// Close the stream and release the runtime. Transitions: opened → closed.
    ///
    /// Safe to call repeatedly; closing a closed session does nothing.
    pub fn close(&mut self) -> Result<(), SessionError> {
        let Some(mut stream) = self.stream.take() else {
            self.state = CaptureState::Closed;
            return Ok(());
        };

        let closed = stream.close();
        drop(stream);
        self.runtime = None;
        self.context.lock().reset();
        self.state = CaptureState::Closed;
        debug!("[capture {}] closed", self.id);

        closed.inspect_err(|e| error!("[capture {}] close failed: {}", self.id, e))
    }
}

impl<D: AudioDriver> Drop for CaptureSession<D> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
