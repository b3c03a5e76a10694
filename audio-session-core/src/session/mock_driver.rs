//! Deterministic driver used by the controller tests.
//!
//! Each started stream runs a period thread that feeds the registered callback
//! fixed-size chunks until the callback stops returning `Continue`.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::audio_models::{DeviceInfo, StreamDirection, StreamParameters};
use crate::models::error::SessionError;
use crate::processing::transfer::TransferSignal;
use crate::traits::audio_driver::{AudioDriver, AudioStream, StreamCallback};

/// Sample the mock microphone produces at absolute frame `frame`.
pub(crate) fn input_sample(frame: usize) -> f32 {
    (frame % 1000) as f32 / 1000.0
}

fn device(direction: StreamDirection) -> DeviceInfo {
    DeviceInfo {
        name: format!("mock {:?}", direction),
        direction,
        default_low_latency: Some(Duration::from_millis(10)),
    }
}

#[derive(Default)]
pub(crate) struct MockDriver {
    pub no_input: bool,
    pub no_output: bool,
    pub fail_init: bool,
    pub fail_open: bool,
    pub fail_start: bool,
    pub fail_status: bool,
    pub null_buffers: bool,

    pub initialized: AtomicUsize,
    pub terminated: AtomicUsize,
    pub opened: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
    pub played: Arc<Mutex<Vec<f32>>>,
    pub last_params: Mutex<Option<StreamParameters>>,
}

impl MockDriver {
    pub fn runtime_balanced(&self) -> bool {
        self.initialized.load(Ordering::SeqCst) == self.terminated.load(Ordering::SeqCst)
    }

    pub fn open_streams(&self) -> usize {
        self.opened.load(Ordering::SeqCst) - self.closed.load(Ordering::SeqCst)
    }
}

impl AudioDriver for MockDriver {
    fn name(&self) -> &str {
        "mock"
    }

    fn initialize(&self) -> Result<(), SessionError> {
        if self.fail_init {
            return Err(SessionError::Driver("init failed".into()));
        }
        self.initialized.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn terminate(&self) {
        self.terminated.fetch_add(1, Ordering::SeqCst);
    }

    fn default_input_device(&self) -> Option<DeviceInfo> {
        (!self.no_input).then(|| device(StreamDirection::Input))
    }

    fn default_output_device(&self) -> Option<DeviceInfo> {
        (!self.no_output).then(|| device(StreamDirection::Output))
    }

    fn open_stream(
        &self,
        params: &StreamParameters,
        callback: StreamCallback,
    ) -> Result<Box<dyn AudioStream>, SessionError> {
        if self.fail_open {
            return Err(SessionError::StreamOpen("mock refused".into()));
        }
        let direction_matches = matches!(
            (&callback, params.direction),
            (StreamCallback::Input(_), StreamDirection::Input)
                | (StreamCallback::Output(_), StreamDirection::Output)
        );
        if !direction_matches {
            return Err(SessionError::StreamOpen("callback direction mismatch".into()));
        }

        *self.last_params.lock() = Some(params.clone());
        self.opened.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(MockStream {
            callback: Arc::new(Mutex::new(callback)),
            frames_per_buffer: params.frames_per_buffer as usize,
            fail_start: self.fail_start,
            fail_status: self.fail_status,
            null_buffers: self.null_buffers,
            active: Arc::new(AtomicBool::new(false)),
            halt: Arc::new(AtomicBool::new(false)),
            worker: None,
            played: Arc::clone(&self.played),
            closed_count: Arc::clone(&self.closed),
            is_closed: false,
        }))
    }
}

struct MockStream {
    callback: Arc<Mutex<StreamCallback>>,
    frames_per_buffer: usize,
    fail_start: bool,
    fail_status: bool,
    null_buffers: bool,
    active: Arc<AtomicBool>,
    halt: Arc<AtomicBool>,
    worker: Option<thread::JoinHandle<()>>,
    played: Arc<Mutex<Vec<f32>>>,
    closed_count: Arc<AtomicUsize>,
    is_closed: bool,
}

impl AudioStream for MockStream {
    fn start(&mut self) -> Result<(), SessionError> {
        if self.fail_start {
            return Err(SessionError::StreamStart("mock refused".into()));
        }
        if self.is_closed {
            return Err(SessionError::StreamStart("stream closed".into()));
        }
        self.stop()?;

        self.halt.store(false, Ordering::SeqCst);
        self.active.store(true, Ordering::SeqCst);

        let callback = Arc::clone(&self.callback);
        let active = Arc::clone(&self.active);
        let halt = Arc::clone(&self.halt);
        let played = Arc::clone(&self.played);
        let frames = self.frames_per_buffer;
        let null_buffers = self.null_buffers;

        self.worker = Some(thread::spawn(move || {
            let mut frame = 0usize;
            while !halt.load(Ordering::SeqCst) {
                let signal = match &mut *callback.lock() {
                    StreamCallback::Input(f) if null_buffers => f(None),
                    StreamCallback::Input(f) => {
                        let chunk: Vec<f32> = (frame..frame + frames).map(input_sample).collect();
                        f(Some(&chunk[..]))
                    }
                    StreamCallback::Output(f) if null_buffers => f(None),
                    StreamCallback::Output(f) => {
                        let mut chunk = vec![0.0f32; frames];
                        let signal = f(Some(&mut chunk[..]));
                        played.lock().extend_from_slice(&chunk);
                        signal
                    }
                };
                frame += frames;
                if signal != TransferSignal::Continue {
                    break;
                }
                thread::sleep(Duration::from_micros(200));
            }
            active.store(false, Ordering::SeqCst);
        }));
        Ok(())
    }

    fn is_active(&self) -> Result<bool, SessionError> {
        if self.fail_status && self.worker.is_some() {
            return Err(SessionError::Driver("stream status -9999".into()));
        }
        Ok(self.active.load(Ordering::SeqCst))
    }

    fn stop(&mut self) -> Result<(), SessionError> {
        self.halt.store(true, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        self.active.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn close(&mut self) -> Result<(), SessionError> {
        if self.is_closed {
            return Ok(());
        }
        self.stop()?;
        self.is_closed = true;
        self.closed_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for MockStream {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
