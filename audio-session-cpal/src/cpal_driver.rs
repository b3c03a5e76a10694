//! `AudioDriver` over the default cpal host.

use std::sync::atomic::{AtomicUsize, Ordering};

use audio_session_core::models::audio_models::{DeviceInfo, StreamDirection, StreamParameters};
use audio_session_core::models::error::SessionError;
use audio_session_core::traits::audio_driver::{AudioDriver, AudioStream, StreamCallback};

use crate::cpal_stream::CpalStream;
use crate::device_enumerator;

/// Audio driver runtime backed by cpal.
///
/// cpal needs no global initialization, so `initialize`/`terminate` only
/// count outstanding acquisitions. The host is resolved on each query so the
/// driver itself holds no platform handles.
pub struct CpalDriver {
    host_id: cpal::HostId,
    acquisitions: AtomicUsize,
}

impl CpalDriver {
    /// Driver for the platform's default host.
    pub fn new() -> Self {
        Self {
            host_id: cpal::default_host().id(),
            acquisitions: AtomicUsize::new(0),
        }
    }

    /// Runtime acquisitions not yet released.
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    fn host(&self) -> Result<cpal::Host, SessionError> {
        cpal::host_from_id(self.host_id)
            .map_err(|e| SessionError::Driver(format!("host {:?} unavailable: {}", self.host_id, e)))
    }

    fn default_device_info(&self, direction: StreamDirection) -> Option<DeviceInfo> {
        let host = match self.host() {
            Ok(host) => host,
            Err(e) => {
                log::error!("{}", e);
                return None;
            }
        };
        device_enumerator::default_device(&host, direction)
            .map(|device| device_enumerator::device_info(&device, direction))
    }
}

impl Default for CpalDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioDriver for CpalDriver {
    fn name(&self) -> &str {
        self.host_id.name()
    }

    fn initialize(&self) -> Result<(), SessionError> {
        self.host()?;
        let n = self.acquisitions.fetch_add(1, Ordering::SeqCst) + 1;
        log::debug!("cpal runtime acquired ({} outstanding)", n);
        Ok(())
    }

    fn terminate(&self) {
        let previous = self
            .acquisitions
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        match previous {
            Ok(n) => log::debug!("cpal runtime released ({} outstanding)", n - 1),
            Err(_) => log::warn!("cpal runtime released more times than acquired"),
        }
    }

    fn default_input_device(&self) -> Option<DeviceInfo> {
        self.default_device_info(StreamDirection::Input)
    }

    fn default_output_device(&self) -> Option<DeviceInfo> {
        self.default_device_info(StreamDirection::Output)
    }

    fn open_stream(
        &self,
        params: &StreamParameters,
        callback: StreamCallback,
    ) -> Result<Box<dyn AudioStream>, SessionError> {
        let host = self.host()?;
        let device = device_enumerator::default_device(&host, params.direction).ok_or(
            match params.direction {
                StreamDirection::Input => SessionError::NoInputDevice,
                StreamDirection::Output => SessionError::NoOutputDevice,
            },
        )?;

        let stream = CpalStream::open(&device, params, callback)?;
        log::debug!(
            "cpal {:?} stream built on '{}' ({} Hz, {} frames, latency {:?})",
            params.direction,
            params.device.name,
            params.sample_rate,
            params.frames_per_buffer,
            params.suggested_latency
        );
        Ok(Box::new(stream))
    }
}
