use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};
use parking_lot::Mutex;

use crate::models::audio_models::{StreamEnd, StreamParameters, TransferReport};
use crate::models::config::StreamConfiguration;
use crate::models::error::SessionError;
use crate::session::context::{self, SharedContext, TransferContext};
use crate::session::supervisor::{self, CancellationToken, WaitOutcome};
use crate::traits::audio_driver::{AudioDriver, AudioStream, RuntimeGuard};

/// One-shot blocking playback to the default output device.
///
/// Every call builds its own context, runtime acquisition, and stream, and
/// tears all three down before returning. Nothing carries over between calls.
pub struct PlaybackSession<D: AudioDriver> {
    driver: Arc<D>,
    config: StreamConfiguration,
}

impl<D: AudioDriver> PlaybackSession<D> {
    pub fn new(driver: Arc<D>) -> Self {
        Self {
            driver,
            config: StreamConfiguration::default(),
        }
    }

    pub fn with_config(driver: Arc<D>, config: StreamConfiguration) -> Result<Self, SessionError> {
        config.validate().map_err(SessionError::InvalidArgument)?;
        Ok(Self { driver, config })
    }

    /// Play `samples` at `sample_rate`, blocking until the driver reports the
    /// stream inactive.
    pub fn play(&self, samples: &[f64], sample_rate: u32) -> Result<TransferReport, SessionError> {
        self.play_until(samples, sample_rate, &CancellationToken::new())
    }

    /// Like [`play`](Self::play), but closes the stream early once `cancel` fires.
    pub fn play_until(
        &self,
        samples: &[f64],
        sample_rate: u32,
        cancel: &CancellationToken,
    ) -> Result<TransferReport, SessionError> {
        self.play_inner(samples, sample_rate, cancel)
            .inspect_err(|e| error!("playback failed: {}", e))
    }

    fn play_inner(
        &self,
        samples: &[f64],
        sample_rate: u32,
        cancel: &CancellationToken,
    ) -> Result<TransferReport, SessionError> {
        if samples.is_empty() {
            return Err(SessionError::InvalidArgument("playback buffer is empty".into()));
        }
        if sample_rate == 0 {
            return Err(SessionError::InvalidArgument("sample rate must be positive".into()));
        }

        let context: SharedContext = Arc::new(Mutex::new(TransferContext::for_playback(samples)));

        let runtime = RuntimeGuard::acquire(Arc::clone(&self.driver))?;
        let device = runtime
            .driver()
            .default_output_device()
            .ok_or(SessionError::NoOutputDevice)?;

        let params =
            StreamParameters::mono(device, sample_rate, self.config.frames_per_buffer);
        let mut stream = runtime
            .driver()
            .open_stream(&params, context::playback_callback(Arc::clone(&context)))?;
        debug!(
            "opened output '{}' via {} at {} Hz for {} frames",
            params.device.name,
            self.driver.name(),
            sample_rate,
            samples.len()
        );

        // Single teardown path: close the stream, then release the runtime.
        let driven = drive(stream.as_mut(), self.config.poll_interval, cancel);
        let closed = stream.close();
        drop(stream);
        drop(runtime);

        let outcome = driven?;
        closed?;

        let mut ctx = context.lock();
        if let Some(fault) = ctx.take_fault() {
            return Err(fault);
        }

        let requested = samples.len();
        let transferred = ctx.cursor().frame_index();
        let end = match outcome {
            WaitOutcome::Cancelled => StreamEnd::Cancelled,
            WaitOutcome::Inactive if transferred == requested => StreamEnd::Completed,
            WaitOutcome::Inactive => StreamEnd::Stopped,
        };
        info!("played {}/{} frames ({:?})", transferred, requested, end);

        Ok(TransferReport {
            requested,
            transferred,
            end,
        })
    }
}

fn drive(
    stream: &mut dyn AudioStream,
    interval: Duration,
    cancel: &CancellationToken,
) -> Result<WaitOutcome, SessionError> {
    stream.start()?;
    supervisor::wait_until_inactive(stream, interval, cancel)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use approx::assert_relative_eq;

    use super::*;
    use crate::session::mock_driver::MockDriver;

    fn player(driver: MockDriver) -> (Arc<MockDriver>, PlaybackSession<MockDriver>) {
        let driver = Arc::new(driver);
        let config = StreamConfiguration {
            poll_interval: Duration::from_millis(1),
            ..Default::default()
        };
        let player = PlaybackSession::with_config(Arc::clone(&driver), config).unwrap();
        (driver, player)
    }

    fn tone(len: usize, scale: f64) -> Vec<f64> {
        (0..len).map(|i| ((i % 100) as f64 / 100.0) * scale).collect()
    }

    #[test]
    fn plays_exactly_the_requested_frames() {
        let (driver, player) = player(MockDriver::default());
        let samples = tone(48000, 0.5);

        let report = player.play(&samples, 48000).unwrap();

        assert_eq!(report.transferred, 48000);
        assert_eq!(report.end, StreamEnd::Completed);

        let played = driver.played.lock();
        // 93 full periods plus one partial period padded with driver silence.
        assert_eq!(played.len(), 94 * 512);
        for (out, expected) in played.iter().zip(&samples) {
            assert_relative_eq!(*out, *expected as f32);
        }
        assert!(played[48000..].iter().all(|&s| s == 0.0));

        let params = driver.last_params.lock().clone().unwrap();
        assert_eq!(params.channels, 1);
        assert_eq!(params.frames_per_buffer, 512);
        assert_eq!(params.sample_rate, 48000);

        assert_eq!(driver.open_streams(), 0);
        assert!(driver.runtime_balanced());
    }

    #[test]
    fn consecutive_calls_are_isolated() {
        let (driver, player) = player(MockDriver::default());

        player.play(&tone(1000, 0.5), 48000).unwrap();
        driver.played.lock().clear();

        let second = tone(700, -0.25);
        let report = player.play(&second, 48000).unwrap();

        assert_eq!(report.transferred, 700);
        let played = driver.played.lock();
        assert_eq!(played.len(), 2 * 512);
        assert_relative_eq!(played[1], second[1] as f32);
        assert_relative_eq!(played[699], second[699] as f32);
        assert_eq!(driver.initialized.load(Ordering::SeqCst), 2);
        assert!(driver.runtime_balanced());
    }

    #[test]
    fn missing_output_device_releases_runtime() {
        let (driver, player) = player(MockDriver {
            no_output: true,
            ..Default::default()
        });

        assert_eq!(player.play(&tone(10, 1.0), 48000), Err(SessionError::NoOutputDevice));
        assert_eq!(driver.initialized.load(Ordering::SeqCst), 1);
        assert!(driver.runtime_balanced());
        assert_eq!(driver.opened.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn open_failure_releases_runtime() {
        let (driver, player) = player(MockDriver {
            fail_open: true,
            ..Default::default()
        });

        assert!(matches!(
            player.play(&tone(10, 1.0), 48000),
            Err(SessionError::StreamOpen(_))
        ));
        assert!(driver.runtime_balanced());
    }

    #[test]
    fn start_failure_closes_stream_and_releases_runtime() {
        let (driver, player) = player(MockDriver {
            fail_start: true,
            ..Default::default()
        });

        assert!(matches!(
            player.play(&tone(10, 1.0), 48000),
            Err(SessionError::StreamStart(_))
        ));
        assert_eq!(driver.closed.load(Ordering::SeqCst), 1);
        assert!(driver.runtime_balanced());
    }

    #[test]
    fn abnormal_status_is_fatal_and_tears_down() {
        let (driver, player) = player(MockDriver {
            fail_status: true,
            ..Default::default()
        });

        assert!(matches!(
            player.play(&tone(48000, 1.0), 48000),
            Err(SessionError::Driver(_))
        ));
        assert_eq!(driver.open_streams(), 0);
        assert!(driver.runtime_balanced());
    }

    #[test]
    fn null_output_buffer_surfaces_as_error() {
        let (driver, player) = player(MockDriver {
            null_buffers: true,
            ..Default::default()
        });

        assert_eq!(player.play(&tone(2048, 1.0), 48000), Err(SessionError::NullBuffer));
        assert!(driver.played.lock().is_empty());
        assert!(driver.runtime_balanced());
    }

    #[test]
    fn invalid_arguments_never_touch_the_driver() {
        let (driver, player) = player(MockDriver::default());

        assert!(matches!(player.play(&[], 48000), Err(SessionError::InvalidArgument(_))));
        assert!(matches!(
            player.play(&tone(10, 1.0), 0),
            Err(SessionError::InvalidArgument(_))
        ));
        assert_eq!(driver.initialized.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn cancelled_playback_closes_early() {
        let (driver, player) = player(MockDriver::default());
        let token = CancellationToken::new();
        token.cancel();

        let report = player.play_until(&tone(48000 * 60, 0.1), 48000, &token).unwrap();

        assert_eq!(report.end, StreamEnd::Cancelled);
        assert!(report.transferred < report.requested);
        assert_eq!(driver.open_streams(), 0);
        assert!(driver.runtime_balanced());
    }
}
