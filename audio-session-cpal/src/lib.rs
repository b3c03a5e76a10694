//! # audio-session-cpal
//!
//! cpal driver runtime for audio-session-core.
//!
//! Provides:
//! - `CpalDriver`: `AudioDriver` over the default cpal host (ALSA, CoreAudio, WASAPI)
//! - `CpalStream`: mono f32 stream with fixed periods and completion tracking
//! - `device_enumerator`: default device queries and latency estimation
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use audio_session_core::{CaptureSession, PlaybackSession};
//! use audio_session_cpal::CpalDriver;
//!
//! let driver = Arc::new(CpalDriver::new());
//! let mut capture = CaptureSession::new(Arc::clone(&driver));
//! capture.open(44100)?;
//! let mut buffer = vec![0.0; 44100];
//! capture.capture(&mut buffer)?;
//! capture.close()?;
//!
//! PlaybackSession::new(driver).play(&buffer, 44100)?;
//! ```

pub mod cpal_driver;
pub mod cpal_stream;
pub mod device_enumerator;

pub use cpal_driver::CpalDriver;
pub use cpal_stream::CpalStream;
