//! # audio-session-core
//!
//! Platform-agnostic mono capture and playback sessions.
//!
//! A controller opens a stream against an [`AudioDriver`], registers the
//! frame transfer engine as its callback, starts the stream, and polls until
//! the driver reports it inactive. The engine runs on the driver's real-time
//! thread once per period, moving samples between the driver's `f32` buffer
//! and the session's `f64` buffer until the target frame count is reached.
//! Backends (cpal) implement the `AudioDriver` trait.
//!
//! ## Architecture
//!
//! ```text
//! audio-session-core (this crate)
//! ├── traits/       ← AudioDriver, AudioStream, StreamCallback, RuntimeGuard
//! ├── models/       ← SessionError, CaptureState, StreamConfiguration, DeviceInfo, TransferReport
//! ├── processing/   ← frame transfer engine (FrameCursor, capture_period, playback_period)
//! └── session/      ← TransferContext, CaptureSession, PlaybackSession, supervisor loop
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::audio_models::{DeviceInfo, StreamDirection, StreamEnd, StreamParameters, TransferReport};
pub use models::config::{StreamConfiguration, FRAMES_PER_BUFFER, POLL_INTERVAL};
pub use models::error::SessionError;
pub use models::state::CaptureState;
pub use processing::transfer::{FrameCursor, NarrowSample, TransferSignal};
pub use session::capture::CaptureSession;
pub use session::playback::PlaybackSession;
pub use session::supervisor::CancellationToken;
pub use traits::audio_driver::{AudioDriver, AudioStream, InputCallback, OutputCallback, RuntimeGuard, StreamCallback};
