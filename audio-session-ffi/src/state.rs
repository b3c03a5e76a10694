use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use audio_session_core::CaptureSession;
use audio_session_cpal::CpalDriver;

pub(crate) type Session = CaptureSession<CpalDriver>;

/// Process-wide capture session behind the C ABI.
///
/// The mutex is held across the whole open, capture, or close call, so
/// concurrent callers are serialized rather than interleaved.
pub(crate) static CAPTURE: Mutex<Option<Session>> = parking_lot::const_mutex(None);

static DRIVER: OnceLock<Arc<CpalDriver>> = OnceLock::new();

/// The shared cpal driver, created on first use.
pub(crate) fn driver() -> Arc<CpalDriver> {
    Arc::clone(DRIVER.get_or_init(|| Arc::new(CpalDriver::new())))
}
