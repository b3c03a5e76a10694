use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Frames delivered to the callback per hardware period.
pub const FRAMES_PER_BUFFER: u32 = 512;

/// How often the supervising thread checks whether the stream is still active.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Stream settings shared by the capture and playback controllers.
///
/// The sample rate is not part of the configuration; it is supplied per
/// operation by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfiguration {
    /// Frames per callback period (default: 512).
    pub frames_per_buffer: u32,

    /// Channel count. Only mono is supported.
    pub channels: u16,

    /// Supervisor poll interval (default: 100ms).
    #[serde(rename = "poll_interval_ms", with = "millis")]
    pub poll_interval: Duration,
}

impl StreamConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.frames_per_buffer == 0 {
            return Err("frames per buffer must be positive".into());
        }
        if self.channels != 1 {
            return Err(format!("unsupported channel count: {}", self.channels));
        }
        if self.poll_interval.is_zero() {
            return Err("poll interval must be positive".into());
        }
        Ok(())
    }
}

impl Default for StreamConfiguration {
    fn default() -> Self {
        Self {
            frames_per_buffer: FRAMES_PER_BUFFER,
            channels: 1,
            poll_interval: POLL_INTERVAL,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
