use std::time::Duration;

/// Direction of an audio stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamDirection {
    Input,
    Output,
}

/// A device reported by the driver runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInfo {
    pub name: String,
    pub direction: StreamDirection,
    /// Lowest latency the device advertises, if the driver can tell.
    pub default_low_latency: Option<Duration>,
}

/// Everything the driver needs to open one stream.
///
/// Samples are always exchanged with the callback as `f32`.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamParameters {
    pub direction: StreamDirection,
    pub device: DeviceInfo,
    pub channels: u16,
    pub sample_rate: u32,
    pub frames_per_buffer: u32,
    pub suggested_latency: Option<Duration>,
}

impl StreamParameters {
    /// Mono parameters for `device`, using the device's low-latency default.
    pub fn mono(device: DeviceInfo, sample_rate: u32, frames_per_buffer: u32) -> Self {
        Self {
            direction: device.direction,
            suggested_latency: device.default_low_latency,
            device,
            channels: 1,
            sample_rate,
            frames_per_buffer,
        }
    }
}

/// How a driven stream came to rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamEnd {
    /// The transfer engine reached the target frame count.
    Completed,
    /// The stream went inactive before the target (e.g. the callback aborted).
    Stopped,
    /// The supervisor observed a cancellation request and closed the stream early.
    Cancelled,
}

/// Outcome of one capture or playback operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReport {
    pub requested: usize,
    pub transferred: usize,
    pub end: StreamEnd,
}

impl TransferReport {
    pub fn is_complete(&self) -> bool {
        self.transferred == self.requested
    }
}
