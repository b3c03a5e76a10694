//! Default device queries via the cpal host.
//!
//! Converts cpal devices into `DeviceInfo`, deriving a low-latency estimate
//! from the smallest buffer the device's default configuration accepts.

use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::SupportedBufferSize;

use audio_session_core::models::audio_models::{DeviceInfo, StreamDirection};

/// The host's default device for `direction`, if any.
pub fn default_device(host: &cpal::Host, direction: StreamDirection) -> Option<cpal::Device> {
    match direction {
        StreamDirection::Input => host.default_input_device(),
        StreamDirection::Output => host.default_output_device(),
    }
}

/// Describe `device` for the given direction.
pub fn device_info(device: &cpal::Device, direction: StreamDirection) -> DeviceInfo {
    let name = device
        .description()
        .map(|d| d.name().to_string())
        .unwrap_or_else(|_| String::from("unknown"));

    let config = match direction {
        StreamDirection::Input => device.default_input_config(),
        StreamDirection::Output => device.default_output_config(),
    };

    let default_low_latency = match config {
        Ok(config) => low_latency(config.buffer_size(), config.sample_rate()),
        Err(e) => {
            log::warn!("no default {:?} config for '{}': {}", direction, name, e);
            None
        }
    };

    DeviceInfo {
        name,
        direction,
        default_low_latency,
    }
}

/// Duration of the smallest buffer the device supports at `sample_rate`.
pub fn low_latency(buffer_size: &SupportedBufferSize, sample_rate: u32) -> Option<Duration> {
    match buffer_size {
        SupportedBufferSize::Range { min, .. } if sample_rate > 0 => Some(Duration::from_secs_f64(
            *min as f64 / sample_rate as f64,
        )),
        _ => None,
    }
}
