//! Output device discovery.
//!
//! ```ignore
//! use zupfen::{CpalDevice, Engine};
//!
//! for (i, device) in CpalDevice::list_outputs().iter().enumerate() {
//!     println!("[{}] {} ({} Hz, {} ch)", i, device.name(), device.sample_rate(), device.channels());
//! }
//!
//! let device = CpalDevice::default_output().expect("no audio device");
//! let engine = Engine::new(device.sample_rate()).with_output(device.create_sink());
//! ```

use alloc::string::String;
use alloc::vec::Vec;

#[cfg(feature = "cpal_sink")]
use cpal::traits::{DeviceTrait, HostTrait};

/// An audio output device and its default stream configuration.
///
/// Without the `cpal_sink` feature no devices are ever found.
pub struct CpalDevice {
    #[cfg(feature = "cpal_sink")]
    device: cpal::Device,
    #[cfg(feature = "cpal_sink")]
    config: cpal::SupportedStreamConfig,

    name: String,
    sample_rate: u32,
    channels: u16,
}

impl CpalDevice {
    #[cfg(feature = "cpal_sink")]
    fn probe(device: cpal::Device) -> Option<Self> {
        let config = match device.default_output_config() {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!(error = %e, "skipping device without output config");
                return None;
            }
        };
        let name = device.name().unwrap_or_else(|_| "Unknown".into());
        Some(Self {
            sample_rate: config.sample_rate().0,
            channels: config.channels(),
            name,
            device,
            config,
        })
    }

    /// The system's default output device, or `None` if there is none.
    #[cfg(feature = "cpal_sink")]
    pub fn default_output() -> Option<Self> {
        cpal::default_host().default_output_device().and_then(Self::probe)
    }

    #[cfg(not(feature = "cpal_sink"))]
    pub fn default_output() -> Option<Self> {
        None
    }

    /// Every output device that reports a usable configuration.
    #[cfg(feature = "cpal_sink")]
    pub fn list_outputs() -> Vec<Self> {
        match cpal::default_host().output_devices() {
            Ok(devices) => devices.filter_map(Self::probe).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "could not enumerate output devices");
                Vec::new()
            }
        }
    }

    #[cfg(not(feature = "cpal_sink"))]
    pub fn list_outputs() -> Vec<Self> {
        Vec::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// A sink node playing on this device, for [`Engine::with_output`](crate::Engine::with_output).
    #[cfg(feature = "cpal_sink")]
    pub fn create_sink(&self) -> crate::nodes::CpalSink {
        crate::nodes::CpalSink::new(&self.device, &self.config)
    }
}
