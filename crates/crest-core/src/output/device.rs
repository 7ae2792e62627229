//! Audio device enumeration
//!
//! Enumerates output devices from ALL available audio hosts (ALSA, JACK,
//! PulseAudio, WASAPI, CoreAudio) so multichannel interfaces that only one
//! backend exposes still appear in the settings list.

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::HostId;

use super::error::{AudioError, AudioResult};

/// Human-readable name for a host ID
fn host_name(host_id: HostId) -> String {
    let name = format!("{:?}", host_id);
    match name.as_str() {
        "Alsa" => "ALSA".to_string(),
        "Jack" => "JACK".to_string(),
        "Wasapi" => "WASAPI".to_string(),
        _ => name,
    }
}

/// One output device as shown in the settings list
#[derive(Debug, Clone, PartialEq)]
pub struct OutputDevice {
    /// Device name as reported by the backend
    pub name: String,
    /// Host backend name (e.g., "ALSA", "JACK")
    pub host: String,
    /// Whether this is the system default device for its host
    pub is_default: bool,
    /// Maximum output channels across supported configs
    pub max_channels: u16,
    /// Common sample rates the device supports
    pub sample_rates: Vec<u32>,
}

impl std::fmt::Display for OutputDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.host, self.name)
    }
}

/// Enumerate output devices from every available host
pub fn list_output_devices() -> AudioResult<Vec<OutputDevice>> {
    let mut all_devices: Vec<OutputDevice> = Vec::new();

    for host_id in cpal::available_hosts() {
        let host = match cpal::host_from_id(host_id) {
            Ok(h) => h,
            Err(e) => {
                log::debug!("Could not initialize host {:?}: {}", host_id, e);
                continue;
            }
        };

        let host_name_str = host_name(host_id);

        let default_device_name = host
            .default_output_device()
            .and_then(|d: cpal::Device| d.name().ok());

        let devices_iter = match host.output_devices() {
            Ok(d) => d,
            Err(e) => {
                log::debug!("Could not enumerate devices for {:?}: {}", host_id, e);
                continue;
            }
        };

        for device in devices_iter {
            let name = match device.name() {
                Ok(n) => n,
                Err(_) => continue,
            };

            let is_default = default_device_name.as_ref() == Some(&name);

            let configs: Vec<_> = match device.supported_output_configs() {
                Ok(c) => c.collect(),
                Err(_) => continue,
            };

            if configs.is_empty() {
                continue;
            }

            let mut sample_rates: Vec<u32> = Vec::new();
            let mut max_channels: u16 = 0;

            for config in &configs {
                max_channels = max_channels.max(config.channels());

                for rate in [44100, 48000, 88200, 96000, 176400, 192000] {
                    if rate >= config.min_sample_rate().0
                        && rate <= config.max_sample_rate().0
                        && !sample_rates.contains(&rate)
                    {
                        sample_rates.push(rate);
                    }
                }
            }

            sample_rates.sort();

            all_devices.push(OutputDevice {
                name,
                host: host_name_str.clone(),
                is_default,
                max_channels,
                sample_rates,
            });
        }
    }

    if all_devices.is_empty() {
        return Err(AudioError::NoDevices);
    }

    // Default devices first, then by host, then by name
    all_devices.sort_by(|a, b| {
        b.is_default
            .cmp(&a.is_default)
            .then_with(|| a.host.cmp(&b.host))
            .then_with(|| a.name.cmp(&b.name))
    });

    log::info!(
        "Enumerated {} audio devices from {} hosts",
        all_devices.len(),
        cpal::available_hosts().len()
    );

    Ok(all_devices)
}

/// Find a cpal device by name across all hosts; `None` falls back to the
/// default host's default device.
pub fn find_device(name: Option<&str>) -> AudioResult<cpal::Device> {
    match name {
        Some(name) => {
            for host_id in cpal::available_hosts() {
                if let Ok(host) = cpal::host_from_id(host_id) {
                    if let Ok(mut devices) = host.output_devices() {
                        if let Some(device) =
                            devices.find(|d: &cpal::Device| d.name().ok().as_deref() == Some(name))
                        {
                            return Ok(device);
                        }
                    }
                }
            }
            Err(AudioError::DeviceNotFound(name.to_string()))
        }
        None => cpal::default_host()
            .default_output_device()
            .ok_or(AudioError::NoDefaultDevice),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_enumeration() {
        // May legitimately find nothing in CI
        match list_output_devices() {
            Ok(devices) => {
                for device in &devices {
                    println!(
                        "  - {} (default: {}, channels: {}, rates: {:?})",
                        device, device.is_default, device.max_channels, device.sample_rates
                    );
                }
            }
            Err(AudioError::NoDevices) => {
                println!("No audio devices available (expected in CI)");
            }
            Err(e) => {
                println!("Error enumerating devices: {}", e);
            }
        }
    }
}
