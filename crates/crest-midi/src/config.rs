//! MIDI remote configuration
//!
//! YAML file at `~/.config/crest/midi.yaml`, same load/save discipline as
//! the player config: missing or broken files fall back to defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::mapping::ActionMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub enabled: bool,
    /// Preferred input port (substring match); `None` takes the first port
    pub port: Option<String>,
    /// Channel filter 0-15; `None` accepts all channels
    pub channel: Option<u8>,
    pub bindings: ActionMap,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: None,
            channel: None,
            bindings: ActionMap::new(),
        }
    }
}

pub fn default_midi_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("crest")
        .join("midi.yaml")
}

/// Load the remote config, falling back to defaults on any failure
pub fn load_midi_config() -> RemoteConfig {
    let path = default_midi_config_path();
    if !path.exists() {
        return RemoteConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => match serde_yaml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                RemoteConfig::default()
            }
        },
        Err(e) => {
            log::warn!("Failed to read {}: {}, using defaults", path.display(), e);
            RemoteConfig::default()
        }
    }
}

/// Save the remote config, creating parent directories as needed
pub fn save_midi_config(config: &RemoteConfig) -> Result<()> {
    let path = default_midi_config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let yaml = serde_yaml::to_string(config).context("Failed to serialize MIDI config")?;
    std::fs::write(&path, yaml).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::TransportAction;

    #[test]
    fn test_defaults() {
        let config = RemoteConfig::default();
        assert!(config.enabled);
        assert!(config.port.is_none());
        assert!(config.channel.is_none());
        assert!(config.bindings.is_empty());
    }

    #[test]
    fn test_yaml_round_trip() {
        let mut config = RemoteConfig::default();
        config.port = Some("nanoKONTROL".to_string());
        config.channel = Some(9);
        config.bindings.bind(TransportAction::TogglePlay, 41);
        config.bindings.bind(TransportAction::NextTrack, 43);

        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: RemoteConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.port.as_deref(), Some("nanoKONTROL"));
        assert_eq!(parsed.channel, Some(9));
        assert_eq!(parsed.bindings, config.bindings);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let parsed: RemoteConfig = serde_yaml::from_str("enabled: false\n").unwrap();
        assert!(!parsed.enabled);
        assert!(parsed.bindings.is_empty());
    }
}
