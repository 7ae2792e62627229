//! Player configuration
//!
//! YAML file at `~/.config/crest/config.yaml`. Missing file or parse
//! failure falls back to defaults; the player must always start.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::playback::RepeatMode;
use crate::routing::RoutingMode;
use crate::waveform::clamp_resolution;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PlayerConfig {
    pub theme: ThemeConfig,
    pub waveform: WaveformConfig,
    pub audio: AudioConfig,
    pub playback: PlaybackConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Dark palette toggle
    pub dark: bool,
    /// Accent color as a hex string, e.g. "#4DA6FF"
    pub accent: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            dark: true,
            accent: "#4DA6FF".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveformViewMode {
    /// Single mirrored band, per-bucket max across channels
    #[default]
    Combined,
    /// Stacked per-channel bands
    Channels,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveformConfig {
    /// Bucket count per waveform, clamped to 1200..=24000 on use
    pub resolution: usize,
    pub view_mode: WaveformViewMode,
}

impl Default for WaveformConfig {
    fn default() -> Self {
        Self {
            resolution: 4000,
            view_mode: WaveformViewMode::Combined,
        }
    }
}

impl WaveformConfig {
    /// Resolution clamped into the supported range
    pub fn effective_resolution(&self) -> usize {
        clamp_resolution(self.resolution)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AudioConfig {
    /// Preferred output device name; `None` uses the system default
    pub output_device: Option<String>,
    pub routing: RoutingMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub repeat: RepeatMode,
    pub auto_next: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            repeat: RepeatMode::Off,
            auto_next: true,
        }
    }
}

/// Default config file location
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("crest")
        .join("config.yaml")
}

/// Load config, falling back to defaults on any failure
pub fn load_config() -> PlayerConfig {
    let path = default_config_path();
    if !path.exists() {
        log::info!("No config at {}, using defaults", path.display());
        return PlayerConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => match serde_yaml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                PlayerConfig::default()
            }
        },
        Err(e) => {
            log::warn!("Failed to read {}: {}, using defaults", path.display(), e);
            PlayerConfig::default()
        }
    }
}

/// Save config, creating parent directories as needed
pub fn save_config(config: &PlayerConfig) -> Result<()> {
    let path = default_config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let yaml = serde_yaml::to_string(config).context("Failed to serialize config")?;
    std::fs::write(&path, yaml).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlayerConfig::default();
        assert!(config.theme.dark);
        assert_eq!(config.waveform.resolution, 4000);
        assert_eq!(config.waveform.view_mode, WaveformViewMode::Combined);
        assert_eq!(config.audio.routing, RoutingMode::Auto);
        assert!(config.playback.auto_next);
    }

    #[test]
    fn test_yaml_round_trip() {
        let mut config = PlayerConfig::default();
        config.theme.accent = "#FF8800".to_string();
        config.waveform.resolution = 8000;
        config.waveform.view_mode = WaveformViewMode::Channels;
        config.audio.output_device = Some("hw:1,0".to_string());
        config.audio.routing = RoutingMode::Surround51;
        config.playback.repeat = RepeatMode::All;

        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: PlayerConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.theme.accent, "#FF8800");
        assert_eq!(parsed.waveform.resolution, 8000);
        assert_eq!(parsed.waveform.view_mode, WaveformViewMode::Channels);
        assert_eq!(parsed.audio.output_device.as_deref(), Some("hw:1,0"));
        assert_eq!(parsed.audio.routing, RoutingMode::Surround51);
        assert_eq!(parsed.playback.repeat, RepeatMode::All);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let parsed: PlayerConfig = serde_yaml::from_str("theme:\n  dark: false\n").unwrap();
        assert!(!parsed.theme.dark);
        assert_eq!(parsed.waveform.resolution, 4000);
        assert!(parsed.playback.auto_next);
    }

    #[test]
    fn test_effective_resolution_clamped() {
        let waveform = WaveformConfig {
            resolution: 50,
            ..Default::default()
        };
        assert_eq!(waveform.effective_resolution(), 1200);
    }
}
