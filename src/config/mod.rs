//! Configuration management for the mode selector
//!
//! Handles loading, parsing, and hot-reloading of YAML configuration files.

pub mod watcher;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::fs;

pub use watcher::{ConfigUpdate, ConfigWatcher};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SelectorConfig {
    #[serde(default)]
    pub gesture: GestureConfig,
    #[serde(default)]
    pub config_button: ConfigButtonConfig,
    #[serde(default)]
    pub user_mode: UserModeConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub palette: Palette,
}

/// Tap/hold classification for the scene buttons
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GestureConfig {
    #[serde(default = "default_hold_threshold_ms")]
    pub hold_threshold_ms: u64,
}

impl GestureConfig {
    pub fn hold_threshold(&self) -> Duration {
        Duration::from_millis(self.hold_threshold_ms)
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            hold_threshold_ms: default_hold_threshold_ms(),
        }
    }
}

/// Values sent to the config button to tell the host about context changes
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConfigButtonConfig {
    /// Sent in order on every mode update
    #[serde(default = "default_context_values")]
    pub context_values: Vec<u8>,
    /// Sent when user mode releases its buttons
    #[serde(default = "default_user_layout_value")]
    pub user_layout_value: u8,
    /// Sent (forced) whenever user mode is set up
    #[serde(default = "default_user_value")]
    pub user_value: u8,
}

impl Default for ConfigButtonConfig {
    fn default() -> Self {
        Self {
            context_values: default_context_values(),
            user_layout_value: default_user_layout_value(),
            user_value: default_user_value(),
        }
    }
}

/// User mode behaviour
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct UserModeConfig {
    /// Disable matrix/side/nav buttons entirely instead of only blanking them
    #[serde(default)]
    pub release_buttons: bool,
}

/// Size of the simulated host model
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default = "default_track_count")]
    pub tracks: usize,
    #[serde(default = "default_scene_count")]
    pub scenes: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tracks: default_track_count(),
            scenes: default_scene_count(),
        }
    }
}

/// LED values (Launchpad MK1 velocity encoding)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Palette {
    pub full: u8,
    pub led_off: u8,
    pub red_third: u8,
    pub red_full: u8,
    pub red_blink: u8,
    pub green_third: u8,
    pub green_full: u8,
    pub green_blink: u8,
    pub amber_third: u8,
    pub amber_full: u8,
    pub amber_blink: u8,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            full: 127,
            led_off: 4,
            red_third: 13,
            red_full: 15,
            red_blink: 11,
            green_third: 28,
            green_full: 60,
            green_blink: 56,
            amber_third: 29,
            amber_full: 63,
            amber_blink: 59,
        }
    }
}

impl SelectorConfig {
    /// Load configuration from file with validation
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::from_yaml(&contents).with_context(|| format!("Invalid config file: {}", path))
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: SelectorConfig =
            serde_yaml::from_str(contents).context("Failed to parse YAML config")?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self, path: &str) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write config file: {}", path))?;

        Ok(())
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<()> {
        if self.gesture.hold_threshold_ms == 0 {
            anyhow::bail!("gesture.hold_threshold_ms must be greater than 0");
        }

        if self.config_button.context_values.is_empty() {
            anyhow::bail!("config_button.context_values cannot be empty");
        }
        for value in self
            .config_button
            .context_values
            .iter()
            .chain([&self.config_button.user_layout_value, &self.config_button.user_value])
        {
            if *value > 127 {
                anyhow::bail!("Config button value {} is invalid (must be 0-127)", value);
            }
        }

        if self.session.tracks == 0 || self.session.scenes == 0 {
            anyhow::bail!(
                "Session must have at least one track and one scene (got {}x{})",
                self.session.tracks,
                self.session.scenes
            );
        }

        let p = &self.palette;
        for (name, value) in [
            ("full", p.full),
            ("led_off", p.led_off),
            ("red_third", p.red_third),
            ("red_full", p.red_full),
            ("red_blink", p.red_blink),
            ("green_third", p.green_third),
            ("green_full", p.green_full),
            ("green_blink", p.green_blink),
            ("amber_third", p.amber_third),
            ("amber_full", p.amber_full),
            ("amber_blink", p.amber_blink),
        ] {
            if value > 127 {
                anyhow::bail!("Palette color '{}' = {} is invalid (must be 0-127)", name, value);
            }
        }

        Ok(())
    }
}

/// Which parts of the configuration differ between two versions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigChange {
    /// Hold threshold only; no rewiring needed
    pub gesture: bool,
    /// Palette, config button values or user mode; the surface must be rewired
    pub surface: bool,
    /// Simulated song size; only takes effect on restart
    pub session: bool,
}

impl ConfigChange {
    pub fn between(old: &SelectorConfig, new: &SelectorConfig) -> Self {
        Self {
            gesture: old.gesture != new.gesture,
            surface: old.palette != new.palette
                || old.config_button != new.config_button
                || old.user_mode != new.user_mode,
            session: old.session != new.session,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.gesture || self.surface || self.session)
    }
}

// Default value functions
fn default_hold_threshold_ms() -> u64 { 500 }
fn default_context_values() -> Vec<u8> { vec![40, 1] }
fn default_user_layout_value() -> u8 { 2 }
fn default_user_value() -> u8 { 32 }
fn default_track_count() -> usize { 8 }
fn default_scene_count() -> usize { 8 }

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = SelectorConfig::from_yaml("{}").unwrap();
        assert_eq!(config, SelectorConfig::default());
        assert_eq!(config.gesture.hold_threshold(), Duration::from_millis(500));
        assert_eq!(config.config_button.context_values, vec![40, 1]);
        assert!(!config.user_mode.release_buttons);
    }

    #[test]
    fn test_partial_palette_keeps_other_defaults() {
        let config = SelectorConfig::from_yaml(
            r#"
palette:
  red_full: 3
"#,
        )
        .unwrap();
        assert_eq!(config.palette.red_full, 3);
        assert_eq!(config.palette.led_off, Palette::default().led_off);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(SelectorConfig::from_yaml("gesture: { hold_threshold_ms: 0 }").is_err());
        assert!(SelectorConfig::from_yaml("config_button: { context_values: [] }").is_err());
        assert!(SelectorConfig::from_yaml("config_button: { user_value: 200 }").is_err());
        assert!(SelectorConfig::from_yaml("session: { tracks: 0 }").is_err());
        assert!(SelectorConfig::from_yaml("palette: { green_full: 128 }").is_err());
    }

    #[tokio::test]
    async fn test_save_and_load() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.yaml");
        let path = path.to_string_lossy().to_string();

        let mut config = SelectorConfig::default();
        config.gesture.hold_threshold_ms = 750;
        config.user_mode.release_buttons = true;
        config.save(&path).await?;

        let loaded = SelectorConfig::load(&path).await?;
        assert_eq!(loaded, config);
        Ok(())
    }

    #[test]
    fn test_config_change_detection() {
        let old = SelectorConfig::default();
        assert!(ConfigChange::between(&old, &old).is_empty());

        let mut new = old.clone();
        new.gesture.hold_threshold_ms = 800;
        assert_eq!(
            ConfigChange::between(&old, &new),
            ConfigChange { gesture: true, ..Default::default() }
        );

        new.palette.red_full = 3;
        new.session.tracks = 16;
        let change = ConfigChange::between(&old, &new);
        assert!(change.gesture && change.surface && change.session);

        let mut user = old.clone();
        user.user_mode.release_buttons = true;
        assert!(ConfigChange::between(&old, &user).surface);
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        assert!(SelectorConfig::load("/nonexistent/config.yaml").await.is_err());
    }
}
