use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Decoder buffering hints handed to the platform player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferConfig {
    #[serde(default = "default_min_buffer_ms")]
    pub min_buffer_ms: u32,
    #[serde(default = "default_max_buffer_ms")]
    pub max_buffer_ms: u32,
    #[serde(default = "default_buffer_for_playback_ms")]
    pub buffer_for_playback_ms: u32,
    #[serde(default = "default_buffer_after_rebuffer_ms")]
    pub buffer_for_playback_after_rebuffer_ms: u32,
}

fn default_min_buffer_ms() -> u32 { 3000 }
fn default_max_buffer_ms() -> u32 { 15_000 }
fn default_buffer_for_playback_ms() -> u32 { 250 }
fn default_buffer_after_rebuffer_ms() -> u32 { 500 }

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            min_buffer_ms: 3000,
            max_buffer_ms: 15_000,
            buffer_for_playback_ms: 250,
            buffer_for_playback_after_rebuffer_ms: 500,
        }
    }
}

/// Persisted engine and feed tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Minimum time between accepted progress updates.
    #[serde(default = "default_ui_throttle_ms")]
    pub ui_throttle_ms: u64,
    /// How often the decoder should report progress.
    #[serde(default = "default_progress_update_interval_ms")]
    pub progress_update_interval_ms: u64,
    /// Let the preload slot play muted until its first frame is ready.
    #[serde(default = "default_true")]
    pub enable_prebuffer: bool,
    /// Request more items once the settled index is this close to the end.
    #[serde(default = "default_load_more_threshold")]
    pub load_more_threshold: usize,
    /// Lists shorter than this never trigger load-more.
    #[serde(default = "default_min_items_for_load_more")]
    pub min_items_for_load_more: usize,
    #[serde(default)]
    pub buffer: BufferConfig,
    /// Prefix joined with item file names to form media and poster URIs.
    #[serde(default)]
    pub media_base_url: Option<String>,
}

fn default_version() -> u32 { 1 }
fn default_true() -> bool { true }
fn default_ui_throttle_ms() -> u64 { 250 }
fn default_progress_update_interval_ms() -> u64 { 500 }
fn default_load_more_threshold() -> usize { 2 }
fn default_min_items_for_load_more() -> usize { 3 }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: 1,
            ui_throttle_ms: 250,
            progress_update_interval_ms: 500,
            enable_prebuffer: true,
            load_more_threshold: 2,
            min_items_for_load_more: 3,
            buffer: BufferConfig::default(),
            media_base_url: None,
        }
    }
}

impl EngineConfig {
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("reelswap").join("engine.json")
    }

    /// Load from the default location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("Loaded engine config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Failed to parse engine config {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("No engine config at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write engine config {}", path.display()))?;
        log::info!("Saved engine config to {}", path.display());
        Ok(())
    }

    pub fn ui_throttle(&self) -> Duration {
        Duration::from_millis(self.ui_throttle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_feed_tuning() {
        let c = EngineConfig::default();
        assert_eq!(c.ui_throttle_ms, 250);
        assert_eq!(c.progress_update_interval_ms, 500);
        assert!(c.enable_prebuffer);
        assert_eq!(c.load_more_threshold, 2);
        assert_eq!(c.min_items_for_load_more, 3);
        assert_eq!(c.buffer.min_buffer_ms, 3000);
        assert_eq!(c.buffer.max_buffer_ms, 15_000);
        assert!(c.media_base_url.is_none());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let c: EngineConfig = serde_json::from_str(r#"{"ui_throttle_ms": 100}"#).unwrap();
        assert_eq!(c.ui_throttle_ms, 100);
        assert_eq!(c.version, 1);
        assert!(c.enable_prebuffer);
        assert_eq!(c.buffer, BufferConfig::default());
    }

    #[test]
    fn partial_buffer_block_takes_defaults() {
        let c: EngineConfig =
            serde_json::from_str(r#"{"buffer": {"max_buffer_ms": 9000}}"#).unwrap();
        assert_eq!(c.buffer.max_buffer_ms, 9000);
        assert_eq!(c.buffer.buffer_for_playback_ms, 250);
    }

    #[test]
    fn save_and_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("engine.json");
        let config = EngineConfig {
            media_base_url: Some("https://cdn.example.com/videos/".into()),
            enable_prebuffer: false,
            ..EngineConfig::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(EngineConfig::load_from(&path), config);
    }

    #[test]
    fn unreadable_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert_eq!(EngineConfig::load_from(&missing), EngineConfig::default());

        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, "{ not json").unwrap();
        assert_eq!(EngineConfig::load_from(&garbage), EngineConfig::default());
    }
}
