use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::a11y::VolumeLevel;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
    #[serde(default = "default_warning_threshold_ms")]
    pub warning_threshold_ms: u64,
    #[serde(default = "default_warning_window_ms")]
    pub warning_window_ms: u64,
    #[serde(default = "default_activity_debounce_ms")]
    pub activity_debounce_ms: u64,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_synth_endpoint")]
    pub synth_endpoint: String,
    #[serde(default = "default_remote_synthesis_enabled")]
    pub remote_synthesis_enabled: bool,
    #[serde(default = "default_volume_level")]
    pub default_volume_level: u8,
    #[serde(default = "default_speech_rate")]
    pub speech_rate: f32,
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_idle_timeout_ms() -> u64 {
    120_000
}
fn default_warning_threshold_ms() -> u64 {
    30_000
}
fn default_warning_window_ms() -> u64 {
    20_000
}
fn default_activity_debounce_ms() -> u64 {
    300
}
fn default_tick_ms() -> u64 {
    100
}
fn default_synth_endpoint() -> String {
    "http://127.0.0.1:59125".to_string()
}
fn default_remote_synthesis_enabled() -> bool {
    true
}
fn default_volume_level() -> u8 {
    2
}
fn default_speech_rate() -> f32 {
    1.0
}
fn default_theme() -> String {
    "kiosk-dark".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            idle_timeout_ms: default_idle_timeout_ms(),
            warning_threshold_ms: default_warning_threshold_ms(),
            warning_window_ms: default_warning_window_ms(),
            activity_debounce_ms: default_activity_debounce_ms(),
            tick_ms: default_tick_ms(),
            synth_endpoint: default_synth_endpoint(),
            remote_synthesis_enabled: default_remote_synthesis_enabled(),
            default_volume_level: default_volume_level(),
            speech_rate: default_speech_rate(),
            theme: default_theme(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// First run writes the default file so operators have something to edit.
    fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kioska")
            .join("config.toml")
    }

    /// Clamp values a hand-edited file could push out of range. The warning
    /// band must fit inside the timeout and the pinned window inside the band.
    pub fn validate(&mut self) {
        self.idle_timeout_ms = self.idle_timeout_ms.clamp(10_000, 600_000);
        self.warning_threshold_ms = self
            .warning_threshold_ms
            .clamp(5_000, self.idle_timeout_ms - 1_000);
        self.warning_window_ms = self
            .warning_window_ms
            .clamp(5_000, self.warning_threshold_ms);
        self.activity_debounce_ms = self.activity_debounce_ms.clamp(50, 2_000);
        self.tick_ms = self.tick_ms.clamp(50, 1_000);
        if self.default_volume_level > 3 {
            self.default_volume_level = default_volume_level();
        }
        if !self.speech_rate.is_finite() {
            self.speech_rate = default_speech_rate();
        }
        self.speech_rate = self.speech_rate.clamp(0.5, 2.0);
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn warning_threshold(&self) -> Duration {
        Duration::from_millis(self.warning_threshold_ms)
    }

    pub fn warning_window(&self) -> Duration {
        Duration::from_millis(self.warning_window_ms)
    }

    pub fn activity_debounce(&self) -> Duration {
        Duration::from_millis(self.activity_debounce_ms)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn default_volume(&self) -> VolumeLevel {
        VolumeLevel::from_index(self.default_volume_level)
    }
}
