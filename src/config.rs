//! Configuration for the notch touch controller.

use crate::platform::CutoutRect;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Platform touch timing constants
    pub timing: TimingConfig,

    /// Torch activation settings
    pub torch: TorchConfig,

    /// Model used by the simulated platform
    pub simulation: SimulationConfig,
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, falling back to defaults when it does not exist.
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to `path`, creating its parent directory.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("notch-touch")
            .join("config.json")
    }
}

/// Touch timing constants, mirroring the platform's view configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Hold duration the platform treats as a long press
    #[serde(with = "duration_ms")]
    pub long_press_timeout: Duration,

    /// Maximum gap between the first up and the second down of a double tap
    #[serde(with = "duration_ms")]
    pub double_tap_timeout: Duration,

    /// Minimum gap between the first up and the second down of a double tap
    #[serde(with = "duration_ms")]
    pub double_tap_min_time: Duration,

    /// Movement in px after which a touch is no longer a tap
    pub touch_slop: f32,

    /// Maximum distance in px between the two downs of a double tap
    pub double_tap_slop: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            long_press_timeout: Duration::from_millis(400),
            double_tap_timeout: Duration::from_millis(300),
            double_tap_min_time: Duration::from_millis(40),
            touch_slop: 8.0,
            double_tap_slop: 100.0,
        }
    }
}

/// Torch activation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TorchConfig {
    /// Strength passed to entry points that accept a level
    pub strength_level: u32,
}

impl Default for TorchConfig {
    fn default() -> Self {
        Self { strength_level: 5 }
    }
}

/// A camera known to the simulated platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatedCamera {
    pub id: String,
    pub flash: bool,
}

/// Device model for the simulated platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Platform API level
    pub sdk_version: u32,

    /// Whether continuous rotation callbacks are available
    pub rotation_callbacks: bool,

    /// Cutout reported at 0 and 180 degrees
    pub portrait_cutout: Option<CutoutRect>,

    /// Cutout reported at 90 and 270 degrees
    pub landscape_cutout: Option<CutoutRect>,

    /// Cameras in enumeration order
    pub cameras: Vec<SimulatedCamera>,

    /// Whether the level-taking standard overload can be looked up
    pub level_entry_point: bool,

    /// Whether the vendor alternate can be looked up
    pub vendor_entry_point: bool,

    /// Make every torch request fail as if the camera were busy
    pub torch_busy: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sdk_version: 34,
            rotation_callbacks: true,
            portrait_cutout: Some(CutoutRect::new(40, 0, 100, 30)),
            landscape_cutout: Some(CutoutRect::new(0, 40, 30, 100)),
            cameras: vec![
                SimulatedCamera {
                    id: "0".to_string(),
                    flash: true,
                },
                SimulatedCamera {
                    id: "1".to_string(),
                    flash: false,
                },
            ],
            level_entry_point: true,
            vendor_entry_point: false,
            torch_busy: false,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Serde support for Duration as whole milliseconds.
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
