// Configuration management
//
// Handles panel geometry, controller memory layout, bus settings, reset
// timing and logging, persisted as TOML.

use crate::bus::BusConfig;
use crate::controller::{AddressWindow, FlushLayout, LayoutError};
use crate::debug::LogLevel;
use crate::display::Geometry;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// Default configuration file path
pub const CONFIG_FILE: &str = "display_config.toml";

/// Display driver configuration
///
/// Stores every setting the controller needs at construction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Visible panel geometry
    pub geometry: Geometry,

    /// Controller memory layout used when streaming the frame buffer
    pub layout: FlushLayout,

    /// Bus settings
    pub bus: BusConfig,

    /// Reset timing
    pub timing: TimingConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Reset timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Time the reset line is held low (milliseconds)
    pub reset_pulse_ms: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Messages above this level are dropped
    pub level: LogLevel,

    /// Record every bus byte (requires `Trace` level)
    pub bus_trace: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            geometry: Geometry::SSD1305_128X32,
            layout: FlushLayout::default(),
            bus: BusConfig::default(),
            timing: TimingConfig { reset_pulse_ms: 1 },
            logging: LoggingConfig {
                level: LogLevel::Info,
                bus_trace: false,
            },
        }
    }
}

impl DisplayConfig {
    /// Load configuration from file or fall back to defaults
    ///
    /// If the file doesn't exist or can't be parsed, a default
    /// configuration is returned and written to `path`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ssd1305::DisplayConfig;
    ///
    /// let config = DisplayConfig::load_or_default("display_config.toml");
    /// ```
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load_from(&path).unwrap_or_else(|_| {
            let config = Self::default();
            // Try to save the default config, but don't fail if we can't
            let _ = config.save_to(&path);
            config
        })
    }

    /// Load configuration from a TOML file
    ///
    /// # Returns
    ///
    /// The parsed configuration, or an `InvalidData` error if it can't be
    /// parsed or doesn't pass `validate`
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, io::Error> {
        let contents = fs::read_to_string(path)?;
        let config: DisplayConfig = toml::from_str(&contents)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        config
            .validate()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ssd1305::DisplayConfig;
    ///
    /// let config = DisplayConfig::default();
    /// config.save_to("display_config.toml").expect("Failed to save configuration");
    /// ```
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), io::Error> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, contents)
    }

    /// Check that the layout matches the geometry
    ///
    /// A flush must rewrite controller RAM exactly once, otherwise the RAM
    /// pointer drifts by the difference on every frame.
    ///
    /// # Returns
    /// The controller address window a flush covers
    pub fn validate(&self) -> Result<AddressWindow, LayoutError> {
        self.layout.address_window(&self.geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DisplayConfig::default();
        assert_eq!(config.geometry.width(), 128);
        assert_eq!(config.geometry.height(), 32);
        assert_eq!(config.layout.preamble_bytes, 532);
        assert_eq!(config.layout.padding_bytes, 4);
        assert_eq!(config.layout.padding_fill, 0xFF);
        assert_eq!(config.layout.controller_ram_bytes, 1056);
        assert_eq!(config.bus.clock_divider, 42);
        assert_eq!(config.timing.reset_pulse_ms, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = DisplayConfig::default();
        let toml_str = toml::to_string(&config).expect("Failed to serialize");
        let deserialized: DisplayConfig =
            toml::from_str(&toml_str).expect("Failed to deserialize");

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_page_config_is_rejected() {
        let toml_str = toml::to_string(&DisplayConfig::default())
            .unwrap()
            .replace("height = 32", "height = 30");
        let parsed: Result<DisplayConfig, _> = toml::from_str(&toml_str);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!(
            "ssd1305_config_test_{}.toml",
            std::process::id()
        ));

        let mut config = DisplayConfig::default();
        config.timing.reset_pulse_ms = 5;
        config.logging.level = LogLevel::Trace;
        config.save_to(&path).unwrap();

        let loaded = DisplayConfig::load_from(&path).unwrap();
        assert_eq!(loaded.timing.reset_pulse_ms, 5);
        assert_eq!(loaded.logging.level, LogLevel::Trace);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_layout_must_cover_controller_ram() {
        let mut config = DisplayConfig::default();
        config.layout.padding_bytes = 0;
        assert_eq!(
            config.validate(),
            Err(LayoutError::LengthMismatch {
                transfer_len: 1044,
                controller_ram_bytes: 1056
            })
        );

        let path = std::env::temp_dir().join(format!(
            "ssd1305_bad_layout_{}.toml",
            std::process::id()
        ));
        fs::write(&path, toml::to_string(&config).unwrap()).unwrap();
        let err = DisplayConfig::load_from(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let dir = std::env::temp_dir().join(format!("ssd1305_cfg_dir_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("missing.toml");
        let _ = fs::remove_file(&path);

        let config = DisplayConfig::load_or_default(&path);
        assert_eq!(config, DisplayConfig::default());
        assert!(path.exists());

        let _ = fs::remove_dir_all(&dir);
    }
}
