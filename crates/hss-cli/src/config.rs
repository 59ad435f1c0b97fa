//! Tool configuration at `~/.hss/config.toml`.
//!
//! Every setting has a default matching the stock HSS, so the file is
//! optional.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use hss_client::{ConsoleTiming, FlashOptions};

/// Top-level config file structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub writer: WriterConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
}

/// `[serial]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SerialConfig {
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: default_baud_rate(),
        }
    }
}

/// `[console]` section. All values in seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    /// Wait after each command for the HSS to act on it.
    #[serde(default = "default_settle")]
    pub settle_secs: u64,

    /// Extra wait after every write. Values below 1 are raised to 1.
    #[serde(default = "default_write_floor")]
    pub write_floor_secs: u64,

    /// Wait for the host to enumerate or release the USB disk.
    #[serde(default = "default_settle")]
    pub host_settle_secs: u64,

    /// How long the power-on prompt keeps printing.
    #[serde(default = "default_power_on")]
    pub power_on_secs: u64,

    /// Give up waiting for a console phrase after this long; 0 waits forever.
    #[serde(default)]
    pub phrase_timeout_secs: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            settle_secs: default_settle(),
            write_floor_secs: default_write_floor(),
            host_settle_secs: default_settle(),
            power_on_secs: default_power_on(),
            phrase_timeout_secs: 0,
        }
    }
}

/// `[device]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    /// udev `ID_MODEL` of the exported eMMC.
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
        }
    }
}

/// `[writer]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WriterConfig {
    /// Program used to gain privileges; must accept `-S` and read the password on stdin.
    #[serde(default = "default_elevate")]
    pub elevate: String,

    /// Helper run with privileges as `<helper> <payload> <device>`.
    /// Defaults to this binary's `write-emmc` subcommand.
    #[serde(default)]
    pub helper: Option<PathBuf>,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            elevate: default_elevate(),
            helper: None,
        }
    }
}

/// `[generator]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    /// Zipped payload generator, relative to the west manifest repository
    /// named in `.west/config`, or to the working directory when there is
    /// no west workspace.
    #[serde(default = "default_archive")]
    pub archive: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            archive: default_archive(),
        }
    }
}

fn default_baud_rate() -> u32 {
    hss_core::phrases::BAUD_RATE
}

fn default_settle() -> u64 {
    5
}

fn default_write_floor() -> u64 {
    1
}

fn default_power_on() -> u64 {
    60
}

fn default_model() -> String {
    hss_core::phrases::DEVICE_MODEL.to_string()
}

fn default_elevate() -> String {
    "sudo".to_string()
}

fn default_archive() -> PathBuf {
    PathBuf::from(hss_client::generator::DEFAULT_ARCHIVE)
}

/// Default config path: `~/.hss/config.toml`.
pub fn default_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".hss")
        .join("config.toml")
}

impl Config {
    /// Load configuration from a TOML file, returning defaults if the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config at {}", path.display()))?;

        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Flash tunables derived from the `[console]` and `[device]` sections.
    pub fn flash_options(&self) -> FlashOptions {
        let console = &self.console;
        FlashOptions {
            timing: ConsoleTiming {
                write_floor: Duration::from_secs(console.write_floor_secs.max(1)),
                settle: Duration::from_secs(console.settle_secs),
                phrase_timeout: match console.phrase_timeout_secs {
                    0 => None,
                    secs => Some(Duration::from_secs(secs)),
                },
            },
            power_on_budget: Duration::from_secs(console.power_on_secs),
            host_settle: Duration::from_secs(console.host_settle_secs),
            model: self.device.model.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = Config::default();
        assert_eq!(cfg.serial.baud_rate, 115_200);
        assert_eq!(cfg.device.model, "PIC64GXSoC_msd");
        assert_eq!(cfg.writer.elevate, "sudo");
        assert!(cfg.writer.helper.is_none());

        let opts = cfg.flash_options();
        assert_eq!(opts.timing.phrase_timeout, None);
        assert_eq!(opts.timing.write_floor, Duration::from_secs(1));
        assert_eq!(opts.power_on_budget, Duration::from_secs(60));
    }

    #[test]
    fn parse_partial_toml_config() {
        let toml_str = r#"
[console]
settle_secs = 3
phrase_timeout_secs = 120

[writer]
elevate = "doas"
"#;
        let cfg: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.console.settle_secs, 3);
        assert_eq!(cfg.console.host_settle_secs, 5); // default
        assert_eq!(cfg.writer.elevate, "doas");
        assert_eq!(cfg.serial.baud_rate, 115_200); // default

        let opts = cfg.flash_options();
        assert_eq!(opts.timing.settle, Duration::from_secs(3));
        assert_eq!(opts.timing.phrase_timeout, Some(Duration::from_secs(120)));
    }

    #[test]
    fn zero_write_floor_is_raised() {
        let cfg: Config = toml::from_str("[console]\nwrite_floor_secs = 0\n").unwrap();
        assert_eq!(cfg.flash_options().timing.write_floor, Duration::from_secs(1));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg.console.power_on_secs, 60);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[console\n").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
