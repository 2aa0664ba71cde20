use crate::models::history::DEFAULT_HISTORY_LEN;
use crate::utils::pci_ids::DEFAULT_PCI_IDS;
use anyhow::{Context, Result};
use config::{Config, File};
use log::{debug, info, LevelFilter};
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DRM_ROOT: &str = "/sys/class/drm";
pub const AMD_VENDOR_ID: &str = "1002";

fn default_drm_root() -> PathBuf {
    PathBuf::from(DEFAULT_DRM_ROOT)
}

fn default_vendor_id() -> String {
    AMD_VENDOR_ID.to_string()
}

fn default_pci_ids() -> PathBuf {
    PathBuf::from(DEFAULT_PCI_IDS)
}

fn default_history_len() -> usize {
    DEFAULT_HISTORY_LEN
}

fn default_polling_ms() -> u64 {
    1000
}

fn default_snapshot_every() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Accepts `0x1002`, `0X1002` or `1002` and keeps the bare lowercase hex.
fn deserialize_hex_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    let value = value.trim();
    let hex = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);

    u16::from_str_radix(hex, 16).map_err(serde::de::Error::custom)?;
    Ok(hex.to_lowercase())
}

#[derive(Debug, Deserialize, Clone)]
pub struct GpuConfig {
    #[serde(default = "default_drm_root")]
    pub drm_root: PathBuf,
    #[serde(default = "default_vendor_id", deserialize_with = "deserialize_hex_id")]
    pub vendor_id: String,
    #[serde(default = "default_pci_ids")]
    pub pci_ids: PathBuf,
    #[serde(default = "default_history_len")]
    pub history_len: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MonitorConfig {
    #[serde(default = "default_polling_ms")]
    pub polling_ms: u64,
    /// Ticks between full rediscoveries, 0 disables.
    #[serde(default)]
    pub rescan_every: u64,
    /// Ticks between snapshot dumps, 0 disables.
    #[serde(default = "default_snapshot_every")]
    pub snapshot_every: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(rename = "GPU", alias = "gpu", default)]
    pub gpu: GpuConfig,
    #[serde(rename = "MONITOR", alias = "monitor", default)]
    pub monitor: MonitorConfig,
    #[serde(rename = "LOGGING", alias = "logging", default)]
    pub logging: LoggingConfig,
}

impl Default for GpuConfig {
    fn default() -> Self {
        Self {
            drm_root: default_drm_root(),
            vendor_id: default_vendor_id(),
            pci_ids: default_pci_ids(),
            history_len: default_history_len(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            polling_ms: default_polling_ms(),
            rescan_every: 0,
            snapshot_every: default_snapshot_every(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        Self::from_file("config.ini")
    }

    pub fn get_log_level(&self) -> LevelFilter {
        match self.logging.level.to_lowercase().as_str() {
            "trace" => LevelFilter::Trace,
            "debug" => LevelFilter::Debug,
            "info" => LevelFilter::Info,
            "warn" => LevelFilter::Warn,
            "error" => LevelFilter::Error,
            "off" => LevelFilter::Off,
            _ => LevelFilter::Info, // Default to Info if invalid
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_path = path.as_ref();
        debug!("Loading configuration from {}", config_path.display());

        let config = Config::builder()
            .add_source(File::from(config_path).format(config::FileFormat::Ini))
            .build()
            .context(format!("Failed to load config from {}", config_path.display()))?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize config")?;

        Ok(app_config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config_path = path.as_ref();

        let mut config_str = String::new();

        config_str.push_str(&format!(
            "[GPU]\ndrm_root = {}\nvendor_id = 0x{}\npci_ids = {}\nhistory_len = {}\n\n",
            self.gpu.drm_root.display(),
            self.gpu.vendor_id,
            self.gpu.pci_ids.display(),
            self.gpu.history_len
        ));

        config_str.push_str(&format!(
            "[MONITOR]\npolling_ms = {}\nrescan_every = {}\nsnapshot_every = {}\n\n",
            self.monitor.polling_ms, self.monitor.rescan_every, self.monitor.snapshot_every
        ));

        config_str.push_str(&format!("[LOGGING]\nlevel = {}\n", self.logging.level));

        fs::write(config_path, config_str)
            .context(format!("Failed to save config to {}", config_path.display()))?;

        info!("Configuration saved to {}", config_path.display());
        Ok(())
    }
}
