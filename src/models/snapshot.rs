use chrono::{DateTime, Local};
use serde::Serialize;

pub const PCIE_UNAVAILABLE: &str = "N/A";

/// Every metric of one device, read at `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSnapshot {
    pub id: String,
    pub model: String,
    pub load: u32,
    pub temp: f64,
    pub temp_junction: f64,
    pub temp_mem: f64,
    pub vram_used: u64,
    pub vram_total: u64,
    pub power: f64,
    pub power_cap: f64,
    pub voltage: f64,
    pub fan: u32,
    pub sclk: u32,
    pub mclk: u32,
    pub pcie: String,
    pub timestamp: DateTime<Local>,
}

impl MetricSnapshot {
    pub fn timestamp_display(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// VRAM usage in percent, 0.0 - 100.0.
    pub fn vram_percent(&self) -> f32 {
        if self.vram_total > 0 {
            self.vram_used as f32 / self.vram_total as f32 * 100.0
        } else {
            0.0
        }
    }
}
