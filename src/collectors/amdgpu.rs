//! Readers for the amdgpu sysfs attributes of one device.
//!
//! Every reader takes the `cardN/device` directory and returns a [`Result`];
//! turning a failure into the metric's zero value is left to the caller.

use crate::utils::file::{get_file_line, read_number_from_file, Result, SysfsError};
use crate::utils::hwmon;
use crate::utils::units::{bytes_to_mib, micro_to_base, milli_to_base};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

pub const JUNCTION_LABELS: &[&str] = &["junction", "hotspot", "edge"];
pub const MEMORY_LABELS: &[&str] = &["mem", "memory"];

fn dpm_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // "1: 1500Mhz *"
    RE.get_or_init(|| Regex::new(r"(?i)^\s*\d+:\s*(\d+)\s*mhz\s+\*").unwrap())
}

/// GPU busy percentage from `gpu_busy_percent`.
pub fn read_load(device_path: &Path) -> Result<u32> {
    read_number_from_file(&device_path.join("gpu_busy_percent"))
}

/// Find the active level in a `pp_dpm_*` table, the line marked with `*`.
pub fn parse_dpm_clock(table: &str) -> Option<u32> {
    table.lines().find_map(|line| {
        dpm_line()
            .captures(line)
            .and_then(|captures| captures[1].parse().ok())
    })
}

/// Current clock in MHz from a `pp_dpm_sclk`/`pp_dpm_mclk` style file.
pub fn read_dpm_clock(file: &Path) -> Result<u32> {
    let table = get_file_line(file, 256)?;
    parse_dpm_clock(&table).ok_or_else(|| SysfsError::Invalid {
        path: file.to_path_buf(),
        reason: "no active clock level".to_string(),
    })
}

pub fn read_core_clock(device_path: &Path) -> Result<u32> {
    read_dpm_clock(&device_path.join("pp_dpm_sclk"))
}

pub fn read_memory_clock(device_path: &Path) -> Result<u32> {
    read_dpm_clock(&device_path.join("pp_dpm_mclk"))
}

/// `(used, total)` VRAM in MiB.
pub fn read_vram(device_path: &Path) -> Result<(u64, u64)> {
    let total_path = device_path.join("mem_info_vram_total");
    let total: u64 = read_number_from_file(&total_path)?;
    let used: u64 = read_number_from_file(&device_path.join("mem_info_vram_used"))?;
    if total == 0 {
        return Err(SysfsError::Invalid {
            path: total_path,
            reason: "total VRAM is zero".to_string(),
        });
    }
    Ok((bytes_to_mib(used), bytes_to_mib(total)))
}

/// PCIe link as `"<speed> x<width>"`, e.g. `"16.0 GT/s PCIe x16"`.
pub fn read_pcie_link(device_path: &Path) -> Result<String> {
    let speed = get_file_line(&device_path.join("current_link_speed"), 32)?;
    let width = get_file_line(&device_path.join("current_link_width"), 8)?;
    Ok(format!("{speed} x{width}"))
}

/// Edge temperature in °C, `temp1_input` of the first group that has one.
pub fn read_edge_temp(device_path: &Path) -> Result<f64> {
    hwmon::read_plain(device_path, "temp1_input").map(milli_to_base)
}

/// Junction (hotspot) temperature in °C, falling back to the edge label.
pub fn read_junction_temp(device_path: &Path) -> Result<f64> {
    hwmon::read_labeled(device_path, JUNCTION_LABELS).map(milli_to_base)
}

/// VRAM temperature in °C.
pub fn read_memory_temp(device_path: &Path) -> Result<f64> {
    hwmon::read_labeled(device_path, MEMORY_LABELS).map(milli_to_base)
}

/// Board power in W. Newer firmware only exposes `power1_input`.
pub fn read_power(device_path: &Path) -> Result<f64> {
    hwmon::read_plain_any(device_path, &["power1_average", "power1_input"]).map(micro_to_base)
}

/// Power limit in W.
pub fn read_power_cap(device_path: &Path) -> Result<f64> {
    hwmon::read_plain(device_path, "power1_cap").map(micro_to_base)
}

/// GPU core voltage in V.
pub fn read_voltage(device_path: &Path) -> Result<f64> {
    hwmon::read_plain(device_path, "in0_input").map(milli_to_base)
}

pub fn read_fan_rpm(device_path: &Path) -> Result<u32> {
    hwmon::read_plain(device_path, "fan1_input")
}
