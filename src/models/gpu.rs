use crate::collectors::amdgpu;
use crate::models::history::History;
use crate::models::snapshot::{MetricSnapshot, PCIE_UNAVAILABLE};
use crate::utils::file::{get_file_line, Result};
use crate::utils::pci_ids;
use chrono::Local;
use log::trace;
use std::fs::read_dir;
use std::path::{Path, PathBuf};

/// One AMD adapter found under the DRM root.
///
/// Identity is fixed at construction. Current values and the three histories
/// only change through [`GpuDevice::refresh`].
#[derive(Debug, Clone)]
pub struct GpuDevice {
    id: String,
    card_path: PathBuf,
    device_path: PathBuf,
    vendor_id: String,
    device_id: String,
    model_name: String,
    render_node: Option<PathBuf>,

    current_load: u32,
    current_temp: f64,
    current_power: f64,

    history_load: History<u32>,
    history_temp: History<f64>,
    history_power: History<f64>,
}

impl GpuDevice {
    /// Read identity for `card_path` and resolve its model name against the
    /// `pci.ids` file at `database`.
    pub fn new(card_path: &Path, history_len: usize, database: &Path) -> Self {
        let device_path = card_path.join("device");
        let id = card_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let vendor_id = get_file_line(&device_path.join("vendor"), 8).unwrap_or_default();
        let device_id = get_file_line(&device_path.join("device"), 8).unwrap_or_default();
        let model_name = pci_ids::model_name(database, &vendor_id, &device_id);
        let render_node = find_render_node(&device_path);

        Self {
            id,
            card_path: card_path.to_path_buf(),
            device_path,
            vendor_id,
            device_id,
            model_name,
            render_node,
            current_load: 0,
            current_temp: 0.0,
            current_power: 0.0,
            history_load: History::new(history_len),
            history_temp: History::new(history_len),
            history_power: History::new(history_len),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn card_path(&self) -> &Path {
        &self.card_path
    }

    pub fn device_path(&self) -> &Path {
        &self.device_path
    }

    pub fn vendor_id(&self) -> &str {
        &self.vendor_id
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// `/dev/dri/renderDN` for this card, if the driver exposes one.
    pub fn render_node(&self) -> Option<&Path> {
        self.render_node.as_deref()
    }

    pub fn current_load(&self) -> u32 {
        self.current_load
    }

    pub fn current_temp(&self) -> f64 {
        self.current_temp
    }

    pub fn current_power(&self) -> f64 {
        self.current_power
    }

    pub fn load_history(&self) -> &History<u32> {
        &self.history_load
    }

    pub fn temp_history(&self) -> &History<f64> {
        &self.history_temp
    }

    pub fn power_history(&self) -> &History<f64> {
        &self.history_power
    }

    /// Sample load, edge temperature and power, and append them to history.
    pub fn refresh(&mut self) {
        self.current_load = self.load();
        self.current_temp = self.temp();
        self.current_power = self.power();

        self.history_load.push(self.current_load);
        self.history_temp.push(self.current_temp);
        self.history_power.push(self.current_power);
    }

    /// Read every metric afresh. History is left alone.
    pub fn snapshot(&self) -> MetricSnapshot {
        let (vram_used, vram_total) = self.vram();

        MetricSnapshot {
            id: self.id.clone(),
            model: self.model_name.clone(),
            load: self.load(),
            temp: self.temp(),
            temp_junction: self.junction_temp(),
            temp_mem: self.memory_temp(),
            vram_used,
            vram_total,
            power: self.power(),
            power_cap: self.power_cap(),
            voltage: self.voltage(),
            fan: self.fan_rpm(),
            sclk: self.core_clock(),
            mclk: self.memory_clock(),
            pcie: self.pcie_link(),
            timestamp: Local::now(),
        }
    }

    pub fn load(&self) -> u32 {
        or_default("load", amdgpu::read_load(&self.device_path))
    }

    pub fn temp(&self) -> f64 {
        or_default("temp", amdgpu::read_edge_temp(&self.device_path))
    }

    pub fn junction_temp(&self) -> f64 {
        or_default("temp_junction", amdgpu::read_junction_temp(&self.device_path))
    }

    pub fn memory_temp(&self) -> f64 {
        or_default("temp_mem", amdgpu::read_memory_temp(&self.device_path))
    }

    pub fn vram(&self) -> (u64, u64) {
        or_default("vram", amdgpu::read_vram(&self.device_path))
    }

    pub fn power(&self) -> f64 {
        or_default("power", amdgpu::read_power(&self.device_path))
    }

    pub fn power_cap(&self) -> f64 {
        or_default("power_cap", amdgpu::read_power_cap(&self.device_path))
    }

    pub fn voltage(&self) -> f64 {
        or_default("voltage", amdgpu::read_voltage(&self.device_path))
    }

    pub fn fan_rpm(&self) -> u32 {
        or_default("fan", amdgpu::read_fan_rpm(&self.device_path))
    }

    pub fn core_clock(&self) -> u32 {
        or_default("sclk", amdgpu::read_core_clock(&self.device_path))
    }

    pub fn memory_clock(&self) -> u32 {
        or_default("mclk", amdgpu::read_memory_clock(&self.device_path))
    }

    pub fn pcie_link(&self) -> String {
        amdgpu::read_pcie_link(&self.device_path).unwrap_or_else(|e| {
            trace!("pcie: {}", e);
            PCIE_UNAVAILABLE.to_string()
        })
    }
}

fn or_default<T: Default>(metric: &str, reading: Result<T>) -> T {
    reading.unwrap_or_else(|e| {
        trace!("{}: {}", metric, e);
        T::default()
    })
}

fn find_render_node(device_path: &Path) -> Option<PathBuf> {
    let dir = read_dir(device_path.join("drm")).ok()?;
    dir.flatten()
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .find(|name| name.starts_with("render"))
        .map(|name| Path::new("/dev/dri").join(name))
}
