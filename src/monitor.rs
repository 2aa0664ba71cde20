use crate::collectors::discovery;
use crate::config::AppConfig;
use crate::models::gpu::GpuDevice;
use anyhow::Context;
use log::{debug, info, warn};
use std::time::Instant;

/// Polling state: the current device collection and a tick counter.
///
/// The collection is only ever replaced as a whole, on rescan.
pub struct Monitor {
    config: AppConfig,
    devices: Vec<GpuDevice>,
    ticks: u64,
}

impl Monitor {
    pub fn new(config: AppConfig) -> Self {
        let devices = discovery::discover(&config.gpu);
        if devices.is_empty() {
            warn!(
                "No GPUs with vendor id {} under {}",
                config.gpu.vendor_id,
                config.gpu.drm_root.display()
            );
        }
        Self {
            config,
            devices,
            ticks: 0,
        }
    }

    pub fn devices(&self) -> &[GpuDevice] {
        &self.devices
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Run one polling step: rescan if due, refresh every device, then dump
    /// snapshots if due.
    pub fn tick(&mut self) -> anyhow::Result<()> {
        let start = Instant::now();
        self.ticks += 1;

        if is_due(self.ticks, self.config.monitor.rescan_every) {
            debug!("Rescanning {}", self.config.gpu.drm_root.display());
            let devices = discovery::discover(&self.config.gpu);
            if devices.is_empty() && !self.devices.is_empty() {
                warn!(
                    "Rescan of {} found no GPUs, dropping {} device(s)",
                    self.config.gpu.drm_root.display(),
                    self.devices.len()
                );
            }
            self.devices = devices;
        }

        for device in self.devices.iter_mut() {
            device.refresh();
            info!(
                "{} {}: load {}% temp {:.1}°C power {:.1}W",
                device.id(),
                device.model_name(),
                device.current_load(),
                device.current_temp(),
                device.current_power()
            );
        }

        if is_due(self.ticks, self.config.monitor.snapshot_every) {
            for device in &self.devices {
                let snapshot = device.snapshot();
                let json = serde_json::to_string(&snapshot)
                    .context(format!("Failed to serialize snapshot of {}", device.id()))?;
                info!(
                    "{} snapshot ({:.1}% VRAM): {}",
                    device.id(),
                    snapshot.vram_percent(),
                    json
                );
            }
        }

        debug!("tick took: {} ms", start.elapsed().as_millis());
        Ok(())
    }
}

fn is_due(ticks: u64, every: u64) -> bool {
    every > 0 && ticks % every == 0
}
