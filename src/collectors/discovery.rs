use crate::config::GpuConfig;
use crate::models::gpu::GpuDevice;
use crate::utils::file::get_file_line;
use log::{debug, info};
use regex::Regex;
use std::fs::read_dir;
use std::sync::OnceLock;
use std::time::Instant;

fn card_name() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // card0 but not card0-DP-1
    RE.get_or_init(|| Regex::new(r"^card([0-9]+)$").unwrap())
}

/// Scan the DRM root for cards of the configured vendor.
///
/// Returns a fresh collection ordered by card number. A missing root or a
/// machine without a matching card yields an empty list, and a card whose
/// vendor file cannot be read is skipped.
pub fn discover(config: &GpuConfig) -> Vec<GpuDevice> {
    let start = Instant::now();

    let dir = match read_dir(&config.drm_root) {
        Ok(dir) => dir,
        Err(e) => {
            debug!("Cannot list {}: {}", config.drm_root.display(), e);
            return Vec::new();
        }
    };

    let mut cards: Vec<(u32, _)> = dir
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name();
            let number = card_name()
                .captures(name.to_str()?)?
                .get(1)?
                .as_str()
                .parse::<u32>()
                .ok()?;
            Some((number, entry.path()))
        })
        .filter(|(_, path)| {
            let vendor_path = path.join("device").join("vendor");
            match get_file_line(&vendor_path, 8) {
                Ok(vendor) => vendor.to_lowercase().contains(&config.vendor_id),
                Err(e) => {
                    debug!("Skipping {}: {}", path.display(), e);
                    false
                }
            }
        })
        .collect();
    cards.sort_by_key(|(number, _)| *number);

    let devices: Vec<GpuDevice> = cards
        .iter()
        .map(|(_, path)| GpuDevice::new(path, config.history_len, &config.pci_ids))
        .collect();

    for device in &devices {
        info!(
            "Found {} ({}) at {}",
            device.id(),
            device.model_name(),
            device.card_path().display()
        );
    }
    debug!("discover took: {} ms", start.elapsed().as_millis());
    devices
}
