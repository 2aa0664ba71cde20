use crate::utils::file::{Result, SysfsError};
use log::{debug, trace};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::OnceLock;

pub const DEFAULT_PCI_IDS: &str = "/usr/share/misc/pci.ids";

const VENDOR_LABEL: &str = "AMD GPU";
const MARKETING_PREFIX: &str = "Radeon";

fn vendor_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9a-fA-F]{4}").unwrap())
}

/// `0x1002` and `1002` both become `1002`.
pub fn normalize_id(raw: &str) -> String {
    let raw = raw.trim();
    raw.strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw)
        .to_lowercase()
}

/// Model name used when the database has nothing to say.
pub fn fallback_name(device_id: &str) -> String {
    format!("{VENDOR_LABEL} ({device_id})")
}

/// Resolve a human readable model name, falling back to [`fallback_name`].
pub fn model_name(database: &Path, vendor_id: &str, device_id: &str) -> String {
    match lookup(database, vendor_id, device_id) {
        Ok(name) => name,
        Err(e) => {
            debug!("Model name lookup for {vendor_id}:{device_id} failed: {e}");
            fallback_name(device_id)
        }
    }
}

/// Look `vendor_id:device_id` up in a `pci.ids` style database.
///
/// Vendor lines start at column 0 with four hex digits, device lines are
/// indented by exactly one tab. Subsystem lines (two tabs) and comments are
/// ignored.
pub fn lookup(database: &Path, vendor_id: &str, device_id: &str) -> Result<String> {
    let vendor = normalize_id(vendor_id);
    let device = normalize_id(device_id);
    let file = File::open(database).map_err(|e| SysfsError::Io {
        path: database.to_path_buf(),
        source: e,
    })?;

    let mut in_vendor = false;
    for line in BufReader::new(file).split(b'\n') {
        let line = line.map_err(|e| SysfsError::Io {
            path: database.to_path_buf(),
            source: e,
        })?;
        let line = String::from_utf8_lossy(&line);
        let line = line.trim_end_matches('\r');

        if vendor_line().is_match(line) {
            if in_vendor {
                break;
            }
            in_vendor = line.split_whitespace().next() == Some(vendor.as_str());
            continue;
        }
        if !in_vendor {
            continue;
        }

        let Some(entry) = line.strip_prefix('\t') else {
            continue;
        };
        if entry.starts_with(char::is_whitespace) {
            continue;
        }
        let Some(id) = entry.split_whitespace().next() else {
            continue;
        };
        if id.to_lowercase() == device {
            let description = entry
                .split_once("  ")
                .map_or(&entry[id.len()..], |(_, rest)| rest)
                .trim();
            trace!("pci.ids entry for {vendor}:{device}: {description:?}");
            return Ok(clean_description(description));
        }
    }

    Err(SysfsError::NotFound {
        path: database.to_path_buf(),
        what: format!("{vendor}:{device}"),
    })
}

/// `Navi 21 [Radeon RX 6800]` becomes `Radeon RX 6800`, plain descriptions
/// are kept as they are.
fn clean_description(description: &str) -> String {
    let Some((_, bracketed)) = description.split_once('[') else {
        return description.to_string();
    };
    let model = bracketed.replace(']', "");
    let model = model.trim();
    if model.starts_with(MARKETING_PREFIX) {
        model.to_string()
    } else {
        format!("{MARKETING_PREFIX} {model}")
    }
}
