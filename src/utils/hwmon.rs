use crate::utils::file::{get_file_line, read_number_from_file, Result, SysfsError};
use log::trace;
use std::fs::read_dir;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lists the `hwmon` sensor groups of a GPU, `device/hwmon/hwmonN`, in the
/// order the filesystem hands them out.
///
/// Nothing is cached: groups can come and go when the driver is reloaded, so
/// every lookup enumerates again.
///
/// ## Doc to Linux kernel API.
///
/// Kernel hwmon API: https://www.kernel.org/doc/html/latest/hwmon/hwmon-kernel-api.html
/// Amdgpu hwmon interface: https://docs.kernel.org/gpu/amdgpu/thermal.html#hwmon-interfaces
pub fn sensor_groups(device_path: &Path) -> Vec<PathBuf> {
    let hwmon_root = device_path.join("hwmon");
    let Ok(dir) = read_dir(&hwmon_root) else {
        trace!("no hwmon directory under {}", device_path.display());
        return Vec::new();
    };

    dir.flatten()
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.path())
        .collect()
}

/// Read `filename` from the first sensor group where it exists and parses.
pub fn read_plain<N>(device_path: &Path, filename: &str) -> Result<N>
where
    N: std::str::FromStr,
{
    read_plain_any(device_path, &[filename])
}

/// Like [`read_plain`] but tries each of `filenames` in turn inside a group
/// before moving on to the next group, e.g. `power1_average` then
/// `power1_input`.
pub fn read_plain_any<N>(device_path: &Path, filenames: &[&str]) -> Result<N>
where
    N: std::str::FromStr,
{
    for group in sensor_groups(device_path) {
        for filename in filenames {
            match read_number_from_file(&group.join(filename)) {
                Ok(value) => return Ok(value),
                Err(e) => trace!("{}", e),
            }
        }
    }

    Err(SysfsError::NotFound {
        path: device_path.join("hwmon"),
        what: filenames.join(" | "),
    })
}

/// Find a temperature sensor by label and return its raw `tempN_input` value.
///
/// Every `temp*_label` file of every group is checked against `labels` by
/// case-insensitive substring. The first label file that matches any
/// candidate and has a readable input wins, there is no ranking.
pub fn read_labeled(device_path: &Path, labels: &[&str]) -> Result<f64> {
    let hwmon_root = device_path.join("hwmon");
    let entries = WalkDir::new(&hwmon_root)
        .min_depth(2)
        .max_depth(2)
        .into_iter()
        .flatten();

    for entry in entries {
        let Some(filename) = entry.file_name().to_str() else {
            continue;
        };
        let Some(prefix) = filename
            .strip_suffix("_label")
            .filter(|prefix| prefix.starts_with("temp"))
        else {
            continue;
        };

        let label = match get_file_line(entry.path(), 16) {
            Ok(label) => label.to_lowercase(),
            Err(e) => {
                trace!("{}", e);
                continue;
            }
        };
        if !labels.iter().any(|candidate| label.contains(candidate)) {
            continue;
        }

        let Some(group) = entry.path().parent() else {
            continue;
        };
        match read_number_from_file::<f64>(&group.join(format!("{prefix}_input"))) {
            Ok(value) => return Ok(value),
            Err(e) => trace!("label {label:?} matched but {e}"),
        }
    }

    Err(SysfsError::NotFound {
        path: hwmon_root,
        what: format!("temperature labelled {}", labels.join(" | ")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeCard;

    #[test]
    fn test_no_hwmon_directory() {
        let card = FakeCard::new("card0");
        assert!(sensor_groups(&card.device_path()).is_empty());
        assert!(read_plain::<f64>(&card.device_path(), "temp1_input").is_err());
        assert!(matches!(
            read_labeled(&card.device_path(), &["junction"]),
            Err(SysfsError::NotFound { .. })
        ));
    }

    #[test]
    fn test_plain_skips_groups_without_file() {
        let card = FakeCard::new("card0");
        card.hwmon("hwmon3", "name", "nvme");
        card.hwmon("hwmon4", "fan1_input", "1200");

        let rpm: u32 = read_plain(&card.device_path(), "fan1_input").unwrap();
        assert_eq!(rpm, 1200);
    }

    #[test]
    fn test_plain_skips_unparseable_value() {
        let card = FakeCard::new("card0");
        card.hwmon("hwmon0", "in0_input", "n/a");
        assert!(read_plain::<f64>(&card.device_path(), "in0_input").is_err());
    }

    #[test]
    fn test_plain_any_prefers_first_name() {
        let card = FakeCard::new("card0");
        card.hwmon("hwmon0", "power1_average", "30000000");
        card.hwmon("hwmon0", "power1_input", "50000000");

        let raw: f64 =
            read_plain_any(&card.device_path(), &["power1_average", "power1_input"]).unwrap();
        assert_eq!(raw, 30_000_000.0);
    }

    #[test]
    fn test_labeled_match_is_case_insensitive() {
        let card = FakeCard::new("card0");
        card.hwmon("hwmon0", "temp1_label", "edge");
        card.hwmon("hwmon0", "temp1_input", "40000");
        card.hwmon("hwmon0", "temp3_label", "Mem");
        card.hwmon("hwmon0", "temp3_input", "60000");

        let raw = read_labeled(&card.device_path(), &["mem", "memory"]).unwrap();
        assert_eq!(raw, 60000.0);
    }

    #[test]
    fn test_labeled_skips_missing_input() {
        let card = FakeCard::new("card0");
        card.hwmon("hwmon0", "temp2_label", "junction");

        assert!(read_labeled(&card.device_path(), &["junction"]).is_err());
    }

    /// Name of the group the filesystem lists first.
    fn first_group(card: &FakeCard) -> String {
        let groups = sensor_groups(&card.device_path());
        assert_eq!(groups.len(), 2);
        groups[0].file_name().unwrap().to_string_lossy().into_owned()
    }

    #[test]
    fn test_plain_first_group_wins() {
        let card = FakeCard::new("card0");
        card.hwmon("hwmon0", "temp1_input", "40000");
        card.hwmon("hwmon1", "temp1_input", "90000");

        let expected = if first_group(&card) == "hwmon0" { 40000.0 } else { 90000.0 };
        let raw: f64 = read_plain(&card.device_path(), "temp1_input").unwrap();
        assert_eq!(raw, expected);
    }

    #[test]
    fn test_plain_moves_past_nan() {
        let card = FakeCard::new("card0");
        card.hwmon("hwmon0", "temp1_input", "nan");
        card.hwmon("hwmon1", "temp1_input", "nan");
        assert!(read_plain::<f64>(&card.device_path(), "temp1_input").is_err());

        card.hwmon("hwmon1", "temp1_input", "40000");
        let raw: f64 = read_plain(&card.device_path(), "temp1_input").unwrap();
        assert_eq!(raw, 40000.0);
    }

    #[test]
    fn test_labeled_in_second_group() {
        let card = FakeCard::new("card0");
        card.hwmon("hwmon0", "fan1_input", "1200");
        card.hwmon("hwmon1", "temp2_label", "Junction");
        card.hwmon("hwmon1", "temp2_input", "75000");

        let raw = read_labeled(&card.device_path(), &["junction"]).unwrap();
        assert_eq!(raw, 75000.0);
    }

    #[test]
    fn test_labeled_first_match_not_best_match() {
        let card = FakeCard::new("card0");
        // Enumeration order decides, not candidate order or value.
        card.hwmon("hwmon0", "temp1_label", "edge");
        card.hwmon("hwmon0", "temp1_input", "40000");
        card.hwmon("hwmon1", "temp2_label", "junction");
        card.hwmon("hwmon1", "temp2_input", "95000");

        let expected = if first_group(&card) == "hwmon0" { 40000.0 } else { 95000.0 };
        let raw = read_labeled(&card.device_path(), &["junction", "hotspot", "edge"]).unwrap();
        assert_eq!(raw, expected);
    }
}
