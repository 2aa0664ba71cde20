pub mod file;
pub mod hwmon;
pub mod pci_ids;
pub mod units;
