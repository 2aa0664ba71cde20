//! Raw sysfs unit conversions.

const BYTES_PER_MIB: u64 = 1024 * 1024;

/// Takes a value in milli-units (millidegree, millivolt) and converts it to the base unit.
#[inline]
pub fn milli_to_base(value: f64) -> f64 {
    value / 1000.0
}

/// Takes a value in micro-units (microwatt) and converts it to the base unit.
#[inline]
pub fn micro_to_base(value: f64) -> f64 {
    value / 1_000_000.0
}

/// Whole MiB, remainder discarded.
#[inline]
pub fn bytes_to_mib(bytes: u64) -> u64 {
    bytes / BYTES_PER_MIB
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(milli_to_base(75000.0), 75.0);
        assert_eq!(milli_to_base(1100.0), 1.1);
        assert_eq!(micro_to_base(50_000_000.0), 50.0);
        assert_eq!(bytes_to_mib(8 * 1024 * 1024 * 1024), 8192);
        assert_eq!(bytes_to_mib(BYTES_PER_MIB - 1), 0);
    }
}
