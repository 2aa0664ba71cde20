use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a sysfs attribute could not produce a value.
///
/// Nothing outside the crate ever sees this: device accessors turn it into the
/// metric's zero value. It exists so parsers and resolvers can say *why* a
/// reading is unavailable instead of quietly returning a default.
#[derive(Debug, Error)]
pub enum SysfsError {
    #[error("{path} does not exist")]
    Missing { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path} is empty")]
    Empty { path: PathBuf },

    #[error("cannot parse {value:?} from {path}")]
    Parse { path: PathBuf, value: String },

    #[error("{path}: {reason}")]
    Invalid { path: PathBuf, reason: String },

    #[error("no match for {what} under {path}")]
    NotFound { path: PathBuf, what: String },
}

pub type Result<T> = std::result::Result<T, SysfsError>;

// Read arbitrary string data, trailing whitespace removed.
pub fn get_file_line(file: &Path, capacity: usize) -> Result<String> {
    let mut reader = Vec::with_capacity(capacity);
    let mut f = File::open(file).map_err(|e| io_error(file, e))?;
    f.read_to_end(&mut reader).map_err(|e| io_error(file, e))?;
    // sysfs attributes can carry stray non-UTF-8 bytes, keep what we can.
    let text = String::from_utf8_lossy(&reader);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(SysfsError::Empty {
            path: file.to_path_buf(),
        });
    }
    Ok(trimmed.to_string())
}

/// Designed at first for reading an integer or float out of a single-value
/// sysfs attribute such as `temp1_input` or `gpu_busy_percent`.
pub fn read_number_from_file<N>(file: &Path) -> Result<N>
where
    N: std::str::FromStr,
{
    let value = get_file_line(file, 32)?;
    // parse would complain about `\0`.
    let number = value.trim_end_matches('\0').trim();
    let parse_error = || SysfsError::Parse {
        path: file.to_path_buf(),
        value: number.to_string(),
    };
    // Float parsing takes `nan` and `inf`, sysfs counters are plain digits.
    if number.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(parse_error());
    }
    number.parse().map_err(|_| parse_error())
}

fn io_error(file: &Path, source: io::Error) -> SysfsError {
    if source.kind() == io::ErrorKind::NotFound {
        SysfsError::Missing {
            path: file.to_path_buf(),
        }
    } else {
        SysfsError::Io {
            path: file.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_get_file_line_trims() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vendor");
        fs::write(&path, "0x1002\n").unwrap();
        assert_eq!(get_file_line(&path, 16).unwrap(), "0x1002");
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = get_file_line(&dir.path().join("nope"), 16).unwrap_err();
        assert!(matches!(err, SysfsError::Missing { .. }));
    }

    #[test]
    fn test_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("power1_average");
        fs::write(&path, "\n").unwrap();
        assert!(matches!(
            read_number_from_file::<u64>(&path),
            Err(SysfsError::Empty { .. })
        ));
    }

    #[test]
    fn test_read_number() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("temp1_input");
        fs::write(&path, "45000\n").unwrap();
        assert_eq!(read_number_from_file::<i64>(&path).unwrap(), 45000);

        fs::write(&path, "garbage").unwrap();
        assert!(matches!(
            read_number_from_file::<i64>(&path),
            Err(SysfsError::Parse { .. })
        ));
    }

    #[test]
    fn test_non_finite_floats_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("temp1_input");
        for value in ["nan", "NaN", "inf", "-infinity"] {
            fs::write(&path, value).unwrap();
            assert!(matches!(
                read_number_from_file::<f64>(&path),
                Err(SysfsError::Parse { .. })
            ));
        }

        fs::write(&path, "-1500").unwrap();
        assert_eq!(read_number_from_file::<f64>(&path).unwrap(), -1500.0);
    }
}
