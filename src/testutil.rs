//! Throwaway `/sys/class/drm` trees for tests.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct FakeDrm {
    dir: TempDir,
}

impl FakeDrm {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Create `<root>/<name>/device/vendor`.
    pub fn add_card(&self, name: &str, vendor: &str) -> PathBuf {
        self.write(&format!("{name}/device/vendor"), vendor);
        self.root().join(name)
    }

    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
}

/// A single card inside its own fake DRM root.
pub struct FakeCard {
    drm: FakeDrm,
    name: String,
}

impl FakeCard {
    pub fn new(name: &str) -> Self {
        let drm = FakeDrm::new();
        fs::create_dir_all(drm.root().join(name).join("device")).unwrap();
        Self {
            drm,
            name: name.to_string(),
        }
    }

    pub fn card_path(&self) -> PathBuf {
        self.drm.root().join(&self.name)
    }

    pub fn device_path(&self) -> PathBuf {
        self.card_path().join("device")
    }

    /// Write `device/<file>`.
    pub fn device(&self, file: &str, contents: &str) -> &Self {
        self.drm
            .write(&format!("{}/device/{file}", self.name), contents);
        self
    }

    /// Write `device/hwmon/<group>/<file>`.
    pub fn hwmon(&self, group: &str, file: &str, contents: &str) -> &Self {
        self.drm.write(
            &format!("{}/device/hwmon/{group}/{file}", self.name),
            contents,
        );
        self
    }
}
