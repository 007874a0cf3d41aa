//! Test fixtures: throwaway sysfs trees

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::device::Directory;

/// A sysfs tree in a temporary directory
pub struct FakeSysfs {
    dir: TempDir,
}

impl FakeSysfs {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp sysfs root"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn directory(&self) -> Directory {
        Directory::Sysfs(self.root().to_path_buf())
    }

    /// Add `class/backlight/<name>` with the three brightness attributes
    pub fn add_backlight(&self, name: &str, brightness: i32, max: i32, actual: i32) {
        let dir = self.root().join("class/backlight").join(name);
        fs::create_dir_all(&dir).expect("create backlight dir");
        fs::write(dir.join("brightness"), format!("{brightness}\n")).unwrap();
        fs::write(dir.join("max_brightness"), format!("{max}\n")).unwrap();
        fs::write(dir.join("actual_brightness"), format!("{actual}\n")).unwrap();
        fs::write(dir.join("type"), "raw\n").unwrap();
    }

    /// Add `class/video4linux/<name>`, optionally with a uevent naming its devnode
    pub fn add_video(&self, name: &str, devname: Option<&str>) {
        let dir = self.root().join("class/video4linux").join(name);
        fs::create_dir_all(&dir).expect("create video dir");
        if let Some(devname) = devname {
            fs::write(
                dir.join("uevent"),
                format!("MAJOR=81\nMINOR=0\nDEVNAME={devname}\n"),
            )
            .unwrap();
        }
    }

    /// Overwrite a raw attribute of an existing backlight device
    pub fn write_attribute(&self, name: &str, attribute: &str, value: &str) {
        let path = self.root().join("class/backlight").join(name).join(attribute);
        fs::write(path, value).unwrap();
    }

    /// Read a raw attribute of an existing backlight device
    pub fn read_attribute(&self, name: &str, attribute: &str) -> String {
        let path = self.root().join("class/backlight").join(name).join(attribute);
        fs::read_to_string(path).unwrap().trim().to_string()
    }
}
