// SPDX-License-Identifier: GPL-3.0-only
//! Plain sysfs device access
//!
//! Walks `<root>/class/<subsystem>/` directly instead of asking libudev. Used on
//! hosts without a udev daemon and to run the service against a fake tree.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{Device, DeviceClass};

/// Device found under a sysfs root
#[derive(Debug, Clone)]
pub struct SysfsDevice {
    class: DeviceClass,
    name: String,
    path: PathBuf,
}

fn class_dir(root: &Path, class: DeviceClass) -> PathBuf {
    root.join("class").join(class.subsystem())
}

impl SysfsDevice {
    /// Open exactly the device `name` of `class` below `root`
    pub fn open(root: &Path, class: DeviceClass, name: &str) -> std::io::Result<Self> {
        let path = class_dir(root, class).join(name);
        if !path.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            ));
        }

        Ok(Self {
            class,
            name: name.to_string(),
            path,
        })
    }

    /// All devices of `class` below `root`, sorted by name
    ///
    /// A missing class directory means no device of that class is present.
    pub fn enumerate(root: &Path, class: DeviceClass) -> std::io::Result<Vec<Self>> {
        let entries = match fs::read_dir(class_dir(root, class)) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut devices = Vec::new();
        for entry in entries {
            let path = entry?.path();
            // class entries are symlinks into /sys/devices
            if !path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            devices.push(Self { class, name, path });
        }

        devices.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(devices)
    }

    /// `DEVNAME` from the device's uevent file
    fn uevent_devname(&self) -> Option<String> {
        let uevent = fs::read_to_string(self.path.join("uevent")).ok()?;
        uevent
            .lines()
            .find_map(|line| line.strip_prefix("DEVNAME="))
            .map(|devname| devname.trim().to_string())
    }
}

impl Device for SysfsDevice {
    fn class(&self) -> DeviceClass {
        self.class
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn syspath(&self) -> PathBuf {
        fs::canonicalize(&self.path).unwrap_or_else(|_| self.path.clone())
    }

    fn devnode(&self) -> Option<PathBuf> {
        match self.class {
            DeviceClass::Backlight => None,
            DeviceClass::Video => {
                let devname = self.uevent_devname().unwrap_or_else(|| self.name.clone());
                Some(Path::new("/dev").join(devname))
            }
        }
    }

    fn attribute(&self, attribute: &str) -> Option<String> {
        fs::read_to_string(self.path.join(attribute))
            .ok()
            .map(|value| value.trim().to_string())
    }

    fn set_attribute(&mut self, attribute: &str, value: &str) -> std::io::Result<()> {
        // never create: an attribute the kernel does not expose can't be written
        let mut file = fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(self.path.join(attribute))?;
        file.write_all(value.as_bytes())
    }
}
