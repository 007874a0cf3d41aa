// SPDX-License-Identifier: GPL-3.0-only
//! libudev-backed device access

use std::path::{Path, PathBuf};

use super::{Device, DeviceClass};

/// Device resolved through libudev
pub struct UdevDevice {
    class: DeviceClass,
    device: udev::Device,
}

impl UdevDevice {
    /// Open exactly the device `name` of `class`
    pub fn open(class: DeviceClass, name: &str) -> std::io::Result<Self> {
        let device =
            udev::Device::from_subsystem_sysname(class.subsystem().to_string(), name.to_string())?;
        Ok(Self { class, device })
    }

    /// First device of `class` in udev's enumeration order
    pub fn first(class: DeviceClass) -> std::io::Result<Option<Self>> {
        let mut enumerator = udev::Enumerator::new()?;
        enumerator.match_subsystem(class.subsystem())?;

        let first = enumerator.scan_devices()?.next();
        Ok(first.map(|device| Self { class, device }))
    }

    /// All devices of `class` in udev's enumeration order
    pub fn enumerate(class: DeviceClass) -> std::io::Result<Vec<Self>> {
        let mut enumerator = udev::Enumerator::new()?;
        enumerator.match_subsystem(class.subsystem())?;

        Ok(enumerator
            .scan_devices()?
            .map(|device| Self { class, device })
            .collect())
    }
}

impl Device for UdevDevice {
    fn class(&self) -> DeviceClass {
        self.class
    }

    fn name(&self) -> String {
        self.device.sysname().to_string_lossy().into_owned()
    }

    fn syspath(&self) -> PathBuf {
        self.device.syspath().to_path_buf()
    }

    fn devnode(&self) -> Option<PathBuf> {
        self.device.devnode().map(Path::to_path_buf)
    }

    fn attribute(&self, attribute: &str) -> Option<String> {
        self.device
            .attribute_value(attribute)
            .map(|value| value.to_string_lossy().trim().to_string())
    }

    fn set_attribute(&mut self, attribute: &str, value: &str) -> std::io::Result<()> {
        self.device.set_attribute_value(attribute, value)
    }
}

impl std::fmt::Debug for UdevDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "UdevDevice(class: {}, name: {}, syspath: {})",
            self.class,
            self.name(),
            self.device.syspath().display()
        )
    }
}
