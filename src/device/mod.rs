// SPDX-License-Identifier: GPL-3.0-only
//! Kernel device access
//!
//! Devices are looked up by class and sysname through a [`Directory`], either via
//! libudev or by walking a sysfs tree directly. A resolved [`DeviceHandle`] is owned
//! by the method call that asked for it and is dropped when that call returns.

mod directory;
mod sysfs;
mod udev_device;

use std::path::PathBuf;

pub use directory::Directory;
pub use sysfs::SysfsDevice;
pub use udev_device::UdevDevice;

/// Device classes the service knows how to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DeviceClass {
    Backlight,
    Video,
}

impl DeviceClass {
    /// Kernel subsystem name used for enumeration
    pub fn subsystem(self) -> &'static str {
        match self {
            DeviceClass::Backlight => "backlight",
            DeviceClass::Video => "video4linux",
        }
    }
}

impl std::fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceClass::Backlight => write!(f, "backlight"),
            DeviceClass::Video => write!(f, "video"),
        }
    }
}

/// Common trait for every way of reaching a kernel device
pub trait Device: std::fmt::Debug {
    /// Device class this handle was resolved for
    fn class(&self) -> DeviceClass;

    /// Kernel sysname, e.g. `intel_backlight`
    fn name(&self) -> String;

    /// Absolute sysfs path of the device
    fn syspath(&self) -> PathBuf;

    /// Device node under /dev, if the device has one
    fn devnode(&self) -> Option<PathBuf>;

    /// Read a sysfs attribute, trimmed of trailing whitespace
    fn attribute(&self, attribute: &str) -> Option<String>;

    /// Write a sysfs attribute
    fn set_attribute(&mut self, attribute: &str, value: &str) -> std::io::Result<()>;
}

/// Owned handle to one resolved device
pub enum DeviceHandle {
    /// Device opened through libudev
    Udev(UdevDevice),
    /// Device found by walking a sysfs tree
    Sysfs(SysfsDevice),
}

impl std::fmt::Debug for DeviceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceHandle::Udev(device) => write!(f, "{:?}", device),
            DeviceHandle::Sysfs(device) => write!(f, "{:?}", device),
        }
    }
}

impl DeviceHandle {
    fn inner(&self) -> &dyn Device {
        match self {
            DeviceHandle::Udev(device) => device,
            DeviceHandle::Sysfs(device) => device,
        }
    }

    pub fn class(&self) -> DeviceClass {
        self.inner().class()
    }

    pub fn name(&self) -> String {
        self.inner().name()
    }

    pub fn syspath(&self) -> PathBuf {
        self.inner().syspath()
    }

    pub fn devnode(&self) -> Option<PathBuf> {
        self.inner().devnode()
    }

    pub fn attribute(&self, attribute: &str) -> Option<String> {
        self.inner().attribute(attribute)
    }

    pub fn set_attribute(&mut self, attribute: &str, value: &str) -> std::io::Result<()> {
        match self {
            DeviceHandle::Udev(device) => device.set_attribute(attribute, value),
            DeviceHandle::Sysfs(device) => device.set_attribute(attribute, value),
        }
    }
}

/// Whether `name` can only ever denote a single entry of a class directory
pub(crate) fn is_valid_sysname(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\0'])
}
