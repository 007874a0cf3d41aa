use std::path::PathBuf;

use super::{DeviceClass, DeviceHandle, SysfsDevice, UdevDevice, is_valid_sysname};
use crate::config::{Backend, Config};
use crate::error::{Result, ServiceError};

/// Resolves devices by class and name
///
/// An empty name selects the first device of the class in the backend's native
/// enumeration order. The returned handle is owned by the caller and released
/// when dropped.
#[derive(Debug, Clone)]
pub enum Directory {
    /// Ask libudev
    Udev,
    /// Walk a sysfs tree rooted at the given path
    Sysfs(PathBuf),
}

impl Directory {
    pub fn from_config(config: &Config) -> Self {
        match config.backend {
            Backend::Udev => Directory::Udev,
            Backend::Sysfs => Directory::Sysfs(config.sysfs_root.clone()),
        }
    }

    /// Resolve `name` within `class`, or the first device of `class` if `name` is empty
    pub fn resolve(&self, class: DeviceClass, name: &str) -> Result<DeviceHandle> {
        let device = if name.is_empty() {
            self.first(class)?
        } else {
            self.open(class, name)?
        };

        trace!(
            "Resolved {} device {} at {}",
            device.class(),
            device.name(),
            device.syspath().display()
        );
        Ok(device)
    }

    fn open(&self, class: DeviceClass, name: &str) -> Result<DeviceHandle> {
        if !is_valid_sysname(name) {
            debug!("Rejecting {} device name {:?}", class, name);
            return Err(ServiceError::not_found(class, name));
        }

        let opened = match self {
            Directory::Udev => UdevDevice::open(class, name).map(DeviceHandle::Udev),
            Directory::Sysfs(root) => SysfsDevice::open(root, class, name).map(DeviceHandle::Sysfs),
        };

        opened.map_err(|e| {
            debug!("Failed to open {} device {}: {}", class, name, e);
            ServiceError::not_found(class, name)
        })
    }

    fn first(&self, class: DeviceClass) -> Result<DeviceHandle> {
        let first = match self {
            Directory::Udev => UdevDevice::first(class)?.map(DeviceHandle::Udev),
            Directory::Sysfs(root) => SysfsDevice::enumerate(root, class)?
                .into_iter()
                .next()
                .map(DeviceHandle::Sysfs),
        };

        match first {
            Some(device) => {
                debug!("No {} device requested, using {}", class, device.name());
                Ok(device)
            }
            None => {
                debug!("No {} device present", class);
                Err(ServiceError::not_found(class, ""))
            }
        }
    }

    /// Every device of `class` in enumeration order
    pub fn enumerate(&self, class: DeviceClass) -> Result<Vec<DeviceHandle>> {
        let devices = match self {
            Directory::Udev => UdevDevice::enumerate(class)?
                .into_iter()
                .map(DeviceHandle::Udev)
                .collect(),
            Directory::Sysfs(root) => SysfsDevice::enumerate(root, class)?
                .into_iter()
                .map(DeviceHandle::Sysfs)
                .collect(),
        };
        Ok(devices)
    }
}
