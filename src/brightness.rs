// SPDX-License-Identifier: GPL-3.0-only
//! Backlight brightness control
//!
//! Reads and writes the `brightness`, `max_brightness` and `actual_brightness`
//! attributes of a backlight device, validating writes against the device maximum.

use crate::device::{DeviceClass, DeviceHandle, Directory};
use crate::error::{Result, ServiceError};

pub const BRIGHTNESS: &str = "brightness";
pub const MAX_BRIGHTNESS: &str = "max_brightness";
pub const ACTUAL_BRIGHTNESS: &str = "actual_brightness";

/// Brightness operations against backlight devices of a [`Directory`]
///
/// Every operation resolves its own device and releases it before returning.
pub struct BrightnessController<'a> {
    directory: &'a Directory,
}

impl<'a> BrightnessController<'a> {
    /// Create a controller resolving devices through `directory`
    pub fn new(directory: &'a Directory) -> Self {
        Self { directory }
    }

    /// Current `brightness` of backlight `name` (empty: first backlight)
    pub fn get_brightness(&self, name: &str) -> Result<i32> {
        self.read(name, BRIGHTNESS)
    }

    /// `max_brightness` of backlight `name` (empty: first backlight)
    pub fn get_max_brightness(&self, name: &str) -> Result<i32> {
        self.read(name, MAX_BRIGHTNESS)
    }

    /// Hardware-reported `actual_brightness` of backlight `name` (empty: first backlight)
    pub fn get_actual_brightness(&self, name: &str) -> Result<i32> {
        self.read(name, ACTUAL_BRIGHTNESS)
    }

    /// Write `value` to the `brightness` of backlight `name` (empty: first backlight)
    ///
    /// The value must lie in `0..=max_brightness`. On success the requested value is
    /// returned as is; the attribute is not read back.
    pub fn set_brightness(&self, name: &str, value: i32) -> Result<i32> {
        if value < 0 {
            return Err(ServiceError::InvalidArgument(
                "Value must be greater or equal to 0.".to_string(),
            ));
        }

        let mut device = self.directory.resolve(DeviceClass::Backlight, name)?;

        let max = read_int(&device, MAX_BRIGHTNESS)?;
        if value > max {
            return Err(ServiceError::InvalidArgument(format!(
                "Value must be less than or equal to {}.",
                max
            )));
        }

        device
            .set_attribute(BRIGHTNESS, &value.to_string())
            .map_err(|source| ServiceError::PermissionDenied {
                device: device.name(),
                source,
            })?;

        info!("New brightness value for {}: {}", device.name(), value);
        Ok(value)
    }

    fn read(&self, name: &str, attribute: &'static str) -> Result<i32> {
        let device = self.directory.resolve(DeviceClass::Backlight, name)?;
        let value = read_int(&device, attribute)?;
        debug!(
            device = %device.name(),
            attribute,
            value,
            "Read backlight attribute"
        );
        Ok(value)
    }
}

/// Parse an integer attribute, failing on absent or malformed values
fn read_int(device: &DeviceHandle, attribute: &'static str) -> Result<i32> {
    let raw = device
        .attribute(attribute)
        .ok_or_else(|| ServiceError::Attribute {
            device: device.name(),
            attribute,
            reason: "attribute not present".to_string(),
        })?;

    raw.parse().map_err(|e: std::num::ParseIntError| ServiceError::Attribute {
        device: device.name(),
        attribute,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSysfs;

    fn intel_backlight() -> FakeSysfs {
        let sysfs = FakeSysfs::new();
        sysfs.add_backlight("intel_backlight", 50, 100, 48);
        sysfs
    }

    #[test]
    fn test_getters_return_attributes_verbatim() {
        let sysfs = intel_backlight();
        let directory = sysfs.directory();
        let controller = BrightnessController::new(&directory);

        assert_eq!(controller.get_brightness("intel_backlight").unwrap(), 50);
        assert_eq!(controller.get_max_brightness("intel_backlight").unwrap(), 100);
        assert_eq!(controller.get_actual_brightness("intel_backlight").unwrap(), 48);
    }

    #[test]
    fn test_actual_brightness_is_not_bounded() {
        let sysfs = FakeSysfs::new();
        sysfs.add_backlight("nv_backlight", 10, 100, 250);
        let directory = sysfs.directory();
        let controller = BrightnessController::new(&directory);

        assert_eq!(controller.get_actual_brightness("nv_backlight").unwrap(), 250);
    }

    #[test]
    fn test_reject_over_max_then_accept() {
        let sysfs = intel_backlight();
        let directory = sysfs.directory();
        let controller = BrightnessController::new(&directory);

        let err = controller.set_brightness("intel_backlight", 120).unwrap_err();
        assert!(
            matches!(err, ServiceError::InvalidArgument(ref m) if m.contains("100")),
            "{err:?}"
        );
        assert_eq!(controller.get_brightness("intel_backlight").unwrap(), 50);

        assert_eq!(controller.set_brightness("intel_backlight", 80).unwrap(), 80);
        assert_eq!(controller.get_brightness("intel_backlight").unwrap(), 80);
    }

    #[test]
    fn test_negative_value_is_rejected_without_write() {
        let sysfs = intel_backlight();
        let directory = sysfs.directory();
        let controller = BrightnessController::new(&directory);

        for value in [-1, -50, i32::MIN] {
            let err = controller.set_brightness("intel_backlight", value).unwrap_err();
            assert!(matches!(err, ServiceError::InvalidArgument(_)));
        }
        assert_eq!(sysfs.read_attribute("intel_backlight", BRIGHTNESS), "50");
    }

    #[test]
    fn test_negative_value_checked_before_resolution() {
        let sysfs = FakeSysfs::new();
        let directory = sysfs.directory();
        let controller = BrightnessController::new(&directory);

        let err = controller.set_brightness("missing", -3).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let sysfs = intel_backlight();
        let directory = sysfs.directory();
        let controller = BrightnessController::new(&directory);

        for value in [0, 1, 99, 100] {
            assert_eq!(controller.set_brightness("intel_backlight", value).unwrap(), value);
            assert_eq!(controller.get_brightness("intel_backlight").unwrap(), value);
        }
        assert!(controller.set_brightness("intel_backlight", 101).is_err());
        assert_eq!(controller.get_brightness("intel_backlight").unwrap(), 100);
    }

    #[test]
    fn test_empty_name_uses_first_backlight() {
        let sysfs = FakeSysfs::new();
        sysfs.add_backlight("acpi_video0", 3, 15, 3);
        sysfs.add_backlight("intel_backlight", 50, 100, 48);
        let directory = sysfs.directory();
        let controller = BrightnessController::new(&directory);

        assert_eq!(
            controller.get_brightness("").unwrap(),
            controller.get_brightness("acpi_video0").unwrap()
        );
        assert_eq!(
            controller.get_max_brightness("").unwrap(),
            controller.get_max_brightness("acpi_video0").unwrap()
        );
        assert_eq!(
            controller.get_actual_brightness("").unwrap(),
            controller.get_actual_brightness("acpi_video0").unwrap()
        );

        assert_eq!(controller.set_brightness("", 7).unwrap(), 7);
        assert_eq!(sysfs.read_attribute("acpi_video0", BRIGHTNESS), "7");
        assert_eq!(sysfs.read_attribute("intel_backlight", BRIGHTNESS), "50");
    }

    #[test]
    fn test_missing_device() {
        let sysfs = intel_backlight();
        let directory = sysfs.directory();
        let controller = BrightnessController::new(&directory);

        assert!(matches!(
            controller.get_brightness("amdgpu_bl0"),
            Err(ServiceError::NotFound { .. })
        ));
        assert!(matches!(
            controller.set_brightness("amdgpu_bl0", 10),
            Err(ServiceError::NotFound { .. })
        ));

        let empty = FakeSysfs::new();
        let directory = empty.directory();
        let controller = BrightnessController::new(&directory);
        assert!(matches!(
            controller.get_max_brightness(""),
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[test]
    fn test_malformed_attribute() {
        let sysfs = intel_backlight();
        sysfs.write_attribute("intel_backlight", MAX_BRIGHTNESS, "lots\n");
        let directory = sysfs.directory();
        let controller = BrightnessController::new(&directory);

        let err = controller.set_brightness("intel_backlight", 10).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Attribute { attribute: MAX_BRIGHTNESS, .. }
        ));
        assert_eq!(sysfs.read_attribute("intel_backlight", BRIGHTNESS), "50");
    }

    #[test]
    fn test_missing_attribute() {
        let sysfs = intel_backlight();
        std::fs::remove_file(
            sysfs
                .root()
                .join("class/backlight/intel_backlight/actual_brightness"),
        )
        .unwrap();
        let directory = sysfs.directory();
        let controller = BrightnessController::new(&directory);

        assert!(matches!(
            controller.get_actual_brightness("intel_backlight"),
            Err(ServiceError::Attribute { .. })
        ));
    }

    #[test]
    fn test_refused_write_is_permission_denied() {
        let sysfs = intel_backlight();
        // a directory in place of the attribute can't be opened for writing
        let attr = sysfs.root().join("class/backlight/intel_backlight/brightness");
        std::fs::remove_file(&attr).unwrap();
        std::fs::create_dir(&attr).unwrap();
        let directory = sysfs.directory();
        let controller = BrightnessController::new(&directory);

        let err = controller.set_brightness("intel_backlight", 10).unwrap_err();
        assert!(matches!(err, ServiceError::PermissionDenied { .. }), "{err:?}");
    }
}
