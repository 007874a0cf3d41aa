// SPDX-License-Identifier: GPL-3.0-only
//! D-Bus interface of the service
//!
//! Exposes `org.clight.backlight` at `/org/clight/backlight`. Two interface types
//! exist: one with the four backlight methods, and one that also carries
//! `captureframes`. The daemon serves exactly one of them.
//!
//! Methods take `&mut self`, so the object server runs them one at a time.

use zbus::interface;

use crate::brightness::BrightnessController;
#[cfg(feature = "frame-capture")]
use crate::capture::FrameSampler;
use crate::device::Directory;
use crate::error::ServiceError;

/// Well-known bus name and interface name
pub const BUS_NAME: &str = "org.clight.backlight";

/// Object path of the interface
pub const OBJECT_PATH: &str = "/org/clight/backlight";

/// Runs the domain operations and turns their errors into bus errors
#[derive(Debug)]
pub struct Dispatcher {
    directory: Directory,
}

impl Dispatcher {
    pub fn new(directory: Directory) -> Self {
        Self { directory }
    }

    pub fn set_brightness(&self, device: &str, value: i32) -> zbus::fdo::Result<i32> {
        reply(
            "setbrightness",
            BrightnessController::new(&self.directory).set_brightness(device, value),
        )
    }

    pub fn get_brightness(&self, device: &str) -> zbus::fdo::Result<i32> {
        reply(
            "getbrightness",
            BrightnessController::new(&self.directory).get_brightness(device),
        )
    }

    pub fn get_max_brightness(&self, device: &str) -> zbus::fdo::Result<i32> {
        reply(
            "getmaxbrightness",
            BrightnessController::new(&self.directory).get_max_brightness(device),
        )
    }

    pub fn get_actual_brightness(&self, device: &str) -> zbus::fdo::Result<i32> {
        reply(
            "getactualbrightness",
            BrightnessController::new(&self.directory).get_actual_brightness(device),
        )
    }

    #[cfg(feature = "frame-capture")]
    pub fn capture_frames(
        &self,
        sampler: &mut FrameSampler,
        device: &str,
        frames: i32,
    ) -> zbus::fdo::Result<f64> {
        reply(
            "captureframes",
            sampler.capture_frames(&self.directory, device, frames),
        )
    }
}

fn reply<T>(method: &str, result: Result<T, ServiceError>) -> zbus::fdo::Result<T> {
    result.map_err(|e| {
        warn!(method, error = %e, "Call failed");
        e.into()
    })
}

/// Backlight methods only
pub struct BacklightInterface {
    dispatcher: Dispatcher,
}

impl BacklightInterface {
    pub fn new(directory: Directory) -> Self {
        Self {
            dispatcher: Dispatcher::new(directory),
        }
    }
}

#[interface(name = "org.clight.backlight")]
impl BacklightInterface {
    /// Set brightness of a backlight device, eg: "intel_backlight". Returns the new value.
    #[zbus(name = "setbrightness")]
    fn set_brightness(&mut self, device: &str, value: i32) -> zbus::fdo::Result<i32> {
        self.dispatcher.set_brightness(device, value)
    }

    /// Current brightness of a backlight device
    #[zbus(name = "getbrightness")]
    fn get_brightness(&mut self, device: &str) -> zbus::fdo::Result<i32> {
        self.dispatcher.get_brightness(device)
    }

    /// Max brightness of a backlight device
    #[zbus(name = "getmaxbrightness")]
    fn get_max_brightness(&mut self, device: &str) -> zbus::fdo::Result<i32> {
        self.dispatcher.get_max_brightness(device)
    }

    /// Hardware-reported brightness of a backlight device
    #[zbus(name = "getactualbrightness")]
    fn get_actual_brightness(&mut self, device: &str) -> zbus::fdo::Result<i32> {
        self.dispatcher.get_actual_brightness(device)
    }
}

/// Backlight methods plus webcam brightness sampling
#[cfg(feature = "frame-capture")]
pub struct CaptureBacklightInterface {
    dispatcher: Dispatcher,
    sampler: FrameSampler,
}

#[cfg(feature = "frame-capture")]
impl CaptureBacklightInterface {
    pub fn new(directory: Directory, sampler: FrameSampler) -> Self {
        Self {
            dispatcher: Dispatcher::new(directory),
            sampler,
        }
    }
}

#[cfg(feature = "frame-capture")]
#[interface(name = "org.clight.backlight")]
impl CaptureBacklightInterface {
    /// Set brightness of a backlight device, eg: "intel_backlight". Returns the new value.
    #[zbus(name = "setbrightness")]
    fn set_brightness(&mut self, device: &str, value: i32) -> zbus::fdo::Result<i32> {
        self.dispatcher.set_brightness(device, value)
    }

    /// Current brightness of a backlight device
    #[zbus(name = "getbrightness")]
    fn get_brightness(&mut self, device: &str) -> zbus::fdo::Result<i32> {
        self.dispatcher.get_brightness(device)
    }

    /// Max brightness of a backlight device
    #[zbus(name = "getmaxbrightness")]
    fn get_max_brightness(&mut self, device: &str) -> zbus::fdo::Result<i32> {
        self.dispatcher.get_max_brightness(device)
    }

    /// Hardware-reported brightness of a backlight device
    #[zbus(name = "getactualbrightness")]
    fn get_actual_brightness(&mut self, device: &str) -> zbus::fdo::Result<i32> {
        self.dispatcher.get_actual_brightness(device)
    }

    /// Average brightness of `frames` frames from a video device, eg: "video0"
    ///
    /// Blocks the object server for the whole capture.
    #[zbus(name = "captureframes")]
    fn capture_frames(&mut self, device: &str, frames: i32) -> zbus::fdo::Result<f64> {
        self.dispatcher
            .capture_frames(&mut self.sampler, device, frames)
    }
}
