// SPDX-License-Identifier: GPL-3.0-only
//! Error types for the service
//!
//! Every failure a method call can produce is a [`ServiceError`]. The bus layer
//! converts them into D-Bus errors; nothing here outlives a single call.

use thiserror::Error;

use crate::device::DeviceClass;

/// Errors raised while serving a single method call
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Caller supplied a value outside the accepted range
    #[error("{0}")]
    InvalidArgument(String),

    /// No device matched the requested class and name
    #[error("Device does not exist.")]
    NotFound { class: DeviceClass, name: String },

    /// The kernel refused an attribute write
    #[error("Not authorized.")]
    PermissionDenied {
        device: String,
        #[source]
        source: std::io::Error,
    },

    /// An attribute was missing or did not hold an integer
    #[error("Failed to read {attribute} of {device}: {reason}")]
    Attribute {
        device: String,
        attribute: &'static str,
        reason: String,
    },

    /// Frame acquisition failed
    #[cfg(feature = "frame-capture")]
    #[error("Failed to capture frames from {device}: {source}")]
    Capture {
        device: String,
        #[source]
        source: crate::capture::CaptureError,
    },

    /// I/O error while talking to the device subsystem
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    pub fn not_found(class: DeviceClass, name: &str) -> Self {
        ServiceError::NotFound {
            class,
            name: name.to_string(),
        }
    }
}

impl From<ServiceError> for zbus::fdo::Error {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::InvalidArgument(_) => zbus::fdo::Error::InvalidArgs(message),
            ServiceError::NotFound { .. } => zbus::fdo::Error::FileNotFound(message),
            ServiceError::PermissionDenied { .. } => zbus::fdo::Error::AccessDenied(message),
            _ => zbus::fdo::Error::Failed(message),
        }
    }
}

/// Result type alias for ServiceError
pub type Result<T> = std::result::Result<T, ServiceError>;
