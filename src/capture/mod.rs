// SPDX-License-Identifier: GPL-3.0-only
//! Ambient brightness sampling from a webcam
//!
//! A [`FrameSource`] grabs a number of consecutive frames from a video device and
//! reduces them to one brightness value in `0.0..=1.0`. The [`FrameSampler`] resolves
//! which device to use and hands the result back unchanged.

mod v4l_source;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::device::{DeviceClass, Directory};
use crate::error::{Result, ServiceError};

pub use v4l_source::V4lFrameSource;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to configure capture format: {0}")]
    Format(#[source] std::io::Error),

    #[error("unsupported pixel format {0}")]
    UnsupportedFormat(String),

    #[error("failed to read frame: {0}")]
    Read(#[source] std::io::Error),

    #[error("captured frame is empty")]
    EmptyFrame,

    #[error("device has no device node")]
    NoDevnode,

    #[error("no frames were captured")]
    NoFrames,
}

/// Something that can turn `frames` frames of a video device into one brightness value
pub trait FrameSource: Send + Sync {
    fn capture(&mut self, devnode: &Path, frames: u32) -> std::result::Result<f64, CaptureError>;
}

/// Where the luma bytes sit in a frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// 8-bit greyscale, every byte is a sample
    Grey,
    /// Packed YUV 4:2:2, luma on every even byte
    Yuyv,
}

impl PixelLayout {
    pub fn from_fourcc(fourcc: &[u8; 4]) -> Option<Self> {
        match fourcc {
            b"GREY" => Some(PixelLayout::Grey),
            b"YUYV" => Some(PixelLayout::Yuyv),
            _ => None,
        }
    }
}

/// Mean luma of one frame scaled to `0.0..=1.0`, or `None` for an empty buffer
pub fn frame_brightness(frame: &[u8], layout: PixelLayout) -> Option<f64> {
    let (sum, count) = match layout {
        PixelLayout::Grey => (
            frame.iter().map(|&y| u64::from(y)).sum::<u64>(),
            frame.len(),
        ),
        PixelLayout::Yuyv => frame
            .iter()
            .step_by(2)
            .fold((0u64, 0usize), |(sum, count), &y| (sum + u64::from(y), count + 1)),
    };

    if count == 0 {
        return None;
    }
    Some(sum as f64 / count as f64 / 255.0)
}

/// Upper bound on samples reserved up front; larger captures grow as frames arrive
const MAX_PREALLOCATED_SAMPLES: usize = 64;

/// Per-frame brightness measurements of one capture
#[derive(Debug, Default)]
pub struct SampleSet {
    samples: Vec<f64>,
}

impl SampleSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity.min(MAX_PREALLOCATED_SAMPLES)),
        }
    }

    pub fn push(&mut self, sample: f64) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Arithmetic mean of all samples
    pub fn average(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
    }
}

/// Resolves video devices and samples their brightness
pub struct FrameSampler {
    source: Box<dyn FrameSource>,
}

impl FrameSampler {
    pub fn new(source: Box<dyn FrameSource>) -> Self {
        Self { source }
    }

    /// Average brightness of `frames` frames from video device `name` (empty: first)
    pub fn capture_frames(&mut self, directory: &Directory, name: &str, frames: i32) -> Result<f64> {
        let frames = match u32::try_from(frames) {
            Ok(frames) if frames > 0 => frames,
            _ => {
                return Err(ServiceError::InvalidArgument(
                    "Number of frames must be greater than 0.".to_string(),
                ));
            }
        };

        let device = directory.resolve(DeviceClass::Video, name)?;
        let devnode = device.devnode().ok_or_else(|| ServiceError::Capture {
            device: device.name(),
            source: CaptureError::NoDevnode,
        })?;

        debug!("Capturing {} frame(s) from {}", frames, devnode.display());
        let value = self
            .source
            .capture(&devnode, frames)
            .map_err(|source| ServiceError::Capture {
                device: device.name(),
                source,
            })?;

        info!(
            "Frames captured by {} average brightness value: {}",
            device.name(),
            value
        );
        Ok(value)
    }
}
