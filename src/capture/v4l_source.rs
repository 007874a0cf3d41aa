use std::path::Path;

use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, FourCC};

use super::{CaptureError, FrameSource, PixelLayout, SampleSet, frame_brightness};
use crate::config::CaptureConfig;

/// Grabs frames through the V4L2 mmap streaming API
#[derive(Debug, Clone)]
pub struct V4lFrameSource {
    width: u32,
    height: u32,
    buffers: u32,
}

impl V4lFrameSource {
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            buffers: config.buffers,
        }
    }

    /// Ask for a small greyscale format and report what the driver settled on
    fn configure(&self, device: &Device) -> Result<PixelLayout, CaptureError> {
        let mut format = device.format().map_err(CaptureError::Format)?;
        format.width = self.width;
        format.height = self.height;
        format.fourcc = FourCC::new(b"GREY");

        let format = match device.set_format(&format) {
            Ok(format) => format,
            Err(e) => {
                debug!("Driver rejected GREY {}x{}: {}", self.width, self.height, e);
                device.format().map_err(CaptureError::Format)?
            }
        };

        debug!(
            "Capturing {}x{} {}",
            format.width,
            format.height,
            String::from_utf8_lossy(&format.fourcc.repr)
        );

        PixelLayout::from_fourcc(&format.fourcc.repr).ok_or_else(|| {
            CaptureError::UnsupportedFormat(String::from_utf8_lossy(&format.fourcc.repr).into_owned())
        })
    }
}

impl FrameSource for V4lFrameSource {
    fn capture(&mut self, devnode: &Path, frames: u32) -> Result<f64, CaptureError> {
        let device = Device::with_path(devnode).map_err(|source| CaptureError::Open {
            path: devnode.to_path_buf(),
            source,
        })?;
        let layout = self.configure(&device)?;

        let mut stream = Stream::with_buffers(&device, Type::VideoCapture, self.buffers)
            .map_err(CaptureError::Read)?;

        let mut samples = SampleSet::with_capacity(frames as usize);
        for _ in 0..frames {
            let (buffer, meta) = stream.next().map_err(CaptureError::Read)?;
            let used = match meta.bytesused as usize {
                0 => buffer.len(),
                n => n.min(buffer.len()),
            };
            let brightness =
                frame_brightness(&buffer[..used], layout).ok_or(CaptureError::EmptyFrame)?;
            samples.push(brightness);
        }

        trace!("Collected {} frame sample(s)", samples.len());
        samples.average().ok_or(CaptureError::NoFrames)
    }
}
