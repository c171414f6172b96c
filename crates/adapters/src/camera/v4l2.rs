use crashlens_application::{CameraDevice, CameraStream};
use crashlens_domain::{CameraConstraints, CameraErrorCode, CameraFailure, RasterFrame};
use tracing::{debug, info};
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, FourCC};

use super::classify_io_error;
use crate::codec::decode_rgb;

const BUFFER_COUNT: u32 = 4;

/// `/dev/video<index>` in MJPEG, falling back to whatever size the driver
/// negotiates.
#[derive(Debug, Clone, Copy)]
pub struct V4l2Camera {
    index: usize,
}

impl V4l2Camera {
    pub fn new(index: u32) -> Self {
        Self {
            index: index as usize,
        }
    }
}

impl CameraDevice for V4l2Camera {
    fn open(
        &self,
        constraints: &CameraConstraints,
    ) -> Result<Box<dyn CameraStream>, CameraFailure> {
        let io_failure = |error: std::io::Error| {
            CameraFailure::new(classify_io_error(&error), error.to_string())
        };

        let device = Device::new(self.index).map_err(io_failure)?;
        let mut format = device.format().map_err(io_failure)?;
        format.width = constraints.ideal_width;
        format.height = constraints.ideal_height;
        format.fourcc = FourCC::new(b"MJPG");
        let format = device.set_format(&format).map_err(io_failure)?;
        if format.fourcc != FourCC::new(b"MJPG") {
            return Err(CameraFailure::new(
                CameraErrorCode::NotSupported,
                format!("device does not offer MJPEG (got {})", format.fourcc),
            ));
        }

        let stream =
            Stream::with_buffers(&device, Type::VideoCapture, BUFFER_COUNT).map_err(io_failure)?;
        info!(
            index = self.index,
            width = format.width,
            height = format.height,
            "v4l2 stream started"
        );

        Ok(Box::new(V4l2Stream {
            stream: Some(stream),
            _device: device,
            width: format.width,
            height: format.height,
        }))
    }
}

struct V4l2Stream {
    stream: Option<Stream<'static>>,
    _device: Device,
    width: u32,
    height: u32,
}

impl CameraStream for V4l2Stream {
    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn grab_frame(&mut self) -> Result<RasterFrame, CameraFailure> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(CameraFailure::new(CameraErrorCode::Other, "stream stopped"));
        };
        let (buffer, meta) = stream
            .next()
            .map_err(|error| CameraFailure::new(classify_io_error(&error), error.to_string()))?;
        let used = (meta.bytesused as usize).min(buffer.len());
        debug!(bytes = used, sequence = meta.sequence, "v4l2 frame");
        decode_rgb(&buffer[..used])
            .map_err(|error| CameraFailure::new(CameraErrorCode::Other, error.to_string()))
    }

    fn stop(&mut self) {
        if self.stream.take().is_some() {
            debug!("v4l2 stream stopped");
        }
    }

    fn is_live(&self) -> bool {
        self.stream.is_some()
    }
}
