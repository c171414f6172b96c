//! Capture devices.
//!
//! - [`UnavailableCamera`] when the build has no capture backend
//! - [`V4l2Camera`] for USB/V4L2 devices (feature: v4l2)

#[cfg(feature = "v4l2")]
mod v4l2;

#[cfg(feature = "v4l2")]
pub use v4l2::V4l2Camera;

use std::io;

use crashlens_application::{CameraDevice, CameraStream};
use crashlens_domain::{CameraConstraints, CameraErrorCode, CameraFailure};

/// Stands in for a camera on builds and platforms without a backend.
#[derive(Debug, Default)]
pub struct UnavailableCamera;

impl CameraDevice for UnavailableCamera {
    fn open(
        &self,
        _constraints: &CameraConstraints,
    ) -> Result<Box<dyn CameraStream>, CameraFailure> {
        Err(CameraFailure::new(
            CameraErrorCode::NotSupported,
            "this build has no camera backend",
        ))
    }
}

/// Device index `index` on this platform, or the unavailable stub.
pub fn default_camera(index: u32) -> Box<dyn CameraDevice> {
    #[cfg(feature = "v4l2")]
    {
        Box::new(V4l2Camera::new(index))
    }
    #[cfg(not(feature = "v4l2"))]
    {
        let _ = index;
        Box::new(UnavailableCamera)
    }
}

pub(crate) fn classify_io_error(error: &io::Error) -> CameraErrorCode {
    match error.kind() {
        io::ErrorKind::PermissionDenied => CameraErrorCode::PermissionDenied,
        io::ErrorKind::NotFound => CameraErrorCode::NotFound,
        io::ErrorKind::Unsupported => CameraErrorCode::NotSupported,
        _ => CameraErrorCode::Other,
    }
}
