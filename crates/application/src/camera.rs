use std::sync::Arc;

use crashlens_domain::{
    CameraConstraints, CameraFailure, CameraState, ImageBlob, RasterFrame, CAPTURE_JPEG_QUALITY,
};
use tracing::{debug, info, warn};

use crate::{ApplicationError, CameraDevice, CameraStream, Clock, ImageEncoder};

/// Identifies one stream acquisition. Results carrying an outdated ticket
/// are released instead of applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenTicket {
    generation: u64,
}

#[derive(Debug, Clone)]
pub struct CapturedStill {
    pub frame: RasterFrame,
    pub preview_jpeg: Vec<u8>,
}

/// Camera capture lifecycle. Owns at most one live stream and releases it on
/// capture, close, failure and drop.
pub struct CameraSession {
    constraints: CameraConstraints,
    encoder: Arc<dyn ImageEncoder>,
    state: CameraState,
    generation: u64,
    stream: Option<Box<dyn CameraStream>>,
    still: Option<CapturedStill>,
    failure: Option<CameraFailure>,
}

impl CameraSession {
    pub fn new(encoder: Arc<dyn ImageEncoder>) -> Self {
        Self::with_constraints(encoder, CameraConstraints::default())
    }

    pub fn with_constraints(
        encoder: Arc<dyn ImageEncoder>,
        constraints: CameraConstraints,
    ) -> Self {
        Self {
            constraints,
            encoder,
            state: CameraState::Idle,
            generation: 0,
            stream: None,
            still: None,
            failure: None,
        }
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    pub fn constraints(&self) -> CameraConstraints {
        self.constraints
    }

    pub fn failure(&self) -> Option<&CameraFailure> {
        self.failure.as_ref()
    }

    pub fn still(&self) -> Option<&CapturedStill> {
        self.still.as_ref()
    }

    pub fn has_live_stream(&self) -> bool {
        self.stream.as_ref().is_some_and(|stream| stream.is_live())
    }

    /// Moves to `Requesting`. Valid from `Idle` and `Error` (a retry).
    pub fn begin_open(&mut self) -> Result<OpenTicket, ApplicationError> {
        match self.state {
            CameraState::Idle | CameraState::Error => Ok(self.request_stream()),
            state => Err(ApplicationError::CameraState {
                action: "open",
                state,
            }),
        }
    }

    /// Applies the outcome of an acquisition. Returns false when the ticket
    /// is stale, in which case a successfully opened stream is stopped.
    pub fn complete_open(
        &mut self,
        ticket: OpenTicket,
        result: Result<Box<dyn CameraStream>, CameraFailure>,
    ) -> bool {
        if ticket.generation != self.generation || self.state != CameraState::Requesting {
            if let Ok(mut late) = result {
                late.stop();
            }
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "dropping stale camera acquisition"
            );
            return false;
        }

        match result {
            Ok(stream) => {
                let (width, height) = stream.resolution();
                info!(width, height, "camera stream live");
                self.stream = Some(stream);
                self.state = CameraState::Live;
            }
            Err(failure) => {
                warn!(error = %failure, "camera acquisition failed");
                self.failure = Some(failure);
                self.state = CameraState::Error;
            }
        }
        true
    }

    pub fn open_with(&mut self, device: &dyn CameraDevice) -> Result<(), ApplicationError> {
        let ticket = self.begin_open()?;
        self.acquire(ticket, device)
    }

    /// Grabs the current frame for the viewfinder while `Live`.
    pub fn poll_preview(&mut self) -> Result<Option<RasterFrame>, ApplicationError> {
        if self.state != CameraState::Live {
            return Ok(None);
        }
        let Some(stream) = self.stream.as_mut() else {
            return Ok(None);
        };
        match stream.grab_frame() {
            Ok(frame) => Ok(Some(frame)),
            Err(failure) => Err(self.fail(failure)),
        }
    }

    /// Takes a still at the stream's native size and releases the device.
    pub fn capture(&mut self) -> Result<(), ApplicationError> {
        if self.state != CameraState::Live {
            return Err(ApplicationError::CameraState {
                action: "capture",
                state: self.state,
            });
        }
        let grabbed = match self.stream.as_mut() {
            Some(stream) => stream.grab_frame(),
            None => Err(CameraFailure::new(
                crashlens_domain::CameraErrorCode::Other,
                "stream vanished before capture",
            )),
        };
        self.release_stream();

        let frame = grabbed.map_err(|failure| self.fail(failure))?;
        let preview_jpeg = match self.encoder.encode_jpeg(&frame, CAPTURE_JPEG_QUALITY) {
            Ok(jpeg) => jpeg,
            Err(error) => {
                return Err(self.fail(CameraFailure::new(
                    crashlens_domain::CameraErrorCode::Other,
                    error.to_string(),
                )))
            }
        };
        info!(
            width = frame.width(),
            height = frame.height(),
            "camera still captured"
        );
        self.still = Some(CapturedStill {
            frame,
            preview_jpeg,
        });
        self.state = CameraState::Captured;
        Ok(())
    }

    /// Discards the still and asks for a fresh stream.
    pub fn retake(&mut self) -> Result<OpenTicket, ApplicationError> {
        if self.state != CameraState::Captured {
            return Err(ApplicationError::CameraState {
                action: "retake",
                state: self.state,
            });
        }
        self.still = None;
        Ok(self.request_stream())
    }

    pub fn retake_with(&mut self, device: &dyn CameraDevice) -> Result<(), ApplicationError> {
        let ticket = self.retake()?;
        self.acquire(ticket, device)
    }

    /// Encodes the still as a JPEG photo and closes the session.
    pub fn confirm(&mut self, clock: &dyn Clock) -> Result<ImageBlob, ApplicationError> {
        let Some(still) = self.still.as_ref() else {
            return Err(ApplicationError::CameraState {
                action: "confirm",
                state: self.state,
            });
        };
        let jpeg = self.encoder.encode_jpeg(&still.frame, CAPTURE_JPEG_QUALITY)?;
        let photo = ImageBlob::capture(clock.now_millis(), jpeg)?;
        info!(name = photo.name(), bytes = photo.len(), "camera photo confirmed");
        self.close();
        Ok(photo)
    }

    /// Ends the session from any state.
    pub fn close(&mut self) {
        self.release_stream();
        self.still = None;
        self.failure = None;
        self.generation += 1;
        self.state = CameraState::Idle;
    }

    fn request_stream(&mut self) -> OpenTicket {
        self.release_stream();
        self.failure = None;
        self.generation += 1;
        self.state = CameraState::Requesting;
        OpenTicket {
            generation: self.generation,
        }
    }

    fn acquire(
        &mut self,
        ticket: OpenTicket,
        device: &dyn CameraDevice,
    ) -> Result<(), ApplicationError> {
        let result = device.open(&self.constraints);
        self.complete_open(ticket, result);
        match &self.failure {
            Some(failure) => Err(failure.clone().into()),
            None => Ok(()),
        }
    }

    fn fail(&mut self, failure: CameraFailure) -> ApplicationError {
        warn!(error = %failure, "camera stream failed");
        self.release_stream();
        self.failure = Some(failure.clone());
        self.state = CameraState::Error;
        failure.into()
    }

    fn release_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            info!("camera stream released");
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.release_stream();
    }
}
