use std::path::{Path, PathBuf};

use crashlens_domain::{
    CameraConstraints, CameraFailure, ImageBlob, PageFormat, PageSlice, RasterFrame, ReportBlock,
};

use crate::ApplicationError;

/// Device-local key/value slot holding the raw usage counter text.
pub trait UsageStore {
    fn read(&self) -> Result<Option<String>, ApplicationError>;

    fn write(&self, value: &str) -> Result<(), ApplicationError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data_base64: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub instruction: String,
    pub images: Vec<InlineImage>,
    pub response_mime_type: &'static str,
}

impl ReportRequest {
    pub fn payload_bytes(&self) -> usize {
        self.images.iter().map(|image| image.data_base64.len()).sum()
    }
}

/// One round-trip to the generative model. Returns the raw response text.
pub trait ReportClient: Send + Sync {
    fn complete(&self, request: &ReportRequest) -> Result<String, ApplicationError>;
}

pub trait CameraDevice: Send + Sync {
    fn open(
        &self,
        constraints: &CameraConstraints,
    ) -> Result<Box<dyn CameraStream>, CameraFailure>;
}

/// A live capture stream. `stop` must be idempotent and release the device.
pub trait CameraStream: Send {
    fn resolution(&self) -> (u32, u32);

    fn grab_frame(&mut self) -> Result<RasterFrame, CameraFailure>;

    fn stop(&mut self);

    fn is_live(&self) -> bool;
}

pub trait ImageEncoder: Send + Sync {
    fn encode_jpeg(&self, frame: &RasterFrame, quality: u8) -> Result<Vec<u8>, ApplicationError>;
}

pub trait ReportRasterizer: Send + Sync {
    fn rasterize(
        &self,
        blocks: &[ReportBlock],
        scale: u32,
        background: u32,
    ) -> Result<RasterFrame, ApplicationError>;
}

#[derive(Debug, Clone)]
pub struct PageImage {
    pub jpeg: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
    pub slice: PageSlice,
}

pub trait DocumentWriter: Send + Sync {
    fn write_pdf(
        &self,
        pages: &[PageImage],
        format: PageFormat,
    ) -> Result<Vec<u8>, ApplicationError>;
}

pub trait ExportSink: Send + Sync {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ApplicationError>;
}

/// Turns a file or a folder into photos, in path order.
pub trait PhotoLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Vec<ImageBlob>, ApplicationError>;
}

pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;

    /// Local time formatted for file names, e.g. `20261016-153000`.
    fn file_timestamp(&self) -> String;
}
