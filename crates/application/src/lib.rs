mod camera;
mod error;
mod export;
mod ports;
mod request;
mod service;
mod session;
mod usage;
mod use_cases;

pub use camera::{CameraSession, CapturedStill, OpenTicket};
pub use error::ApplicationError;
pub use export::{ExportedReport, ReportExportService, PAGE_JPEG_QUALITY};
pub use ports::{
    CameraDevice, CameraStream, Clock, DocumentWriter, ExportSink, ImageEncoder, InlineImage,
    PageImage, PhotoLoader, ReportClient, ReportRasterizer, ReportRequest, UsageStore,
};
pub use request::{ReportRequestService, REPORT_INSTRUCTION, RESPONSE_MIME_TYPE};
pub use service::ApplicationService;
pub use session::{ExportTicket, GenerationTicket, ReportSession};
pub use usage::UsageGovernor;
pub use use_cases::{
    ExportReportCommand, GenerateReportCommand, LoadPhotosCommand, OpenCameraCommand,
};
