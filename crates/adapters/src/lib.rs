pub mod camera;
pub mod codec;
pub mod export;
pub mod fs;
pub mod gemini;
pub mod jobs;
pub mod migrations;
pub mod presenters;
pub mod sqlite;

pub use camera::{default_camera, UnavailableCamera};
pub use codec::{decode_rgb, decode_thumbnail, ImageCrateJpegEncoder};
pub use export::{Font8x8Rasterizer, LopdfDocumentWriter};
pub use fs::{photo_from_bytes, FsExportSink, FsPhotoLoader, SystemClock};
pub use gemini::{GeminiConfig, GeminiReportClient};
pub use jobs::{JobResult, JobWorker};
pub use presenters::{present_add_outcome, present_export, present_report, present_usage};
pub use sqlite::SqliteUsageStore;
