mod camera;
mod collection;
mod error;
mod export;
mod image;
mod layout;
mod raster;
mod report;
mod usage;

pub use camera::{
    CameraConstraints, CameraErrorCode, CameraFailure, CameraState, FacingMode,
    CAPTURE_JPEG_QUALITY,
};
pub use collection::{
    retain_images, valid_photo_count, AddOutcome, PhotoCollection, MAX_PHOTOS,
    OVER_LIMIT_WARNING,
};
pub use error::DomainError;
pub use export::{
    export_file_name, plan_pages, PageFormat, PageSlice, EXPORT_BACKGROUND, EXPORT_SCALE,
};
pub use image::{is_image_mime, BlobId, ImageBlob, PhotoKey, CAPTURE_MIME_TYPE};
pub use layout::{report_blocks, ReportBlock, DISCLAIMER_TEXT};
pub use raster::RasterFrame;
pub use report::{parse_report_text, strip_code_fence, ReportData, VehicleAnalysis};
pub use usage::{UsageCounter, USAGE_COUNT_KEY, USAGE_LIMIT};
