use std::path::PathBuf;

use crashlens_domain::{CameraConstraints, ImageBlob, ReportData};

#[derive(Debug, Clone)]
pub struct LoadPhotosCommand {
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct GenerateReportCommand {
    pub photos: Vec<ImageBlob>,
}

#[derive(Debug, Clone)]
pub struct ExportReportCommand {
    pub report: ReportData,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenCameraCommand {
    pub constraints: CameraConstraints,
}
