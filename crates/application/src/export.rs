use std::path::PathBuf;
use std::sync::Arc;

use crashlens_domain::{
    export_file_name, plan_pages, report_blocks, PageFormat, ReportData, EXPORT_BACKGROUND,
    EXPORT_SCALE,
};
use tracing::{debug, info};

use crate::{
    ApplicationError, Clock, DocumentWriter, ExportSink, ImageEncoder, PageImage,
    ReportRasterizer,
};

pub const PAGE_JPEG_QUALITY: u8 = 92;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedReport {
    pub path: PathBuf,
    pub file_name: String,
    pub pages: usize,
    pub bytes: usize,
}

/// Rasterizes a report, cuts it into pages and writes the document.
#[derive(Clone)]
pub struct ReportExportService {
    rasterizer: Arc<dyn ReportRasterizer>,
    encoder: Arc<dyn ImageEncoder>,
    writer: Arc<dyn DocumentWriter>,
    sink: Arc<dyn ExportSink>,
    clock: Arc<dyn Clock>,
    format: PageFormat,
}

impl ReportExportService {
    pub fn new(
        rasterizer: Arc<dyn ReportRasterizer>,
        encoder: Arc<dyn ImageEncoder>,
        writer: Arc<dyn DocumentWriter>,
        sink: Arc<dyn ExportSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rasterizer,
            encoder,
            writer,
            sink,
            clock,
            format: PageFormat::A4,
        }
    }

    pub fn export(&self, report: &ReportData) -> Result<ExportedReport, ApplicationError> {
        let blocks = report_blocks(report);
        let raster = self
            .rasterizer
            .rasterize(&blocks, EXPORT_SCALE, EXPORT_BACKGROUND)?;
        debug!(
            width = raster.width(),
            height = raster.height(),
            "report rasterized"
        );

        let slices = plan_pages(raster.width(), raster.height(), self.format);
        if slices.is_empty() {
            return Err(ApplicationError::Export(
                "el informe no produjo ninguna página".to_string(),
            ));
        }

        let mut pages = Vec::with_capacity(slices.len());
        for slice in slices {
            let band = raster.crop_rows(slice.src_y, slice.src_height);
            let jpeg = self.encoder.encode_jpeg(&band, PAGE_JPEG_QUALITY)?;
            pages.push(PageImage {
                jpeg,
                width_px: band.width(),
                height_px: band.height(),
                slice,
            });
        }

        let document = self.writer.write_pdf(&pages, self.format)?;
        let file_name = export_file_name(&self.clock.file_timestamp());
        let path = self.sink.save(&file_name, &document)?;
        info!(
            path = %path.display(),
            pages = pages.len(),
            bytes = document.len(),
            "report exported"
        );

        Ok(ExportedReport {
            path,
            file_name,
            pages: pages.len(),
            bytes: document.len(),
        })
    }
}
