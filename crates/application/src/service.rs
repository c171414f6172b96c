use std::sync::Arc;

use crashlens_domain::{CameraFailure, ImageBlob, ReportData};
use tracing::info;

use crate::{
    ApplicationError, CameraDevice, CameraSession, CameraStream, Clock, ExportReportCommand,
    ExportedReport, GenerateReportCommand, ImageEncoder, LoadPhotosCommand, OpenCameraCommand,
    PhotoLoader, ReportExportService, ReportRequestService,
};

/// Entry point the drivers talk to. Cheap to clone so jobs can carry it onto
/// a worker thread.
#[derive(Clone)]
pub struct ApplicationService {
    loader: Arc<dyn PhotoLoader>,
    requests: ReportRequestService,
    exports: ReportExportService,
    camera: Arc<dyn CameraDevice>,
    encoder: Arc<dyn ImageEncoder>,
    clock: Arc<dyn Clock>,
}

impl ApplicationService {
    pub fn new(
        loader: Arc<dyn PhotoLoader>,
        requests: ReportRequestService,
        exports: ReportExportService,
        camera: Arc<dyn CameraDevice>,
        encoder: Arc<dyn ImageEncoder>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            loader,
            requests,
            exports,
            camera,
            encoder,
            clock,
        }
    }

    /// Files and folders in argument order; folders expand in path order.
    pub fn load_photos(
        &self,
        command: LoadPhotosCommand,
    ) -> Result<Vec<ImageBlob>, ApplicationError> {
        if command.paths.is_empty() {
            return Err(ApplicationError::InvalidInput(
                "at least one photo path is required".to_string(),
            ));
        }

        let mut photos = Vec::new();
        for path in &command.paths {
            if path.as_os_str().is_empty() {
                return Err(ApplicationError::InvalidInput(
                    "photo path must not be empty".to_string(),
                ));
            }
            let loaded = self.loader.load(path)?;
            info!(path = %path.display(), photos = loaded.len(), "photos loaded");
            photos.extend(loaded);
        }
        Ok(photos)
    }

    pub fn generate_report(
        &self,
        command: GenerateReportCommand,
    ) -> Result<ReportData, ApplicationError> {
        self.requests.generate(&command.photos)
    }

    pub fn export_report(
        &self,
        command: ExportReportCommand,
    ) -> Result<ExportedReport, ApplicationError> {
        self.exports.export(&command.report)
    }

    pub fn open_camera(
        &self,
        command: OpenCameraCommand,
    ) -> Result<Box<dyn CameraStream>, CameraFailure> {
        self.camera.open(&command.constraints)
    }

    pub fn camera_session(&self) -> CameraSession {
        CameraSession::new(Arc::clone(&self.encoder))
    }

    pub fn confirm_capture(
        &self,
        session: &mut CameraSession,
    ) -> Result<ImageBlob, ApplicationError> {
        session.confirm(self.clock.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use crashlens_domain::{CameraConstraints, CameraErrorCode, PhotoKey, RasterFrame};

    use super::*;
    use crate::export::tests::{report, service as export_service, FixedClock, MemorySink};
    use crate::{ReportClient, ReportRequest};

    struct FakeLoader;

    impl PhotoLoader for FakeLoader {
        fn load(&self, path: &Path) -> Result<Vec<ImageBlob>, ApplicationError> {
            let name = path.display().to_string();
            if name.ends_with("missing.jpg") {
                return Err(ApplicationError::Io(format!("{name}: not found")));
            }
            let count = if name.ends_with('/') { 2 } else { 1 };
            Ok((0..count)
                .map(|i| {
                    ImageBlob::new(PhotoKey::new(format!("{name}{i}"), 0), "image/png", vec![1])
                        .expect("blob")
                })
                .collect())
        }
    }

    struct EchoClient;

    impl ReportClient for EchoClient {
        fn complete(&self, request: &ReportRequest) -> Result<String, ApplicationError> {
            Ok(format!(
                r#"{{"summary":"{} fotos","probable_cause":"-","vehicles":[]}}"#,
                request.images.len()
            ))
        }
    }

    struct NoCamera;

    impl CameraDevice for NoCamera {
        fn open(
            &self,
            _constraints: &CameraConstraints,
        ) -> Result<Box<dyn CameraStream>, CameraFailure> {
            Err(CameraFailure::new(CameraErrorCode::NotFound, "no /dev/video0"))
        }
    }

    struct NullEncoder;

    impl ImageEncoder for NullEncoder {
        fn encode_jpeg(
            &self,
            _frame: &RasterFrame,
            _quality: u8,
        ) -> Result<Vec<u8>, ApplicationError> {
            Ok(vec![0xFF, 0xD8, 0xFF, 0xD9])
        }
    }

    fn app() -> ApplicationService {
        ApplicationService::new(
            Arc::new(FakeLoader),
            ReportRequestService::new(Arc::new(EchoClient)),
            export_service(100, Arc::new(MemorySink::default())),
            Arc::new(NoCamera),
            Arc::new(NullEncoder),
            Arc::new(FixedClock),
        )
    }

    #[test]
    fn load_photos_concatenates_in_argument_order() {
        let photos = app()
            .load_photos(LoadPhotosCommand {
                paths: vec![PathBuf::from("a.jpg"), PathBuf::from("dir/")],
            })
            .expect("load");
        let names: Vec<_> = photos.iter().map(|photo| photo.name().to_string()).collect();
        assert_eq!(names, vec!["a.jpg0", "dir/0", "dir/1"]);
    }

    #[test]
    fn load_photos_rejects_empty_input_and_propagates_io() {
        assert!(matches!(
            app().load_photos(LoadPhotosCommand { paths: Vec::new() }),
            Err(ApplicationError::InvalidInput(_))
        ));
        assert!(matches!(
            app().load_photos(LoadPhotosCommand {
                paths: vec![PathBuf::from("missing.jpg")]
            }),
            Err(ApplicationError::Io(_))
        ));
    }

    #[test]
    fn generate_and_export_go_through_their_services() {
        let app = app();
        let photos = app
            .load_photos(LoadPhotosCommand {
                paths: vec![PathBuf::from("dir/")],
            })
            .expect("load");
        let generated = app
            .generate_report(GenerateReportCommand { photos })
            .expect("generate");
        assert_eq!(generated.summary, "2 fotos");

        let exported = app
            .export_report(ExportReportCommand { report: report() })
            .expect("export");
        assert_eq!(exported.pages, 1);
    }

    #[test]
    fn camera_errors_surface_classified() {
        let failure = app()
            .open_camera(OpenCameraCommand::default())
            .err()
            .expect("no camera");
        assert_eq!(failure.code, CameraErrorCode::NotFound);
    }
}
