use crashlens_domain::{
    retain_images, valid_photo_count, AddOutcome, BlobId, ImageBlob, PhotoCollection, ReportData,
    UsageCounter,
};
use tracing::{debug, info, warn};

use crate::{ApplicationError, ExportedReport, UsageGovernor};

/// Handed out when a generation starts. The worker sends the result back
/// with `seq` so a reset in between can be detected.
#[derive(Debug, Clone)]
pub struct GenerationTicket {
    pub seq: u64,
    pub photos: Vec<ImageBlob>,
}

#[derive(Debug, Clone)]
pub struct ExportTicket {
    pub seq: u64,
    pub report: ReportData,
}

/// Top-level state of one report workflow: the queued photos, the current
/// report, the usage counter and the busy flags gating the two long
/// operations.
pub struct ReportSession {
    photos: PhotoCollection,
    report: Option<ReportData>,
    governor: UsageGovernor,
    usage: UsageCounter,
    error: Option<String>,
    alert: Option<String>,
    last_export: Option<ExportedReport>,
    next_seq: u64,
    generating: Option<u64>,
    exporting: Option<u64>,
}

impl ReportSession {
    pub fn new(governor: UsageGovernor) -> Self {
        let usage = governor.read();
        info!(count = usage.get(), remaining = usage.remaining(), "usage counter loaded");
        Self {
            photos: PhotoCollection::new(),
            report: None,
            governor,
            usage,
            error: None,
            alert: None,
            last_export: None,
            next_seq: 0,
            generating: None,
            exporting: None,
        }
    }

    pub fn photos(&self) -> &[ImageBlob] {
        self.photos.as_slice()
    }

    pub fn report(&self) -> Option<&ReportData> {
        self.report.as_ref()
    }

    pub fn usage(&self) -> UsageCounter {
        self.usage
    }

    pub fn remaining_uses(&self) -> u32 {
        self.governor.remaining(self.usage)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_export(&self) -> Option<&ExportedReport> {
        self.last_export.as_ref()
    }

    pub fn is_generating(&self) -> bool {
        self.generating.is_some()
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.is_some()
    }

    /// Blocking alert to show once, then forget.
    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    pub fn add_photos(
        &mut self,
        candidates: Vec<ImageBlob>,
    ) -> Result<AddOutcome, ApplicationError> {
        self.ensure_idle_photos()?;
        self.error = None;
        let outcome = self.photos.add(candidates);
        info!(
            added = outcome.added,
            replaced = outcome.replaced,
            dropped = outcome.dropped,
            total = self.photos.len(),
            "photos added"
        );
        if let Some(warning) = outcome.warning() {
            self.error = Some(warning.to_string());
        }
        Ok(outcome)
    }

    /// Drop-zone entry point: non-image payloads are discarded first.
    pub fn add_dropped(
        &mut self,
        candidates: Vec<ImageBlob>,
    ) -> Result<AddOutcome, ApplicationError> {
        let offered = candidates.len();
        let images = retain_images(candidates);
        if images.len() != offered {
            debug!(discarded = offered - images.len(), "non-image drops discarded");
        }
        self.add_photos(images)
    }

    pub fn remove_photo(&mut self, id: BlobId) -> Result<bool, ApplicationError> {
        self.ensure_idle_photos()?;
        Ok(self.photos.remove(id))
    }

    pub fn clear_photos(&mut self) -> Result<(), ApplicationError> {
        self.ensure_idle_photos()?;
        self.photos.clear();
        Ok(())
    }

    pub fn can_generate(&self) -> bool {
        self.generating.is_none()
            && valid_photo_count(self.photos.len())
            && self.governor.can_proceed(self.usage)
    }

    /// Pre-flight checks, photo count first and then the usage cap. A
    /// refusal is also stored as the inline error.
    pub fn begin_generation(&mut self) -> Result<GenerationTicket, ApplicationError> {
        if self.generating.is_some() {
            return Err(ApplicationError::Busy("report generation"));
        }
        if !valid_photo_count(self.photos.len()) {
            return Err(self.refuse(ApplicationError::photo_count(self.photos.len())));
        }
        if !self.governor.can_proceed(self.usage) {
            return Err(self.refuse(ApplicationError::usage_limit()));
        }

        let seq = self.bump_seq();
        self.generating = Some(seq);
        self.report = None;
        self.error = None;
        info!(seq, photos = self.photos.len(), "report generation started");
        Ok(GenerationTicket {
            seq,
            photos: self.photos.to_vec(),
        })
    }

    /// Applies a generation result. Usage is recorded for every success,
    /// even one whose ticket was invalidated by [`reset`](Self::reset); the
    /// report is only shown when the ticket is still current. Returns
    /// whether a report is now displayed.
    pub fn finish_generation(
        &mut self,
        seq: u64,
        result: Result<ReportData, ApplicationError>,
    ) -> bool {
        let current = self.generating == Some(seq);
        if current {
            self.generating = None;
        }

        match result {
            Ok(report) => {
                self.usage = self.governor.record_success(self.usage);
                if current {
                    self.report = Some(report);
                } else {
                    debug!(seq, "report from a reset session discarded");
                }
                current
            }
            Err(error) => {
                warn!(seq, error = %error, "report generation failed");
                if current {
                    self.error = Some(error.user_message());
                }
                false
            }
        }
    }

    pub fn reset(&mut self) {
        self.photos.clear();
        self.report = None;
        self.error = None;
        self.alert = None;
        self.last_export = None;
        self.generating = None;
        self.exporting = None;
        info!("session reset");
    }

    pub fn begin_export(&mut self) -> Result<ExportTicket, ApplicationError> {
        if self.exporting.is_some() {
            return Err(ApplicationError::Busy("export"));
        }
        let Some(report) = self.report.clone() else {
            return Err(ApplicationError::InvalidInput(
                "no report to export".to_string(),
            ));
        };
        let seq = self.bump_seq();
        self.exporting = Some(seq);
        Ok(ExportTicket { seq, report })
    }

    /// Re-enables export whatever the outcome; a failure becomes the alert.
    pub fn finish_export(&mut self, seq: u64, result: Result<ExportedReport, ApplicationError>) {
        if self.exporting != Some(seq) {
            debug!(seq, "stale export result ignored");
            return;
        }
        self.exporting = None;
        match result {
            Ok(exported) => self.last_export = Some(exported),
            Err(error) => {
                warn!(error = %error, "export failed");
                let error = match error {
                    ApplicationError::Export(_) => error,
                    other => ApplicationError::Export(other.to_string()),
                };
                self.alert = Some(error.user_message());
            }
        }
    }

    fn ensure_idle_photos(&self) -> Result<(), ApplicationError> {
        if self.generating.is_some() {
            return Err(ApplicationError::Busy("report generation"));
        }
        Ok(())
    }

    fn refuse(&mut self, error: ApplicationError) -> ApplicationError {
        warn!(error = %error, "report generation refused");
        self.error = Some(error.user_message());
        error
    }

    fn bump_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}
