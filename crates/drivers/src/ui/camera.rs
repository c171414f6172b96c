use std::time::Duration;

use crashlens_adapters::{decode_rgb, JobWorker};
use crashlens_application::{
    ApplicationService, CameraSession, CameraStream, CapturedStill, OpenCameraCommand,
    OpenTicket,
};
use crashlens_domain::{CameraConstraints, CameraFailure, CameraState, ImageBlob, RasterFrame};
use eframe::egui::{self, RichText};
use tracing::warn;

use super::textures::upload_frame;

type OpenJob = (OpenTicket, CameraConstraints);
type OpenReply = (OpenTicket, Result<Box<dyn CameraStream>, CameraFailure>);

const PREVIEW_MAX: egui::Vec2 = egui::vec2(640.0, 360.0);

/// The capture modal. Device acquisition runs on its own worker so the
/// window keeps painting while the driver negotiates the stream.
pub struct CameraModal {
    session: CameraSession,
    opener: JobWorker<OpenJob, OpenReply>,
    visible: bool,
    viewfinder: Option<egui::TextureHandle>,
    still: Option<egui::TextureHandle>,
    notice: Option<String>,
}

impl CameraModal {
    pub fn new(service: &ApplicationService) -> Result<Self, String> {
        let worker_service = service.clone();
        let opener = JobWorker::spawn("camera-open", move |(ticket, constraints): OpenJob| {
            (
                ticket,
                worker_service.open_camera(OpenCameraCommand { constraints }),
            )
        })
        .map_err(|error| format!("failed to start camera worker: {error}"))?;

        Ok(Self {
            session: service.camera_session(),
            opener,
            visible: false,
            viewfinder: None,
            still: None,
            notice: None,
        })
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn open(&mut self) {
        self.visible = true;
        self.notice = None;
        match self.session.begin_open() {
            Ok(ticket) => self.request(ticket),
            Err(error) => self.notice = Some(error.user_message()),
        }
    }

    pub fn close(&mut self) {
        self.session.close();
        self.visible = false;
        self.viewfinder = None;
        self.still = None;
        self.notice = None;
    }

    /// Applies finished acquisitions and refreshes the viewfinder. Runs every
    /// frame, also while hidden, so late streams get released.
    pub fn poll(&mut self, ctx: &egui::Context) {
        loop {
            match self.opener.try_receive() {
                Ok(Some(result)) => {
                    let (ticket, reply) = result.output;
                    self.session.complete_open(ticket, reply);
                }
                Ok(None) => break,
                Err(error) => {
                    warn!(error = %error, "camera worker unavailable");
                    break;
                }
            }
        }

        match self.session.state() {
            CameraState::Live => {
                match self.session.poll_preview() {
                    Ok(Some(frame)) => {
                        upload_frame(ctx, &mut self.viewfinder, "viewfinder", &frame)
                    }
                    Ok(None) => {}
                    Err(error) => warn!(error = %error, "viewfinder frame lost"),
                }
                ctx.request_repaint();
            }
            CameraState::Requesting => ctx.request_repaint_after(Duration::from_millis(50)),
            _ => {}
        }
    }

    /// Draws the modal. Returns the confirmed photo, if any.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        service: &ApplicationService,
    ) -> Option<ImageBlob> {
        if !self.visible {
            return None;
        }

        let mut confirmed = None;
        let mut close = false;
        let response = egui::Modal::new(egui::Id::new("camera-modal")).show(ctx, |ui| {
            ui.set_max_width(PREVIEW_MAX.x);
            ui.heading("Tomar foto");
            ui.add_space(6.0);

            match self.session.state() {
                CameraState::Idle | CameraState::Requesting => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Iniciando cámara...");
                    });
                }
                CameraState::Live => {
                    if let Some(texture) = &self.viewfinder {
                        ui.add(egui::Image::new(texture).max_size(PREVIEW_MAX));
                    }
                    if ui.button("Capturar").clicked() {
                        self.capture(ctx);
                    }
                }
                CameraState::Captured => {
                    if let Some(texture) = &self.still {
                        ui.add(egui::Image::new(texture).max_size(PREVIEW_MAX));
                    }
                    ui.horizontal(|ui| {
                        if ui.button("Volver a tomar").clicked() {
                            self.retake();
                        }
                        if ui.button("Usar foto").clicked() {
                            match service.confirm_capture(&mut self.session) {
                                Ok(photo) => {
                                    confirmed = Some(photo);
                                    close = true;
                                }
                                Err(error) => self.notice = Some(error.user_message()),
                            }
                        }
                    });
                }
                CameraState::Error => {
                    if let Some(failure) = self.session.failure() {
                        ui.colored_label(ui.visuals().error_fg_color, failure.user_message());
                    }
                    if ui.button("Reintentar").clicked() {
                        self.open();
                    }
                }
            }

            if let Some(notice) = &self.notice {
                ui.label(RichText::new(notice).color(ui.visuals().error_fg_color));
            }
            ui.separator();
            if ui.button("Cerrar").clicked() {
                close = true;
            }
        });

        if close || response.should_close() {
            self.close();
        }
        confirmed
    }

    fn request(&mut self, ticket: OpenTicket) {
        if let Err(error) = self.opener.submit((ticket, self.session.constraints())) {
            self.notice = Some(error.user_message());
        }
    }

    fn capture(&mut self, ctx: &egui::Context) {
        match self.session.capture() {
            Ok(()) => {
                self.viewfinder = None;
                if let Some(still) = self.session.still() {
                    let preview = still_preview(still);
                    upload_frame(ctx, &mut self.still, "camera-still", &preview);
                }
            }
            // An Error state already shows its failure message.
            Err(_) if self.session.state() == CameraState::Error => self.viewfinder = None,
            Err(error) => self.notice = Some(error.user_message()),
        }
    }

    fn retake(&mut self) {
        self.still = None;
        match self.session.retake() {
            Ok(ticket) => self.request(ticket),
            Err(error) => self.notice = Some(error.user_message()),
        }
    }
}

/// The still as it will be sent, decoded from its JPEG preview. Falls back to
/// the raw frame when the preview cannot be decoded.
fn still_preview(still: &CapturedStill) -> RasterFrame {
    match decode_rgb(&still.preview_jpeg) {
        Ok(frame) => frame,
        Err(error) => {
            warn!(error = %error, "still preview undecodable, showing raw frame");
            still.frame.clone()
        }
    }
}
