mod camera;
mod report_view;
mod textures;

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crashlens_adapters::{photo_from_bytes, JobResult, JobWorker};
use crashlens_application::{
    ApplicationError, ApplicationService, ExportReportCommand, ExportTicket, ExportedReport,
    GenerateReportCommand, GenerationTicket, LoadPhotosCommand, ReportSession,
};
use crashlens_domain::{BlobId, ImageBlob, ReportData, MAX_PHOTOS, USAGE_LIMIT};
use eframe::egui::{self, Color32, RichText};
use tracing::{info, warn};

use crate::config::AppConfig;
use camera::CameraModal;
use textures::ThumbnailCache;

const WINDOW_WIDTH: f32 = 1120.0;
const WINDOW_HEIGHT: f32 = 760.0;
const SIDE_PANEL_WIDTH: f32 = 360.0;
const THUMB_DISPLAY: f32 = 96.0;
const PICKER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp"];

type GenerationReply = (u64, Result<ReportData, ApplicationError>);
type ExportReply = (u64, Result<ExportedReport, ApplicationError>);

pub fn launch_window(
    service: ApplicationService,
    session: ReportSession,
    config: &AppConfig,
) -> Result<(), String> {
    let app = CrashLensApp::new(service, session, config)?;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("CrashLens")
            .with_inner_size([WINDOW_WIDTH, WINDOW_HEIGHT])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "CrashLens",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|error| format!("failed to start UI: {error}"))
}

struct CrashLensApp {
    service: ApplicationService,
    session: ReportSession,
    generator: JobWorker<GenerationTicket, GenerationReply>,
    exporter: JobWorker<ExportTicket, ExportReply>,
    camera: CameraModal,
    thumbnails: ThumbnailCache,
    notice: Option<String>,
    alert: Option<String>,
    export_dir: PathBuf,
}

impl CrashLensApp {
    fn new(
        service: ApplicationService,
        session: ReportSession,
        config: &AppConfig,
    ) -> Result<Self, String> {
        let generate_service = service.clone();
        let generator = JobWorker::spawn("report-generation", move |ticket: GenerationTicket| {
            let result = generate_service.generate_report(GenerateReportCommand {
                photos: ticket.photos,
            });
            (ticket.seq, result)
        })
        .map_err(|error| format!("failed to start generation worker: {error}"))?;

        let export_service = service.clone();
        let exporter = JobWorker::spawn("report-export", move |ticket: ExportTicket| {
            let result = export_service.export_report(ExportReportCommand {
                report: ticket.report,
            });
            (ticket.seq, result)
        })
        .map_err(|error| format!("failed to start export worker: {error}"))?;

        let camera = CameraModal::new(&service)?;

        Ok(Self {
            service,
            session,
            generator,
            exporter,
            camera,
            thumbnails: ThumbnailCache::default(),
            notice: None,
            alert: None,
            export_dir: config.export_dir.clone(),
        })
    }

    fn pick_files(&mut self) {
        let Some(paths) = rfd::FileDialog::new()
            .set_title("Seleccione las fotos del accidente")
            .add_filter("Imágenes", PICKER_EXTENSIONS)
            .pick_files()
        else {
            return;
        };
        match self.service.load_photos(LoadPhotosCommand { paths }) {
            Ok(photos) => self.add(photos, false),
            Err(error) => self.notice = Some(error.user_message()),
        }
    }

    fn handle_drops(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|input| input.raw.dropped_files.clone());
        if dropped.is_empty() {
            return;
        }

        let mut photos = Vec::new();
        for file in dropped {
            let loaded = match (file.path, file.bytes) {
                (Some(path), _) => self
                    .service
                    .load_photos(LoadPhotosCommand { paths: vec![path] }),
                (None, Some(bytes)) => photo_from_bytes(
                    &file.name,
                    Some(file.mime.as_str()),
                    file.last_modified.map(system_time_millis).unwrap_or_default(),
                    bytes.to_vec(),
                )
                .map(|photo| vec![photo]),
                (None, None) => continue,
            };
            match loaded {
                Ok(loaded) => photos.extend(loaded),
                Err(error) => warn!(name = %file.name, error = %error, "dropped file skipped"),
            }
        }
        self.add(photos, true);
    }

    fn add(&mut self, photos: Vec<ImageBlob>, dropped: bool) {
        self.notice = None;
        let result = if dropped {
            self.session.add_dropped(photos)
        } else {
            self.session.add_photos(photos)
        };
        match result {
            Ok(_) => self.thumbnails.retain(self.session.photos()),
            Err(error) => self.notice = Some(error.user_message()),
        }
    }

    fn remove(&mut self, id: BlobId) {
        match self.session.remove_photo(id) {
            Ok(_) => self.thumbnails.retain(self.session.photos()),
            Err(error) => self.notice = Some(error.user_message()),
        }
    }

    fn clear(&mut self) {
        match self.session.clear_photos() {
            Ok(()) => self.thumbnails.clear(),
            Err(error) => self.notice = Some(error.user_message()),
        }
    }

    fn start_generation(&mut self) {
        self.notice = None;
        let Ok(ticket) = self.session.begin_generation() else {
            // The refusal is already the session's inline error.
            return;
        };
        let seq = ticket.seq;
        if let Err(error) = self.generator.submit(ticket) {
            self.session.finish_generation(seq, Err(error));
        }
    }

    fn start_export(&mut self) {
        let ticket = match self.session.begin_export() {
            Ok(ticket) => ticket,
            Err(error) => {
                self.notice = Some(error.user_message());
                return;
            }
        };
        let seq = ticket.seq;
        if let Err(error) = self.exporter.submit(ticket) {
            self.session.finish_export(seq, Err(error));
        }
    }

    fn reset(&mut self) {
        self.session.reset();
        self.camera.close();
        self.thumbnails.clear();
        self.notice = None;
        self.alert = None;
    }

    fn poll_workers(&mut self, ctx: &egui::Context) {
        while let Some(result) = receive(&self.generator) {
            let (seq, reply) = result.output;
            info!(seq, elapsed_ms = result.elapsed_ms, "generation job finished");
            self.session.finish_generation(seq, reply);
        }
        while let Some(result) = receive(&self.exporter) {
            let (seq, reply) = result.output;
            info!(seq, elapsed_ms = result.elapsed_ms, "export job finished");
            self.session.finish_export(seq, reply);
        }
        if let Some(alert) = self.session.take_alert() {
            self.alert = Some(alert);
        }
        self.camera.poll(ctx);

        if self.session.is_generating() || self.session.is_exporting() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }

    fn photos_panel(&mut self, ui: &mut egui::Ui) {
        let busy = self.session.is_generating();
        ui.heading("Fotos del accidente");
        ui.label(format!(
            "Cargue entre 1 y {MAX_PHOTOS} fotos. También puede arrastrarlas a la ventana."
        ));
        ui.add_space(6.0);

        ui.horizontal(|ui| {
            if ui
                .add_enabled(!busy, egui::Button::new("Subir fotos"))
                .clicked()
            {
                self.pick_files();
            }
            if ui
                .add_enabled(!busy && !self.camera.is_visible(), egui::Button::new("Usar cámara"))
                .clicked()
            {
                self.camera.open();
            }
            if ui
                .add_enabled(
                    !busy && !self.session.photos().is_empty(),
                    egui::Button::new("Quitar todas"),
                )
                .clicked()
            {
                self.clear();
            }
        });
        ui.label(format!("{} / {MAX_PHOTOS}", self.session.photos().len()));
        ui.separator();

        let mut removed = None;
        let ctx = ui.ctx().clone();
        egui::ScrollArea::vertical()
            .id_salt("photos")
            .max_height((ui.available_height() - 120.0).max(THUMB_DISPLAY))
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    for photo in self.session.photos() {
                        ui.vertical(|ui| {
                            ui.set_width(THUMB_DISPLAY);
                            match self.thumbnails.get(&ctx, photo) {
                                Some(texture) => {
                                    ui.add(
                                        egui::Image::new(texture)
                                            .max_size(egui::vec2(THUMB_DISPLAY, THUMB_DISPLAY)),
                                    );
                                }
                                None => {
                                    ui.label(RichText::new("(sin vista previa)").weak());
                                }
                            }
                            ui.label(RichText::new(photo.name()).small());
                            if ui
                                .add_enabled(!busy, egui::Button::new("Quitar").small())
                                .clicked()
                            {
                                removed = Some(photo.id());
                            }
                        });
                    }
                });
            });
        if let Some(id) = removed {
            self.remove(id);
        }

        ui.separator();
        let remaining = self.session.remaining_uses();
        let can_generate = self.session.can_generate();
        let label = if busy {
            "Generando informe..."
        } else {
            "Generar informe"
        };
        ui.horizontal(|ui| {
            if ui
                .add_enabled(can_generate, egui::Button::new(label))
                .clicked()
            {
                self.start_generation();
            }
            if busy {
                ui.spinner();
            }
        });
        ui.label(format!("Usos restantes: {remaining} de {USAGE_LIMIT}"));
        if remaining == 0 {
            ui.colored_label(
                ui.visuals().error_fg_color,
                ApplicationError::usage_limit().user_message(),
            );
        }

        for message in [self.session.error(), self.notice.as_deref()]
            .into_iter()
            .flatten()
        {
            ui.colored_label(ui.visuals().error_fg_color, message);
        }
    }

    fn report_panel(&mut self, ui: &mut egui::Ui) {
        if self.session.is_generating() {
            ui.centered_and_justified(|ui| {
                ui.vertical_centered(|ui| {
                    ui.spinner();
                    ui.label("Analizando las imágenes, esto puede tardar unos segundos...");
                });
            });
            return;
        }

        let Some(report) = self.session.report().cloned() else {
            ui.centered_and_justified(|ui| {
                ui.label(
                    RichText::new("El informe aparecerá aquí cuando lo genere.")
                        .color(Color32::GRAY),
                );
            });
            return;
        };

        ui.horizontal(|ui| {
            let exporting = self.session.is_exporting();
            let label = if exporting {
                "Exportando..."
            } else {
                "Exportar a PDF"
            };
            if ui
                .add_enabled(!exporting, egui::Button::new(label))
                .clicked()
            {
                self.start_export();
            }
            if ui.button("Nuevo informe").clicked() {
                self.reset();
            }
        });
        if let Some(exported) = self.session.last_export() {
            ui.label(format!(
                "PDF guardado: {} ({} páginas)",
                exported.path.display(),
                exported.pages
            ));
        } else {
            ui.label(
                RichText::new(format!("Los PDF se guardan en {}", self.export_dir.display()))
                    .weak(),
            );
        }
        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("report")
            .show(ui, |ui| report_view::show_report(ui, &report));
    }

    fn alert_modal(&mut self, ctx: &egui::Context) {
        let Some(message) = self.alert.clone() else {
            return;
        };
        let response = egui::Modal::new(egui::Id::new("alert-modal")).show(ctx, |ui| {
            ui.set_max_width(420.0);
            ui.label(message);
            ui.add_space(8.0);
            ui.button("Aceptar").clicked()
        });
        if response.inner || response.should_close() {
            self.alert = None;
        }
    }
}

impl eframe::App for CrashLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_workers(ctx);
        self.handle_drops(ctx);

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Informe de Accidente con IA");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("Usos restantes: {}", self.session.remaining_uses()));
                });
            });
        });

        egui::SidePanel::left("photos_panel")
            .resizable(false)
            .exact_width(SIDE_PANEL_WIDTH)
            .show(ctx, |ui| self.photos_panel(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.report_panel(ui));

        if let Some(photo) = self.camera.show(ctx, &self.service) {
            self.add(vec![photo], false);
        }
        self.alert_modal(ctx);
        paint_drop_hint(ctx);
    }
}

fn receive<J, R>(worker: &JobWorker<J, R>) -> Option<JobResult<R>>
where
    J: Send + 'static,
    R: Send + 'static,
{
    match worker.try_receive() {
        Ok(result) => result,
        Err(error) => {
            warn!(error = %error, "worker result unavailable");
            None
        }
    }
}

fn paint_drop_hint(ctx: &egui::Context) {
    let hovering = ctx.input(|input| !input.raw.hovered_files.is_empty());
    if !hovering {
        return;
    }
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Foreground,
        egui::Id::new("drop-hint"),
    ));
    let screen = ctx.screen_rect();
    painter.rect_filled(screen, 0.0, Color32::from_black_alpha(160));
    painter.text(
        screen.center(),
        egui::Align2::CENTER_CENTER,
        "Suelte las fotos aquí",
        egui::FontId::proportional(28.0),
        Color32::WHITE,
    );
}

fn system_time_millis(time: SystemTime) -> i64 {
    time.duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_timestamps_are_epoch_millis() {
        let time = UNIX_EPOCH + Duration::from_millis(1_700_000_000_123);
        assert_eq!(system_time_millis(time), 1_700_000_000_123);
        assert_eq!(system_time_millis(UNIX_EPOCH), 0);
    }
}
