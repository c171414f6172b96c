use crashlens_domain::{report_blocks, ReportBlock, ReportData};
use eframe::egui::{self, Color32, RichText};

const ACCENT: Color32 = Color32::from_rgb(30, 64, 175);
const CALLOUT_FILL: Color32 = Color32::from_rgb(254, 249, 195);
const DISCLAIMER_FILL: Color32 = Color32::from_rgb(254, 226, 226);

/// Draws the report from the same block list the PDF export rasterizes.
pub fn show_report(ui: &mut egui::Ui, report: &ReportData) {
    for block in report_blocks(report) {
        match block {
            ReportBlock::Title(text) => {
                ui.heading(RichText::new(text).color(ACCENT).strong());
            }
            ReportBlock::Subtitle(text) => {
                ui.label(RichText::new(text).italics().weak());
                ui.add_space(8.0);
            }
            ReportBlock::SectionHeading(text) => {
                ui.add_space(10.0);
                ui.label(RichText::new(text).size(18.0).strong());
                ui.separator();
            }
            ReportBlock::Paragraph(text) => {
                ui.label(text);
            }
            ReportBlock::VehicleHeading(text) => {
                ui.add_space(6.0);
                ui.label(RichText::new(text).size(15.0).strong().color(ACCENT));
            }
            ReportBlock::Labeled { label, text } => labeled(ui, &label, &text, false),
            ReportBlock::SpeedNote { label, text } => labeled(ui, &label, &text, true),
            ReportBlock::Callout { label, text } => {
                boxed(ui, CALLOUT_FILL, &label, &text);
            }
            ReportBlock::Disclaimer { label, text } => {
                ui.add_space(12.0);
                boxed(ui, DISCLAIMER_FILL, &label, &text);
            }
        }
    }
}

fn labeled(ui: &mut egui::Ui, label: &str, text: &str, italic: bool) {
    ui.horizontal_wrapped(|ui| {
        ui.label(RichText::new(label).strong());
        let body = RichText::new(text);
        ui.label(if italic { body.italics() } else { body });
    });
}

fn boxed(ui: &mut egui::Ui, fill: Color32, label: &str, text: &str) {
    egui::Frame::group(ui.style()).fill(fill).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.label(RichText::new(label).strong().color(Color32::BLACK));
        ui.label(RichText::new(text).color(Color32::BLACK));
    });
}
