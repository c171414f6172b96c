use crashlens_application::ExportedReport;
use crashlens_domain::{report_blocks, AddOutcome, ReportBlock, ReportData, UsageCounter};

pub fn present_report(report: &ReportData) -> String {
    let mut out = String::new();
    for block in report_blocks(report) {
        match block {
            ReportBlock::Title(text) => {
                out.push_str(&text.to_uppercase());
                out.push('\n');
            }
            ReportBlock::Subtitle(text) => {
                out.push_str(&text);
                out.push_str("\n\n");
            }
            ReportBlock::SectionHeading(text) => {
                out.push_str(&format!("== {text} ==\n"));
            }
            ReportBlock::Paragraph(text) => {
                out.push_str(&text);
                out.push_str("\n\n");
            }
            ReportBlock::VehicleHeading(text) => {
                out.push_str(&format!("* {text}\n"));
            }
            ReportBlock::Labeled { label, text } | ReportBlock::SpeedNote { label, text } => {
                out.push_str(&format!("  {label} {text}\n"));
            }
            ReportBlock::Callout { label, text } => {
                out.push_str(&format!("{label} {text}\n\n"));
            }
            ReportBlock::Disclaimer { label, text } => {
                out.push_str(&format!("{label} {text}\n"));
            }
        }
    }
    out
}

pub fn present_usage(counter: UsageCounter) -> String {
    format!(
        "informes generados: {}\tusos restantes: {}",
        counter.get(),
        counter.remaining()
    )
}

pub fn present_add_outcome(outcome: &AddOutcome, total: usize) -> String {
    format!(
        "fotos: {total} (nuevas={}, reemplazadas={}, descartadas={})",
        outcome.added, outcome.replaced, outcome.dropped
    )
}

pub fn present_export(exported: &ExportedReport) -> String {
    format!(
        "PDF guardado en {} ({} páginas, {} bytes)",
        exported.path.display(),
        exported.pages,
        exported.bytes
    )
}
