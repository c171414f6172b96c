use crate::ReportData;

pub const DISCLAIMER_TEXT: &str = "Este informe es generado por una inteligencia artificial y se basa únicamente en el análisis visual de las imágenes proporcionadas. No constituye un informe pericial legal ni una determinación definitiva de culpabilidad. Debe ser utilizado únicamente con fines informativos. Se recomienda una inspección profesional para una evaluación completa.";

/// One visual unit of the rendered report. The on-screen view and the
/// export rasterizer both draw from the same block list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportBlock {
    Title(String),
    Subtitle(String),
    SectionHeading(String),
    Paragraph(String),
    VehicleHeading(String),
    Labeled { label: String, text: String },
    SpeedNote { label: String, text: String },
    Callout { label: String, text: String },
    Disclaimer { label: String, text: String },
}

pub fn report_blocks(report: &ReportData) -> Vec<ReportBlock> {
    let mut blocks = vec![
        ReportBlock::Title("Informe del Accidente".to_string()),
        ReportBlock::Subtitle(
            "Este es un análisis generado por IA basado en las imágenes proporcionadas."
                .to_string(),
        ),
        ReportBlock::SectionHeading("Resumen del Incidente".to_string()),
        ReportBlock::Paragraph(report.summary.clone()),
        ReportBlock::SectionHeading("Análisis de Vehículos".to_string()),
    ];

    for vehicle in &report.vehicles {
        blocks.push(ReportBlock::VehicleHeading(vehicle.description.clone()));
        blocks.push(ReportBlock::Labeled {
            label: "Análisis de Daños:".to_string(),
            text: vehicle.damage_analysis.clone(),
        });
        blocks.push(ReportBlock::SpeedNote {
            label: "Velocidad de Impacto Estimada:".to_string(),
            text: vehicle.estimated_impact_speed.clone(),
        });
    }

    blocks.push(ReportBlock::SectionHeading(
        "Causa Probable y Culpabilidad".to_string(),
    ));
    blocks.push(ReportBlock::Callout {
        label: "Nota de Culpabilidad:".to_string(),
        text: report.probable_cause.clone(),
    });
    blocks.push(ReportBlock::Disclaimer {
        label: "Descargo de responsabilidad:".to_string(),
        text: DISCLAIMER_TEXT.to_string(),
    });
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VehicleAnalysis;

    fn report(vehicles: usize) -> ReportData {
        ReportData {
            summary: "resumen".to_string(),
            probable_cause: "causa".to_string(),
            vehicles: (0..vehicles)
                .map(|i| VehicleAnalysis {
                    description: format!("vehículo {i}"),
                    damage_analysis: "daños".to_string(),
                    estimated_impact_speed: "baja".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn one_heading_per_vehicle() {
        let blocks = report_blocks(&report(2));
        let headings = blocks
            .iter()
            .filter(|block| matches!(block, ReportBlock::VehicleHeading(_)))
            .count();
        assert_eq!(headings, 2);
    }

    #[test]
    fn disclaimer_closes_every_report() {
        for vehicles in [0, 1, 3] {
            let blocks = report_blocks(&report(vehicles));
            assert!(matches!(
                blocks.last(),
                Some(ReportBlock::Disclaimer { text, .. }) if text == DISCLAIMER_TEXT
            ));
        }
    }
}
