use serde::{Deserialize, Serialize};

use crate::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleAnalysis {
    pub description: String,
    pub damage_analysis: String,
    pub estimated_impact_speed: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportData {
    pub summary: String,
    pub probable_cause: String,
    pub vehicles: Vec<VehicleAnalysis>,
}

/// Unwraps a response wrapped in a triple-backtick fence, with or without a
/// language tag. Text that is not fenced comes back trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    let Some(inner) = text
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return text;
    };

    let body = inner
        .trim_start_matches(|ch: char| ch.is_ascii_alphanumeric() || ch == '_')
        .trim();
    if body.is_empty() {
        return text;
    }
    body
}

pub fn parse_report_text(raw: &str) -> Result<ReportData, DomainError> {
    serde_json::from_str(strip_code_fence(raw))
        .map_err(|error| DomainError::MalformedReport(error.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{"summary":"Colisión por alcance","probable_cause":"Distancia insuficiente","vehicles":[{"description":"Sedán rojo","damage_analysis":"Puerta abollada","estimated_impact_speed":"Baja, <20km/h"}]}"#;

    #[test]
    fn parses_plain_json() {
        let report = parse_report_text(BODY).expect("report");
        assert_eq!(report.vehicles.len(), 1);
        assert_eq!(report.vehicles[0].description, "Sedán rojo");
    }

    #[test]
    fn fenced_bodies_parse_like_plain_ones() {
        let plain = parse_report_text(BODY).expect("plain");
        let tagged = parse_report_text(&format!("```json\n{BODY}\n```")).expect("tagged");
        let untagged = parse_report_text(&format!("  ```\n{BODY}\n```  ")).expect("untagged");
        let inline = parse_report_text(&format!("```{BODY}```")).expect("inline");
        assert_eq!(plain, tagged);
        assert_eq!(plain, untagged);
        assert_eq!(plain, inline);
    }

    #[test]
    fn unfenced_text_is_only_trimmed() {
        assert_eq!(strip_code_fence("  {\"a\":1}\n"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json```"), "```json```");
    }

    #[test]
    fn malformed_json_is_an_error() {
        let result = parse_report_text("Lo siento, no puedo analizar estas imágenes.");
        assert!(matches!(result, Err(DomainError::MalformedReport(_))));
    }

    #[test]
    fn missing_fields_are_rejected() {
        let result = parse_report_text(r#"{"summary":"x","vehicles":[]}"#);
        assert!(matches!(result, Err(DomainError::MalformedReport(_))));
    }
}
