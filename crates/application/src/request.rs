use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use crashlens_domain::{parse_report_text, valid_photo_count, DomainError, ImageBlob, ReportData};
use tracing::{debug, info};

use crate::{ApplicationError, InlineImage, ReportClient, ReportRequest};

pub const RESPONSE_MIME_TYPE: &str = "application/json";

pub const REPORT_INSTRUCTION: &str = r#"Actúa como un perito experto en reconstrucción de accidentes de tráfico. Analiza las imágenes adjuntas de un accidente de vehículos y elabora un informe detallado.

**Instrucciones:**
1. Revisa todas las imágenes para entender la escena, la posición de los vehículos, los daños y el entorno.
2. Limita el análisis a la evidencia visual y mantén un tono objetivo.
3. Responde únicamente con un objeto JSON con la forma indicada abajo, sin texto introductorio ni explicaciones adicionales.

**Formato JSON requerido:**
{
  "summary": "Resumen breve del incidente a partir de las imágenes.",
  "probable_cause": "Causa probable del accidente y estimación de la culpabilidad, con la advertencia de que no es una conclusión legal.",
  "vehicles": [
    {
      "description": "Tipo y color del vehículo (p. ej. 'Sedán azul').",
      "damage_analysis": "Descripción detallada de los daños visibles.",
      "estimated_impact_speed": "Velocidad de impacto estimada, si puede determinarse, con una advertencia sobre su imprecisión."
    }
  ]
}

**Directrices por campo:**
- summary: un párrafo conciso que resuma lo ocurrido.
- probable_cause: valora la dinámica de la colisión según los puntos de impacto, la posición final de los vehículos y la señalización visible. Incluye siempre una advertencia de que se trata de un análisis preliminar basado en fotografías y no de una determinación legal de culpabilidad.
- vehicles: un objeto por cada vehículo claramente identificable.
  - description: tipo, marca si es visible y color (p. ej. "Camioneta Ford F-150 negra").
  - damage_analysis: abolladuras, arañazos, roturas y deformaciones, indicando su ubicación exacta (p. ej. "Parachoques trasero desprendido").
  - estimated_impact_speed: un rango aproximado (p. ej. "Velocidad moderada, entre 40 y 60 km/h"), siempre acompañado de una advertencia de que es una estimación sujeta a un análisis más profundo.

Analiza las imágenes y devuelve el informe en el formato JSON indicado."#;

/// Turns photos into one model request and the response into [`ReportData`].
#[derive(Clone)]
pub struct ReportRequestService {
    client: Arc<dyn ReportClient>,
}

impl ReportRequestService {
    pub fn new(client: Arc<dyn ReportClient>) -> Self {
        Self { client }
    }

    pub fn build_request(photos: &[ImageBlob]) -> ReportRequest {
        let images = photos
            .iter()
            .map(|photo| InlineImage {
                mime_type: photo.mime_type().to_string(),
                data_base64: STANDARD.encode(photo.bytes()),
            })
            .collect();
        ReportRequest {
            instruction: REPORT_INSTRUCTION.to_string(),
            images,
            response_mime_type: RESPONSE_MIME_TYPE,
        }
    }

    /// Single attempt. Refuses an out-of-range photo count before any I/O.
    pub fn generate(&self, photos: &[ImageBlob]) -> Result<ReportData, ApplicationError> {
        if !valid_photo_count(photos.len()) {
            return Err(ApplicationError::photo_count(photos.len()));
        }

        let request = Self::build_request(photos);
        debug!(
            images = request.images.len(),
            payload_bytes = request.payload_bytes(),
            "report request built"
        );

        let text = self.client.complete(&request)?;
        debug!(response_chars = text.len(), "report response received");

        let report = parse_report_text(&text).map_err(|error| match error {
            DomainError::MalformedReport(detail) => ApplicationError::MalformedResponse(detail),
            other => other.into(),
        })?;
        info!(vehicles = report.vehicles.len(), "report parsed");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crashlens_domain::PhotoKey;

    use super::*;

    struct ScriptedClient {
        reply: Result<String, ApplicationError>,
        seen: Mutex<Vec<ReportRequest>>,
    }

    impl ScriptedClient {
        fn new(reply: Result<String, ApplicationError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.seen.lock().expect("lock").len()
        }
    }

    impl ReportClient for ScriptedClient {
        fn complete(&self, request: &ReportRequest) -> Result<String, ApplicationError> {
            self.seen.lock().expect("lock").push(request.clone());
            self.reply.clone()
        }
    }

    const REPLY: &str = r#"{"summary":"Colisión lateral","probable_cause":"Invasión de carril","vehicles":[{"description":"Sedán rojo","damage_analysis":"Puerta abollada","estimated_impact_speed":"Baja, <20km/h"}]}"#;

    fn photo(name: &str, bytes: &[u8]) -> ImageBlob {
        ImageBlob::new(PhotoKey::new(name, 1), "image/png", bytes.to_vec()).expect("photo")
    }

    #[test]
    fn request_puts_instruction_first_and_encodes_every_photo() {
        let request =
            ReportRequestService::build_request(&[photo("a.png", b"hello"), photo("b.png", b"hi")]);
        assert_eq!(request.instruction, REPORT_INSTRUCTION);
        assert_eq!(request.response_mime_type, "application/json");
        assert_eq!(request.images.len(), 2);
        assert_eq!(request.images[0].data_base64, "aGVsbG8=");
        assert_eq!(request.images[1].data_base64, "aGk=");
        assert_eq!(request.images[0].mime_type, "image/png");
    }

    #[test]
    fn parses_fenced_and_plain_replies_identically() {
        let plain = ScriptedClient::new(Ok(REPLY.to_string()));
        let fenced = ScriptedClient::new(Ok(format!("```json\n{REPLY}\n```")));
        let photos = [photo("a.png", b"x")];

        let a = ReportRequestService::new(plain).generate(&photos).expect("plain");
        let b = ReportRequestService::new(fenced).generate(&photos).expect("fenced");
        assert_eq!(a, b);
        assert_eq!(a.vehicles[0].description, "Sedán rojo");
    }

    #[test]
    fn out_of_range_count_never_reaches_client() {
        let client = ScriptedClient::new(Ok(REPLY.to_string()));
        let service = ReportRequestService::new(client.clone());

        assert_eq!(
            service.generate(&[]),
            Err(ApplicationError::photo_count(0))
        );
        let eleven: Vec<_> = (0..11).map(|i| photo(&format!("{i}.png"), b"x")).collect();
        assert!(matches!(
            service.generate(&eleven),
            Err(ApplicationError::PhotoCount { count: 11, .. })
        ));
        assert_eq!(client.calls(), 0);
    }

    #[test]
    fn non_json_reply_is_malformed_response() {
        let client = ScriptedClient::new(Ok("Lo siento, no puedo ayudar.".to_string()));
        let error = ReportRequestService::new(client)
            .generate(&[photo("a.png", b"x")])
            .expect_err("malformed");
        assert!(matches!(error, ApplicationError::MalformedResponse(_)));
    }

    #[test]
    fn client_errors_pass_through() {
        let client = ScriptedClient::new(Err(ApplicationError::MissingCredential));
        let error = ReportRequestService::new(client)
            .generate(&[photo("a.png", b"x")])
            .expect_err("missing key");
        assert_eq!(error, ApplicationError::MissingCredential);
    }
}
