mod wire;

use std::time::Duration;

use crashlens_application::{ApplicationError, ReportClient, ReportRequest};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::{debug, info, warn};

use wire::{
    Content, ErrorEnvelope, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    InlineData, Part,
};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// `generateContent` over the Gemini REST API, one blocking call per report.
pub struct GeminiReportClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiReportClient {
    pub fn new(config: GeminiConfig) -> Result<Self, ApplicationError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|error| ApplicationError::Service(error.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }

    fn api_key(&self) -> Result<&str, ApplicationError> {
        self.config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ApplicationError::MissingCredential)
    }
}

impl ReportClient for GeminiReportClient {
    fn complete(&self, request: &ReportRequest) -> Result<String, ApplicationError> {
        let api_key = self.api_key()?;
        let body = request_body(request);
        info!(
            model = %self.config.model,
            images = request.images.len(),
            "sending report request"
        );

        let response = self
            .http
            .post(self.url())
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .map_err(|error| ApplicationError::Service(transport_message(&error)))?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|error| ApplicationError::Service(error.to_string()))?;
        debug!(status = status.as_u16(), bytes = text.len(), "report response received");

        if !status.is_success() {
            let message = service_error_message(status, &text);
            warn!(status = status.as_u16(), message = %message, "report request rejected");
            return Err(ApplicationError::Service(message));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|error| ApplicationError::MalformedResponse(error.to_string()))?;
        response_text(parsed)
    }
}

fn request_body(request: &ReportRequest) -> GenerateContentRequest<'_> {
    let mut parts = Vec::with_capacity(request.images.len() + 1);
    parts.push(Part::Text {
        text: &request.instruction,
    });
    parts.extend(request.images.iter().map(|image| Part::Inline {
        inline_data: InlineData {
            mime_type: &image.mime_type,
            data: &image.data_base64,
        },
    }));

    GenerateContentRequest {
        contents: vec![Content { parts }],
        generation_config: GenerationConfig {
            response_mime_type: request.response_mime_type,
        },
    }
}

/// Concatenated text of the first candidate.
fn response_text(response: GenerateContentResponse) -> Result<String, ApplicationError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
            .map(|reason| format!(" (bloqueado: {reason})"))
            .unwrap_or_default();
        return Err(ApplicationError::Service(format!(
            "la respuesta no contiene candidatos{reason}"
        )));
    };

    let text: String = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.text)
        .collect();
    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".to_string());
        return Err(ApplicationError::Service(format!(
            "la respuesta está vacía (finishReason: {reason})"
        )));
    }
    Ok(text)
}

fn service_error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) if body.trim().is_empty() => format!("HTTP {status}"),
        Err(_) => format!("HTTP {status}: {}", body.trim()),
    }
}

fn transport_message(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        return "tiempo de espera agotado".to_string();
    }
    if error.is_connect() {
        return format!("no se pudo conectar: {error}");
    }
    error.to_string()
}
