use crashlens_domain::{CameraFailure, CameraState, DomainError, MAX_PHOTOS, USAGE_LIMIT};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("expected between 1 and {max} photos, got {count}")]
    PhotoCount { count: usize, max: usize },
    #[error("usage limit of {limit} reports reached")]
    UsageLimitReached { limit: u32 },
    #[error("{0} already in progress")]
    Busy(&'static str),
    #[error("API credential is not configured")]
    MissingCredential,
    #[error("service error: {0}")]
    Service(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error(transparent)]
    Camera(#[from] CameraFailure),
    #[error("camera cannot {action} while {state:?}")]
    CameraState {
        action: &'static str,
        state: CameraState,
    },
    #[error("export error: {0}")]
    Export(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("encode error: {0}")]
    Encode(String),
}

impl ApplicationError {
    pub fn photo_count(count: usize) -> Self {
        Self::PhotoCount {
            count,
            max: MAX_PHOTOS,
        }
    }

    pub fn usage_limit() -> Self {
        Self::UsageLimitReached { limit: USAGE_LIMIT }
    }

    /// Text shown to the user next to the control that failed.
    pub fn user_message(&self) -> String {
        const GENERATION: &str = "Error al generar el informe:";
        const SERVICE: &str = "Error en la API de Gemini:";
        match self {
            Self::PhotoCount { .. } => "Por favor, cargue entre 1 y 10 fotos.".to_string(),
            Self::UsageLimitReached { limit } => {
                format!("Ha alcanzado el límite de {limit} informes por dispositivo.")
            }
            Self::Busy(_) => "Ya hay una operación en curso.".to_string(),
            Self::MissingCredential => format!(
                "{GENERATION} La clave de API de Google no está configurada. Por favor, configure la variable de entorno GEMINI_API_KEY."
            ),
            Self::Service(detail) => format!("{GENERATION} {SERVICE} {detail}"),
            Self::MalformedResponse(detail) => {
                format!("{GENERATION} {SERVICE} respuesta no válida ({detail})")
            }
            Self::Camera(failure) => failure.user_message(),
            Self::Export(detail) => format!("No se pudo exportar el informe a PDF: {detail}"),
            Self::Domain(DomainError::EmptyImage(name)) => {
                format!("La foto {name} está vacía.")
            }
            other => format!("Ocurrió un error inesperado: {other}"),
        }
    }
}
