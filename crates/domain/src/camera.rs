use thiserror::Error;

pub const CAPTURE_JPEG_QUALITY: u8 = 95;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraState {
    Idle,
    Requesting,
    Live,
    Captured,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    Environment,
    User,
}

/// What the session asks of a device. Sizes are preferences; the device
/// reports what it actually negotiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraConstraints {
    pub facing: FacingMode,
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            facing: FacingMode::Environment,
            ideal_width: 1920,
            ideal_height: 1080,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraErrorCode {
    PermissionDenied,
    NotFound,
    NotSupported,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("camera failure ({code:?}): {detail}")]
pub struct CameraFailure {
    pub code: CameraErrorCode,
    pub detail: String,
}

impl CameraFailure {
    pub fn new(code: CameraErrorCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
        }
    }

    pub fn user_message(&self) -> String {
        let prefix = "No se pudo acceder a la cámara.";
        match self.code {
            CameraErrorCode::PermissionDenied => format!(
                "{prefix} Por favor, conceda permiso para usar la cámara en la configuración de su sistema."
            ),
            CameraErrorCode::NotFound => {
                format!("{prefix} No se encontró ningún dispositivo de cámara.")
            }
            CameraErrorCode::NotSupported => {
                format!("{prefix} La cámara no es compatible con este equipo.")
            }
            CameraErrorCode::Other => format!("{prefix} Detalle: {}", self.detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_constraints_prefer_rear_full_hd() {
        let constraints = CameraConstraints::default();
        assert_eq!(constraints.facing, FacingMode::Environment);
        assert_eq!((constraints.ideal_width, constraints.ideal_height), (1920, 1080));
    }

    #[test]
    fn messages_differ_per_code() {
        let denied = CameraFailure::new(CameraErrorCode::PermissionDenied, "EACCES").user_message();
        let missing = CameraFailure::new(CameraErrorCode::NotFound, "ENOENT").user_message();
        let other = CameraFailure::new(CameraErrorCode::Other, "device busy").user_message();
        assert!(denied.contains("conceda permiso"));
        assert!(missing.contains("No se encontró"));
        assert!(other.ends_with("Detalle: device busy"));
        assert!(!denied.contains("EACCES"));
    }
}
