use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Failures of the upload endpoint
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Solo se permiten archivos CSV")]
    NotCsv,

    #[error("No se proporcionó archivo CSV")]
    MissingFile,

    #[error("{0}")]
    Multipart(#[from] MultipartError),

    #[error("{0:#}")]
    Processing(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotCsv | Self::MissingFile => StatusCode::BAD_REQUEST,
            Self::Multipart(err) => err.status(),
            Self::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        let (message, detail) = match self {
            Self::MissingFile => (self.to_string(), None),
            Self::NotCsv | Self::Multipart(_) => ("Error al subir archivo".to_string(), Some(self.to_string())),
            Self::Processing(_) => ("Error procesando productos".to_string(), Some(self.to_string())),
        };
        ErrorBody {
            success: false,
            message,
            error: detail,
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        if let Self::Processing(err) = &self {
            error!("❌ Upload processing failed: {:#}", err);
        }
        (self.status(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(UploadError::NotCsv.status(), StatusCode::BAD_REQUEST);
        assert_eq!(UploadError::MissingFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            UploadError::Processing(anyhow::anyhow!("disk full")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_body_shape() {
        let body = serde_json::to_value(UploadError::NotCsv.body()).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Error al subir archivo");
        assert_eq!(body["error"], "Solo se permiten archivos CSV");

        let missing = serde_json::to_value(UploadError::MissingFile.body()).unwrap();
        assert!(missing.get("error").is_none());
    }
}
