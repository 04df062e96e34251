//! Failure taxonomy for the analysis pipeline.
//!
//! Every stage of the pipeline fails with an [`AnalysisError`]. The error
//! knows which HTTP status it maps to and how to render itself as the
//! stable `{error, message?}` envelope, so handlers never build error
//! bodies by hand.

use crate::models::ErrorBody;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Minimum number of characters a trimmed subject must contain.
pub const MIN_SUBJECT_CHARS: usize = 5;

/// Generic label attached to every 500 response.
pub const ANALYSIS_FAILED: &str = "Erreur lors de l'analyse";

/// Why a subject was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    /// Absent, or fewer than [`MIN_SUBJECT_CHARS`] characters once trimmed.
    TooShort,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Caller input fault.
    #[error("Le sujet doit contenir au moins {} caractères", MIN_SUBJECT_CHARS)]
    Validation { kind: ValidationKind },

    /// The generation service answered with a non-success status.
    /// `raw_body` is kept for logs only.
    #[error("Erreur API Gemini: {status}")]
    Upstream { status: u16, raw_body: String },

    /// Success status, but no text payload could be extracted.
    #[error("Réponse vide de l'API Gemini")]
    EmptyResponse,

    /// The generated text is not a valid analysis array.
    #[error("Réponse JSON invalide de l'API Gemini: {reason} (extrait: {snippet})")]
    MalformedResponse { reason: String, snippet: String },

    /// Anything else (transport faults, client construction, ...).
    #[error("{message}")]
    Unhandled { message: String },
}

impl AnalysisError {
    pub fn too_short() -> Self {
        AnalysisError::Validation {
            kind: ValidationKind::TooShort,
        }
    }

    pub fn unhandled(message: impl Into<String>) -> Self {
        AnalysisError::Unhandled {
            message: message.into(),
        }
    }

    /// HTTP status this failure is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AnalysisError::Validation { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The `{error, message?}` body for this failure.
    pub fn to_body(&self) -> ErrorBody {
        match self {
            AnalysisError::Validation { .. } => ErrorBody {
                error: self.to_string(),
                message: None,
            },
            _ => ErrorBody {
                error: ANALYSIS_FAILED.to_string(),
                message: Some(self.to_string()),
            },
        }
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key.
        let err = err.without_url();
        let message = if err.is_timeout() {
            format!("Délai dépassé lors de l'appel à l'API Gemini: {}", err)
        } else if err.is_connect() {
            format!("Connexion impossible à l'API Gemini: {}", err)
        } else {
            format!("Échec de la requête vers l'API Gemini: {}", err)
        };
        AnalysisError::Unhandled { message }
    }
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_body())).into_response()
    }
}
