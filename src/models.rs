//! Data models for the analysis service.
//!
//! This module contains the request and response shapes exchanged with
//! callers of the HTTP API.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/analyze`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Free-text subject to analyze. Absent is allowed on the wire and
    /// rejected by the validator.
    #[serde(default)]
    pub subject: Option<String>,
}

/// One thinker's analysis of the subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    /// Name of the thinker (e.g. Socrate).
    pub thinker: String,
    /// The thinker's stance on the broader theme the subject evokes.
    pub general_approach: String,
    /// The thinker's application to the exact subject.
    pub specific_analysis: String,
}

/// Successful analysis envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// Always `true`; lets clients branch on the envelope shape.
    pub success: bool,
    /// The validated (trimmed) subject.
    pub subject: String,
    /// One record per thinker, in the order the generator returned them.
    pub analysis: Vec<AnalysisRecord>,
    /// ISO-8601 instant at which the response was built.
    pub timestamp: String,
}

impl AnalysisResponse {
    /// Builds a success envelope stamped with the current instant.
    pub fn completed(subject: String, analysis: Vec<AnalysisRecord>) -> Self {
        Self {
            success: true,
            subject,
            analysis,
            timestamp: iso_timestamp(Utc::now()),
        }
    }
}

/// Error envelope returned for 4xx/5xx outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
    pub timestamp: String,
}

impl HealthStatus {
    pub fn ok() -> Self {
        Self {
            status: "OK".to_string(),
            message: "Le serveur backend fonctionne correctement".to_string(),
            timestamp: iso_timestamp(Utc::now()),
        }
    }
}

/// Body of the catch-all 404 handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteNotFound {
    pub error: String,
    pub available_routes: Vec<String>,
}

/// Formats an instant as ISO-8601 UTC with millisecond precision
/// (`2024-05-01T12:00:00.000Z`).
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
