//! Gemini `generateContent` client.
//!
//! Sends the instruction as `systemInstruction`, the query as the single
//! user turn, and asks for `application/json` constrained by the analysis
//! schema. The API key travels as the `key` query parameter.

use crate::analysis::schema::AnalysisSchema;
use crate::error::AnalysisError;
use crate::generation::client::{GenerationClient, GenerationPayload};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Connection settings for the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Base URL, e.g. `https://generativelanguage.googleapis.com/v1beta`.
    pub api_url: String,
    pub model: String,
    pub api_key: String,
    /// `None` leaves the call unbounded.
    pub timeout_seconds: Option<u64>,
}

/// `generateContent` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    system_instruction: Content<'a>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: &'static AnalysisSchema,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_payload(payload: &'a GenerationPayload) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: &payload.query,
                }],
            }],
            system_instruction: Content {
                parts: vec![Part {
                    text: &payload.instruction,
                }],
            },
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: payload.schema,
            },
        }
    }
}

/// `generateContent` response body (only the fields we read).
#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// `candidates[0].content.parts[0].text`, if present and non-empty.
    fn into_first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
            .filter(|text| !text.is_empty())
    }
}

pub struct GeminiClient {
    config: GeminiConfig,
    http_client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(&self, payload: &GenerationPayload) -> Result<String, AnalysisError> {
        let request = GenerateContentRequest::from_payload(payload);

        debug!(
            "Sending generateContent to model {} ({} instruction chars, {} query chars)",
            self.config.model,
            payload.instruction.len(),
            payload.query.len()
        );

        let response = self
            .http_client
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw_body = response.text().await.unwrap_or_default();
            error!("Gemini API error {}: {}", status, raw_body);
            return Err(AnalysisError::Upstream {
                status: status.as_u16(),
                raw_body,
            });
        }

        let body = response.text().await?;
        let parsed: GenerateContentResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Undecodable Gemini response body: {}", e);
                return Err(AnalysisError::EmptyResponse);
            }
        };

        parsed.into_first_text().ok_or_else(|| {
            warn!("Gemini response carried no text part");
            AnalysisError::EmptyResponse
        })
    }
}
