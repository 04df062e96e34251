//! The analysis request pipeline as an explicit state machine.
//!
//! ```text
//! Idle -> Validating -> { Rejected | Composing }
//! Composing -> Requesting -> { UpstreamFailed | Parsing }
//! Parsing -> { ParseFailed | Completed }
//! ```
//!
//! Each call to [`Analyzer::step`] performs one transition. Only
//! `Requesting` awaits; every other transition is synchronous. Terminal
//! states carry either the success envelope or the failure that ends the
//! request, so nothing is retried and nothing is partially returned.

use crate::analysis::prompt;
use crate::analysis::roster::Roster;
use crate::analysis::sanitizer;
use crate::analysis::schema::{AnalysisSchema, ANALYSIS_SCHEMA};
use crate::analysis::validator::validate_subject;
use crate::error::AnalysisError;
use crate::generation::{GenerationClient, GenerationPayload};
use crate::models::AnalysisResponse;
use std::sync::Arc;
use tracing::{debug, error, info};

#[derive(Debug)]
pub enum PipelineState {
    Idle { raw_subject: Option<String> },
    Validating { raw_subject: Option<String> },
    Composing { subject: String },
    Requesting { subject: String, payload: GenerationPayload },
    Parsing { subject: String, raw_text: String },
    Rejected(AnalysisError),
    UpstreamFailed(AnalysisError),
    ParseFailed(AnalysisError),
    Completed(AnalysisResponse),
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineState::Rejected(_)
                | PipelineState::UpstreamFailed(_)
                | PipelineState::ParseFailed(_)
                | PipelineState::Completed(_)
        )
    }

    fn name(&self) -> &'static str {
        match self {
            PipelineState::Idle { .. } => "idle",
            PipelineState::Validating { .. } => "validating",
            PipelineState::Composing { .. } => "composing",
            PipelineState::Requesting { .. } => "requesting",
            PipelineState::Parsing { .. } => "parsing",
            PipelineState::Rejected(_) => "rejected",
            PipelineState::UpstreamFailed(_) => "upstream_failed",
            PipelineState::ParseFailed(_) => "parse_failed",
            PipelineState::Completed(_) => "completed",
        }
    }
}

/// Runs subjects through validation, composition, generation and parsing.
///
/// Holds only read-only state, so one instance serves concurrent requests.
pub struct Analyzer {
    client: Arc<dyn GenerationClient>,
    roster: Roster,
    schema: &'static AnalysisSchema,
}

impl Analyzer {
    pub fn new(client: Arc<dyn GenerationClient>, roster: Roster) -> Self {
        Self {
            client,
            roster,
            schema: &ANALYSIS_SCHEMA,
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Analyze a raw subject, driving the state machine to a terminal state.
    pub async fn analyze(&self, raw_subject: Option<String>) -> Result<AnalysisResponse, AnalysisError> {
        let mut state = PipelineState::Idle { raw_subject };

        loop {
            state = match state {
                PipelineState::Completed(response) => return Ok(response),
                PipelineState::Rejected(err)
                | PipelineState::UpstreamFailed(err)
                | PipelineState::ParseFailed(err) => return Err(err),
                other => self.step(other).await,
            };
        }
    }

    /// Perform a single transition. Terminal states are returned unchanged.
    pub async fn step(&self, state: PipelineState) -> PipelineState {
        if state.is_terminal() {
            return state;
        }
        let from = state.name();

        let next = match state {
            PipelineState::Idle { raw_subject } => PipelineState::Validating { raw_subject },

            PipelineState::Validating { raw_subject } => {
                match validate_subject(raw_subject.as_deref()) {
                    Ok(subject) => PipelineState::Composing { subject },
                    Err(err) => {
                        if let AnalysisError::Validation { kind } = &err {
                            info!("Rejected subject ({:?})", kind);
                        }
                        PipelineState::Rejected(err)
                    }
                }
            }

            PipelineState::Composing { subject } => {
                let prompt = prompt::compose(&subject, &self.roster);
                let payload = GenerationPayload::new(prompt, self.schema);
                PipelineState::Requesting { subject, payload }
            }

            PipelineState::Requesting { subject, payload } => {
                info!("Analyzing subject: \"{}\"", subject);
                match self.client.generate(&payload).await {
                    Ok(raw_text) => PipelineState::Parsing { subject, raw_text },
                    Err(err) => {
                        error!("Generation failed for \"{}\": {}", subject, err);
                        PipelineState::UpstreamFailed(err)
                    }
                }
            }

            PipelineState::Parsing { subject, raw_text } => {
                match sanitizer::parse_analysis(&raw_text, self.schema) {
                    Ok(records) => {
                        info!("Analysis completed for \"{}\" ({} entries)", subject, records.len());
                        PipelineState::Completed(AnalysisResponse::completed(subject, records))
                    }
                    Err(err) => {
                        error!("Unparseable generation for \"{}\": {}", subject, err);
                        PipelineState::ParseFailed(err)
                    }
                }
            }

            terminal => terminal,
        };

        debug!("Pipeline transition: {} -> {}", from, next.name());
        next
    }
}
