//! The call contract between the pipeline and a generation backend.

use crate::analysis::prompt::Prompt;
use crate::analysis::schema::AnalysisSchema;
use crate::error::AnalysisError;
use async_trait::async_trait;

/// Everything a backend needs for one schema-constrained generation.
#[derive(Debug, Clone)]
pub struct GenerationPayload {
    pub instruction: String,
    pub query: String,
    pub schema: &'static AnalysisSchema,
}

impl GenerationPayload {
    pub fn new(prompt: Prompt, schema: &'static AnalysisSchema) -> Self {
        Self {
            instruction: prompt.instruction,
            query: prompt.query,
            schema,
        }
    }
}

/// A backend able to turn a payload into raw generated text.
///
/// Implementations make exactly one attempt per call and return the text
/// unmodified (fences included); cleanup is the sanitizer's job.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, payload: &GenerationPayload) -> Result<String, AnalysisError>;
}
