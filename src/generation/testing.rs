//! Scripted generation client for pipeline and router tests.

use crate::error::AnalysisError;
use crate::generation::client::{GenerationClient, GenerationPayload};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Replies with queued results in order and records every call.
#[derive(Default)]
pub struct StubClient {
    replies: Mutex<VecDeque<Result<String, AnalysisError>>>,
    calls: AtomicUsize,
    payloads: Mutex<Vec<GenerationPayload>>,
}

impl StubClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply_text(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()))
    }

    pub fn reply_err(self, err: AnalysisError) -> Self {
        self.push(Err(err))
    }

    fn push(self, reply: Result<String, AnalysisError>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_payload(&self) -> Option<GenerationPayload> {
        self.payloads.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl GenerationClient for StubClient {
    async fn generate(&self, payload: &GenerationPayload) -> Result<String, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().unwrap().push(payload.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AnalysisError::unhandled("stub has no reply queued")))
    }
}

/// A JSON array of `n` well-formed records, wrapped in a ```json fence.
pub fn fenced_records(n: usize) -> String {
    let items: Vec<String> = (0..n)
        .map(|i| {
            serde_json::json!({
                "thinker": format!("Penseur {}", i),
                "generalApproach": format!("Approche générale {}", i),
                "specificAnalysis": format!("Analyse spécifique {}", i),
            })
            .to_string()
        })
        .collect();
    format!("```json\n[{}]\n```", items.join(",\n"))
}
