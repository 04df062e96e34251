//! Cleanup and parsing of generator output.
//!
//! Models asked for JSON still wrap it in markdown fences from time to
//! time (```` ```json ... ``` ````). The fences are stripped before parsing.

use crate::analysis::schema::AnalysisSchema;
use crate::error::AnalysisError;
use crate::models::AnalysisRecord;
use serde_json::Value;

/// Maximum number of characters of generator output kept in diagnostics.
pub const SNIPPET_CHARS: usize = 200;

/// Remove a leading fence (with optional language tag) and a trailing fence.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let tag_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(rest.len());
        text = &rest[tag_len..];
    }

    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

/// Parse raw generator output into analysis records.
pub fn parse_analysis(raw: &str, schema: &AnalysisSchema) -> Result<Vec<AnalysisRecord>, AnalysisError> {
    let cleaned = strip_code_fences(raw);

    let value: Value = serde_json::from_str(cleaned).map_err(|e| AnalysisError::MalformedResponse {
        reason: e.to_string(),
        snippet: snippet(cleaned),
    })?;

    schema
        .validate(&value)
        .map_err(|reason| AnalysisError::MalformedResponse {
            reason,
            snippet: snippet(cleaned),
        })
}

/// First [`SNIPPET_CHARS`] characters of `text`, with an ellipsis when cut.
fn snippet(text: &str) -> String {
    match text.char_indices().nth(SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::schema::ANALYSIS_SCHEMA;
    use crate::generation::testing::fenced_records;

    #[test]
    fn test_strip_json_fence() {
        assert_eq!(strip_code_fences("```json\n[1, 2]\n```"), "[1, 2]");
    }

    #[test]
    fn test_strip_bare_fence() {
        assert_eq!(strip_code_fences("  ```\n[]\n```  "), "[]");
    }

    #[test]
    fn test_strip_single_line_fence() {
        assert_eq!(strip_code_fences("```json[]```"), "[]");
    }

    #[test]
    fn test_unfenced_text_untouched() {
        assert_eq!(strip_code_fences("  [{\"a\": 1}]\n"), "[{\"a\": 1}]");
    }

    #[test]
    fn test_parse_fenced_records() {
        for n in [1, 3, 8] {
            let records = parse_analysis(&fenced_records(n), &ANALYSIS_SCHEMA).unwrap();
            assert_eq!(records.len(), n);

            for record in &records {
                let value = serde_json::to_value(record).unwrap();
                let mut keys: Vec<&String> = value.as_object().unwrap().keys().collect();
                keys.sort();
                assert_eq!(keys, ["generalApproach", "specificAnalysis", "thinker"]);
            }
        }
    }

    #[test]
    fn test_parse_fenced_empty_array() {
        let records = parse_analysis("```json\n[]\n```", &ANALYSIS_SCHEMA).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = parse_analysis("```json\n[{\"thinker\": \n```", &ANALYSIS_SCHEMA).unwrap_err();
        match err {
            AnalysisError::MalformedResponse { snippet, .. } => {
                assert_eq!(snippet, "[{\"thinker\":");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_schema_mismatch_is_malformed() {
        let err = parse_analysis(r#"{"analysis": []}"#, &ANALYSIS_SCHEMA).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedResponse { .. }));
    }

    #[test]
    fn test_snippet_is_bounded() {
        let long = "é".repeat(SNIPPET_CHARS * 3);
        let err = parse_analysis(&long, &ANALYSIS_SCHEMA).unwrap_err();
        match err {
            AnalysisError::MalformedResponse { snippet, .. } => {
                assert_eq!(snippet.chars().count(), SNIPPET_CHARS + 1);
                assert!(snippet.ends_with('…'));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
