//! Subject validation.

use crate::error::{AnalysisError, MIN_SUBJECT_CHARS};

/// Trim the raw subject and enforce the minimum length.
///
/// Length is counted in characters, not bytes, so accented subjects are
/// measured the way a reader would count them.
pub fn validate_subject(raw: Option<&str>) -> Result<String, AnalysisError> {
    let subject = raw.map(str::trim).unwrap_or("");

    if subject.chars().count() < MIN_SUBJECT_CHARS {
        return Err(AnalysisError::too_short());
    }

    Ok(subject.to_string())
}
