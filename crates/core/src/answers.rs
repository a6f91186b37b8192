//! Answer normalization and comparison.
//!
//! Stored answers are always normalized at write time, so a submitted answer
//! only needs the same normalization before an equality check.

/// Normalize an answer for storage or comparison: trim, then lowercase.
pub fn normalize_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Whether a submitted answer matches the stored answer.
///
/// Blank submissions never match, even against a blank stored answer.
pub fn answers_match(submitted: &str, stored: &str) -> bool {
    let submitted = normalize_answer(submitted);
    !submitted.is_empty() && submitted == stored.to_lowercase()
}
