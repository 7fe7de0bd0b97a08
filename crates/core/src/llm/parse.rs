use crate::error::ScoreError;
use crate::llm::Provider;
use regex::Regex;
use std::sync::OnceLock;

fn decimal_pattern() -> Option<&'static Regex> {
    static DECIMAL: OnceLock<Option<Regex>> = OnceLock::new();
    DECIMAL.get_or_init(|| Regex::new(r"\d+\.\d+").ok()).as_ref()
}

/// Best-effort extraction of a score from free-form model output.
///
/// Takes the first `digits.digits` match. A reply that is nothing but `0` or `1` (optionally
/// followed by a period) is accepted too; integers inside prose are not a score.
pub fn extract_score(text: &str) -> Option<f64> {
    if let Some(found) = decimal_pattern().and_then(|re| re.find(text)) {
        return found.as_str().parse::<f64>().ok();
    }

    match text.trim().trim_end_matches('.') {
        "0" => Some(0.0),
        "1" => Some(1.0),
        _ => None,
    }
}

/// Extracts and range-checks a score from a model reply.
pub fn score_from_reply(provider: Provider, text: &str) -> Result<f64, ScoreError> {
    let score = extract_score(text).ok_or_else(|| {
        ScoreError::new(provider, "parse", "reply contains no numeric score").with_raw_output(text)
    })?;

    if !(0.0..=1.0).contains(&score) {
        return Err(ScoreError::new(
            provider,
            "range",
            format!("score must be between 0 and 1 (got {score})"),
        )
        .with_raw_output(text));
    }

    Ok(score)
}
