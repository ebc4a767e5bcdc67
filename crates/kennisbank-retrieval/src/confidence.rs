//! Confidence scoring for generated answers.
//!
//! Two stages: a numeric base from the similarity of the evidence
//! actually used, and a ceiling override when the generator's own text
//! says it could not answer. Retrieval similarity alone overstates
//! confidence in that case.

/// Lowercase phrases that mark an answer as a non-answer.
pub const UNCERTAINTY_PHRASES: &[&str] = &[
    "kan niet beantwoorden",
    "niet in de beschikbare",
    "weet ik niet",
    "weet het niet",
    "geen informatie",
    "staat niet in mijn kennisbank",
];

/// Confidence ceiling applied when the answer contains an uncertainty
/// phrase.
pub const UNCERTAIN_CONFIDENCE_CAP: f64 = 30.0;

/// Score an answer in [0, 100].
///
/// Base = mean similarity of the used chunks, as a percentage rounded to
/// one decimal. Capped at 30 when the answer text contains any
/// uncertainty phrase (case-insensitive substring match). No evidence
/// scores 0.
pub fn score(similarities: &[f64], answer: &str) -> f64 {
    if similarities.is_empty() {
        return 0.0;
    }
    let mean = similarities.iter().sum::<f64>() / similarities.len() as f64;
    let mut confidence = (mean * 100.0 * 10.0).round() / 10.0;

    let lowered = answer.to_lowercase();
    if UNCERTAINTY_PHRASES.iter().any(|p| lowered.contains(p)) {
        confidence = confidence.min(UNCERTAIN_CONFIDENCE_CAP);
    }
    confidence
}
