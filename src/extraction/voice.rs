use super::patterns::SPOKEN_SYMPTOM_KEYWORDS;

/// Symptom keywords contained in a voice transcript, in keyword-table order.
///
/// Plain substring containment, so "headache" also reports "ache".
pub fn detect_spoken_symptoms(transcript: &str) -> Vec<&'static str> {
    let lower = transcript.to_lowercase();
    SPOKEN_SYMPTOM_KEYWORDS
        .iter()
        .copied()
        .filter(|keyword| lower.contains(keyword))
        .collect()
}
