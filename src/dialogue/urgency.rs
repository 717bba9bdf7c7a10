use crate::diagnosis::DiagnosisResult;
use crate::models::Urgency;

/// Symptoms that call for immediate care regardless of condition probabilities.
pub const RED_FLAG_SYMPTOMS: &[&str] = &[
    "chest pain",
    "difficulty breathing",
    "severe pain",
    "high fever",
    "bleeding",
    "confusion",
    "severe headache",
];

/// Whether any reported symptom is, or contains, a red-flag phrase.
pub fn has_red_flag<S: AsRef<str>>(symptoms: &[S]) -> bool {
    symptoms.iter().any(|s| {
        let lower = s.as_ref().to_lowercase();
        RED_FLAG_SYMPTOMS.iter().any(|flag| lower.contains(flag))
    })
}

/// Red-flag urgency: immediate care when flagged, otherwise schedule soon.
pub fn urgency_from_symptoms<S: AsRef<str>>(symptoms: &[S]) -> Urgency {
    if has_red_flag(symptoms) {
        Urgency::SeekImmediateCare
    } else {
        Urgency::ScheduleSoon
    }
}

/// Probability urgency from the most likely condition's probability.
pub fn urgency_from_probability(highest: f32) -> Urgency {
    if highest > 0.7 {
        Urgency::SeekImmediateCare
    } else if highest > 0.4 {
        Urgency::ScheduleSoon
    } else {
        Urgency::Routine
    }
}

/// Urgency attached to an analysis message.
///
/// Condition probabilities decide when present, escalated to immediate care
/// by any red-flag symptom; with no conditions the red-flag rule decides alone.
pub fn analysis_urgency<S: AsRef<str>>(symptoms: &[S], result: &DiagnosisResult) -> Urgency {
    let Some(highest) = result.highest_probability() else {
        return urgency_from_symptoms(symptoms);
    };
    if has_red_flag(symptoms) {
        return Urgency::SeekImmediateCare;
    }
    urgency_from_probability(highest)
}
