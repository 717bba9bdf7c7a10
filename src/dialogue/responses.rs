//! Assistant reply texts: fixed messages, randomized phrase pools and the
//! analysis and document renderings.

use rand::Rng;

use crate::diagnosis::DiagnosisResult;
use crate::models::{HealthDocument, SymptomList, Urgency, UserProfile};

// ═══════════════════════════════════════════
// Phrase selection
// ═══════════════════════════════════════════

/// Chooses an index into a phrase pool.
pub trait PhrasePicker: Send + Sync {
    /// Return an index in `0..len`. `len` is never zero.
    fn pick(&self, len: usize) -> usize;
}

/// Uniform random choice on every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPicker;

impl PhrasePicker for RandomPicker {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Always the same slot (wrapped to the pool size).
#[derive(Debug, Clone, Copy)]
pub struct FixedPicker(pub usize);

impl PhrasePicker for FixedPicker {
    fn pick(&self, len: usize) -> usize {
        self.0 % len
    }
}

fn choose<'a>(picker: &dyn PhrasePicker, pool: &[&'a str]) -> &'a str {
    pool[picker.pick(pool.len()).min(pool.len() - 1)]
}

// ═══════════════════════════════════════════
// Fixed messages
// ═══════════════════════════════════════════

pub const OPENING_GREETING: &str = "Hello! I'm your AI health assistant. I'm here to help you \
understand your symptoms and provide medical guidance. How are you feeling today?";

pub const ANALYSIS_PLACEHOLDER: &str = "Let me analyze your symptoms using medical AI...";

pub const ANALYSIS_FALLBACK: &str = "I'm having trouble analyzing your symptoms right now. \
Based on what you've told me, I'd recommend consulting with a healthcare professional, \
especially if your symptoms persist or worsen.";

pub const REPHRASE_MESSAGE: &str = "I apologize, but I'm having trouble processing your \
message. Could you please rephrase your concern?";

pub const DOCUMENTS_FALLBACK: &str = "I couldn't access your health records right now. \
For questions about your medical history, please consult a healthcare professional.";

pub const NO_DOCUMENTS_MESSAGE: &str = "I couldn't find any uploaded documents or health \
records in your account yet. Once you upload reports, prescriptions or lab results, I can \
summarize them for you.";

/// Characters of description/extracted text shown per document.
const DOCUMENT_PREVIEW_CHARS: usize = 150;

/// Conditions listed in the analysis text.
const CONDITIONS_SHOWN: usize = 3;

// ═══════════════════════════════════════════
// Phrase pools
// ═══════════════════════════════════════════

pub const GREETING_PROMPTS: [&str; 4] = [
    "I'm here to help with any health concerns you might have. Please describe any symptoms \
you're experiencing, and I'll do my best to provide guidance.",
    "Tell me what's been bothering you. Mentioning your age and sex along with your symptoms \
helps me give better guidance.",
    "How can I help today? Describe how you're feeling, for example \"I'm 40, female, and I \
have a sore throat.\"",
    "I'm listening. What symptoms have you noticed, and how long have you had them?",
];

/// `{symptoms}` is replaced with the running symptom list.
pub const DETAIL_PROMPTS: [&str; 4] = [
    "Could you tell me more about your {symptoms}? For example, where exactly do you feel \
discomfort, and how long has it been going on?",
    "How would you rate your {symptoms}: mild, moderate, or severe? Is there anything else \
you've noticed?",
    "Has anything made your {symptoms} better or worse? If you have nothing to add, just say \
yes and I'll analyze what you've told me.",
    "Are there any other symptoms alongside your {symptoms}? When did it start?",
];

pub const EMPTY_DETAIL_PROMPTS: [&str; 4] = [
    "Could you provide more details about your symptoms? For example, where exactly do you \
feel discomfort, and how long have you been experiencing this?",
    "I haven't noted any specific symptoms yet. What are you feeling right now?",
    "Can you describe what's bothering you? Something like \"I have a headache for 2 days\" \
works well.",
    "Which symptoms would you like me to look at? Please describe them in your own words.",
];

pub const GENERIC_ACKNOWLEDGMENTS: [&str; 4] = [
    "Thank you for sharing that. If your symptoms change or get worse, please reach out to a \
healthcare professional.",
    "I've noted that. Remember that this guidance is informational only; a healthcare \
provider can give you a proper assessment.",
    "Understood. Is there anything else about your health you'd like to talk about?",
    "Thanks for letting me know. Keep monitoring how you feel, and don't hesitate to contact \
your doctor if you're concerned.",
];

pub fn greeting_prompt(picker: &dyn PhrasePicker) -> String {
    choose(picker, &GREETING_PROMPTS).to_string()
}

pub fn detail_prompt(picker: &dyn PhrasePicker, symptoms: &SymptomList) -> String {
    if symptoms.is_empty() {
        choose(picker, &EMPTY_DETAIL_PROMPTS).to_string()
    } else {
        choose(picker, &DETAIL_PROMPTS).replace("{symptoms}", &symptoms.joined())
    }
}

pub fn generic_acknowledgment(picker: &dyn PhrasePicker) -> String {
    choose(picker, &GENERIC_ACKNOWLEDGMENTS).to_string()
}

// ═══════════════════════════════════════════
// Intake replies
// ═══════════════════════════════════════════

/// Everything needed is known: confirm back and invite more detail.
pub fn acknowledge_intake(profile: &UserProfile, symptoms: &SymptomList) -> String {
    let who = match (profile.age, profile.sex) {
        (Some(age), Some(sex)) => format!("a {age}-year-old {sex}"),
        _ => "someone".to_string(),
    };
    format!(
        "Thank you. I understand you're {who} experiencing {}. How severe does it feel \
(mild, moderate, or severe), and are there any other symptoms? When you're ready, say yes and \
I'll analyze what you've told me.",
        symptoms.joined()
    )
}

/// Ask for whatever is still missing among age, sex and symptoms.
pub fn ask_for_missing(profile: &UserProfile, symptoms: &SymptomList) -> String {
    let missing = profile.missing_fields().join(" and ");
    match (symptoms.is_empty(), missing.is_empty()) {
        (true, true) => "Thanks for that. What symptoms are you experiencing?".to_string(),
        (true, false) => format!(
            "Thanks. Could you also tell me your {missing}, and describe any symptoms you're \
experiencing?"
        ),
        (false, _) => format!(
            "I understand you're experiencing {}. To assess this properly, could you tell me \
your {}?",
            symptoms.joined(),
            if missing.is_empty() { "age and sex" } else { missing.as_str() }
        ),
    }
}

pub fn noted_symptoms(new_symptoms: &[String]) -> String {
    format!(
        "I've noted {} as well. Are there any other symptoms you'd like to mention? If not, \
say yes and I can analyze what you've told me so far.",
        new_symptoms.join(", ")
    )
}

pub fn clarification_reprompt(question: Option<&str>) -> String {
    match question {
        Some(q) => format!("Please answer yes or no so I can refine the analysis: {q}"),
        None => "Please answer yes or no, or tell me more about how you're feeling.".to_string(),
    }
}

// ═══════════════════════════════════════════
// Analysis rendering
// ═══════════════════════════════════════════

pub fn recommendation_text(urgency: Urgency) -> &'static str {
    match urgency {
        Urgency::SeekImmediateCare => {
            "**Important:** Based on your symptoms, I recommend seeking immediate medical \
attention. Please consider visiting an emergency room or urgent care center."
        }
        Urgency::ScheduleSoon => {
            "**Recommendation:** You should schedule an appointment with your healthcare \
provider within the next few days to discuss these symptoms."
        }
        Urgency::Routine => {
            "**Recommendation:** Keep monitoring your symptoms. If they worsen or persist, \
consider scheduling a routine appointment with your healthcare provider."
        }
    }
}

/// Top conditions, then the follow-up question or the recommendation.
pub fn render_analysis(result: &DiagnosisResult, urgency: Urgency) -> String {
    let mut text = if result.conditions.is_empty() {
        "Based on my analysis, I couldn't match your symptoms to a specific condition.\n\n"
            .to_string()
    } else {
        let mut listing = String::from(
            "Based on my analysis of your symptoms, here are the most likely conditions:\n\n",
        );
        for (index, condition) in result.conditions.iter().take(CONDITIONS_SHOWN).enumerate() {
            listing.push_str(&format!(
                "{}. **{}** ({}% likelihood)\n",
                index + 1,
                condition.name,
                (condition.probability * 100.0).round() as u32
            ));
        }
        listing.push('\n');
        listing
    };

    match &result.question {
        Some(question) => text.push_str(&format!(
            "I have a follow-up question to better understand your condition: {}",
            question.text
        )),
        None => text.push_str(recommendation_text(urgency)),
    }
    text
}

// ═══════════════════════════════════════════
// Document summary
// ═══════════════════════════════════════════

/// List up to `max` documents, newest first as given.
pub fn summarize_documents(documents: &[HealthDocument], max: usize) -> String {
    if documents.is_empty() || max == 0 {
        return NO_DOCUMENTS_MESSAGE.to_string();
    }

    let mut text = String::from("Here's a summary of your most recent health records:\n\n");
    for (index, doc) in documents.iter().take(max).enumerate() {
        let mut header = format!("{}. **{}** ({}", index + 1, doc.title, doc.record_type);
        if let Some(date) = doc.date_recorded {
            header.push_str(&format!(", {}", date.format("%Y-%m-%d")));
        }
        header.push(')');
        text.push_str(&header);
        text.push('\n');
        if let Some(preview) = doc.preview_source() {
            text.push_str("   ");
            text.push_str(&truncate_chars(preview.trim(), DOCUMENT_PREVIEW_CHARS));
            text.push('\n');
        }
    }
    text.push_str("\nLet me know if you'd like to discuss any of these, or describe any new symptoms.");
    text
}

/// Truncate to `max` characters with "..." if longer, on a char boundary.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_string(),
    }
}
