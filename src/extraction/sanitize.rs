use super::ExtractionError;

/// Cleaned user message, ready for extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedInput {
    pub text: String,
    /// Whether any characters were stripped.
    pub was_modified: bool,
}

/// Strip invisible and control characters, then enforce the length bound.
///
/// Length is counted in characters after stripping. Blank input is an error
/// so the caller can ignore it without touching the conversation.
pub fn sanitize_user_message(raw: &str, max_chars: usize) -> Result<SanitizedInput, ExtractionError> {
    let stripped = remove_control_characters(&remove_invisible_unicode(raw));
    let was_modified = stripped != raw;
    let text = stripped.trim().to_string();

    if text.is_empty() {
        return Err(ExtractionError::EmptyInput);
    }

    let actual = text.chars().count();
    if actual > max_chars {
        return Err(ExtractionError::InputTooLong {
            max: max_chars,
            actual,
        });
    }

    Ok(SanitizedInput { text, was_modified })
}

/// Remove zero-width and invisible Unicode characters.
fn remove_invisible_unicode(text: &str) -> String {
    text.chars()
        .filter(|c| {
            !matches!(
                *c,
                '\u{200B}'..='\u{200F}'
                | '\u{202A}'..='\u{202E}'
                | '\u{2060}'..='\u{2064}'
                | '\u{2066}'..='\u{2069}'
                | '\u{FEFF}'
                | '\u{00AD}'
                | '\u{034F}'
                | '\u{061C}'
                | '\u{180E}'
            )
        })
        .collect()
}

/// Remove control characters except newline and tab.
fn remove_control_characters(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}
