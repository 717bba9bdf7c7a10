//! Stage handlers for the intake state machine.
//!
//! Each handler takes the current state and this turn's extraction, mutates
//! the state and returns the reply to append. None of them perform I/O;
//! when analysis should start they hand back the request for the session to
//! dispatch.

use super::responses::{self, PhrasePicker};
use super::urgency::analysis_urgency;
use crate::diagnosis::{AnalysisRequest, DiagnosisResult, Evidence};
use crate::extraction::ExtractionResult;
use crate::models::{ClarificationAnswer, ConversationState, Intent, Message, MessageMetadata, Stage};

/// What one user turn produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub reply: String,
    /// Set when the session should call the diagnosis service.
    pub analysis: Option<AnalysisRequest>,
}

impl TurnOutcome {
    fn reply(text: String) -> Self {
        Self {
            reply: text,
            analysis: None,
        }
    }
}

/// Advance the state machine by one user turn.
pub fn advance(
    state: &mut ConversationState,
    extraction: &ExtractionResult,
    picker: &dyn PhrasePicker,
) -> TurnOutcome {
    let from = state.stage;
    let outcome = match state.stage {
        Stage::Greeting => on_greeting(state, extraction, picker),
        Stage::SymptomGathering => on_symptom_gathering(state, extraction, picker),
        Stage::Clarification => on_clarification(state, extraction),
        Stage::Analysis => on_analysis(state),
        Stage::Recommendation => TurnOutcome::reply(responses::generic_acknowledgment(picker)),
    };
    if from != state.stage {
        tracing::debug!(from = %from, to = %state.stage, "Stage transition");
    }
    outcome
}

/// Merge profile fields and symptoms from this turn. Returns newly added symptoms.
fn absorb(state: &mut ConversationState, extraction: &ExtractionResult) -> Vec<String> {
    state.user_profile.merge(extraction.age, extraction.sex);
    let added = state.symptoms.extend_new(extraction.symptoms.iter());
    if extraction.severity_stated {
        state.context.severity = Some(extraction.severity);
    }
    if let Some(duration) = &extraction.duration {
        state.context.duration = Some(duration.clone());
    }
    added
}

fn on_greeting(
    state: &mut ConversationState,
    extraction: &ExtractionResult,
    picker: &dyn PhrasePicker,
) -> TurnOutcome {
    let added = absorb(state, extraction);

    if state.is_analysis_ready() {
        state.stage = Stage::SymptomGathering;
        return TurnOutcome::reply(responses::acknowledge_intake(
            &state.user_profile,
            &state.symptoms,
        ));
    }
    if extraction.has_profile_info() || !added.is_empty() {
        return TurnOutcome::reply(responses::ask_for_missing(
            &state.user_profile,
            &state.symptoms,
        ));
    }
    TurnOutcome::reply(responses::greeting_prompt(picker))
}

fn on_symptom_gathering(
    state: &mut ConversationState,
    extraction: &ExtractionResult,
    picker: &dyn PhrasePicker,
) -> TurnOutcome {
    let added = absorb(state, extraction);

    if extraction.intent == Intent::Confirmation && !state.symptoms.is_empty() {
        return match build_request(state) {
            Some(request) => start_analysis(state, request),
            None => TurnOutcome::reply(responses::ask_for_missing(
                &state.user_profile,
                &state.symptoms,
            )),
        };
    }
    if !added.is_empty() {
        return TurnOutcome::reply(responses::noted_symptoms(&added));
    }
    TurnOutcome::reply(responses::detail_prompt(picker, &state.symptoms))
}

fn on_clarification(state: &mut ConversationState, extraction: &ExtractionResult) -> TurnOutcome {
    if !extraction.intent.is_yes_no() {
        return TurnOutcome::reply(responses::clarification_reprompt(
            state.context.pending_question.as_deref(),
        ));
    }

    if let Some(question) = state.context.pending_question.take() {
        state.context.clarifications.push(ClarificationAnswer {
            question,
            answer: extraction.intent == Intent::Confirmation,
        });
    }

    match build_request(state) {
        Some(request) => start_analysis(state, request),
        None => {
            state.stage = Stage::SymptomGathering;
            TurnOutcome::reply(responses::ask_for_missing(
                &state.user_profile,
                &state.symptoms,
            ))
        }
    }
}

/// A user turn arriving in Analysis with no call in flight, e.g. after a failure.
fn on_analysis(state: &mut ConversationState) -> TurnOutcome {
    match build_request(state) {
        Some(request) => start_analysis(state, request),
        None => {
            state.stage = Stage::SymptomGathering;
            TurnOutcome::reply(responses::ask_for_missing(
                &state.user_profile,
                &state.symptoms,
            ))
        }
    }
}

fn start_analysis(state: &mut ConversationState, request: AnalysisRequest) -> TurnOutcome {
    state.stage = Stage::Analysis;
    TurnOutcome {
        reply: responses::ANALYSIS_PLACEHOLDER.to_string(),
        analysis: Some(request),
    }
}

/// Evidence for every recorded symptom at the session's severity.
///
/// `None` while symptoms or either profile field are missing.
pub fn build_request(state: &ConversationState) -> Option<AnalysisRequest> {
    if state.symptoms.is_empty() {
        return None;
    }
    let age = state.user_profile.age?;
    let sex = state.user_profile.sex?;
    let severity = state.context.effective_severity().evidence_score();

    Some(AnalysisRequest {
        evidence: state
            .symptoms
            .iter()
            .map(|name| Evidence {
                name: name.clone(),
                severity,
            })
            .collect(),
        age,
        sex,
    })
}

/// Fold a successful diagnosis into the state and build the analysis message.
pub fn apply_analysis(state: &mut ConversationState, result: &DiagnosisResult) -> Message {
    let urgency = analysis_urgency(state.symptoms.as_slice(), result);
    let text = responses::render_analysis(result, urgency);
    let question = result.question.as_ref().map(|q| q.text.clone());

    state.stage = if question.is_some() {
        Stage::Clarification
    } else {
        Stage::Recommendation
    };
    state.context.pending_question = question.clone();

    tracing::info!(
        conditions = result.conditions.len(),
        urgency = %urgency,
        stage = %state.stage,
        "Analysis applied"
    );

    Message::analysis(
        &text,
        MessageMetadata::new(result.conditions.clone(), urgency, result.confidence, question),
    )
}

/// Safety fallback for a failed diagnosis call. The stage is left untouched.
pub fn analysis_failed() -> Message {
    Message::assistant(responses::ANALYSIS_FALLBACK)
}
