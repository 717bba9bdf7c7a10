use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::responses::{self, PhrasePicker, RandomPicker};
use super::transitions;
use super::DialogueError;
use crate::config::EngineConfig;
use crate::diagnosis::{
    AnalysisRequest, DiagnosisError, DiagnosisResult, DiagnosisService, DocumentSource,
};
use crate::extraction::{extract, is_document_request, sanitize_user_message};
use crate::models::{ConversationState, HealthDocument, Message};

/// A finished diagnosis call, tagged with the generation that started it.
struct AnalysisOutcome {
    generation: u64,
    result: Result<DiagnosisResult, DiagnosisError>,
}

struct PendingAnalysis {
    generation: u64,
    handle: JoinHandle<()>,
}

/// One user's intake conversation.
///
/// Owns the conversation state and the transcript. `send_user_message` is
/// the only way to drive a turn. Analysis turns append a placeholder
/// immediately and run the diagnosis call on a background task; its result
/// is appended by [`ChatSession::poll_analysis`] or
/// [`ChatSession::wait_for_analysis`]. At most one call is in flight.
pub struct ChatSession {
    user_id: String,
    config: EngineConfig,
    state: ConversationState,
    transcript: Vec<Message>,
    diagnosis: Arc<dyn DiagnosisService>,
    documents: Arc<dyn DocumentSource>,
    picker: Box<dyn PhrasePicker>,
    /// Bumped on reset; results from older generations are dropped.
    generation: u64,
    pending: Option<PendingAnalysis>,
    results_tx: mpsc::UnboundedSender<AnalysisOutcome>,
    results_rx: mpsc::UnboundedReceiver<AnalysisOutcome>,
    closed: bool,
}

impl ChatSession {
    pub fn new(
        user_id: &str,
        diagnosis: Arc<dyn DiagnosisService>,
        documents: Arc<dyn DocumentSource>,
        config: EngineConfig,
    ) -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let mut session = Self {
            user_id: user_id.to_string(),
            state: ConversationState::new(config.previous_questions_capacity),
            config,
            transcript: Vec::new(),
            diagnosis,
            documents,
            picker: Box::new(RandomPicker),
            generation: 0,
            pending: None,
            results_tx,
            results_rx,
            closed: false,
        };
        session.greet();
        session
    }

    /// Replace the phrase selector, e.g. with a [`super::FixedPicker`] in tests.
    pub fn with_picker(mut self, picker: Box<dyn PhrasePicker>) -> Self {
        self.picker = picker;
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Messages appended so far.
    ///
    /// A finished analysis is appended only when the session polls: at the
    /// start of the next `send_user_message`, or through
    /// [`ChatSession::poll_analysis`] / [`ChatSession::wait_for_analysis`].
    /// Hosts rendering between turns should poll first.
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn is_analysis_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Process one user utterance.
    ///
    /// Blank input is ignored. Failures inside the turn become assistant
    /// messages; only `SessionBusy` and `SessionClosed` reach the caller, and
    /// neither touches the state or transcript.
    pub async fn send_user_message(&mut self, text: &str) -> Result<(), DialogueError> {
        if self.closed {
            return Err(DialogueError::SessionClosed);
        }
        self.poll_analysis();
        if self.pending.is_some() {
            return Err(DialogueError::SessionBusy);
        }

        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        tracing::info!(
            stage = %self.state.stage,
            chars = text.chars().count(),
            "Turn received"
        );
        self.transcript.push(Message::user(text));
        self.state.previous_questions.push(text);

        let reply = match self.process_turn(text).await {
            Ok(reply) => reply,
            Err(DialogueError::Diagnosis(e)) => {
                tracing::warn!(error = %e, "Document fetch failed");
                responses::DOCUMENTS_FALLBACK.to_string()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Turn processing failed");
                responses::REPHRASE_MESSAGE.to_string()
            }
        };
        self.transcript.push(Message::assistant(&reply));
        Ok(())
    }

    async fn process_turn(&mut self, text: &str) -> Result<String, DialogueError> {
        let input = sanitize_user_message(text, self.config.max_message_chars)?;
        if input.was_modified {
            tracing::debug!("Stripped invisible/control characters from user message");
        }

        if is_document_request(&input.text.to_lowercase()) {
            tracing::info!(stage = %self.state.stage, "Document request, skipping stage logic");
            let documents = self.fetch_documents().await?;
            return Ok(responses::summarize_documents(
                &documents,
                self.config.max_documents,
            ));
        }

        let extraction = extract(&input.text);
        let snapshot = self.state.clone();
        let picker = self.picker.as_ref();
        let state = &mut self.state;
        let outcome = match catch_unwind(AssertUnwindSafe(|| {
            transitions::advance(state, &extraction, picker)
        })) {
            Ok(outcome) => outcome,
            Err(_) => {
                self.state = snapshot;
                return Err(DialogueError::TurnFailed(
                    "stage transition panicked".to_string(),
                ));
            }
        };
        if let Some(request) = outcome.analysis {
            self.dispatch_analysis(request);
        }
        Ok(outcome.reply)
    }

    async fn fetch_documents(&self) -> Result<Vec<HealthDocument>, DiagnosisError> {
        let fetch = self
            .documents
            .fetch_documents(&self.user_id, self.config.max_documents);
        match tokio::time::timeout(self.config.analysis_timeout(), fetch).await {
            Ok(result) => result,
            Err(_) => Err(DiagnosisError::Timeout(self.config.analysis_timeout_secs)),
        }
    }

    fn dispatch_analysis(&mut self, request: AnalysisRequest) {
        let generation = self.generation;
        let diagnosis = self.diagnosis.clone();
        let tx = self.results_tx.clone();
        let timeout = self.config.analysis_timeout();
        let timeout_secs = self.config.analysis_timeout_secs;

        tracing::info!(
            generation,
            evidence = request.evidence.len(),
            "Analysis dispatched"
        );

        let handle = tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, diagnosis.analyze(&request)).await {
                Ok(result) => result,
                Err(_) => Err(DiagnosisError::Timeout(timeout_secs)),
            };
            // Receiver lives as long as the session.
            let _ = tx.send(AnalysisOutcome { generation, result });
        });

        self.pending = Some(PendingAnalysis { generation, handle });
    }

    /// Append the result of a finished analysis, if any. Never blocks.
    pub fn poll_analysis(&mut self) {
        let finished = self
            .pending
            .as_ref()
            .is_some_and(|p| p.handle.is_finished());

        while let Ok(outcome) = self.results_rx.try_recv() {
            self.apply_outcome(outcome);
        }

        // Task ended without reporting (panicked).
        if finished {
            if let Some(pending) = self.pending.take() {
                self.apply_outcome(AnalysisOutcome {
                    generation: pending.generation,
                    result: Err(DiagnosisError::TaskFailed(
                        "analysis task ended without a result".to_string(),
                    )),
                });
            }
        }
    }

    /// Wait for the in-flight analysis, if any, and append its message.
    pub async fn wait_for_analysis(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        let generation = pending.generation;

        if let Err(e) = pending.handle.await {
            self.apply_outcome(AnalysisOutcome {
                generation,
                result: Err(DiagnosisError::TaskFailed(e.to_string())),
            });
            return;
        }
        while let Ok(outcome) = self.results_rx.try_recv() {
            self.apply_outcome(outcome);
        }
    }

    fn apply_outcome(&mut self, outcome: AnalysisOutcome) {
        if outcome.generation != self.generation {
            tracing::debug!(
                result_generation = outcome.generation,
                current_generation = self.generation,
                "Discarding stale analysis result"
            );
            return;
        }
        if self
            .pending
            .as_ref()
            .is_some_and(|p| p.generation == outcome.generation)
        {
            self.pending = None;
        }

        let message = match outcome.result {
            Ok(result) => transitions::apply_analysis(&mut self.state, &result),
            Err(e) => {
                tracing::warn!(error = %e, stage = %self.state.stage, "Analysis failed");
                transitions::analysis_failed()
            }
        };
        self.transcript.push(message);
    }

    /// Start over in place: new generation, fresh state, greeting re-emitted.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.abort_pending();
        self.state = ConversationState::new(self.config.previous_questions_capacity);
        self.transcript.clear();
        self.closed = false;
        self.greet();
        tracing::info!(generation = self.generation, "Session reset");
    }

    /// End the session. Later turns are rejected.
    pub fn close(&mut self) {
        self.generation += 1;
        self.abort_pending();
        self.closed = true;
    }

    fn abort_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
            tracing::debug!(generation = pending.generation, "Pending analysis aborted");
        }
    }

    fn greet(&mut self) {
        self.transcript
            .push(Message::assistant(responses::OPENING_GREETING));
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.abort_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnosis::{FailingDiagnosis, FollowUpQuestion, InMemoryDocuments, StaticDiagnosis};
    use crate::dialogue::FixedPicker;
    use crate::models::{Condition, MessageAuthor, Sex, Stage, Urgency};
    use std::time::Duration;

    fn diagnosis_result(question: Option<&str>) -> DiagnosisResult {
        DiagnosisResult {
            conditions: vec![
                Condition {
                    name: "Tension headache".into(),
                    probability: 0.64,
                },
                Condition {
                    name: "Migraine".into(),
                    probability: 0.21,
                },
            ],
            question: question.map(|q| FollowUpQuestion { text: q.into() }),
            confidence: 0.64,
        }
    }

    fn session_with(
        diagnosis: Arc<dyn DiagnosisService>,
        documents: Arc<dyn DocumentSource>,
    ) -> ChatSession {
        ChatSession::new("user-1", diagnosis, documents, EngineConfig::default())
            .with_picker(Box::new(FixedPicker(0)))
    }

    fn session(diagnosis: Arc<dyn DiagnosisService>) -> ChatSession {
        session_with(diagnosis, Arc::new(InMemoryDocuments::empty()))
    }

    fn last_text(session: &ChatSession) -> &str {
        &session.transcript().last().unwrap().text
    }

    #[tokio::test]
    async fn new_session_opens_with_greeting() {
        let s = session(Arc::new(FailingDiagnosis::new()));
        assert_eq!(s.transcript().len(), 1);
        assert_eq!(s.transcript()[0].author, MessageAuthor::Assistant);
        assert_eq!(s.transcript()[0].text, responses::OPENING_GREETING);
        assert_eq!(s.state().stage, Stage::Greeting);
    }

    #[tokio::test]
    async fn end_to_end_intake_and_analysis() {
        let diagnosis = Arc::new(StaticDiagnosis::new(diagnosis_result(None)));
        let requests = diagnosis.requests();
        let mut s = session(diagnosis);

        s.send_user_message("I'm 34 years old male and I have a headache")
            .await
            .unwrap();
        assert_eq!(s.state().user_profile.age, Some(34));
        assert_eq!(s.state().user_profile.sex, Some(Sex::Male));
        assert_eq!(s.state().symptoms.as_slice(), ["headache"]);
        assert_eq!(s.state().stage, Stage::SymptomGathering);
        assert_eq!(s.transcript().len(), 3);

        s.send_user_message("yes").await.unwrap();
        assert_eq!(s.state().stage, Stage::Analysis);
        assert_eq!(last_text(&s), responses::ANALYSIS_PLACEHOLDER);
        assert!(s.transcript().last().unwrap().metadata.is_none());

        s.wait_for_analysis().await;
        assert!(!s.is_analysis_pending());
        assert_eq!(s.state().stage, Stage::Recommendation);
        assert_eq!(s.transcript().len(), 6);

        let analysis = s.transcript().last().unwrap();
        assert!(analysis.text.contains("1. **Tension headache** (64% likelihood)"));
        let metadata = analysis.metadata.as_ref().unwrap();
        assert_eq!(metadata.conditions.len(), 2);
        assert_eq!(metadata.urgency, Urgency::ScheduleSoon);
        assert!((metadata.confidence - 0.64).abs() < f32::EPSILON);

        let sent = requests.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].evidence[0].name, "headache");
        assert_eq!(sent[0].evidence[0].severity, 3);
    }

    #[tokio::test]
    async fn analysis_result_applied_on_next_turn_poll() {
        let mut s = session(Arc::new(StaticDiagnosis::new(diagnosis_result(None))));
        s.send_user_message("I'm 34, male, and I have a cough").await.unwrap();
        s.send_user_message("yes").await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        s.send_user_message("thank you").await.unwrap();

        let texts: Vec<&str> = s.transcript().iter().map(|m| m.text.as_str()).collect();
        let placeholder = texts
            .iter()
            .position(|t| *t == responses::ANALYSIS_PLACEHOLDER)
            .unwrap();
        assert!(texts[placeholder + 1].starts_with("Based on my analysis"));
        assert_eq!(texts[placeholder + 2], "thank you");
        assert_eq!(s.state().stage, Stage::Recommendation);
    }

    #[tokio::test]
    async fn adapter_failure_leaves_stage_at_analysis() {
        let diagnosis = Arc::new(FailingDiagnosis::new());
        let mut s = session(diagnosis.clone());
        s.send_user_message("I'm 34 years old male and I have a headache")
            .await
            .unwrap();
        s.send_user_message("yes").await.unwrap();
        let before = s.transcript().len();

        s.wait_for_analysis().await;
        assert_eq!(s.state().stage, Stage::Analysis);
        assert_eq!(s.transcript().len(), before + 1);
        let fallback = s.transcript().last().unwrap();
        assert_eq!(fallback.text, responses::ANALYSIS_FALLBACK);
        assert!(fallback.metadata.is_none());
        assert_eq!(diagnosis.calls(), 1);
    }

    #[tokio::test]
    async fn busy_while_analysis_in_flight() {
        let diagnosis =
            StaticDiagnosis::new(diagnosis_result(None)).with_delay(Duration::from_millis(300));
        let mut s = session(Arc::new(diagnosis));
        s.send_user_message("I'm 34 years old male and I have a headache")
            .await
            .unwrap();
        s.send_user_message("yes").await.unwrap();

        let len = s.transcript().len();
        let stage = s.state().stage;
        let err = s.send_user_message("hello?").await.unwrap_err();
        assert!(matches!(err, DialogueError::SessionBusy));
        assert_eq!(s.transcript().len(), len);
        assert_eq!(s.state().stage, stage);

        s.wait_for_analysis().await;
        assert!(s.send_user_message("thanks").await.is_ok());
    }

    #[tokio::test]
    async fn slow_diagnosis_times_out_to_fallback() {
        let diagnosis =
            StaticDiagnosis::new(diagnosis_result(None)).with_delay(Duration::from_secs(3));
        let config = EngineConfig {
            analysis_timeout_secs: 1,
            ..EngineConfig::default()
        };
        let mut s = ChatSession::new(
            "user-1",
            Arc::new(diagnosis),
            Arc::new(InMemoryDocuments::empty()),
            config,
        );
        s.send_user_message("I'm 34 years old male and I have a headache")
            .await
            .unwrap();
        s.send_user_message("yes").await.unwrap();
        s.wait_for_analysis().await;

        assert_eq!(last_text(&s), responses::ANALYSIS_FALLBACK);
        assert_eq!(s.state().stage, Stage::Analysis);
    }

    #[tokio::test]
    async fn stale_result_after_reset_is_discarded() {
        let mut s = session(Arc::new(StaticDiagnosis::new(diagnosis_result(None))));
        s.send_user_message("I'm 34 years old male and I have a headache")
            .await
            .unwrap();
        s.send_user_message("yes").await.unwrap();

        // Let the task deliver into the channel before resetting.
        tokio::time::sleep(Duration::from_millis(50)).await;
        s.reset();
        assert_eq!(s.transcript().len(), 1);
        assert_eq!(s.state().stage, Stage::Greeting);

        s.send_user_message("hello").await.unwrap();
        assert!(s.transcript().iter().all(|m| m.metadata.is_none()));
        assert_eq!(s.state().stage, Stage::Greeting);
        assert!(s.state().symptoms.is_empty());
    }

    #[tokio::test]
    async fn reset_aborts_in_flight_analysis() {
        let diagnosis =
            StaticDiagnosis::new(diagnosis_result(None)).with_delay(Duration::from_millis(200));
        let mut s = session(Arc::new(diagnosis));
        s.send_user_message("I'm 34 years old male and I have a headache")
            .await
            .unwrap();
        s.send_user_message("yes").await.unwrap();
        assert!(s.is_analysis_pending());

        s.reset();
        assert!(!s.is_analysis_pending());
        tokio::time::sleep(Duration::from_millis(300)).await;
        s.poll_analysis();
        assert_eq!(s.transcript().len(), 1);
    }

    #[tokio::test]
    async fn clarification_round_trip() {
        let diagnosis = Arc::new(StaticDiagnosis::sequence(vec![
            diagnosis_result(Some("Is the pain on one side of your head?")),
            diagnosis_result(None),
        ]));
        let mut s = session(diagnosis.clone());
        s.send_user_message("I'm 34 years old male and I have a headache")
            .await
            .unwrap();
        s.send_user_message("yes").await.unwrap();
        s.wait_for_analysis().await;

        assert_eq!(s.state().stage, Stage::Clarification);
        assert!(last_text(&s).ends_with("Is the pain on one side of your head?"));

        s.send_user_message("yes").await.unwrap();
        assert_eq!(s.state().stage, Stage::Analysis);
        assert_eq!(s.state().context.clarifications.len(), 1);
        assert!(s.state().context.clarifications[0].answer);

        s.wait_for_analysis().await;
        assert_eq!(s.state().stage, Stage::Recommendation);
        assert_eq!(diagnosis.requests().lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn document_request_bypasses_stage_logic() {
        let mut doc = HealthDocument::new("Blood panel", "lab_result");
        doc.description = Some("Routine CBC, all values within range".into());
        let documents = Arc::new(InMemoryDocuments::new(vec![doc]));
        let mut s = session_with(Arc::new(FailingDiagnosis::new()), documents.clone());

        s.send_user_message("I'm 34 years old male and I have a headache")
            .await
            .unwrap();
        let state_before = s.state().clone();

        s.send_user_message("yes, show my documents and I have a fever")
            .await
            .unwrap();
        assert_eq!(documents.calls(), 1);
        assert_eq!(s.state().stage, state_before.stage);
        assert_eq!(s.state().symptoms, state_before.symptoms);
        assert!(!s.is_analysis_pending());
        assert!(last_text(&s).contains("**Blood panel** (lab_result)"));
        assert!(last_text(&s).contains("Routine CBC"));
    }

    #[tokio::test]
    async fn no_documents_sentinel() {
        let mut s = session(Arc::new(FailingDiagnosis::new()));
        s.send_user_message("what's in my medical history?").await.unwrap();
        assert_eq!(last_text(&s), responses::NO_DOCUMENTS_MESSAGE);
        assert_eq!(s.state().stage, Stage::Greeting);
    }

    #[tokio::test]
    async fn document_fetch_failure_falls_back() {
        let mut s = session_with(
            Arc::new(FailingDiagnosis::new()),
            Arc::new(InMemoryDocuments::failing()),
        );
        s.send_user_message("can you check my records").await.unwrap();
        assert_eq!(last_text(&s), responses::DOCUMENTS_FALLBACK);
        assert_eq!(s.state().stage, Stage::Greeting);
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let mut s = session(Arc::new(FailingDiagnosis::new()));
        s.send_user_message("   \n\t ").await.unwrap();
        assert_eq!(s.transcript().len(), 1);
        assert!(s.state().previous_questions.is_empty());
    }

    #[tokio::test]
    async fn overlong_input_asks_to_rephrase() {
        let config = EngineConfig {
            max_message_chars: 20,
            ..EngineConfig::default()
        };
        let mut s = ChatSession::new(
            "user-1",
            Arc::new(FailingDiagnosis::new()),
            Arc::new(InMemoryDocuments::empty()),
            config,
        );
        s.send_user_message("I have a headache that has lasted far too long")
            .await
            .unwrap();
        assert_eq!(last_text(&s), responses::REPHRASE_MESSAGE);
        assert!(s.state().symptoms.is_empty());

        s.send_user_message("hi").await.unwrap();
        assert_eq!(s.transcript().len(), 5);
    }

    #[tokio::test]
    async fn previous_questions_keep_latest_five() {
        let mut s = session(Arc::new(FailingDiagnosis::new()));
        for i in 0..7 {
            s.send_user_message(&format!("message {i}")).await.unwrap();
        }
        let kept: Vec<&str> = s.state().previous_questions.iter().collect();
        assert_eq!(
            kept,
            vec!["message 2", "message 3", "message 4", "message 5", "message 6"]
        );
    }

    #[tokio::test]
    async fn duplicate_symptoms_across_turns() {
        let mut s = session(Arc::new(FailingDiagnosis::new()));
        s.send_user_message("I'm 34 years old male and I have a headache")
            .await
            .unwrap();
        s.send_user_message("I have a HEADACHE").await.unwrap();
        assert_eq!(s.state().symptoms.len(), 1);
    }

    #[tokio::test]
    async fn chest_pain_seeks_immediate_care() {
        let result = DiagnosisResult {
            conditions: vec![Condition {
                name: "Costochondritis".into(),
                probability: 0.2,
            }],
            question: None,
            confidence: 0.2,
        };
        let mut s = session(Arc::new(StaticDiagnosis::new(result)));
        s.send_user_message("I'm 58, male, and I have chest pain").await.unwrap();
        s.send_user_message("yes").await.unwrap();
        s.wait_for_analysis().await;

        let metadata = s.transcript().last().unwrap().metadata.clone().unwrap();
        assert_eq!(metadata.urgency, Urgency::SeekImmediateCare);
    }

    struct PanickingPicker;

    impl PhrasePicker for PanickingPicker {
        fn pick(&self, _len: usize) -> usize {
            panic!("picker failure");
        }
    }

    struct PanickingDiagnosis;

    #[async_trait::async_trait]
    impl DiagnosisService for PanickingDiagnosis {
        async fn analyze(
            &self,
            _request: &AnalysisRequest,
        ) -> Result<DiagnosisResult, DiagnosisError> {
            panic!("diagnosis failure");
        }
    }

    #[tokio::test]
    async fn panicking_transition_asks_to_rephrase() {
        let mut s = ChatSession::new(
            "user-1",
            Arc::new(FailingDiagnosis::new()),
            Arc::new(InMemoryDocuments::empty()),
            EngineConfig::default(),
        )
        .with_picker(Box::new(PanickingPicker));

        s.send_user_message("hello").await.unwrap();
        assert_eq!(last_text(&s), responses::REPHRASE_MESSAGE);
        assert_eq!(s.state().stage, Stage::Greeting);

        s.send_user_message("I'm 34 years old male and I have a headache")
            .await
            .unwrap();
        assert_eq!(s.state().stage, Stage::SymptomGathering);
    }

    #[tokio::test]
    async fn panicking_diagnosis_falls_back() {
        let mut s = session(Arc::new(PanickingDiagnosis));
        s.send_user_message("I'm 34 years old male and I have a headache")
            .await
            .unwrap();
        s.send_user_message("yes").await.unwrap();
        s.wait_for_analysis().await;

        assert_eq!(last_text(&s), responses::ANALYSIS_FALLBACK);
        assert_eq!(s.state().stage, Stage::Analysis);
        assert!(s.send_user_message("thanks").await.is_ok());
    }

    #[tokio::test]
    async fn finished_analysis_visible_after_poll() {
        let mut s = session(Arc::new(StaticDiagnosis::new(diagnosis_result(None))));
        s.send_user_message("I'm 34 years old male and I have a headache")
            .await
            .unwrap();
        s.send_user_message("yes").await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(last_text(&s), responses::ANALYSIS_PLACEHOLDER);
        s.poll_analysis();
        assert!(last_text(&s).starts_with("Based on my analysis"));
    }

    #[tokio::test]
    async fn closed_session_rejects_turns() {
        let mut s = session(Arc::new(FailingDiagnosis::new()));
        s.close();
        let err = s.send_user_message("hello").await.unwrap_err();
        assert!(matches!(err, DialogueError::SessionClosed));
        assert_eq!(s.transcript().len(), 1);

        s.reset();
        assert!(s.send_user_message("hello").await.is_ok());
    }
}
