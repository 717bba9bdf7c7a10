use std::collections::VecDeque;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{MessageAuthor, Stage, Urgency};
use super::profile::UserProfile;
use super::symptom::{SymptomContext, SymptomList};
use crate::config::DEFAULT_PREVIOUS_QUESTIONS_CAPACITY;

/// One transcript entry. Transcripts are append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub author: MessageAuthor,
    pub text: String,
    pub timestamp: NaiveDateTime,
    /// Only present on assistant messages that conclude an analysis step.
    pub metadata: Option<MessageMetadata>,
}

impl Message {
    pub fn user(text: &str) -> Self {
        Self::new(MessageAuthor::User, text, None)
    }

    pub fn assistant(text: &str) -> Self {
        Self::new(MessageAuthor::Assistant, text, None)
    }

    pub fn analysis(text: &str, metadata: MessageMetadata) -> Self {
        Self::new(MessageAuthor::Assistant, text, Some(metadata))
    }

    fn new(author: MessageAuthor, text: &str, metadata: Option<MessageMetadata>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author,
            text: text.to_string(),
            timestamp: Local::now().naive_local(),
            metadata,
        }
    }
}

/// A candidate condition returned by the diagnosis service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Condition {
    pub name: String,
    /// In [0, 1].
    pub probability: f32,
}

/// Analysis payload attached to the assistant message that closes an analysis step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageMetadata {
    pub conditions: Vec<Condition>,
    pub urgency: Urgency,
    /// Always in [0, 1]; clamped on construction.
    pub confidence: f32,
    pub follow_up_question: Option<String>,
}

impl MessageMetadata {
    pub fn new(
        conditions: Vec<Condition>,
        urgency: Urgency,
        confidence: f32,
        follow_up_question: Option<String>,
    ) -> Self {
        Self {
            conditions,
            urgency,
            confidence: clamp_unit(confidence),
            follow_up_question,
        }
    }
}

/// Clamp to [0, 1]; NaN becomes 0.
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Fixed-capacity window of the most recent raw user utterances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentUtterances {
    capacity: usize,
    items: VecDeque<String>,
}

impl RecentUtterances {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            items: VecDeque::with_capacity(capacity),
        }
    }

    /// Append, evicting the oldest entry once the window is full.
    pub fn push(&mut self, utterance: &str) {
        if self.capacity == 0 {
            return;
        }
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(utterance.to_string());
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for RecentUtterances {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_PREVIOUS_QUESTIONS_CAPACITY)
    }
}

/// Everything the dialogue manager knows about one session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationState {
    pub stage: Stage,
    pub symptoms: SymptomList,
    pub context: SymptomContext,
    pub previous_questions: RecentUtterances,
    pub user_profile: UserProfile,
}

impl ConversationState {
    pub fn new(previous_questions_capacity: usize) -> Self {
        Self {
            previous_questions: RecentUtterances::with_capacity(previous_questions_capacity),
            ..Self::default()
        }
    }

    /// Ready to be sent for analysis.
    pub fn is_analysis_ready(&self) -> bool {
        !self.symptoms.is_empty() && self.user_profile.is_complete()
    }
}
