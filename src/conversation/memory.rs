//! Per-session memory store.
//!
//! Owns one `ConversationMemory` and applies turns to it. A user turn runs
//! classifier → symptom extractor → emotional tracker, in that order, against
//! the same utterance. A bot turn runs the tracker with the service's mood hint
//! and merges whatever the reply proposed.

use crate::models::{ConversationMemory, Coordinates, SenderType};
use crate::pipeline::classify::{classify_profile, extract_preferred_name};
use crate::pipeline::emotion::{self, track_turn};
use crate::pipeline::stage::{self, advance_stage, earned_stage, parse_stage_hint, StagePolicy};
use crate::pipeline::symptoms::{extract_symptoms, merge_symptoms};
use crate::services::types::ReasoningResponse;

/// Characters kept from the first utterance when it becomes the current issue.
const CURRENT_ISSUE_MAX_CHARS: usize = 80;

/// What a user turn changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserTurnSummary {
    pub new_symptoms: Vec<String>,
    pub stage_changed: bool,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    memory: ConversationMemory,
    policy: StagePolicy,
    user_turns: usize,
}

impl MemoryStore {
    pub fn new(policy: StagePolicy) -> Self {
        Self {
            memory: ConversationMemory::default(),
            policy,
            user_turns: 0,
        }
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn snapshot(&self) -> ConversationMemory {
        self.memory.clone()
    }

    pub fn apply_user_turn(&mut self, text: &str) -> UserTurnSummary {
        if text.trim().is_empty() {
            return UserTurnSummary::default();
        }
        self.user_turns += 1;

        let profile = &mut self.memory.user_profile;
        *profile = classify_profile(text, profile);
        if let Some(name) = extract_preferred_name(text) {
            tracing::debug!("Preferred name detected");
            profile.preferred_name = Some(name);
        }

        let context = &mut self.memory.diagnostic_context;
        if context.current_issue.is_none() {
            context.current_issue = Some(summarize_issue(text));
        }
        let new_symptoms = merge_symptoms(&mut context.collected_symptoms, extract_symptoms(text));
        if !new_symptoms.is_empty() {
            tracing::debug!(
                added = new_symptoms.len(),
                total = context.collected_symptoms.len(),
                "Symptoms collected"
            );
        }

        track_turn(&mut self.memory.emotional_journey, text, SenderType::User, None);

        let stage_changed = self.advance_to_earned();
        UserTurnSummary {
            new_symptoms,
            stage_changed,
        }
    }

    /// Greeting turn: only the mood hint is taken, the stage stays at `greeting`.
    pub fn apply_greeting(&mut self, response: &ReasoningResponse) {
        track_turn(
            &mut self.memory.emotional_journey,
            &response.message,
            SenderType::Bot,
            response.mood_hint(),
        );
    }

    pub fn apply_bot_turn(&mut self, response: &ReasoningResponse) {
        track_turn(
            &mut self.memory.emotional_journey,
            &response.message,
            SenderType::Bot,
            response.mood_hint(),
        );

        let context = &mut self.memory.diagnostic_context;
        for solution in response.proposed_solutions() {
            context.suggested_solutions.insert(solution.to_string());
        }
        if let Some(repairers) = response.repairers() {
            tracing::debug!(count = repairers.len(), "Nearby repairers updated");
            context.nearby_repairers = repairers;
        }
        if let Some(target) = parse_stage_hint(response.stage_hint()) {
            advance_stage(context, target);
        }

        self.advance_to_earned();
    }

    fn advance_to_earned(&mut self) -> bool {
        let context = &mut self.memory.diagnostic_context;
        let target = earned_stage(context, self.user_turns > 0, &self.policy);
        advance_stage(context, target)
    }

    pub fn set_location(&mut self, coordinates: Coordinates) {
        self.memory.diagnostic_context.location = Some(coordinates);
    }

    /// Append a rating clamped to 1..=5 and return the stored value.
    pub fn record_satisfaction(&mut self, score: u8) -> u8 {
        let score = score.clamp(1, 5);
        self.memory.user_profile.satisfaction_history.push(score);
        score
    }

    pub fn complete(&mut self) {
        stage::complete(&mut self.memory.diagnostic_context);
    }

    /// Back to defaults. The stage policy is kept.
    pub fn reset(&mut self) {
        self.memory = ConversationMemory::default();
        self.user_turns = 0;
    }

    pub fn thinking_text(&self) -> &'static str {
        emotion::thinking_text(
            self.memory.emotional_journey.current_mood(),
            self.memory.user_profile.urgency_level,
        )
    }
}

/// First utterance as a one-line issue summary, cut on a char boundary.
fn summarize_issue(text: &str) -> String {
    let trimmed = text.trim();
    let boundary = trimmed
        .char_indices()
        .nth(CURRENT_ISSUE_MAX_CHARS)
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());

    if boundary >= trimmed.len() {
        trimmed.to_string()
    } else {
        format!("{}...", &trimmed[..boundary])
    }
}
