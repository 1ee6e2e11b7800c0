//! Emotional state tracking across a conversation.
//!
//! User turns are scored against the mood keyword table. Bot turns only
//! move the journey when the reasoning service sent a mood hint; without
//! one they are a no-op. Both levels stay in [0, 100] whatever the deltas.

use serde::{Deserialize, Serialize};

use super::rules::{first_match, MOOD_RULES};
use crate::models::{EmotionalJourney, SenderType, UrgencyLevel};

/// Mood signal supplied by the reasoning service alongside a reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodHint {
    pub mood: Option<String>,
    pub frustration_delta: Option<i32>,
    pub confidence_delta: Option<i32>,
}

impl MoodHint {
    pub fn is_empty(&self) -> bool {
        self.mood.is_none() && self.frustration_delta.is_none() && self.confidence_delta.is_none()
    }
}

/// Update the journey for one message.
pub fn track_turn(
    journey: &mut EmotionalJourney,
    content: &str,
    sender: SenderType,
    hint: Option<&MoodHint>,
) {
    match sender {
        SenderType::User => track_user_turn(journey, content),
        SenderType::Bot => match hint.filter(|h| !h.is_empty()) {
            Some(hint) => journey.apply(
                hint.frustration_delta.unwrap_or(0),
                hint.confidence_delta.unwrap_or(0),
                hint.mood.as_deref(),
            ),
            None => tracing::trace!("Bot turn without mood hint"),
        },
    }
}

fn track_user_turn(journey: &mut EmotionalJourney, content: &str) {
    if content.trim().is_empty() {
        return;
    }
    let lowered = content.to_lowercase();
    match first_match(MOOD_RULES, &lowered) {
        Some(shift) => journey.apply(
            shift.frustration_delta,
            shift.confidence_delta,
            Some(shift.mood),
        ),
        None => tracing::trace!("No mood signal in user turn"),
    }
}

/// Placeholder shown while the reasoning service is working.
///
/// Depends only on mood and urgency; it is never stored as a message.
pub fn thinking_text(current_mood: &str, urgency: UrgencyLevel) -> &'static str {
    match (current_mood, urgency) {
        ("frustrated", UrgencyLevel::High) => {
            "Je comprends l'urgence, je cherche la solution la plus rapide..."
        }
        ("frustrated", _) => "Je comprends votre frustration, je regarde ça de près...",
        ("anxious", _) => "Pas d'inquiétude, j'analyse la situation...",
        ("confused", _) => "Je vais reformuler ça plus simplement...",
        (_, UrgencyLevel::High) => "Je traite votre demande en priorité...",
        (_, UrgencyLevel::Low) => "Je prends le temps d'examiner votre appareil...",
        _ => "Je réfléchis à votre problème...",
    }
}
