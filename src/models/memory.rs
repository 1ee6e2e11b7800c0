use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::enums::{CommunicationStyle, DiagnosisStage, UrgencyLevel};

/// Mood label every session starts from.
pub const DEFAULT_MOOD: &str = "neutral";
/// Confidence level of a fresh session.
pub const DEFAULT_CONFIDENCE: u8 = 50;

const LEVEL_MAX: i32 = 100;

/// Who the user is and how they talk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub communication_style: CommunicationStyle,
    pub urgency_level: UrgencyLevel,
    pub preferred_name: Option<String>,
    /// Append-only, oldest first.
    pub satisfaction_history: Vec<u8>,
}

/// Direction of the last two satisfaction ratings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SatisfactionTrend {
    Improving,
    Declining,
    Stable,
    /// Fewer than two ratings.
    Unknown,
}

impl UserProfile {
    pub fn satisfaction_trend(&self) -> SatisfactionTrend {
        match self.satisfaction_history.as_slice() {
            [.., prev, last] if last > prev => SatisfactionTrend::Improving,
            [.., prev, last] if last < prev => SatisfactionTrend::Declining,
            [_, _, ..] => SatisfactionTrend::Stable,
            _ => SatisfactionTrend::Unknown,
        }
    }
}

/// Device location as reported by the geolocation service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Where the diagnosis stands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticContext {
    pub current_issue: Option<String>,
    pub diagnosis_stage: DiagnosisStage,
    pub collected_symptoms: BTreeSet<String>,
    pub suggested_solutions: BTreeSet<String>,
    /// Opaque records supplied by the reasoning service.
    pub nearby_repairers: Vec<serde_json::Value>,
    pub location: Option<Coordinates>,
}

/// Mood trajectory over the conversation.
///
/// Levels are kept in [0, 100] by construction: the only mutation path
/// is `apply`, which clamps after adding the signed delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "JourneyRecord")]
pub struct EmotionalJourney {
    initial_mood: String,
    current_mood: String,
    frustration_level: u8,
    confidence_level: u8,
}

impl Default for EmotionalJourney {
    fn default() -> Self {
        Self::starting_with(DEFAULT_MOOD)
    }
}

impl EmotionalJourney {
    /// Fresh journey whose initial and current mood are `mood`.
    pub fn starting_with(mood: &str) -> Self {
        Self {
            initial_mood: mood.to_string(),
            current_mood: mood.to_string(),
            frustration_level: 0,
            confidence_level: DEFAULT_CONFIDENCE,
        }
    }

    pub fn initial_mood(&self) -> &str {
        &self.initial_mood
    }

    pub fn current_mood(&self) -> &str {
        &self.current_mood
    }

    pub fn frustration_level(&self) -> u8 {
        self.frustration_level
    }

    pub fn confidence_level(&self) -> u8 {
        self.confidence_level
    }

    /// Apply signed deltas, clamp both levels, and switch mood if one is given.
    pub fn apply(&mut self, frustration_delta: i32, confidence_delta: i32, mood: Option<&str>) {
        self.frustration_level = clamp_level(self.frustration_level, frustration_delta);
        self.confidence_level = clamp_level(self.confidence_level, confidence_delta);
        if let Some(mood) = mood.map(str::trim).filter(|m| !m.is_empty()) {
            if mood != self.current_mood {
                tracing::debug!(from = %self.current_mood, to = %mood, "Mood changed");
                self.current_mood = mood.to_string();
            }
        }
    }
}

/// Wire form of `EmotionalJourney`. Levels are clamped on the way in.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JourneyRecord {
    initial_mood: String,
    current_mood: String,
    frustration_level: i64,
    confidence_level: i64,
}

impl From<JourneyRecord> for EmotionalJourney {
    fn from(record: JourneyRecord) -> Self {
        Self {
            initial_mood: record.initial_mood,
            current_mood: record.current_mood,
            frustration_level: record.frustration_level.clamp(0, i64::from(LEVEL_MAX)) as u8,
            confidence_level: record.confidence_level.clamp(0, i64::from(LEVEL_MAX)) as u8,
        }
    }
}

fn clamp_level(level: u8, delta: i32) -> u8 {
    (i32::from(level).saturating_add(delta)).clamp(0, LEVEL_MAX) as u8
}

/// Everything the assistant remembers about one conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMemory {
    pub user_profile: UserProfile,
    pub diagnostic_context: DiagnosticContext,
    pub emotional_journey: EmotionalJourney,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_memory_matches_documented_defaults() {
        let memory = ConversationMemory::default();
        assert_eq!(memory.user_profile.communication_style, CommunicationStyle::Casual);
        assert_eq!(memory.user_profile.urgency_level, UrgencyLevel::Medium);
        assert_eq!(memory.diagnostic_context.diagnosis_stage, DiagnosisStage::Greeting);
        assert!(memory.diagnostic_context.collected_symptoms.is_empty());
        assert_eq!(memory.emotional_journey.frustration_level(), 0);
        assert_eq!(memory.emotional_journey.confidence_level(), 50);
        assert_eq!(memory.emotional_journey.initial_mood(), "neutral");
    }

    #[test]
    fn deserialized_levels_are_clamped() {
        let journey: EmotionalJourney = serde_json::from_str(
            r#"{"initialMood":"neutral","currentMood":"frustrated","frustrationLevel":250,"confidenceLevel":-40}"#,
        )
        .unwrap();
        assert_eq!(journey.frustration_level(), 100);
        assert_eq!(journey.confidence_level(), 0);
        assert_eq!(journey.current_mood(), "frustrated");
    }

    #[test]
    fn journey_survives_serialization() {
        let mut journey = EmotionalJourney::default();
        journey.apply(30, -10, Some("anxious"));
        let json = serde_json::to_string(&journey).unwrap();
        let back: EmotionalJourney = serde_json::from_str(&json).unwrap();
        assert_eq!(back, journey);
    }

    #[test]
    fn levels_clamp_at_bounds() {
        let mut journey = EmotionalJourney::default();
        journey.apply(500, -500, None);
        assert_eq!(journey.frustration_level(), 100);
        assert_eq!(journey.confidence_level(), 0);

        journey.apply(i32::MIN, i32::MAX, None);
        assert_eq!(journey.frustration_level(), 0);
        assert_eq!(journey.confidence_level(), 100);
    }

    #[test]
    fn mood_change_keeps_initial_mood() {
        let mut journey = EmotionalJourney::starting_with("calm");
        journey.apply(0, 0, Some("frustrated"));
        assert_eq!(journey.current_mood(), "frustrated");
        assert_eq!(journey.initial_mood(), "calm");

        journey.apply(0, 0, Some("   "));
        assert_eq!(journey.current_mood(), "frustrated");
    }

    #[test]
    fn satisfaction_trend_uses_last_two_ratings() {
        let mut profile = UserProfile::default();
        assert_eq!(profile.satisfaction_trend(), SatisfactionTrend::Unknown);
        profile.satisfaction_history = vec![2, 4];
        assert_eq!(profile.satisfaction_trend(), SatisfactionTrend::Improving);
        profile.satisfaction_history.push(1);
        assert_eq!(profile.satisfaction_trend(), SatisfactionTrend::Declining);
        profile.satisfaction_history.push(1);
        assert_eq!(profile.satisfaction_trend(), SatisfactionTrend::Stable);
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let memory = ConversationMemory::default();
        let json = serde_json::to_value(&memory).unwrap();
        assert_eq!(json["diagnosticContext"]["diagnosisStage"], "greeting");
        assert_eq!(json["emotionalJourney"]["confidenceLevel"], 50);
        assert_eq!(json["userProfile"]["urgencyLevel"], "medium");
    }
}
