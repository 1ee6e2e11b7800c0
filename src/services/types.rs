use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Complexity, ConversationMemory, DiagnosticData};
use crate::pipeline::emotion::MoodHint;

// ═══════════════════════════════════════════
// Reasoning service
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningAction {
    StartConversation,
    SendMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningRequest {
    pub action: ReasoningAction,
    pub session_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub language_hint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl ReasoningRequest {
    pub fn start(session_id: Uuid, language_hint: &str, user_id: Option<&str>) -> Self {
        Self {
            action: ReasoningAction::StartConversation,
            session_id,
            text: None,
            language_hint: language_hint.to_string(),
            user_id: user_id.map(String::from),
        }
    }

    pub fn send(session_id: Uuid, text: &str, language_hint: &str, user_id: Option<&str>) -> Self {
        Self {
            action: ReasoningAction::SendMessage,
            session_id,
            text: Some(text.to_string()),
            language_hint: language_hint.to_string(),
            user_id: user_id.map(String::from),
        }
    }
}

/// Follow-up action attached to a reply.
///
/// Known kinds: `suggest_solution` (label is a proposed fix) and
/// `show_repairers` (payload is the list of nearby repairers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseAction {
    #[serde(alias = "type")]
    pub kind: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

pub const ACTION_SUGGEST_SOLUTION: &str = "suggest_solution";
pub const ACTION_SHOW_REPAIRERS: &str = "show_repairers";

/// Hints riding along with a reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    #[serde(default)]
    pub complexity: Option<String>,
    /// Diagnosis stage the service believes the conversation has reached.
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(flatten)]
    pub mood: MoodHint,
}

impl ResponseMetadata {
    pub fn complexity(&self) -> Complexity {
        Complexity::from_hint(self.complexity.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningResponse {
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(alias = "response")]
    pub message: String,
    #[serde(default)]
    pub suggestions: Option<Vec<String>>,
    #[serde(default)]
    pub actions: Vec<ResponseAction>,
    #[serde(default)]
    pub metadata: Option<ResponseMetadata>,
    #[serde(default)]
    pub diagnostic_data: Option<DiagnosticData>,
}

impl ReasoningResponse {
    /// Plain reply with no hints, mostly for tests and mocks.
    pub fn text(message: &str) -> Self {
        Self {
            conversation_id: None,
            message: message.to_string(),
            suggestions: None,
            actions: Vec::new(),
            metadata: None,
            diagnostic_data: None,
        }
    }

    pub fn complexity(&self) -> Complexity {
        self.metadata
            .as_ref()
            .map(ResponseMetadata::complexity)
            .unwrap_or_default()
    }

    pub fn mood_hint(&self) -> Option<&MoodHint> {
        self.metadata.as_ref().map(|m| &m.mood)
    }

    pub fn stage_hint(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.stage.as_deref())
    }

    /// Labels of `suggest_solution` actions.
    pub fn proposed_solutions(&self) -> impl Iterator<Item = &str> {
        self.actions
            .iter()
            .filter(|a| a.kind == ACTION_SUGGEST_SOLUTION)
            .filter_map(|a| a.label.as_deref())
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }

    /// Repairer records from the last `show_repairers` action, if any.
    pub fn repairers(&self) -> Option<Vec<serde_json::Value>> {
        self.actions
            .iter()
            .rev()
            .find(|a| a.kind == ACTION_SHOW_REPAIRERS)
            .map(|a| match &a.payload {
                Some(serde_json::Value::Array(items)) => items.clone(),
                Some(other) => vec![other.clone()],
                None => Vec::new(),
            })
    }
}

// ═══════════════════════════════════════════
// Diagnostic-report service
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub conversation_id: Uuid,
    pub memory_snapshot: ConversationMemory,
}

/// Report as produced by the service. Unknown fields are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReport {
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub likelihood: Option<f32>,
    #[serde(default)]
    pub recommended_providers: Vec<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn start_request_omits_text() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(ReasoningRequest::start(id, "fr", None)).unwrap();
        assert_eq!(json["action"], "start_conversation");
        assert_eq!(json["sessionId"], id.to_string());
        assert_eq!(json["languageHint"], "fr");
        assert!(json.get("text").is_none());
        assert!(json.get("userId").is_none());
    }

    #[test]
    fn send_request_carries_text_and_user() {
        let req = ReasoningRequest::send(Uuid::new_v4(), "écran cassé", "fr", Some("user-7"));
        let json = serde_json::to_value(req).unwrap();
        assert_eq!(json["action"], "send_message");
        assert_eq!(json["text"], "écran cassé");
        assert_eq!(json["userId"], "user-7");
    }

    #[test]
    fn response_accepts_response_alias_and_hints() {
        let raw = json!({
            "conversationId": "c-1",
            "response": "Pouvez-vous préciser ?",
            "suggestions": ["Oui", "Non"],
            "actions": [
                {"type": "suggest_solution", "label": "Remplacer la vitre"},
                {"kind": "show_repairers", "payload": [{"name": "FixIt"}, {"name": "Repar'Tout"}]}
            ],
            "metadata": {"complexity": "complex", "stage": "recommendation", "mood": "reassured", "confidenceDelta": 10}
        });
        let resp: ReasoningResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(resp.message, "Pouvez-vous préciser ?");
        assert_eq!(resp.complexity(), Complexity::Complex);
        assert_eq!(resp.stage_hint(), Some("recommendation"));
        let hint = resp.mood_hint().unwrap();
        assert_eq!(hint.mood.as_deref(), Some("reassured"));
        assert_eq!(hint.confidence_delta, Some(10));
        assert_eq!(resp.proposed_solutions().collect::<Vec<_>>(), vec!["Remplacer la vitre"]);
        assert_eq!(resp.repairers().unwrap().len(), 2);
    }

    #[test]
    fn minimal_response_defaults_to_simple() {
        let resp: ReasoningResponse = serde_json::from_value(json!({"message": "Bonjour"})).unwrap();
        assert_eq!(resp.complexity(), Complexity::Simple);
        assert!(resp.mood_hint().is_none());
        assert!(resp.repairers().is_none());
        assert!(resp.suggestions.is_none());
    }

    #[test]
    fn response_without_message_is_rejected() {
        let parsed: Result<ReasoningResponse, _> = serde_json::from_value(json!({"suggestions": []}));
        assert!(parsed.is_err());
    }

    #[test]
    fn report_keeps_unknown_fields() {
        let raw = json!({
            "symptoms": ["écran cassé"],
            "likelihood": 0.9,
            "recommendedProviders": [{"id": 3}],
            "reportUrl": "https://reports.example/abc"
        });
        let report: DiagnosticReport = serde_json::from_value(raw).unwrap();
        assert_eq!(report.symptoms, vec!["écran cassé"]);
        assert_eq!(report.extra["reportUrl"], "https://reports.example/abc");
    }
}
