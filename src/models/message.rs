use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{MessageType, SenderType, UrgencyLevel};

/// Structured diagnosis attached to a bot message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticData {
    pub symptoms: Vec<String>,
    /// Likelihood of the proposed diagnosis, 0.0..=1.0.
    pub likelihood: f32,
    pub estimated_cost: Option<String>,
    pub urgency: UrgencyLevel,
}

/// One entry of the conversation log. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub content: String,
    pub sender_type: SenderType,
    pub timestamp: DateTime<Utc>,
    pub suggestions: Option<Vec<String>>,
    pub diagnostic_data: Option<DiagnosticData>,
}

impl Message {
    pub fn is_bot(&self) -> bool {
        self.sender_type == SenderType::Bot
    }

    /// Kind of message for persistence: quotes carry a price, diagnostics carry data.
    pub fn message_type(&self) -> MessageType {
        match &self.diagnostic_data {
            Some(data) if data.estimated_cost.is_some() => MessageType::Quote,
            Some(_) => MessageType::Diagnostic,
            None => MessageType::Text,
        }
    }

    /// Minimal record shape handed to a transcript store.
    pub fn to_record(&self) -> MessageRecord {
        let estimated_price = self
            .diagnostic_data
            .as_ref()
            .and_then(|d| d.estimated_cost.clone());
        let metadata = if self.suggestions.is_some() || estimated_price.is_some() {
            Some(RecordMetadata {
                suggestions: self.suggestions.clone(),
                estimated_price,
            })
        } else {
            None
        };

        MessageRecord {
            id: self.id,
            content: self.content.clone(),
            sender_type: self.sender_type,
            message_type: self.message_type(),
            metadata,
            created_at: self.timestamp,
        }
    }
}

/// Persisted transcript record, consumed by read-only renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub id: Uuid,
    pub content: String,
    pub sender_type: SenderType,
    pub message_type: MessageType,
    pub metadata: Option<RecordMetadata>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMetadata {
    pub suggestions: Option<Vec<String>>,
    pub estimated_price: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bot_message(diagnostic_data: Option<DiagnosticData>) -> Message {
        Message {
            id: Uuid::new_v4(),
            content: "Votre écran semble endommagé.".into(),
            sender_type: SenderType::Bot,
            timestamp: Utc::now(),
            suggestions: Some(vec!["Trouver un réparateur".into()]),
            diagnostic_data,
        }
    }

    fn screen_diagnosis(estimated_cost: Option<&str>) -> DiagnosticData {
        DiagnosticData {
            symptoms: vec!["écran cassé".into()],
            likelihood: 0.8,
            estimated_cost: estimated_cost.map(String::from),
            urgency: UrgencyLevel::High,
        }
    }

    #[test]
    fn message_type_follows_diagnostic_data() {
        assert_eq!(bot_message(None).message_type(), MessageType::Text);
        assert_eq!(
            bot_message(Some(screen_diagnosis(None))).message_type(),
            MessageType::Diagnostic
        );
        assert_eq!(
            bot_message(Some(screen_diagnosis(Some("89€")))).message_type(),
            MessageType::Quote
        );
    }

    #[test]
    fn record_carries_suggestions_and_price() {
        let msg = bot_message(Some(screen_diagnosis(Some("89€"))));
        let record = msg.to_record();
        assert_eq!(record.id, msg.id);
        assert_eq!(record.created_at, msg.timestamp);
        let metadata = record.metadata.unwrap();
        assert_eq!(metadata.estimated_price.as_deref(), Some("89€"));
        assert_eq!(metadata.suggestions.unwrap().len(), 1);
    }

    #[test]
    fn plain_user_record_has_no_metadata() {
        let msg = Message {
            id: Uuid::new_v4(),
            content: "bonjour".into(),
            sender_type: SenderType::User,
            timestamp: Utc::now(),
            suggestions: None,
            diagnostic_data: None,
        };
        let record = msg.to_record();
        assert!(record.metadata.is_none());
        assert_eq!(record.message_type, MessageType::Text);
    }
}
