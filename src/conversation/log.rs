use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::models::{DiagnosticData, Message, SenderType};

/// Append-only message log of one session.
///
/// Timestamps are strictly increasing: when the clock has not moved (or
/// went backwards) since the last message, the new one is stamped one
/// microsecond after it.
#[derive(Debug, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: &str) -> &Message {
        self.push(content, SenderType::User, None, None)
    }

    pub fn push_bot(
        &mut self,
        content: &str,
        suggestions: Option<Vec<String>>,
        diagnostic_data: Option<DiagnosticData>,
    ) -> &Message {
        self.push(content, SenderType::Bot, suggestions, diagnostic_data)
    }

    fn push(
        &mut self,
        content: &str,
        sender_type: SenderType,
        suggestions: Option<Vec<String>>,
        diagnostic_data: Option<DiagnosticData>,
    ) -> &Message {
        let timestamp = self.next_timestamp(Utc::now());
        self.messages.push(Message {
            id: Uuid::new_v4(),
            content: content.to_string(),
            sender_type,
            timestamp,
            suggestions,
            diagnostic_data,
        });
        &self.messages[self.messages.len() - 1]
    }

    fn next_timestamp(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.messages.last() {
            Some(last) if now <= last.timestamp => last.timestamp + Duration::microseconds(1),
            _ => now,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_strictly_increase() {
        let mut log = MessageLog::new();
        for i in 0..50 {
            if i % 2 == 0 {
                log.push_user("bonjour");
            } else {
                log.push_bot("bonjour !", None, None);
            }
        }
        for pair in log.messages().windows(2) {
            assert!(pair[1].timestamp > pair[0].timestamp);
        }
    }

    #[test]
    fn clock_going_backwards_still_increases() {
        let mut log = MessageLog::new();
        let first = log.push_user("premier").timestamp;
        let next = log.next_timestamp(first - Duration::seconds(10));
        assert_eq!(next, first + Duration::microseconds(1));
    }

    #[test]
    fn bot_message_keeps_suggestions() {
        let mut log = MessageLog::new();
        let msg = log.push_bot("Bonjour", Some(vec!["Écran".into(), "Batterie".into()]), None);
        assert!(msg.is_bot());
        assert_eq!(msg.suggestions.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn clear_empties_log() {
        let mut log = MessageLog::new();
        log.push_user("a");
        log.clear();
        assert!(log.is_empty());
    }
}
