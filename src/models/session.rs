use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One conversation. Identifiers are never reused after the session ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// `None` for anonymous users.
    pub user_id: Option<String>,
}

impl ConversationSession {
    pub fn new(user_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sessions_get_distinct_ids() {
        let a = ConversationSession::new(None);
        let b = ConversationSession::new(Some("user-1".into()));
        assert_ne!(a.id, b.id);
        assert_eq!(b.user_id.as_deref(), Some("user-1"));
    }
}
