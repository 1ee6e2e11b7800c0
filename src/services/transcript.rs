use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::MessageRecord;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Transcript backend error: {0}")]
    Backend(String),

    #[error("Lock poisoned")]
    LockPoisoned,
}

/// Append-only sink for message records. Records are never updated.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    async fn append(&self, session_id: Uuid, record: &MessageRecord) -> Result<(), StoreError>;
}

/// Transcript store kept in process memory.
#[derive(Default)]
pub struct InMemoryTranscriptStore {
    records: Mutex<Vec<(Uuid, MessageRecord)>>,
}

impl InMemoryTranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records of one session, in append order.
    pub fn records_for(&self, session_id: Uuid) -> Result<Vec<MessageRecord>, StoreError> {
        let records = self.records.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(records
            .iter()
            .filter(|(id, _)| *id == session_id)
            .map(|(_, r)| r.clone())
            .collect())
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TranscriptStore for InMemoryTranscriptStore {
    async fn append(&self, session_id: Uuid, record: &MessageRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().map_err(|_| StoreError::LockPoisoned)?;
        records.push((session_id, record.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MessageType, SenderType};
    use chrono::Utc;

    fn record(content: &str) -> MessageRecord {
        MessageRecord {
            id: Uuid::new_v4(),
            content: content.into(),
            sender_type: SenderType::User,
            message_type: MessageType::Text,
            metadata: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn records_are_scoped_by_session() {
        let store = InMemoryTranscriptStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        store.append(a, &record("premier")).await.unwrap();
        store.append(b, &record("autre session")).await.unwrap();
        store.append(a, &record("second")).await.unwrap();

        let for_a = store.records_for(a).unwrap();
        assert_eq!(for_a.len(), 2);
        assert_eq!(for_a[0].content, "premier");
        assert_eq!(for_a[1].content, "second");
        assert_eq!(store.len(), 3);
    }
}
