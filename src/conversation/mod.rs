//! Conversation orchestration: session lifecycle, turn serialization,
//! memory updates and reply pacing.

pub mod log;
pub mod memory;
pub mod orchestrator;

pub use log::MessageLog;
pub use memory::{MemoryStore, UserTurnSummary};
pub use orchestrator::{ConversationOrchestrator, FALLBACK_MESSAGE, FALLBACK_SUGGESTIONS};

use crate::models::Message;
use crate::services::{ReasoningError, ReportError};

/// Errors surfaced to callers of the orchestrator.
///
/// Reasoning failures during a turn are never surfaced here: they become the
/// fallback bot message.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("No active conversation")]
    NoActiveSession,
    #[error("Conversation could not be started: {0}")]
    StartFailed(ReasoningError),
    #[error("Conversation start was superseded by another start or end")]
    StartSuperseded,
    #[error("Service setup failed: {0}")]
    Setup(String),
    #[error("No {0} service configured")]
    NotConfigured(&'static str),
    #[error("Diagnostic report failed: {0}")]
    Report(#[from] ReportError),
    #[error("Internal lock error")]
    LockPoisoned,
}

/// Where the current turn stands. Replaces independent loading/typing flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TurnState {
    #[default]
    Idle,
    /// A reasoning call is in flight.
    AwaitingReasoning,
    /// The reply is known and the pacing delay is running.
    Typing,
}

/// Why a `send_message` call had no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Blank,
    /// Another turn is still pending.
    Busy,
}

/// Result of one `send_message` call.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// The reply was appended after its pacing delay.
    Replied(Message),
    /// The reasoning service failed; the fallback message was appended.
    Fallback(Message),
    Ignored(IgnoreReason),
    /// The conversation ended or restarted before the reply could be shown.
    Discarded,
}

impl SendOutcome {
    /// Bot message appended by this call, if any.
    pub fn message(&self) -> Option<&Message> {
        match self {
            Self::Replied(m) | Self::Fallback(m) => Some(m),
            Self::Ignored(_) | Self::Discarded => None,
        }
    }
}
