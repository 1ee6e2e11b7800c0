//! External collaborators of the conversation engine.
//!
//! The engine never composes reply text itself. It talks to:
//! - a reasoning service (greeting + replies, suggestions, pacing hints)
//! - a geolocation service (user coordinates)
//! - a diagnostic-report service (final report from a memory snapshot)
//! - optionally, a transcript store (append-only message records)
//!
//! Each is an object-safe async trait so the orchestrator can hold
//! `Arc<dyn _>` and tests can swap in the mocks from `mock`.

pub mod types;
pub mod http;
pub mod transcript;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::Coordinates;
use types::{DiagnosticReport, ReasoningRequest, ReasoningResponse, ReportRequest};

pub use transcript::{InMemoryTranscriptStore, StoreError, TranscriptStore};

// ═══════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════

/// Any failure of the reasoning service. The orchestrator treats all of
/// them the same way: fallback message, never a raw error to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReasoningError {
    #[error("Reasoning service unreachable at {0}")]
    Connection(String),

    #[error("Reasoning request timed out after {0}s")]
    Timeout(u64),

    #[error("Reasoning service returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Malformed reasoning response: {0}")]
    ResponseParsing(String),

    #[error("HTTP client error: {0}")]
    Http(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    #[error("Location unavailable: {0}")]
    Unavailable(String),

    #[error("Location access denied")]
    Denied,

    #[error("Geolocation service returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Malformed geolocation response: {0}")]
    ResponseParsing(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportError {
    #[error("Report service unreachable at {0}")]
    Connection(String),

    #[error("Report request timed out after {0}s")]
    Timeout(u64),

    #[error("Report service returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Malformed report response: {0}")]
    ResponseParsing(String),

    #[error("HTTP client error: {0}")]
    Http(String),
}

// ═══════════════════════════════════════════
// Collaborator traits
// ═══════════════════════════════════════════

/// Service that composes the assistant's replies.
#[async_trait]
pub trait ReasoningService: Send + Sync {
    async fn call(&self, request: &ReasoningRequest) -> Result<ReasoningResponse, ReasoningError>;
}

/// Service that resolves the user's coordinates.
#[async_trait]
pub trait GeolocationService: Send + Sync {
    async fn locate(&self, session_id: Uuid) -> Result<Coordinates, LocationError>;
}

/// Service that renders a diagnostic report from a memory snapshot.
#[async_trait]
pub trait ReportService: Send + Sync {
    async fn generate(&self, request: &ReportRequest) -> Result<DiagnosticReport, ReportError>;
}
