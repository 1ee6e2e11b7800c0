//! Conversation orchestrator.
//!
//! One orchestrator drives one conversation at a time. All mutable state sits
//! behind a single mutex that is never held across an await, so read-only
//! accessors stay available while a reasoning call or a pacing delay is in
//! flight.
//!
//! Turn flow for `send_message`:
//! 1. Append the user message and update memory (classifier → extractor → tracker).
//! 2. Call the reasoning service (bounded by a timeout, optionally retried).
//! 3. On success, wait out the pacing delay, then append the bot message and
//!    run the bot-turn tracker. On failure, append the fallback message at once.
//!
//! Every start and end bumps an epoch counter. A turn that resumes after an
//! await with a stale epoch drops its reply instead of writing into a
//! conversation that no longer exists.

use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use super::log::MessageLog;
use super::memory::MemoryStore;
use super::{AssistantError, IgnoreReason, SendOutcome, TurnState};
use crate::config::AssistantConfig;
use crate::models::{ConversationMemory, ConversationSession, Coordinates, Message};
use crate::pipeline::pacing::{PacingHandle, PacingOutcome, PacingScheduler};
use crate::pipeline::stage::StagePolicy;
use crate::services::http::{HttpGeolocationClient, HttpReasoningClient, HttpReportClient};
use crate::services::types::{DiagnosticReport, ReasoningRequest, ReasoningResponse, ReportRequest};
use crate::services::{
    GeolocationService, ReasoningError, ReasoningService, ReportService, TranscriptStore,
};

/// Bot reply shown when the reasoning service cannot answer.
pub const FALLBACK_MESSAGE: &str = "Désolé, je rencontre une difficulté technique pour analyser votre demande. Pouvez-vous reformuler votre question ou réessayer dans un instant ?";

/// Suggestions attached to the fallback reply.
pub const FALLBACK_SUGGESTIONS: [&str; 3] =
    ["Reformuler la question", "Assistance technique", "Recommencer"];

struct ConversationState {
    session: Option<ConversationSession>,
    store: MemoryStore,
    log: MessageLog,
    turn: TurnState,
    pacing: Option<PacingHandle>,
    epoch: u64,
    /// Bumped for every accepted user turn.
    turn_id: u64,
}

impl ConversationState {
    fn new(policy: StagePolicy) -> Self {
        Self {
            session: None,
            store: MemoryStore::new(policy),
            log: MessageLog::new(),
            turn: TurnState::Idle,
            pacing: None,
            epoch: 0,
            turn_id: 0,
        }
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch && self.session.is_some()
    }

    /// Cancel any pending reply, complete the diagnosis, then wipe memory and log.
    ///
    /// Always invalidates in-flight turns and starts, even with no session.
    fn end_session(&mut self) -> Option<ConversationSession> {
        self.epoch += 1;
        let session = self.session.take()?;

        if let Some(handle) = self.pacing.take() {
            handle.cancel();
            tracing::debug!(session_id = %session.id, "Pending reply cancelled");
        }
        self.store.complete();
        tracing::info!(
            session_id = %session.id,
            messages = self.log.len(),
            symptoms = self.store.memory().diagnostic_context.collected_symptoms.len(),
            "Conversation ended"
        );

        self.store.reset();
        self.log.clear();
        self.turn = TurnState::Idle;
        Some(session)
    }
}

/// Puts the turn back to `Idle` if a `send_message` future is dropped mid-turn.
///
/// Only acts while its own turn is still the pending one; turns that finished
/// normally, or were replaced by a later turn or session, are left alone.
struct TurnRelease<'a> {
    state: &'a Mutex<ConversationState>,
    turn_id: u64,
}

impl Drop for TurnRelease<'_> {
    fn drop(&mut self) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if state.turn_id != self.turn_id || state.turn == TurnState::Idle {
            return;
        }
        if let Some(handle) = state.pacing.take() {
            handle.cancel();
        }
        tracing::debug!(turn = ?state.turn, "Send abandoned mid-turn, releasing it");
        state.turn = TurnState::Idle;
    }
}

pub struct ConversationOrchestrator {
    config: AssistantConfig,
    reasoning: Arc<dyn ReasoningService>,
    geolocation: Option<Arc<dyn GeolocationService>>,
    reports: Option<Arc<dyn ReportService>>,
    transcript: Option<Arc<dyn TranscriptStore>>,
    pacing: PacingScheduler,
    user_id: Option<String>,
    state: Mutex<ConversationState>,
}

impl ConversationOrchestrator {
    pub fn new(config: AssistantConfig, reasoning: Arc<dyn ReasoningService>) -> Self {
        let policy = StagePolicy {
            recommendation_symptom_threshold: config.recommendation_symptom_threshold,
        };
        Self {
            config,
            reasoning,
            geolocation: None,
            reports: None,
            transcript: None,
            pacing: PacingScheduler::default(),
            user_id: None,
            state: Mutex::new(ConversationState::new(policy)),
        }
    }

    /// Orchestrator wired to the HTTP services named in `config`.
    pub fn from_config(config: AssistantConfig) -> Result<Self, AssistantError> {
        let reasoning = HttpReasoningClient::from_config(&config)
            .map_err(|e| AssistantError::Setup(e.to_string()))?;
        let geolocation = HttpGeolocationClient::from_config(&config)
            .map_err(|e| AssistantError::Setup(e.to_string()))?;
        let reports = HttpReportClient::from_config(&config)
            .map_err(|e| AssistantError::Setup(e.to_string()))?;

        tracing::info!(reasoning_url = %reasoning.url(), "Assistant services configured");
        Ok(Self::new(config, Arc::new(reasoning))
            .with_geolocation(Arc::new(geolocation))
            .with_reports(Arc::new(reports)))
    }

    pub fn with_geolocation(mut self, geolocation: Arc<dyn GeolocationService>) -> Self {
        self.geolocation = Some(geolocation);
        self
    }

    pub fn with_reports(mut self, reports: Arc<dyn ReportService>) -> Self {
        self.reports = Some(reports);
        self
    }

    pub fn with_transcript(mut self, transcript: Arc<dyn TranscriptStore>) -> Self {
        self.transcript = Some(transcript);
        self
    }

    pub fn with_pacing(mut self, pacing: PacingScheduler) -> Self {
        self.pacing = pacing;
        self
    }

    /// Owner recorded on new sessions. Anonymous when unset.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    fn state(&self) -> Result<MutexGuard<'_, ConversationState>, AssistantError> {
        self.state.lock().map_err(|_| AssistantError::LockPoisoned)
    }

    // ═══════════════════════════════════════════
    // Lifecycle
    // ═══════════════════════════════════════════

    /// Start a new conversation and show the service's greeting.
    ///
    /// Any active conversation is ended first. On failure no session exists
    /// afterwards and no greeting is made up.
    pub async fn start_conversation(&self) -> Result<ConversationSession, AssistantError> {
        let (session, epoch) = {
            let mut state = self.state()?;
            if let Some(previous) = state.end_session() {
                tracing::info!(session_id = %previous.id, "Replacing active conversation");
            }
            (ConversationSession::new(self.user_id.clone()), state.epoch)
        };

        let request = ReasoningRequest::start(
            session.id,
            &self.config.language_hint,
            session.user_id.as_deref(),
        );
        let response = match self.call_reasoning(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(session_id = %session.id, error = %e, "Failed to start conversation");
                return Err(AssistantError::StartFailed(e));
            }
        };

        let greeting = {
            let mut state = self.state()?;
            if state.epoch != epoch {
                tracing::debug!(session_id = %session.id, "Start superseded while awaiting greeting");
                return Err(AssistantError::StartSuperseded);
            }
            state.session = Some(session.clone());
            state.store.apply_greeting(&response);
            state
                .log
                .push_bot(&response.message, response.suggestions, response.diagnostic_data)
                .clone()
        };

        tracing::info!(session_id = %session.id, "Conversation started");
        self.persist(session.id, &greeting).await;
        Ok(session)
    }

    /// End the active conversation. Returns the session that was ended.
    ///
    /// A pending reply is cancelled before memory is touched. Calling this with
    /// no active conversation does nothing.
    pub fn end_conversation(&self) -> Option<ConversationSession> {
        let ended = self
            .state
            .lock()
            .ok()
            .and_then(|mut state| state.end_session());
        if ended.is_none() {
            tracing::debug!("No active conversation to end");
        }
        ended
    }

    // ═══════════════════════════════════════════
    // Turns
    // ═══════════════════════════════════════════

    /// Send one user utterance and wait for the paced reply.
    ///
    /// Blank input and sends made while another turn is pending are ignored.
    /// Reasoning failures are not returned as errors: they produce the
    /// fallback message.
    pub async fn send_message(&self, content: &str) -> Result<SendOutcome, AssistantError> {
        let (request, epoch, turn_id, user_message) = {
            let mut state = self.state()?;
            let Some(session) = state.session.clone() else {
                tracing::warn!("Message sent without an active conversation");
                return Err(AssistantError::NoActiveSession);
            };
            if content.trim().is_empty() {
                tracing::debug!(session_id = %session.id, "Ignoring blank message");
                return Ok(SendOutcome::Ignored(IgnoreReason::Blank));
            }
            if state.turn != TurnState::Idle {
                tracing::debug!(
                    session_id = %session.id,
                    turn = ?state.turn,
                    "Turn already pending, message dropped"
                );
                return Ok(SendOutcome::Ignored(IgnoreReason::Busy));
            }

            let user_message = state.log.push_user(content).clone();
            let summary = state.store.apply_user_turn(content);
            tracing::debug!(
                session_id = %session.id,
                new_symptoms = summary.new_symptoms.len(),
                stage = %state.store.memory().diagnostic_context.diagnosis_stage,
                "User turn recorded"
            );
            state.turn = TurnState::AwaitingReasoning;
            state.turn_id += 1;

            let request = ReasoningRequest::send(
                session.id,
                content,
                &self.config.language_hint,
                session.user_id.as_deref(),
            );
            (request, state.epoch, state.turn_id, user_message)
        };
        let _release = TurnRelease {
            state: &self.state,
            turn_id,
        };
        let session_id = request.session_id;
        self.persist(session_id, &user_message).await;

        match self.call_reasoning(&request).await {
            Ok(response) => self.deliver_reply(epoch, session_id, response).await,
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Reasoning failed, sending fallback reply");
                self.deliver_fallback(epoch, session_id).await
            }
        }
    }

    /// Call the reasoning service with a timeout, retrying up to the configured attempts.
    async fn call_reasoning(
        &self,
        request: &ReasoningRequest,
    ) -> Result<ReasoningResponse, ReasoningError> {
        let attempts = self.config.reasoning_attempts();
        let timeout = self.config.reasoning_timeout();
        let mut attempt = 1;

        loop {
            let outcome = match tokio::time::timeout(timeout, self.reasoning.call(request)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(ReasoningError::Timeout(self.config.reasoning_timeout_secs)),
            };
            match outcome {
                Ok(response) => return Ok(response),
                Err(e) if attempt < attempts => {
                    tracing::warn!(
                        session_id = %request.session_id,
                        attempt,
                        attempts,
                        error = %e,
                        "Reasoning attempt failed, retrying"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn deliver_reply(
        &self,
        epoch: u64,
        session_id: Uuid,
        response: ReasoningResponse,
    ) -> Result<SendOutcome, AssistantError> {
        let timer = {
            let mut state = self.state()?;
            if !state.is_current(epoch) {
                tracing::debug!(session_id = %session_id, "Conversation ended before the reply arrived");
                return Ok(SendOutcome::Discarded);
            }
            let (handle, timer) = self.pacing.schedule(response.complexity());
            state.pacing = Some(handle);
            state.turn = TurnState::Typing;
            timer
        };

        if timer.wait().await == PacingOutcome::Cancelled {
            tracing::debug!(session_id = %session_id, "Reply dropped during pacing");
            return Ok(SendOutcome::Discarded);
        }

        let message = {
            let mut state = self.state()?;
            if !state.is_current(epoch) {
                return Ok(SendOutcome::Discarded);
            }
            state.pacing = None;
            let message = state
                .log
                .push_bot(
                    &response.message,
                    response.suggestions.clone(),
                    response.diagnostic_data.clone(),
                )
                .clone();
            state.store.apply_bot_turn(&response);
            state.turn = TurnState::Idle;
            message
        };

        self.persist(session_id, &message).await;
        Ok(SendOutcome::Replied(message))
    }

    async fn deliver_fallback(
        &self,
        epoch: u64,
        session_id: Uuid,
    ) -> Result<SendOutcome, AssistantError> {
        let message = {
            let mut state = self.state()?;
            if !state.is_current(epoch) {
                return Ok(SendOutcome::Discarded);
            }
            let suggestions = FALLBACK_SUGGESTIONS.iter().map(|s| s.to_string()).collect();
            let message = state
                .log
                .push_bot(FALLBACK_MESSAGE, Some(suggestions), None)
                .clone();
            state.turn = TurnState::Idle;
            message
        };

        self.persist(session_id, &message).await;
        Ok(SendOutcome::Fallback(message))
    }

    async fn persist(&self, session_id: Uuid, message: &Message) {
        let Some(store) = &self.transcript else {
            return;
        };
        if let Err(e) = store.append(session_id, &message.to_record()).await {
            tracing::warn!(session_id = %session_id, error = %e, "Failed to persist message");
        }
    }

    // ═══════════════════════════════════════════
    // Location, report, satisfaction
    // ═══════════════════════════════════════════

    /// Ask the geolocation service where the user is and remember it.
    ///
    /// Location failures are logged and reported as `Ok(None)`.
    pub async fn request_location(&self) -> Result<Option<Coordinates>, AssistantError> {
        let (session_id, epoch) = self.active_session()?;
        let Some(geolocation) = &self.geolocation else {
            tracing::warn!(session_id = %session_id, "No geolocation service configured");
            return Ok(None);
        };

        match geolocation.locate(session_id).await {
            Ok(coordinates) => {
                let mut state = self.state()?;
                if !state.is_current(epoch) {
                    return Ok(None);
                }
                state.store.set_location(coordinates);
                tracing::info!(session_id = %session_id, "Location stored");
                Ok(Some(coordinates))
            }
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Location unavailable");
                Ok(None)
            }
        }
    }

    /// Complete the diagnosis and hand the memory snapshot to the report service.
    ///
    /// `Ok(None)` when no conversation is active. The report is returned as received.
    pub async fn generate_diagnostic_report(
        &self,
    ) -> Result<Option<DiagnosticReport>, AssistantError> {
        let (reports, request) = {
            let mut state = self.state()?;
            let Some(session_id) = state.session.as_ref().map(|s| s.id) else {
                tracing::debug!("No active conversation, no report");
                return Ok(None);
            };
            let Some(reports) = self.reports.clone() else {
                return Err(AssistantError::NotConfigured("report"));
            };
            state.store.complete();
            let request = ReportRequest {
                conversation_id: session_id,
                memory_snapshot: state.store.snapshot(),
            };
            (reports, request)
        };

        match reports.generate(&request).await {
            Ok(report) => {
                tracing::info!(
                    session_id = %request.conversation_id,
                    symptoms = report.symptoms.len(),
                    "Diagnostic report generated"
                );
                Ok(Some(report))
            }
            Err(e) => {
                tracing::warn!(session_id = %request.conversation_id, error = %e, "Diagnostic report failed");
                Err(AssistantError::Report(e))
            }
        }
    }

    /// Record a 1 to 5 satisfaction rating. Out-of-range scores are clamped.
    pub fn rate_satisfaction(&self, score: u8) -> Result<u8, AssistantError> {
        let mut state = self.state()?;
        let Some(session_id) = state.session.as_ref().map(|s| s.id) else {
            tracing::warn!("Satisfaction rated without an active conversation");
            return Err(AssistantError::NoActiveSession);
        };
        let stored = state.store.record_satisfaction(score);
        tracing::info!(session_id = %session_id, score = stored, "Satisfaction recorded");
        Ok(stored)
    }

    fn active_session(&self) -> Result<(Uuid, u64), AssistantError> {
        let state = self.state()?;
        match &state.session {
            Some(session) => Ok((session.id, state.epoch)),
            None => {
                tracing::warn!("Operation requires an active conversation");
                Err(AssistantError::NoActiveSession)
            }
        }
    }

    // ═══════════════════════════════════════════
    // Read-only views
    // ═══════════════════════════════════════════

    pub fn session(&self) -> Option<ConversationSession> {
        self.state.lock().ok().and_then(|s| s.session.clone())
    }

    pub fn memory(&self) -> ConversationMemory {
        self.state
            .lock()
            .map(|s| s.store.snapshot())
            .unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.state
            .lock()
            .map(|s| s.log.messages().to_vec())
            .unwrap_or_default()
    }

    pub fn turn_state(&self) -> TurnState {
        self.state.lock().map(|s| s.turn).unwrap_or_default()
    }

    pub fn is_awaiting_reasoning(&self) -> bool {
        self.turn_state() == TurnState::AwaitingReasoning
    }

    pub fn is_typing(&self) -> bool {
        self.turn_state() == TurnState::Typing
    }

    /// Filler text while the reasoning service is working, `None` otherwise.
    pub fn thinking_text(&self) -> Option<&'static str> {
        let state = self.state.lock().ok()?;
        (state.turn == TurnState::AwaitingReasoning).then(|| state.store.thinking_text())
    }
}
