//! In-process collaborators for tests and offline demos.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::types::{DiagnosticReport, ReasoningRequest, ReasoningResponse, ReportRequest};
use super::{
    GeolocationService, LocationError, ReasoningError, ReasoningService, ReportError,
    ReportService,
};
use crate::models::Coordinates;

/// Mock reasoning service. Replays scripted outcomes, then a default reply.
pub struct MockReasoningService {
    default_reply: Result<ReasoningResponse, ReasoningError>,
    script: Mutex<VecDeque<Result<ReasoningResponse, ReasoningError>>>,
    latency: Option<Duration>,
    calls: AtomicUsize,
    requests: Mutex<Vec<ReasoningRequest>>,
}

impl MockReasoningService {
    /// Answers every call with `reply`.
    pub fn new(reply: &str) -> Self {
        Self::with_default(Ok(ReasoningResponse::text(reply)))
    }

    /// Fails every call with `error`.
    pub fn failing(error: ReasoningError) -> Self {
        Self::with_default(Err(error))
    }

    fn with_default(default_reply: Result<ReasoningResponse, ReasoningError>) -> Self {
        Self {
            default_reply,
            script: Mutex::new(VecDeque::new()),
            latency: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Outcomes returned, in order, before falling back to the default reply.
    pub fn with_script(self, outcomes: Vec<Result<ReasoningResponse, ReasoningError>>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.extend(outcomes);
        }
        self
    }

    /// Latency of default replies. Scripted outcomes return at once.
    /// Uses tokio time, so paused clocks apply.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ReasoningRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ReasoningService for MockReasoningService {
    async fn call(&self, request: &ReasoningRequest) -> Result<ReasoningResponse, ReasoningError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let scripted = self.script.lock().ok().and_then(|mut s| s.pop_front());
        if let Some(outcome) = scripted {
            return outcome;
        }
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.default_reply.clone()
    }
}

/// Mock geolocation with a fixed outcome.
pub struct MockGeolocationService {
    result: Result<Coordinates, LocationError>,
}

impl MockGeolocationService {
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            result: Ok(Coordinates { latitude, longitude }),
        }
    }

    pub fn failing(error: LocationError) -> Self {
        Self { result: Err(error) }
    }
}

#[async_trait]
impl GeolocationService for MockGeolocationService {
    async fn locate(&self, _session_id: Uuid) -> Result<Coordinates, LocationError> {
        self.result.clone()
    }
}

/// Mock report service. Echoes the snapshot's symptoms back as a report.
#[derive(Default)]
pub struct MockReportService {
    failure: Option<ReportError>,
    requests: Mutex<Vec<ReportRequest>>,
}

impl MockReportService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: ReportError) -> Self {
        Self {
            failure: Some(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ReportRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ReportService for MockReportService {
    async fn generate(&self, request: &ReportRequest) -> Result<DiagnosticReport, ReportError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        let context = &request.memory_snapshot.diagnostic_context;
        Ok(DiagnosticReport {
            symptoms: context.collected_symptoms.iter().cloned().collect(),
            likelihood: Some(if context.collected_symptoms.is_empty() { 0.0 } else { 0.75 }),
            recommended_providers: context.nearby_repairers.clone(),
            extra: serde_json::Map::new(),
        })
    }
}
