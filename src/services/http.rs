//! reqwest-backed collaborators.
//!
//! All three services speak JSON over HTTP. Transport failures are first
//! classified into `HttpFailure` and then mapped onto each service's own
//! error type.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::types::{DiagnosticReport, ReasoningRequest, ReasoningResponse, ReportRequest};
use super::{
    GeolocationService, LocationError, ReasoningError, ReasoningService, ReportError,
    ReportService,
};
use crate::config::AssistantConfig;
use crate::models::Coordinates;

/// Timeout for the geolocation and report services.
const AUX_TIMEOUT_SECS: u64 = 15;

/// Transport-level failure, before mapping to a service error.
#[derive(Debug)]
enum HttpFailure {
    Connect(String),
    Timeout(u64),
    Status { status: u16, body: String },
    Parse(String),
    Other(String),
}

fn build_client(timeout_secs: u64) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}

async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    base_url: &str,
    timeout_secs: u64,
) -> Result<T, HttpFailure> {
    let response = request.send().await.map_err(|e| {
        if e.is_connect() {
            HttpFailure::Connect(base_url.to_string())
        } else if e.is_timeout() {
            HttpFailure::Timeout(timeout_secs)
        } else {
            HttpFailure::Other(e.to_string())
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(HttpFailure::Status {
            status: status.as_u16(),
            body,
        });
    }

    response.json::<T>().await.map_err(|e| {
        if e.is_timeout() {
            HttpFailure::Timeout(timeout_secs)
        } else {
            HttpFailure::Parse(e.to_string())
        }
    })
}

impl From<HttpFailure> for ReasoningError {
    fn from(f: HttpFailure) -> Self {
        match f {
            HttpFailure::Connect(url) => Self::Connection(url),
            HttpFailure::Timeout(secs) => Self::Timeout(secs),
            HttpFailure::Status { status, body } => Self::Status { status, body },
            HttpFailure::Parse(e) => Self::ResponseParsing(e),
            HttpFailure::Other(e) => Self::Http(e),
        }
    }
}

impl From<HttpFailure> for ReportError {
    fn from(f: HttpFailure) -> Self {
        match f {
            HttpFailure::Connect(url) => Self::Connection(url),
            HttpFailure::Timeout(secs) => Self::Timeout(secs),
            HttpFailure::Status { status, body } => Self::Status { status, body },
            HttpFailure::Parse(e) => Self::ResponseParsing(e),
            HttpFailure::Other(e) => Self::Http(e),
        }
    }
}

impl From<HttpFailure> for LocationError {
    fn from(f: HttpFailure) -> Self {
        match f {
            HttpFailure::Status { status: 403, .. } => Self::Denied,
            HttpFailure::Status { status, body } => Self::Status { status, body },
            HttpFailure::Parse(e) => Self::ResponseParsing(e),
            HttpFailure::Connect(url) => Self::Unavailable(format!("unreachable at {url}")),
            HttpFailure::Timeout(secs) => Self::Unavailable(format!("timed out after {secs}s")),
            HttpFailure::Other(e) => Self::Unavailable(e),
        }
    }
}

// ═══════════════════════════════════════════
// Reasoning
// ═══════════════════════════════════════════

/// Reasoning service reached over HTTP (single POST endpoint, action in the body).
pub struct HttpReasoningClient {
    url: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpReasoningClient {
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self, ReasoningError> {
        let client = build_client(timeout_secs).map_err(|e| ReasoningError::Http(e.to_string()))?;
        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn from_config(config: &AssistantConfig) -> Result<Self, ReasoningError> {
        Self::new(&config.reasoning_url, config.reasoning_timeout_secs)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ReasoningService for HttpReasoningClient {
    async fn call(&self, request: &ReasoningRequest) -> Result<ReasoningResponse, ReasoningError> {
        let builder = self.client.post(&self.url).json(request);
        let response: ReasoningResponse = send_json(builder, &self.url, self.timeout_secs).await?;
        Ok(response)
    }
}

// ═══════════════════════════════════════════
// Geolocation
// ═══════════════════════════════════════════

pub struct HttpGeolocationClient {
    url: String,
    client: reqwest::Client,
}

impl HttpGeolocationClient {
    pub fn new(url: &str) -> Result<Self, LocationError> {
        let client =
            build_client(AUX_TIMEOUT_SECS).map_err(|e| LocationError::Unavailable(e.to_string()))?;
        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &AssistantConfig) -> Result<Self, LocationError> {
        Self::new(&config.geolocation_url)
    }
}

#[async_trait]
impl GeolocationService for HttpGeolocationClient {
    async fn locate(&self, session_id: Uuid) -> Result<Coordinates, LocationError> {
        let builder = self
            .client
            .get(&self.url)
            .query(&[("sessionId", session_id.to_string())]);
        let coords: Coordinates = send_json(builder, &self.url, AUX_TIMEOUT_SECS).await?;
        Ok(coords)
    }
}

// ═══════════════════════════════════════════
// Diagnostic report
// ═══════════════════════════════════════════

pub struct HttpReportClient {
    url: String,
    client: reqwest::Client,
}

impl HttpReportClient {
    pub fn new(url: &str) -> Result<Self, ReportError> {
        let client = build_client(AUX_TIMEOUT_SECS).map_err(|e| ReportError::Http(e.to_string()))?;
        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &AssistantConfig) -> Result<Self, ReportError> {
        Self::new(&config.report_url)
    }
}

#[async_trait]
impl ReportService for HttpReportClient {
    async fn generate(&self, request: &ReportRequest) -> Result<DiagnosticReport, ReportError> {
        let builder = self.client.post(&self.url).json(request);
        let report: DiagnosticReport = send_json(builder, &self.url, AUX_TIMEOUT_SECS).await?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConversationMemory;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    /// Serve `app` on an ephemeral local port and return its base URL.
    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn reasoning_round_trip() {
        let app = Router::new().route(
            "/assistant",
            post(|Json(body): Json<Value>| async move {
                let text = body["text"].as_str().unwrap_or("").to_string();
                Json(json!({
                    "conversationId": body["sessionId"],
                    "response": format!("Reçu: {text}"),
                    "suggestions": ["Continuer"],
                    "metadata": {"complexity": "medium"}
                }))
            }),
        );
        let base = serve(app).await;

        let client = HttpReasoningClient::new(&format!("{base}/assistant/"), 5).unwrap();
        assert!(client.url().ends_with("/assistant"));
        let request = ReasoningRequest::send(Uuid::new_v4(), "écran cassé", "fr", None);
        let response = client.call(&request).await.unwrap();

        assert_eq!(response.message, "Reçu: écran cassé");
        assert_eq!(response.conversation_id, Some(request.session_id.to_string()));
        assert_eq!(response.suggestions, Some(vec!["Continuer".to_string()]));
    }

    #[tokio::test]
    async fn reasoning_non_2xx_is_status_error() {
        let app = Router::new().route(
            "/assistant",
            post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        );
        let base = serve(app).await;

        let client = HttpReasoningClient::new(&format!("{base}/assistant"), 5).unwrap();
        let err = client
            .call(&ReasoningRequest::start(Uuid::new_v4(), "fr", None))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ReasoningError::Status {
                status: 502,
                body: "upstream down".into()
            }
        );
    }

    #[tokio::test]
    async fn reasoning_malformed_body_is_parse_error() {
        let app = Router::new().route("/assistant", post(|| async { Json(json!({"oops": true})) }));
        let base = serve(app).await;

        let client = HttpReasoningClient::new(&format!("{base}/assistant"), 5).unwrap();
        let err = client
            .call(&ReasoningRequest::start(Uuid::new_v4(), "fr", None))
            .await
            .unwrap_err();
        assert!(matches!(err, ReasoningError::ResponseParsing(_)));
    }

    #[tokio::test]
    async fn reasoning_unreachable_is_connection_error() {
        // Bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpReasoningClient::new(&format!("http://{addr}/assistant"), 5).unwrap();
        let err = client
            .call(&ReasoningRequest::start(Uuid::new_v4(), "fr", None))
            .await
            .unwrap_err();
        assert!(matches!(err, ReasoningError::Connection(_)));
    }

    #[tokio::test]
    async fn geolocation_parses_coordinates_and_maps_403() {
        let app = Router::new()
            .route(
                "/geo",
                get(|| async { Json(json!({"latitude": 48.8566, "longitude": 2.3522})) }),
            )
            .route("/denied", get(|| async { StatusCode::FORBIDDEN }));
        let base = serve(app).await;

        let client = HttpGeolocationClient::new(&format!("{base}/geo")).unwrap();
        let coords = client.locate(Uuid::new_v4()).await.unwrap();
        assert_eq!(coords.latitude, 48.8566);

        let denied = HttpGeolocationClient::new(&format!("{base}/denied")).unwrap();
        assert_eq!(denied.locate(Uuid::new_v4()).await.unwrap_err(), LocationError::Denied);
    }

    #[tokio::test]
    async fn report_forwards_snapshot() {
        let app = Router::new().route(
            "/report",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "symptoms": body["memorySnapshot"]["diagnosticContext"]["collectedSymptoms"],
                    "likelihood": 0.7,
                    "conversation": body["conversationId"]
                }))
            }),
        );
        let base = serve(app).await;

        let mut memory = ConversationMemory::default();
        memory
            .diagnostic_context
            .collected_symptoms
            .insert("surchauffe".into());
        let request = ReportRequest {
            conversation_id: Uuid::new_v4(),
            memory_snapshot: memory,
        };

        let client = HttpReportClient::new(&format!("{base}/report")).unwrap();
        let report = client.generate(&request).await.unwrap();
        assert_eq!(report.symptoms, vec!["surchauffe"]);
        assert_eq!(report.extra["conversation"], request.conversation_id.to_string());
    }
}
