//! HTTP entry surface.
//!
//! JSON endpoints:
//! - `POST /api/v1/query`           answer one utterance (`GET` with query params for links)
//! - `GET  /api/v1/suggestions`     example utterances (`POST` accepted too)
//!
//! Artifact and telephony endpoints:
//! - `GET  /answer/{filename}`      serve a previously published artifact
//! - `POST /sms`                    inbound text message, answered with TwiML
//! - `POST /voice`                  inbound call, answered with a record-and-transcribe prompt
//! - `POST /voice/transcription`    transcribed call audio, answered by text message

use std::sync::Arc;

use axum::{
    extract::{Form, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use wren_agent::adapters::{ArtifactSource, SmsSender};
use wren_agent::phrases::{phrase, PhraseCategory};
use wren_agent::{Agent, Query as Utterance};
use wren_core::domain::intent::Coordinates;
use wren_core::domain::message::{escape_markup, unescape_markup, Reply};
use wren_core::errors::{ApplicationError, DomainError, InterfaceError, ProviderError};
use wren_core::random::RandomSource;
use wren_core::Channel;
use wren_providers::storage::is_safe_artifact_name;

const DEFAULT_SUGGESTIONS: usize = 3;
const MAX_SUGGESTIONS: usize = 10;
const TRANSCRIPTION_CALLBACK: &str = "/voice/transcription";
const MAX_RECORDING_SECS: u32 = 10;

#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<Agent>,
    pub artifacts: Arc<dyn ArtifactSource>,
    pub sms: Arc<dyn SmsSender>,
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: String,
    pub channel: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl QueryRequest {
    pub fn into_utterance(self) -> Result<Utterance, DomainError> {
        if self.query.trim().is_empty() {
            return Err(DomainError::EmptyQuery);
        }
        let channel: Channel = self.channel.as_deref().unwrap_or_default().parse()?;
        let coordinates = match (self.lat, self.lon) {
            (None, None) => None,
            (Some(latitude), Some(longitude))
                if (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude) =>
            {
                Some(Coordinates::new(latitude, longitude))
            }
            (latitude, longitude) => {
                return Err(DomainError::InvalidCoordinates(format!("lat={latitude:?} lon={longitude:?}")));
            }
        };
        Ok(Utterance::new(self.query, channel).with_coordinates(coordinates))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SuggestionParams {
    pub count: Option<usize>,
    pub channel: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SmsForm {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TranscriptionForm {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub transcription_text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    pub correlation_id: String,
}

/// An [`InterfaceError`] on its way out as JSON.
#[derive(Debug)]
pub struct ApiError(InterfaceError);

impl From<InterfaceError> for ApiError {
    fn from(error: InterfaceError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.0.user_message().to_string(),
            correlation_id: self.0.correlation_id().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

fn rejected(error: impl Into<ApplicationError>, correlation_id: &str) -> ApiError {
    let interface = error.into().into_interface(correlation_id);
    warn!(
        event_name = "server.request.rejected",
        correlation_id,
        error = %interface,
        "request rejected"
    );
    ApiError(interface)
}

fn correlation_id() -> String {
    Uuid::new_v4().simple().to_string()
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/query", post(post_query).get(get_query))
        .route("/api/v1/suggestions", get(suggestions).post(suggestions))
        .route("/answer/{filename}", get(artifact))
        .route("/sms", post(inbound_sms))
        .route("/voice", post(inbound_call))
        .route(TRANSCRIPTION_CALLBACK, post(transcription))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// JSON handlers
// ---------------------------------------------------------------------------

async fn post_query(State(state): State<AppState>, Json(request): Json<QueryRequest>) -> Result<Json<Reply>, ApiError> {
    answer(&state, request).await
}

async fn get_query(State(state): State<AppState>, Query(request): Query<QueryRequest>) -> Result<Json<Reply>, ApiError> {
    answer(&state, request).await
}

async fn answer(state: &AppState, request: QueryRequest) -> Result<Json<Reply>, ApiError> {
    let correlation_id = correlation_id();
    let utterance = request.into_utterance().map_err(|error| rejected(error, &correlation_id))?;

    let mut chooser = RandomSource::from_entropy();
    let reply = state.agent.respond(&utterance, &mut chooser).await;
    info!(
        event_name = "server.query.answered",
        correlation_id = %correlation_id,
        channel = utterance.channel.as_str(),
        messages = reply.messages.len(),
        "query answered"
    );
    Ok(Json(reply))
}

async fn suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestionParams>,
) -> Result<Json<SuggestionsResponse>, ApiError> {
    let correlation_id = correlation_id();
    let channel: Channel = params
        .channel
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|error: DomainError| rejected(error, &correlation_id))?;
    let count = params.count.unwrap_or(DEFAULT_SUGGESTIONS).clamp(1, MAX_SUGGESTIONS);

    let mut chooser = RandomSource::from_entropy();
    let suggestions = state.agent.suggest(count, channel, &mut chooser).into_vec();
    Ok(Json(SuggestionsResponse { suggestions }))
}

async fn artifact(State(state): State<AppState>, Path(filename): Path<String>) -> Result<Response, ApiError> {
    let correlation_id = correlation_id();
    let not_found = || ApplicationError::NotFound(filename.clone());
    if !is_safe_artifact_name(&filename) {
        return Err(rejected(not_found(), &correlation_id));
    }

    match state.artifacts.fetch(&filename).await {
        Ok(Some(content)) => {
            Ok(([(header::CONTENT_TYPE, "text/html; charset=utf-8")], content).into_response())
        }
        Ok(None) | Err(ProviderError::Unsupported { .. }) => Err(rejected(not_found(), &correlation_id)),
        Err(error) => Err(rejected(error, &correlation_id)),
    }
}

// ---------------------------------------------------------------------------
// Telephony handlers
// ---------------------------------------------------------------------------

async fn inbound_sms(State(state): State<AppState>, Form(form): Form<SmsForm>) -> Response {
    let mut chooser = RandomSource::from_entropy();
    let messages = if form.body.trim().is_empty() {
        vec![escape_markup(phrase(&mut chooser, PhraseCategory::Refusal))]
    } else {
        let utterance = Utterance::new(form.body, Channel::Sms);
        state.agent.respond(&utterance, &mut chooser).await.messages
    };
    info!(event_name = "server.sms.answered", messages = messages.len(), "text message answered");

    let verbs: String =
        messages.iter().map(|message| format!("<Message>{}</Message>", twiml_text(message))).collect();
    twiml(&verbs)
}

async fn inbound_call() -> Response {
    let mut chooser = RandomSource::from_entropy();
    let prompt = phrase(&mut chooser, PhraseCategory::Acknowledge);
    twiml(&format!(
        "<Say>{}</Say><Record transcribe=\"true\" transcribeCallback=\"{TRANSCRIPTION_CALLBACK}\" \
         maxLength=\"{MAX_RECORDING_SECS}\" playBeep=\"true\"/>",
        escape_markup(prompt)
    ))
}

async fn transcription(State(state): State<AppState>, Form(form): Form<TranscriptionForm>) -> StatusCode {
    let mut chooser = RandomSource::from_entropy();
    let messages = if form.transcription_text.trim().is_empty() {
        vec![phrase(&mut chooser, PhraseCategory::CantHear).to_string()]
    } else {
        let utterance = Utterance::new(form.transcription_text, Channel::Voice);
        state.agent.respond(&utterance, &mut chooser).await.messages
    };

    if !state.sms.is_configured() || form.from.trim().is_empty() {
        warn!(
            event_name = "server.voice.reply_dropped",
            sms_configured = state.sms.is_configured(),
            messages = messages.len(),
            "voice reply has no way back to the caller"
        );
        return StatusCode::NO_CONTENT;
    }

    for message in &messages {
        if let Err(error) = state.sms.send_message(form.from.trim(), &unescape_markup(message)).await {
            warn!(
                event_name = "server.voice.send_failed",
                provider = error.provider(),
                error = %error,
                "voice reply message could not be sent"
            );
        }
    }
    StatusCode::NO_CONTENT
}

/// Messages arrive wire-escaped; re-escaping the plain text keeps TwiML well formed
/// whether or not a message was escaped to begin with.
fn twiml_text(message: &str) -> String {
    escape_markup(&unescape_markup(message))
}

fn twiml(verbs: &str) -> Response {
    let document = format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response>{verbs}</Response>");
    ([(header::CONTENT_TYPE, "application/xml")], document).into_response()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;
    use wren_agent::adapters::{ArtifactSource, SmsSender};
    use wren_agent::Agent;
    use wren_core::config::AppConfig;
    use wren_core::errors::ProviderError;
    use wren_providers::ProviderSet;

    use super::{router, AppState};
    use crate::templates::TeraRenderer;

    struct MemoryArtifacts(HashMap<String, Vec<u8>>);

    #[async_trait]
    impl ArtifactSource for MemoryArtifacts {
        async fn fetch(&self, filename: &str) -> Result<Option<Vec<u8>>, ProviderError> {
            Ok(self.0.get(filename).cloned())
        }
    }

    #[derive(Default)]
    struct RecordingSms {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl SmsSender for RecordingSms {
        fn is_configured(&self) -> bool {
            true
        }

        async fn send_message(&self, to: &str, body: &str) -> Result<(), ProviderError> {
            if let Ok(mut sent) = self.sent.lock() {
                sent.push((to.to_string(), body.to_string()));
            }
            Ok(())
        }
    }

    fn app(sms: Arc<RecordingSms>) -> Router {
        let config = AppConfig::default();
        let set = match ProviderSet::from_config(&config, Arc::new(TeraRenderer::embedded())) {
            Ok(set) => set,
            Err(error) => panic!("providers should wire: {error}"),
        };
        let agent = match Agent::new(&config, set.providers) {
            Ok(agent) => agent,
            Err(error) => panic!("agent should build: {error}"),
        };
        let stored = HashMap::from([("wren-image-1.html".to_string(), b"<html>cats</html>".to_vec())]);
        router(AppState { agent: Arc::new(agent), artifacts: Arc::new(MemoryArtifacts(stored)), sms })
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
        let response = match app.oneshot(request).await {
            Ok(response) => response,
            Err(error) => match error {},
        };
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap_or_default();
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    fn json_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap_or_default()
    }

    fn form_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap_or_default()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap_or_default()
    }

    fn parse(body: &str) -> Value {
        serde_json::from_str(body).unwrap_or(Value::Null)
    }

    #[tokio::test]
    async fn greeting_query_returns_one_message() {
        let (status, body) =
            send(app(Arc::default()), json_request("/api/v1/query", r#"{"query":"hello wren"}"#)).await;

        assert_eq!(status, StatusCode::OK);
        let reply = parse(&body);
        assert_eq!(reply["messages"].as_array().map(Vec::len), Some(1), "{body}");
        assert!(reply.get("shareSuggestion").is_none());
    }

    #[tokio::test]
    async fn help_shorthand_works_over_get() {
        let (status, body) = send(app(Arc::default()), get("/api/v1/query?query=%3F")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse(&body)["messages"][0], "Please let me help!");
    }

    #[tokio::test]
    async fn unknown_channel_is_a_bad_request_with_correlation_id() {
        let (status, body) = send(
            app(Arc::default()),
            json_request("/api/v1/query", r#"{"query":"cats","channel":"fax"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error = parse(&body);
        assert_eq!(error["error"], "The request could not be processed. Check inputs and try again.");
        assert!(error["correlationId"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn half_coordinates_and_blank_queries_are_rejected() {
        let (status, _) = send(
            app(Arc::default()),
            json_request("/api/v1/query", r#"{"query":"where am i","lat":45.1}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(app(Arc::default()), json_request("/api/v1/query", r#"{"query":"   "}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unconfigured_provider_failure_is_an_apology_not_an_error() {
        let (status, body) = send(
            app(Arc::default()),
            json_request("/api/v1/query", r#"{"query":"show me 5 pictures of cats"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse(&body)["messages"].as_array().map(Vec::len), Some(1), "{body}");
    }

    #[tokio::test]
    async fn stored_artifacts_are_served_as_html() {
        let response = match app(Arc::default()).oneshot(get("/answer/wren-image-1.html")).await {
            Ok(response) => response,
            Err(error) => match error {},
        };
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).and_then(|value| value.to_str().ok()),
            Some("text/html; charset=utf-8")
        );

        let (status, body) = send(app(Arc::default()), get("/answer/missing.html")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(parse(&body)["error"], "Nothing is stored under that name.");

        let (status, _) = send(app(Arc::default()), get("/answer/..%2Fconfig.toml")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn suggestion_count_defaults_to_three_and_caps_at_ten() {
        let (_, body) = send(app(Arc::default()), get("/api/v1/suggestions")).await;
        assert_eq!(parse(&body)["suggestions"].as_array().map(Vec::len), Some(3));

        let (_, body) = send(app(Arc::default()), get("/api/v1/suggestions?count=40")).await;
        assert_eq!(parse(&body)["suggestions"].as_array().map(Vec::len), Some(10));

        let (status, body) = send(
            app(Arc::default()),
            Request::builder().method("POST").uri("/api/v1/suggestions?count=1&channel=sms").body(Body::empty()).unwrap_or_default(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse(&body)["suggestions"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn inbound_sms_is_answered_with_twiml() {
        let (status, body) = send(app(Arc::default()), form_request("/sms", "From=%2B15550100&Body=hello+wren")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>"), "{body}");
        assert_eq!(body.matches("<Message>").count(), 1);

        let (_, body) = send(app(Arc::default()), form_request("/sms", "From=%2B15550100&Body=")).await;
        assert_eq!(body.matches("<Message>").count(), 1, "{body}");
    }

    #[tokio::test]
    async fn inbound_call_prompts_for_a_recording() {
        let (status, body) = send(app(Arc::default()), form_request("/voice", "From=%2B15550100")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<Say>"));
        assert!(body.contains("transcribeCallback=\"/voice/transcription\""));
    }

    #[tokio::test]
    async fn transcriptions_are_answered_by_text_message() {
        let sms = Arc::new(RecordingSms::default());
        let (status, _) = send(
            app(sms.clone()),
            form_request("/voice/transcription", "From=%2B15550100&TranscriptionText=hello+wren"),
        )
        .await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        let sent = sms.sent.lock().map(|sent| sent.clone()).unwrap_or_default();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "+15550100");
    }
}
