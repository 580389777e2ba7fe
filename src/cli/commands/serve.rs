//! HTTP API server for the multi-agent chat.
//!
//! Each session id gets its own conversation controller; transcripts live in
//! memory for the lifetime of the server, agent history in the history store.

use crate::agent::AgentRegistry;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::conversation::{ConversationController, Message, SurfaceId};
use crate::error::AgentDeckError;
use crate::extract::{extract_videos, ExtractRequest, RegexVideoExtractor, VideoResource};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Sessions kept in memory; the oldest is dropped when a new one would exceed it.
const MAX_SESSIONS: usize = 1024;

/// Largest video count `/extract` accepts.
const MAX_EXTRACT_VIDEOS: usize = 20;

type SharedController = Arc<tokio::sync::Mutex<ConversationController>>;

/// Session controllers with their creation order.
#[derive(Default)]
struct SessionTable {
    controllers: HashMap<String, SharedController>,
    order: VecDeque<String>,
}

/// Shared application state.
struct AppState {
    registry: Arc<AgentRegistry>,
    sessions: Mutex<SessionTable>,
    max_sessions: usize,
    extractor: RegexVideoExtractor,
}

impl AppState {
    fn new(registry: Arc<AgentRegistry>) -> Self {
        Self::with_capacity(registry, MAX_SESSIONS)
    }

    fn with_capacity(registry: Arc<AgentRegistry>, max_sessions: usize) -> Self {
        Self {
            registry,
            sessions: Mutex::new(SessionTable::default()),
            max_sessions: max_sessions.max(1),
            extractor: RegexVideoExtractor::new(),
        }
    }

    fn table(&self) -> Result<std::sync::MutexGuard<'_, SessionTable>, ApiError> {
        self.sessions
            .lock()
            .map_err(|_| ApiError::internal("session table poisoned"))
    }

    /// A controller for `session_id` on the default agent, not yet registered.
    fn new_controller(&self, session_id: &str) -> Result<ConversationController, ApiError> {
        let agent = self
            .registry
            .default_agent()
            .ok_or_else(|| ApiError::internal("no agents configured"))?;
        let mut controller = ConversationController::new(self.registry.clone(), session_id);
        controller.open(SurfaceId::Chat, agent)?;
        Ok(controller)
    }

    /// The controller for `session_id`, if the session has been used.
    fn existing(&self, session_id: &str) -> Result<Option<SharedController>, ApiError> {
        Ok(self.table()?.controllers.get(session_id).cloned())
    }

    /// The controller for `session_id`, created on first use with the default agent.
    fn session(&self, session_id: &str) -> Result<SharedController, ApiError> {
        let mut table = self.table()?;
        if let Some(controller) = table.controllers.get(session_id) {
            return Ok(controller.clone());
        }

        let controller = Arc::new(tokio::sync::Mutex::new(self.new_controller(session_id)?));
        while table.order.len() >= self.max_sessions {
            let Some(oldest) = table.order.pop_front() else {
                break;
            };
            table.controllers.remove(&oldest);
            info!("Dropped session {} (limit {})", oldest, self.max_sessions);
        }
        table.order.push_back(session_id.to_string());
        table.controllers.insert(session_id.to_string(), controller.clone());
        info!("New session {}", session_id);
        Ok(controller)
    }
}

/// Build the API router.
fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/agents", get(list_agents))
        .route(
            "/sessions/{session_id}/messages",
            get(get_messages).post(post_message).delete(clear_messages),
        )
        .route("/sessions/{session_id}/agent", put(switch_agent))
        .route("/extract", post(extract))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Chat, &settings).await {
        Output::error(&format!("{}", e));
        Output::info("Run 'agentdeck doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let registry = Arc::new(AgentRegistry::multi_agent(&settings).await?);
    let state = Arc::new(AppState::new(registry));
    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("agentdeck API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET    /health");
    Output::kv("Agents", "GET    /agents");
    Output::kv("Transcript", "GET    /sessions/:id/messages");
    Output::kv("Send message", "POST   /sessions/:id/messages");
    Output::kv("Clear", "DELETE /sessions/:id/messages");
    Output::kv("Switch agent", "PUT    /sessions/:id/agent");
    Output::kv("Extract videos", "POST   /extract");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Serialize)]
struct AgentInfo {
    id: String,
    name: String,
    role: String,
    model: String,
    description: Option<String>,
    tools: Vec<String>,
}

#[derive(Serialize)]
struct AgentListResponse {
    agents: Vec<AgentInfo>,
}

#[derive(Serialize)]
struct TranscriptResponse {
    session_id: String,
    agent: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct MessageRequest {
    text: String,
    /// Switch to this agent first (clears the transcript when it changes).
    #[serde(default)]
    agent: Option<String>,
}

#[derive(Serialize)]
struct MessageResponse {
    agent: String,
    reply: Message,
}

#[derive(Deserialize)]
struct SwitchRequest {
    agent: String,
}

#[derive(Serialize)]
struct SwitchResponse {
    agent: String,
    cleared: bool,
}

#[derive(Deserialize)]
struct ExtractBody {
    text: String,
    #[serde(default)]
    goal: Option<String>,
    #[serde(default = "default_min")]
    min: usize,
    #[serde(default = "default_max")]
    max: usize,
}

fn default_min() -> usize {
    2
}

fn default_max() -> usize {
    3
}

#[derive(Serialize)]
struct ExtractResponse {
    videos: Vec<VideoResource>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// An error with its HTTP status.
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn internal(message: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.to_string(),
        }
    }
}

impl From<AgentDeckError> for ApiError {
    fn from(err: AgentDeckError) -> Self {
        let status = match &err {
            AgentDeckError::EmptyInput(_) | AgentDeckError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AgentDeckError::UnknownAgent(_) => StatusCode::NOT_FOUND,
            AgentDeckError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

// === Handlers ===

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "registry": state.registry.key() }))
}

async fn list_agents(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(AgentListResponse {
        agents: state
            .registry
            .descriptors()
            .into_iter()
            .map(|d| AgentInfo {
                id: d.id.clone(),
                name: d.name.clone(),
                role: d.role.clone(),
                model: d.model.clone(),
                description: d.description.clone(),
                tools: d.tools.iter().map(|t| t.to_string()).collect(),
            })
            .collect(),
    })
}

async fn get_messages(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<TranscriptResponse>, ApiError> {
    let Some(controller) = state.existing(&session_id)? else {
        return Ok(Json(TranscriptResponse {
            session_id,
            agent: state.registry.default_agent().unwrap_or_default().to_string(),
            messages: Vec::new(),
        }));
    };
    let controller = controller.lock().await;
    Ok(Json(TranscriptResponse {
        session_id,
        agent: controller.active_agent(SurfaceId::Chat).unwrap_or_default().to_string(),
        messages: controller.history(SurfaceId::Chat).to_vec(),
    }))
}

async fn post_message(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let controller = state.session(&session_id)?;
    let mut controller = controller.lock().await;

    if let Some(agent) = &req.agent {
        controller.switch_agent(SurfaceId::Chat, agent)?;
    }
    let reply = controller.submit(SurfaceId::Chat, &req.text).await?;

    Ok(Json(MessageResponse {
        agent: controller.active_agent(SurfaceId::Chat).unwrap_or_default().to_string(),
        reply,
    }))
}

async fn clear_messages(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    match state.existing(&session_id)? {
        Some(controller) => controller.lock().await.forget(SurfaceId::Chat).await?,
        // Stored history may outlive the in-memory session.
        None => state.new_controller(&session_id)?.forget(SurfaceId::Chat).await?,
    };
    Ok(StatusCode::NO_CONTENT)
}

async fn switch_agent(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(req): Json<SwitchRequest>,
) -> Result<Json<SwitchResponse>, ApiError> {
    let controller = state.session(&session_id)?;
    let cleared = controller.lock().await.switch_agent(SurfaceId::Chat, &req.agent)?;
    Ok(Json(SwitchResponse {
        agent: req.agent,
        cleared,
    }))
}

async fn extract(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExtractBody>,
) -> Result<Json<ExtractResponse>, ApiError> {
    if req.min > MAX_EXTRACT_VIDEOS || req.max > MAX_EXTRACT_VIDEOS {
        return Err(AgentDeckError::InvalidInput(format!(
            "min and max must be at most {}",
            MAX_EXTRACT_VIDEOS
        ))
        .into());
    }

    let request = ExtractRequest::new(req.goal.as_deref().unwrap_or_default())
        .with_counts(req.min, req.max);
    Ok(Json(ExtractResponse {
        videos: extract_videos(&state.extractor, &req.text, &request),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::ScriptedAgent;
    use crate::agent::Invoke;

    fn state(web: Arc<ScriptedAgent>, finance: Arc<ScriptedAgent>) -> Arc<AppState> {
        let agents: Vec<Arc<dyn Invoke>> = vec![web, finance];
        let registry = AgentRegistry::from_agents("test", agents).unwrap();
        Arc::new(AppState::new(Arc::new(registry)))
    }

    fn message(text: &str, agent: Option<&str>) -> Json<MessageRequest> {
        Json(MessageRequest {
            text: text.to_string(),
            agent: agent.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn test_health_reports_registry() {
        let web = ScriptedAgent::new("Web Agent").into_arc();
        let finance = ScriptedAgent::new("Finance Agent").into_arc();

        let Json(body) = health(State(state(web, finance))).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["registry"], "test");
    }

    #[tokio::test]
    async fn test_post_message_uses_default_agent() {
        let web = ScriptedAgent::new("Web Agent").reply("It is sunny.").into_arc();
        let finance = ScriptedAgent::new("Finance Agent").into_arc();
        let state = state(web.clone(), finance);

        let Json(resp) = post_message(
            State(state.clone()),
            Path("s1".to_string()),
            message("Weather?", None),
        )
        .await
        .ok()
        .unwrap();
        assert_eq!(resp.agent, "Web Agent");
        assert_eq!(resp.reply, Message::assistant("It is sunny."));
        assert_eq!(web.prompts(), vec!["Weather?"]);

        let Json(transcript) = get_messages(State(state), Path("s1".to_string()))
            .await
            .ok()
            .unwrap();
        assert_eq!(transcript.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let web = ScriptedAgent::new("Web Agent").into_arc();
        let finance = ScriptedAgent::new("Finance Agent").into_arc();
        let state = state(web, finance);

        let _ = post_message(State(state.clone()), Path("a".to_string()), message("hi", None)).await;

        let Json(other) = get_messages(State(state), Path("b".to_string()))
            .await
            .ok()
            .unwrap();
        assert!(other.messages.is_empty());
    }

    #[tokio::test]
    async fn test_switch_agent_in_request() {
        let web = ScriptedAgent::new("Web Agent").into_arc();
        let finance = ScriptedAgent::new("Finance Agent").reply("NVDA is up.").into_arc();
        let state = state(web.clone(), finance.clone());

        let Json(resp) = post_message(
            State(state),
            Path("s1".to_string()),
            message("NVDA?", Some("Finance Agent")),
        )
        .await
        .ok()
        .unwrap();
        assert_eq!(resp.agent, "Finance Agent");
        assert!(web.prompts().is_empty());
        assert_eq!(finance.prompts(), vec!["NVDA?"]);
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let web = ScriptedAgent::new("Web Agent").fail("connection refused").into_arc();
        let finance = ScriptedAgent::new("Finance Agent").into_arc();
        let state = state(web, finance);

        let unavailable = post_message(State(state.clone()), Path("s".to_string()), message("hi", None))
            .await
            .err()
            .unwrap();
        assert_eq!(unavailable.status, StatusCode::SERVICE_UNAVAILABLE);

        let empty = post_message(State(state.clone()), Path("s".to_string()), message("  ", None))
            .await
            .err()
            .unwrap();
        assert_eq!(empty.status, StatusCode::BAD_REQUEST);

        let unknown = switch_agent(
            State(state),
            Path("s".to_string()),
            Json(SwitchRequest {
                agent: "Crypto Agent".to_string(),
            }),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_clear_messages() {
        let web = ScriptedAgent::new("Web Agent").into_arc();
        let finance = ScriptedAgent::new("Finance Agent").into_arc();
        let state = state(web, finance);

        let _ = post_message(State(state.clone()), Path("s".to_string()), message("hi", None)).await;
        let status = clear_messages(State(state.clone()), Path("s".to_string()))
            .await
            .ok()
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let Json(transcript) = get_messages(State(state), Path("s".to_string()))
            .await
            .ok()
            .unwrap();
        assert!(transcript.messages.is_empty());
    }

    #[tokio::test]
    async fn test_extract_pads_with_search_links() {
        let web = ScriptedAgent::new("Web Agent").into_arc();
        let finance = ScriptedAgent::new("Finance Agent").into_arc();
        let state = state(web, finance);

        let Json(resp) = extract(
            State(state),
            Json(ExtractBody {
                text: "No links here.".to_string(),
                goal: Some("Endurance".to_string()),
                min: 2,
                max: 3,
            }),
        )
        .await
        .ok()
        .unwrap();
        assert_eq!(resp.videos.len(), 2);
        assert!(resp.videos.iter().all(|v| v.is_search_link()));
    }

    #[tokio::test]
    async fn test_extract_rejects_large_counts() {
        let web = ScriptedAgent::new("Web Agent").into_arc();
        let finance = ScriptedAgent::new("Finance Agent").into_arc();
        let state = state(web, finance);

        let err = extract(
            State(state),
            Json(ExtractBody {
                text: String::new(),
                goal: None,
                min: 3_000_000,
                max: 3_000_000,
            }),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_reading_unknown_session_creates_nothing() {
        let web = ScriptedAgent::new("Web Agent").into_arc();
        let finance = ScriptedAgent::new("Finance Agent").into_arc();
        let state = state(web, finance);

        let Json(transcript) = get_messages(State(state.clone()), Path("ghost".to_string()))
            .await
            .ok()
            .unwrap();
        assert_eq!(transcript.agent, "Web Agent");
        assert!(transcript.messages.is_empty());

        let status = clear_messages(State(state.clone()), Path("ghost".to_string()))
            .await
            .ok()
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(state.table().ok().unwrap().controllers.is_empty());
    }

    #[tokio::test]
    async fn test_oldest_session_dropped_at_capacity() {
        let agents: Vec<Arc<dyn Invoke>> = vec![ScriptedAgent::new("Web Agent").into_arc()];
        let registry = AgentRegistry::from_agents("test", agents).unwrap();
        let state = Arc::new(AppState::with_capacity(Arc::new(registry), 2));

        for id in ["a", "b", "c"] {
            let _ = post_message(State(state.clone()), Path(id.to_string()), message("hi", None)).await;
        }

        let table = state.table().ok().unwrap();
        assert_eq!(table.controllers.len(), 2);
        assert!(!table.controllers.contains_key("a"));
        assert_eq!(table.order, vec!["b".to_string(), "c".to_string()]);
    }
}
