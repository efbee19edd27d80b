//! HTTP server: the streamable MCP endpoint plus auxiliary endpoints.
//!
//! `/mcp` accepts POST (submit message), GET (open event stream), and DELETE
//! (terminate session), with the session id carried in the `mcp-session-id`
//! header. The credential-capture middleware feeds Authorization headers into
//! the session store; `/health` is an unauthenticated liveness probe that
//! performs no upstream call.

use crate::server::{DatamergeMcpServer, PollDefaults};
use crate::session::SessionStore;
use crate::session_manager::DatamergeSessionManager;
use axum::{Json, Router, extract::State, routing::get};
use rmcp::transport::streamable_http_server::session::SessionManager as _;
use rmcp::transport::{StreamableHttpServerConfig, StreamableHttpService};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Header carrying the session identity on the streamable HTTP transport.
pub const SESSION_ID_HEADER: &str = "mcp-session-id";

/// Shared state for the auxiliary endpoints.
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub start_time: Instant,
    pub version: &'static str,
}

/// State for the credential-capture middleware: the store to feed and the
/// session manager to distinguish known sessions from garbage ids.
struct CredentialCapture {
    sessions: Arc<SessionStore>,
    manager: Arc<DatamergeSessionManager>,
}

/// Build the complete HTTP application: auxiliary endpoints, the `/mcp`
/// streamable service, and the credential-capture middleware.
#[must_use]
pub fn build_app(
    state: Arc<AppState>,
    poll_defaults: PollDefaults,
    ct: &CancellationToken,
) -> Router {
    let sessions = state.sessions.clone();
    let session_manager = Arc::new(DatamergeSessionManager::new(sessions.clone()));

    let factory_sessions = sessions.clone();
    let mcp_service = StreamableHttpService::new(
        move || {
            Ok(DatamergeMcpServer::new(
                factory_sessions.clone(),
                poll_defaults,
            ))
        },
        session_manager.clone(),
        StreamableHttpServerConfig {
            stateful_mode: true,
            sse_keep_alive: Some(Duration::from_secs(15)),
        },
    );

    let capture = Arc::new(CredentialCapture {
        sessions,
        manager: session_manager,
    });
    with_credential_capture(
        create_router(state).nest_service("/mcp", mcp_service),
        capture,
    )
}

/// Create the auxiliary router.
fn create_router(state: Arc<AppState>) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

/// Extract the inbound credential from an Authorization header. Both
/// `Bearer <token>` and `Token <token>` prefixes are accepted and map to the
/// same downstream use. Absence is not an error at this layer.
fn credential_from_headers(headers: &axum::http::HeaderMap) -> Option<String> {
    let value = headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("Token "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Attach the credential-capture middleware.
///
/// For a request bearing a known session id, the credential is
/// (re-)remembered before dispatch. For an initialize request (no session id
/// yet), the new session id is read from the response header and the
/// credential remembered after the service responds, so the first tool call
/// already finds it. Credentials on unknown session ids are ignored: the
/// service rejects those requests and no close handler would ever clean a
/// stray store entry up.
fn with_credential_capture(router: Router, capture: Arc<CredentialCapture>) -> Router {
    use axum::{
        body::Body,
        http::Request,
        middleware::{Next, from_fn_with_state},
        response::Response,
    };
    use rmcp::transport::streamable_http_server::session::SessionId;

    async fn capture_credential(
        State(capture): State<Arc<CredentialCapture>>,
        request: Request<Body>,
        next: Next,
    ) -> Response {
        if !request.uri().path().starts_with("/mcp") {
            return next.run(request).await;
        }

        let credential = credential_from_headers(request.headers());
        let session_id = request
            .headers()
            .get(SESSION_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);

        if let (Some(credential), Some(session_id)) = (credential.as_deref(), session_id.as_deref())
        {
            let id: SessionId = session_id.to_string().into();
            if capture.manager.has_session(&id).await.unwrap_or(false) {
                capture.sessions.remember_credential(session_id, credential);
            }
        }

        let response = next.run(request).await;

        if let Some(credential) = credential
            && session_id.is_none()
            && let Some(new_session_id) = response
                .headers()
                .get(SESSION_ID_HEADER)
                .and_then(|h| h.to_str().ok())
        {
            capture
                .sessions
                .remember_credential(new_session_id, &credential);
        }

        response
    }

    router.layer(from_fn_with_state(capture, capture_credential))
}

// ============================================================================
// Auxiliary endpoints
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_seconds: u64,
}

/// GET /health - always 200 while the process is up; touches nothing upstream.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: state.version,
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}
