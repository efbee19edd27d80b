//! MCP server implementation using rmcp.
//!
//! One [`DatamergeMcpServer`] is shared by both transports: the streamable
//! HTTP transport resolves the session id from the request headers, the stdio
//! transport uses the process-lifetime singleton session. Every tool failure
//! is converted into an `isError` tool result at this boundary; only unknown
//! tool names (a client bug) surface as protocol errors.

use crate::session::{NotConfigured, SessionStore};
use crate::tools;
use axum::http::request::Parts;
use datamerge_api::jobs::{self, JobOutcome, JobStatus, PollOptions};
use datamerge_api::normalize;
use datamerge_api::{ApiError, CompanyRef, DatamergeClient};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject,
        ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;

/// The implicit session id used by the stdio transport for the whole process
/// lifetime.
pub const STDIO_SESSION_ID: &str = "stdio";

/// Process-wide poll cadence overrides, applied when a tool call does not
/// supply its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct PollDefaults {
    pub interval_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
}

impl PollDefaults {
    fn options(self, interval_secs: Option<u64>, timeout_secs: Option<u64>) -> PollOptions {
        PollOptions {
            interval_secs: interval_secs.filter(|&v| v > 0).or(self.interval_secs),
            timeout_secs: timeout_secs.filter(|&v| v > 0).or(self.timeout_secs),
        }
    }
}

fn mcp_session_id_from_context(context: &RequestContext<RoleServer>) -> Option<&str> {
    context
        .extensions
        .get::<Parts>()
        .and_then(|parts| parts.headers.get("mcp-session-id"))
        .and_then(|h| h.to_str().ok())
}

#[derive(Debug, thiserror::Error)]
enum ToolError {
    #[error("Tool not found: {0}")]
    UnknownTool(String),
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    #[error(transparent)]
    NotConfigured(#[from] NotConfigured),
    #[error("Datamerge API error: {0}")]
    Api(#[from] ApiError),
}

/// Which record vocabulary a job's results use.
#[derive(Debug, Clone, Copy)]
enum RecordKind {
    Company,
    Contact,
}

#[derive(Clone)]
pub struct DatamergeMcpServer {
    sessions: Arc<SessionStore>,
    poll_defaults: PollDefaults,
}

impl DatamergeMcpServer {
    #[must_use]
    pub fn new(sessions: Arc<SessionStore>, poll_defaults: PollDefaults) -> Self {
        Self {
            sessions,
            poll_defaults,
        }
    }

    fn client(&self, session_id: &str) -> Result<Arc<DatamergeClient>, ToolError> {
        Ok(self.sessions.get_or_create_client(session_id, None)?)
    }

    async fn dispatch(
        &self,
        session_id: &str,
        tool: &str,
        args: JsonObject,
    ) -> Result<CallToolResult, ToolError> {
        match tool {
            tools::CONFIGURE_CREDENTIAL => {
                let args: tools::ConfigureCredentialArgs = parse_args(args)?;
                self.sessions
                    .configure(session_id, &args.token, args.base_url.as_deref());
                Ok(json_result(json!({
                    "configured": true,
                    "base_url": self.client(session_id)?.base_url(),
                })))
            }
            tools::START_ENRICHMENT => {
                let args: tools::EnrichmentArgs = parse_args_validated(args, |a: &tools::EnrichmentArgs| a.validate())?;
                let client = self.client(session_id)?;
                let handle = client.start_enrichment(&args.query).await?;
                Ok(json_result(to_json(&handle)?))
            }
            tools::START_ENRICHMENT_AND_WAIT => {
                let args: tools::EnrichAndWaitArgs =
                    parse_args_validated(args, |a: &tools::EnrichAndWaitArgs| a.validate())?;
                let client = self.client(session_id)?;
                let options = self
                    .poll_defaults
                    .options(args.poll_interval_seconds, args.timeout_seconds);
                let poll_client = client.clone();
                let outcome = jobs::start_and_await(
                    move || async move { client.start_enrichment(&args.query).await },
                    move |job_id| {
                        let client = poll_client.clone();
                        async move { client.enrichment_status(&job_id).await }
                    },
                    options,
                )
                .await?;
                Ok(outcome_result(
                    outcome,
                    RecordKind::Company,
                    tools::GET_ENRICHMENT_RESULT,
                ))
            }
            tools::GET_ENRICHMENT_RESULT => {
                let args: tools::JobArgs = parse_args(args)?;
                let client = self.client(session_id)?;
                let job = client.enrichment_status(&args.job_id).await?;
                Ok(json_result(job_payload(job, RecordKind::Company)?))
            }
            tools::GET_COMPANY => {
                let args: tools::CompanyArgs = parse_args(args)?;
                let client = self.client(session_id)?;
                let company = if let Some(id) = args.datamerge_id {
                    CompanyRef::DatamergeId(id)
                } else if let Some(id) = args.record_id {
                    CompanyRef::RecordId(id)
                } else {
                    return Err(ToolError::InvalidArguments(
                        "provide datamerge_id or record_id".to_string(),
                    ));
                };
                let record = client.get_company(&company).await?;
                Ok(json_result(to_json(&record)?))
            }
            tools::GET_COMPANY_HIERARCHY => {
                let args: tools::HierarchyArgs = parse_args(args)?;
                let client = self.client(session_id)?;
                let hierarchy = client.get_hierarchy(&args.datamerge_id, args.depth).await?;
                Ok(json_result(to_json(&hierarchy)?))
            }
            tools::START_LOOKALIKE => {
                let args: tools::LookalikeArgs =
                    parse_args_validated(args, |a: &tools::LookalikeArgs| a.validate())?;
                let client = self.client(session_id)?;
                let handle = client.start_lookalike(&args.query).await?;
                Ok(json_result(to_json(&handle)?))
            }
            tools::GET_LOOKALIKE_STATUS => {
                let args: tools::JobArgs = parse_args(args)?;
                let client = self.client(session_id)?;
                let job = client.lookalike_status(&args.job_id).await?;
                Ok(json_result(job_payload(job, RecordKind::Company)?))
            }
            tools::CONTACT_SEARCH => {
                let args: tools::ContactSearchArgs =
                    parse_args_validated(args, |a: &tools::ContactSearchArgs| a.validate())?;
                let client = self.client(session_id)?;
                let options = self
                    .poll_defaults
                    .options(args.poll_interval_seconds, args.timeout_seconds);
                let poll_client = client.clone();
                let outcome = jobs::start_and_await(
                    move || async move { client.start_contact_search(&args.query).await },
                    move |job_id| {
                        let client = poll_client.clone();
                        async move { client.contact_search_status(&job_id).await }
                    },
                    options,
                )
                .await?;
                Ok(outcome_result(
                    outcome,
                    RecordKind::Contact,
                    tools::GET_CONTACT_SEARCH_STATUS,
                ))
            }
            tools::GET_CONTACT_SEARCH_STATUS => {
                let args: tools::JobArgs = parse_args(args)?;
                let client = self.client(session_id)?;
                let job = client.contact_search_status(&args.job_id).await?;
                Ok(json_result(job_payload(job, RecordKind::Contact)?))
            }
            tools::CONTACT_ENRICH => {
                let args: tools::ContactEnrichArgs =
                    parse_args_validated(args, |a: &tools::ContactEnrichArgs| a.validate())?;
                let client = self.client(session_id)?;
                let options = self
                    .poll_defaults
                    .options(args.poll_interval_seconds, args.timeout_seconds);
                let poll_client = client.clone();
                let outcome = jobs::start_and_await(
                    move || async move { client.start_contact_enrichment(&args.query).await },
                    move |job_id| {
                        let client = poll_client.clone();
                        async move { client.contact_enrichment_status(&job_id).await }
                    },
                    options,
                )
                .await?;
                Ok(outcome_result(
                    outcome,
                    RecordKind::Contact,
                    tools::GET_CONTACT_ENRICH_STATUS,
                ))
            }
            tools::GET_CONTACT_ENRICH_STATUS => {
                let args: tools::JobArgs = parse_args(args)?;
                let client = self.client(session_id)?;
                let job = client.contact_enrichment_status(&args.job_id).await?;
                Ok(json_result(job_payload(job, RecordKind::Contact)?))
            }
            tools::GET_CONTACT => {
                let args: tools::ContactArgs = parse_args(args)?;
                let client = self.client(session_id)?;
                let record = client.get_contact(&args.record_id).await?;
                Ok(json_result(to_json(&record)?))
            }
            tools::LIST_LISTS => {
                let client = self.client(session_id)?;
                let lists = client.list_lists().await?;
                Ok(json_result(json!({ "lists": lists })))
            }
            tools::CREATE_LIST => {
                let args: tools::CreateListArgs = parse_args(args)?;
                let client = self.client(session_id)?;
                let list = client.create_list(&args.name).await?;
                Ok(json_result(to_json(&list)?))
            }
            tools::GET_LIST_ITEMS => {
                let args: tools::ListArgs = parse_args(args)?;
                let client = self.client(session_id)?;
                let items = client.get_list_items(&args.list_id).await?;
                Ok(json_result(json!({ "items": items })))
            }
            tools::REMOVE_LIST_ITEM => {
                let args: tools::RemoveListItemArgs = parse_args(args)?;
                let client = self.client(session_id)?;
                client.remove_list_item(&args.list_id, &args.item_id).await?;
                Ok(json_result(json!({ "removed": true })))
            }
            tools::DELETE_LIST => {
                let args: tools::ListArgs = parse_args(args)?;
                let client = self.client(session_id)?;
                client.delete_list(&args.list_id).await?;
                Ok(json_result(json!({ "deleted": true })))
            }
            tools::GET_CREDITS_BALANCE => {
                let client = self.client(session_id)?;
                let balance = client.credits_balance().await?;
                Ok(json_result(to_json(&balance)?))
            }
            tools::HEALTH_CHECK => {
                let client = self.client(session_id)?;
                let healthy = client.health_check().await;
                Ok(json_result(json!({ "healthy": healthy })))
            }
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }
}

impl ServerHandler for DatamergeMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Datamerge company-data tools: enrichment, lookup, hierarchy, lookalikes, \
                 contacts, lists, and credits. Configure a session with the \
                 configure-credential tool or an Authorization header."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let session_id = mcp_session_id_from_context(&context).unwrap_or(STDIO_SESSION_ID);
        let tools = tools::catalog();
        tracing::debug!(
            session_id,
            request_id = %context.id,
            tool_count = tools.len(),
            "tools/list"
        );
        Ok(ListToolsResult {
            tools,
            next_cursor: None,
            ..Default::default()
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let session_id = mcp_session_id_from_context(&context)
            .unwrap_or(STDIO_SESSION_ID)
            .to_string();
        let start = Instant::now();
        let tool_name = request.name.clone();
        let arguments = request.arguments.unwrap_or_default();

        match self.dispatch(&session_id, &tool_name, arguments).await {
            Ok(result) => {
                tracing::debug!(
                    session_id,
                    request_id = %context.id,
                    tool = %tool_name,
                    elapsed = ?start.elapsed(),
                    "tools/call ok"
                );
                Ok(result)
            }
            Err(ToolError::UnknownTool(name)) => {
                tracing::debug!(
                    session_id,
                    request_id = %context.id,
                    tool = %name,
                    elapsed = ?start.elapsed(),
                    "tools/call: tool not found"
                );
                Err(McpError::invalid_params(format!("Tool not found: {name}"), None))
            }
            Err(e) => {
                tracing::warn!(
                    session_id,
                    request_id = %context.id,
                    tool = %tool_name,
                    error = %e,
                    elapsed = ?start.elapsed(),
                    "tools/call failed"
                );
                Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
            }
        }
    }
}

// ============================================================================
// Dispatch helpers
// ============================================================================

fn parse_args<T: DeserializeOwned>(args: JsonObject) -> Result<T, ToolError> {
    serde_json::from_value(Value::Object(args))
        .map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

fn parse_args_validated<T, V>(args: JsonObject, validate: V) -> Result<T, ToolError>
where
    T: DeserializeOwned,
    V: FnOnce(&T) -> Result<(), String>,
{
    let parsed: T = parse_args(args)?;
    validate(&parsed).map_err(ToolError::InvalidArguments)?;
    Ok(parsed)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, ToolError> {
    serde_json::to_value(value).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// Build a success result carrying the payload both as pretty text (every MCP
/// client renders `content`) and as `structured_content` when it is an object.
fn json_result(value: Value) -> CallToolResult {
    let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
    let structured_content = value.is_object().then_some(value);
    CallToolResult {
        content: vec![Content::text(text)],
        structured_content,
        is_error: Some(false),
        meta: None,
    }
}

/// Serialize a job observation with its results normalized and a derived
/// `state` classification alongside the raw upstream status.
fn job_payload(mut job: JobStatus, kind: RecordKind) -> Result<Value, ToolError> {
    let state = jobs::classify(&job);
    job.results = job.results.map(|results| {
        results
            .into_iter()
            .map(|record| match kind {
                RecordKind::Company => normalize::normalize_company_value(record),
                RecordKind::Contact => normalize::normalize_contact_value(record),
            })
            .collect()
    });
    let mut payload = to_json(&job)?;
    if let Some(map) = payload.as_object_mut() {
        map.insert("state".to_string(), json!(state.as_str()));
    }
    Ok(payload)
}

fn outcome_result(outcome: JobOutcome, kind: RecordKind, resume_tool: &str) -> CallToolResult {
    match outcome {
        JobOutcome::Completed(job) => match job_payload(job, kind) {
            Ok(payload) => json_result(payload),
            Err(e) => CallToolResult::error(vec![Content::text(e.to_string())]),
        },
        JobOutcome::Failed(job) => {
            let job_id = job.job_id.as_deref().unwrap_or("<unknown>");
            let status = job.status.as_deref().unwrap_or("<none>");
            CallToolResult::error(vec![Content::text(format!(
                "Job {job_id} ended with status '{status}'"
            ))])
        }
        JobOutcome::TimedOut { job_id } => json_result(json!({
            "timed_out": true,
            "job_id": job_id,
            "message": format!(
                "Job is still in progress; resume polling with the {resume_tool} tool"
            ),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStoreConfig;
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::{Json, Router, http::HeaderMap, http::StatusCode};
    use serde_json::Map;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::net::TcpListener;

    async fn start_server(app: Router) -> (String, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });
        (format!("http://{addr}"), handle)
    }

    fn server_for(base_url: &str, fallback: Option<&str>) -> DatamergeMcpServer {
        let sessions = Arc::new(SessionStore::new(SessionStoreConfig {
            fallback_token: fallback.map(str::to_string),
            base_url: Some(base_url.to_string()),
            http: None,
        }));
        DatamergeMcpServer::new(sessions, PollDefaults::default())
    }

    fn args(value: Value) -> JsonObject {
        value.as_object().cloned().unwrap_or_default()
    }

    fn result_text(result: &CallToolResult) -> String {
        result
            .content
            .iter()
            .filter_map(|c| c.as_text().map(|t| t.text.clone()))
            .collect()
    }

    #[tokio::test]
    async fn not_configured_is_a_tool_level_error_result() {
        let server = server_for("http://127.0.0.1:1", None);
        let err = server
            .dispatch("s1", tools::HEALTH_CHECK, Map::new())
            .await
            .expect_err("must fail");
        assert!(matches!(err, ToolError::NotConfigured(_)));
        assert!(err.to_string().contains("configure-credential"));
    }

    #[tokio::test]
    async fn validation_failure_precedes_any_upstream_call() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_in_handler = calls.clone();
        let app = Router::new().route(
            "/company/enrich",
            post(move || {
                let calls = calls_in_handler.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Json(json!({ "job_id": "job-1", "status": "queued" }))
                }
            }),
        );
        let (base, handle) = start_server(app).await;

        let server = server_for(&base, Some("tok"));
        let err = server
            .dispatch("s1", tools::START_ENRICHMENT, Map::new())
            .await
            .expect_err("must fail validation");
        assert!(matches!(err, ToolError::InvalidArguments(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        handle.abort();
    }

    #[tokio::test]
    async fn get_company_requires_a_selector() {
        let server = server_for("http://127.0.0.1:1", Some("tok"));
        let err = server
            .dispatch("s1", tools::GET_COMPANY, Map::new())
            .await
            .expect_err("must fail validation");
        assert!(matches!(err, ToolError::InvalidArguments(_)));
        assert!(err.to_string().contains("datamerge_id or record_id"));
    }

    #[tokio::test]
    async fn unknown_tool_is_a_protocol_error_not_a_result() {
        let server = server_for("http://127.0.0.1:1", Some("tok"));
        let err = server
            .dispatch("s1", "no-such-tool", Map::new())
            .await
            .expect_err("unknown tool");
        assert!(matches!(err, ToolError::UnknownTool(_)));
    }

    #[tokio::test]
    async fn upstream_error_message_passes_through_to_the_result() {
        let app = Router::new().route(
            "/credits/balance",
            get(|| async {
                (
                    StatusCode::PAYMENT_REQUIRED,
                    Json(json!({ "error": { "message": "credit balance exhausted" } })),
                )
            }),
        );
        let (base, handle) = start_server(app).await;

        let server = server_for(&base, Some("tok"));
        let err = server
            .dispatch("s1", tools::GET_CREDITS_BALANCE, Map::new())
            .await
            .expect_err("must fail");
        assert!(err.to_string().contains("credit balance exhausted"));

        handle.abort();
    }

    #[tokio::test]
    async fn enrich_and_wait_completes_and_normalizes_results() {
        let polls = Arc::new(AtomicU32::new(0));
        let polls_in_handler = polls.clone();
        let app = Router::new()
            .route(
                "/company/enrich",
                post(|| async { Json(json!({ "job_id": "job-1", "status": "queued" })) }),
            )
            .route(
                "/job/{id}/status",
                get(move || {
                    let polls = polls_in_handler.clone();
                    async move {
                        let n = polls.fetch_add(1, Ordering::SeqCst);
                        if n == 0 {
                            Json(json!({ "job_id": "job-1", "status": "processing" }))
                        } else {
                            Json(json!({
                                "job_id": "job-1",
                                "status": "completed",
                                "results": [
                                    { "dm_id": "dm-1", "company_name": "Acme", "status": "not_found" }
                                ]
                            }))
                        }
                    }
                }),
            );
        let (base, handle) = start_server(app).await;

        let server = server_for(&base, Some("tok"));
        let result = server
            .dispatch(
                "s1",
                tools::START_ENRICHMENT_AND_WAIT,
                args(json!({ "domain": "acme.com", "poll_interval_seconds": 1 })),
            )
            .await
            .expect("dispatch");

        assert_eq!(result.is_error, Some(false));
        let payload = result.structured_content.expect("structured content");
        assert_eq!(payload["state"], json!("completed"));
        assert_eq!(payload["results"][0]["datamerge_id"], json!("dm-1"));
        assert_eq!(payload["results"][0]["display_name"], json!("Acme"));
        // The spurious miss marker is corrected, the original field survives.
        assert_eq!(payload["results"][0]["status"], json!("success"));
        assert_eq!(payload["results"][0]["company_name"], json!("Acme"));

        handle.abort();
    }

    #[tokio::test]
    async fn enrich_and_wait_times_out_with_resumable_job_id() {
        let app = Router::new()
            .route(
                "/company/enrich",
                post(|| async { Json(json!({ "job_id": "job-8", "status": "queued" })) }),
            )
            .route(
                "/job/{id}/status",
                get(|| async { Json(json!({ "job_id": "job-8", "status": "processing" })) }),
            );
        let (base, handle) = start_server(app).await;

        let server = server_for(&base, Some("tok"));
        let result = server
            .dispatch(
                "s1",
                tools::START_ENRICHMENT_AND_WAIT,
                args(json!({
                    "domain": "acme.com",
                    "poll_interval_seconds": 1,
                    "timeout_seconds": 1
                })),
            )
            .await
            .expect("dispatch");

        assert_eq!(result.is_error, Some(false));
        let payload = result.structured_content.as_ref().expect("structured content");
        assert_eq!(payload["timed_out"], json!(true));
        assert_eq!(payload["job_id"], json!("job-8"));
        let text = result_text(&result);
        assert!(text.contains(tools::GET_ENRICHMENT_RESULT), "text: {text}");

        handle.abort();
    }

    #[tokio::test]
    async fn failed_job_surfaces_id_and_status_as_error_result() {
        let app = Router::new()
            .route(
                "/contact/search",
                post(|| async { Json(json!({ "job_id": "job-3", "status": "queued" })) }),
            )
            .route(
                "/job/{id}/status",
                get(|| async { Json(json!({ "job_id": "job-3", "status": "cancelled" })) }),
            );
        let (base, handle) = start_server(app).await;

        let server = server_for(&base, Some("tok"));
        let result = server
            .dispatch(
                "s1",
                tools::CONTACT_SEARCH,
                args(json!({ "domain": "acme.com", "poll_interval_seconds": 1 })),
            )
            .await
            .expect("dispatch");

        assert_eq!(result.is_error, Some(true));
        let text = result_text(&result);
        assert!(text.contains("job-3"), "text: {text}");
        assert!(text.contains("cancelled"), "text: {text}");

        handle.abort();
    }

    #[tokio::test]
    async fn configure_credential_rebuilds_the_session_client() {
        let seen: Arc<parking_lot::Mutex<Vec<String>>> =
            Arc::new(parking_lot::Mutex::new(Vec::new()));
        let seen_in_handler = seen.clone();
        let app = Router::new().route(
            "/health",
            get(move |headers: HeaderMap| {
                let seen = seen_in_handler.clone();
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    seen.lock().push(auth);
                    (StatusCode::OK, Json(json!({ "ok": true }))).into_response()
                }
            }),
        );
        let (base, handle) = start_server(app).await;

        let server = server_for(&base, Some("initial"));
        server
            .dispatch("s1", tools::HEALTH_CHECK, Map::new())
            .await
            .expect("health check");

        server
            .dispatch(
                "s1",
                tools::CONFIGURE_CREDENTIAL,
                args(json!({ "token": "rotated", "base_url": base })),
            )
            .await
            .expect("configure");
        server
            .dispatch("s1", tools::HEALTH_CHECK, Map::new())
            .await
            .expect("health check");

        assert_eq!(seen.lock().as_slice(), ["Bearer initial", "Bearer rotated"]);
        handle.abort();
    }

    #[test]
    fn json_result_sets_structured_content_for_objects_only() {
        let result = json_result(json!({ "healthy": true }));
        assert_eq!(result.is_error, Some(false));
        assert!(result.structured_content.is_some());

        let result = json_result(json!([1, 2, 3]));
        assert!(result.structured_content.is_none());
        assert!(result_text(&result).contains('1'));
    }
}
