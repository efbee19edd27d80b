//! Datamerge REST client.
//!
//! One [`DatamergeClient`] wraps one (credential, base URL) pair and is
//! immutable after construction. The credential is sent as a bearer token on
//! every call; it never appears in logs, errors, or `Debug` output.

use crate::error::{ApiError, Result};
use crate::jobs::{JobHandle, JobStatus};
use crate::normalize::{self, CompanyRecord, ContactRecord, Hierarchy};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Production API base.
pub const DEFAULT_BASE_URL: &str = "https://api.datamerge.io/v1";

/// Job-status path template; `{id}` is replaced by the job id. The path is
/// deployment configuration, not part of the client contract: later API
/// revisions moved status under per-capability prefixes, and the template
/// absorbs that without touching callers.
pub const DEFAULT_JOB_STATUS_PATH: &str = "/job/{id}/status";

// ============================================================================
// Construction
// ============================================================================

/// Optional construction parameters for [`DatamergeClient`].
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Base URL override (defaults to [`DEFAULT_BASE_URL`]).
    pub base_url: Option<String>,
    /// Job-status path template override (defaults to
    /// [`DEFAULT_JOB_STATUS_PATH`]).
    pub job_status_path: Option<String>,
    /// Shared HTTP client, so many per-session clients reuse one connection
    /// pool.
    pub http: Option<reqwest::Client>,
}

pub struct DatamergeClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
    job_status_path: String,
}

impl std::fmt::Debug for DatamergeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatamergeClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

// Equality is over the client's logical identity (credential + endpoint). The
// `http` field is a shared, fungible connection pool and is not part of
// identity, so it cannot be compared via `derive(PartialEq)`.
impl PartialEq for DatamergeClient {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
            && self.base_url == other.base_url
            && self.job_status_path == other.job_status_path
    }
}

impl Eq for DatamergeClient {}

impl DatamergeClient {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_options(token, ClientOptions::default())
    }

    #[must_use]
    pub fn with_options(token: impl Into<String>, options: ClientOptions) -> Self {
        let base_url = options
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Self {
            http: options.http.unwrap_or_default(),
            token: token.into(),
            base_url,
            job_status_path: options
                .job_status_path
                .unwrap_or_else(|| DEFAULT_JOB_STATUS_PATH.to_string()),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ========================================================================
    // Enrichment / lookalike / contact jobs
    // ========================================================================

    /// Kick off a company enrichment job for a domain, a company name, or a
    /// batch of domains.
    pub async fn start_enrichment(&self, query: &EnrichmentQuery) -> Result<JobHandle> {
        self.post_json("/company/enrich", query).await
    }

    pub async fn enrichment_status(&self, job_id: &str) -> Result<JobStatus> {
        self.job_status(job_id).await
    }

    pub async fn start_lookalike(&self, query: &LookalikeQuery) -> Result<JobHandle> {
        self.post_json("/company/lookalike", query).await
    }

    pub async fn lookalike_status(&self, job_id: &str) -> Result<JobStatus> {
        self.job_status(job_id).await
    }

    pub async fn start_contact_search(&self, query: &ContactSearchQuery) -> Result<JobHandle> {
        self.post_json("/contact/search", query).await
    }

    pub async fn contact_search_status(&self, job_id: &str) -> Result<JobStatus> {
        self.job_status(job_id).await
    }

    pub async fn start_contact_enrichment(
        &self,
        query: &ContactEnrichmentQuery,
    ) -> Result<JobHandle> {
        self.post_json("/contact/enrich", query).await
    }

    pub async fn contact_enrichment_status(&self, job_id: &str) -> Result<JobStatus> {
        self.job_status(job_id).await
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatus> {
        let path = self.job_status_path.replace("{id}", job_id);
        self.get_json(&path).await
    }

    // ========================================================================
    // Direct lookups
    // ========================================================================

    /// Fetch one company record by Datamerge id or record id. The record is
    /// returned normalized (canonical fields filled, originals preserved).
    pub async fn get_company(&self, company: &CompanyRef) -> Result<CompanyRecord> {
        let record = self
            .get_json_query("/company", &[company.query_pair()])
            .await?;
        Ok(normalize::normalize_company(record))
    }

    /// Fetch the corporate hierarchy around a company.
    pub async fn get_hierarchy(&self, datamerge_id: &str, depth: Option<u32>) -> Result<Hierarchy> {
        let path = format!("/company/{datamerge_id}/hierarchy");
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(depth) = depth {
            query.push(("depth", depth.to_string()));
        }
        let hierarchy = self.get_json_query(&path, &query).await?;
        Ok(normalize::normalize_hierarchy(hierarchy))
    }

    /// Fetch one contact record by record id, normalized.
    pub async fn get_contact(&self, record_id: &str) -> Result<ContactRecord> {
        let record = self.get_json(&format!("/contact/{record_id}")).await?;
        Ok(normalize::normalize_contact(record))
    }

    // ========================================================================
    // Lists and account
    // ========================================================================

    pub async fn list_lists(&self) -> Result<Vec<ListSummary>> {
        let envelope: ListsEnvelope = self.get_json("/lists").await?;
        Ok(envelope.lists)
    }

    pub async fn create_list(&self, name: &str) -> Result<ListSummary> {
        self.post_json("/lists", &serde_json::json!({ "name": name }))
            .await
    }

    pub async fn get_list_items(&self, list_id: &str) -> Result<Vec<Value>> {
        let envelope: ListItemsEnvelope = self.get_json(&format!("/lists/{list_id}/items")).await?;
        Ok(envelope.items)
    }

    pub async fn remove_list_item(&self, list_id: &str, item_id: &str) -> Result<()> {
        self.delete(&format!("/lists/{list_id}/items/{item_id}")).await
    }

    pub async fn delete_list(&self, list_id: &str) -> Result<()> {
        self.delete(&format!("/lists/{list_id}")).await
    }

    pub async fn credits_balance(&self) -> Result<CreditsBalance> {
        self.get_json("/credits/balance").await
    }

    /// Lightweight authenticated probe. Transport failures and non-2xx
    /// responses are swallowed and reported as `false`, never as an error.
    pub async fn health_check(&self) -> bool {
        match self
            .http
            .get(self.url("/health"))
            .bearer_auth(&self.token)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "health probe failed");
                false
            }
        }
    }

    // ========================================================================
    // Transport helpers
    // ========================================================================

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await?;
        read_json(resp).await
    }

    async fn get_json_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let resp = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;
        read_json(resp).await
    }

    async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let resp = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        read_json(resp).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let resp = self
            .http
            .delete(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(upstream_error(status, &body))
    }
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(upstream_error(status, &body));
    }
    Ok(resp.json::<T>().await?)
}

fn upstream_error(status: reqwest::StatusCode, body: &str) -> ApiError {
    ApiError::Upstream {
        status: status.as_u16(),
        message: extract_error_message(status, body),
    }
}

/// Pull a human-readable message out of whatever error shape upstream sent.
/// Checked in order: `error.message`, `error`, `message`, `detail`; falls back
/// to the raw status + body text when nothing parses.
fn extract_error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let candidates = [
            value.pointer("/error/message"),
            value.get("error"),
            value.get("message"),
            value.get("detail"),
        ];
        for candidate in candidates.into_iter().flatten() {
            if let Some(s) = candidate.as_str()
                && !s.trim().is_empty()
            {
                return s.to_string();
            }
        }
    }
    let body = body.trim();
    if body.is_empty() {
        format!("upstream returned {status}")
    } else {
        format!("upstream returned {status}: {body}")
    }
}

// ============================================================================
// Request and response shapes
// ============================================================================

/// Company selector for direct lookups.
#[derive(Debug, Clone)]
pub enum CompanyRef {
    DatamergeId(String),
    RecordId(String),
}

impl CompanyRef {
    fn query_pair(&self) -> (&'static str, &str) {
        match self {
            CompanyRef::DatamergeId(id) => ("datamerge_id", id),
            CompanyRef::RecordId(id) => ("record_id", id),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrichmentQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domains: Option<Vec<String>>,
}

impl EnrichmentQuery {
    /// True when no selector is present; such a query would enrich nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domain.is_none()
            && self.company_name.is_none()
            && self.domains.as_ref().is_none_or(Vec::is_empty)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LookalikeQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datamerge_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl LookalikeQuery {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.datamerge_id.is_none() && self.domain.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactSearchQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datamerge_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_titles: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seniority: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl ContactSearchQuery {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.datamerge_id.is_none() && self.domain.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactEnrichmentQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_domain: Option<String>,
}

impl ContactEnrichmentQuery {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.linkedin_url.is_none() && self.full_name.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ListsEnvelope {
    #[serde(default)]
    lists: Vec<ListSummary>,
}

#[derive(Debug, Deserialize)]
struct ListItemsEnvelope {
    #[serde(default)]
    items: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditsBalance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}
