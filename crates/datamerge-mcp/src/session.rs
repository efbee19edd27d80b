//! Per-session upstream client store.
//!
//! Each MCP session owns at most one [`DatamergeClient`], built lazily from
//! whichever credential resolves first: one supplied with the call, one
//! remembered for the session, or the process-wide fallback. A built client is
//! immutable; only [`SessionStore::configure`] replaces it, by discarding and
//! rebuilding. The connection-close handler is the single caller of
//! [`SessionStore::forget`], so no per-session state outlives its connection.

use datamerge_api::{ClientOptions, DatamergeClient};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// No credential resolvable for the session. Surfaced as a tool-level error
/// result, never a protocol failure, so the calling agent can react.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error(
    "No Datamerge API token is configured for this session. \
     Call the configure-credential tool or send an Authorization header."
)]
pub struct NotConfigured;

#[derive(Default)]
struct SessionEntry {
    credential: Option<String>,
    client: Option<Arc<DatamergeClient>>,
}

/// Construction parameters for [`SessionStore`].
#[derive(Debug, Clone, Default)]
pub struct SessionStoreConfig {
    /// Process-wide fallback credential (lowest precedence).
    pub fallback_token: Option<String>,
    /// Base URL applied to every constructed client.
    pub base_url: Option<String>,
    /// Shared HTTP connection pool, cloned into each per-session client.
    pub http: Option<reqwest::Client>,
}

pub struct SessionStore {
    fallback_token: Option<String>,
    base_url: Option<String>,
    http: reqwest::Client,
    entries: RwLock<HashMap<String, SessionEntry>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(config: SessionStoreConfig) -> Self {
        Self {
            fallback_token: config.fallback_token.filter(|t| !t.trim().is_empty()),
            base_url: config.base_url,
            http: config.http.unwrap_or_default(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Return the session's client, constructing and caching it on first use.
    ///
    /// Credential precedence: explicit with this call, then remembered for the
    /// session, then the process fallback. An explicit credential is always
    /// re-remembered, but an already-built client is returned unchanged: the
    /// passive path never swaps a session's identity mid-flight (only
    /// [`configure`](Self::configure) does).
    ///
    /// Construction happens under the write lock and performs no I/O, so
    /// concurrent calls for the same session settle on one client.
    pub fn get_or_create_client(
        &self,
        session_id: &str,
        explicit_credential: Option<&str>,
    ) -> Result<Arc<DatamergeClient>, NotConfigured> {
        let mut entries = self.entries.write();
        let entry = entries.entry(session_id.to_string()).or_default();

        if let Some(token) = explicit_credential {
            entry.credential = Some(token.to_string());
        }
        if let Some(client) = &entry.client {
            return Ok(client.clone());
        }

        let token = entry
            .credential
            .as_deref()
            .or(self.fallback_token.as_deref())
            .ok_or(NotConfigured)?;
        let client = Arc::new(self.build_client(token, None));
        entry.client = Some(client.clone());
        tracing::debug!(session_id, "upstream client created");
        Ok(client)
    }

    /// Idempotently associate a credential with a session without building a
    /// client. Supports credentials arriving (or rotating) before any tool
    /// call; an existing client is deliberately left in place.
    pub fn remember_credential(&self, session_id: &str, credential: &str) {
        let mut entries = self.entries.write();
        let entry = entries.entry(session_id.to_string()).or_default();
        entry.credential = Some(credential.to_string());
    }

    /// Remember a credential and replace any existing client for the session.
    /// This is the only path that swaps an already-built client.
    pub fn configure(&self, session_id: &str, credential: &str, base_url: Option<&str>) {
        let client = Arc::new(self.build_client(credential, base_url));
        let mut entries = self.entries.write();
        let entry = entries.entry(session_id.to_string()).or_default();
        entry.credential = Some(credential.to_string());
        entry.client = Some(client);
        tracing::debug!(session_id, "upstream client configured");
    }

    /// Drop all state for a session. Safe to call for unknown sessions.
    /// In-flight calls holding the old client complete against it; later
    /// lookups start from nothing.
    pub fn forget(&self, session_id: &str) {
        let removed = self.entries.write().remove(session_id);
        if removed.is_some() {
            tracing::debug!(session_id, "session state dropped");
        }
    }

    /// Number of sessions with any state (credential or client).
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.entries.read().len()
    }

    fn build_client(&self, token: &str, base_url: Option<&str>) -> DatamergeClient {
        DatamergeClient::with_options(
            token,
            ClientOptions {
                base_url: base_url.map(str::to_string).or_else(|| self.base_url.clone()),
                http: Some(self.http.clone()),
                ..ClientOptions::default()
            },
        )
    }
}
