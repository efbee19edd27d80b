//! Tool catalog: names, input contracts, and typed argument shapes.
//!
//! The catalog is defined once and served identically over both transports.
//! Argument bags are validated by deserializing into the typed structs below
//! before any upstream call; cross-field requirements (e.g. "at least one
//! selector") live in the structs' `validate` methods.

use datamerge_api::{
    ContactEnrichmentQuery, ContactSearchQuery, EnrichmentQuery, LookalikeQuery,
};
use rmcp::model::Tool;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

pub const CONFIGURE_CREDENTIAL: &str = "configure-credential";
pub const START_ENRICHMENT: &str = "start-enrichment";
pub const START_ENRICHMENT_AND_WAIT: &str = "start-enrichment-and-wait";
pub const GET_ENRICHMENT_RESULT: &str = "get-enrichment-result";
pub const GET_COMPANY: &str = "get-company";
pub const GET_COMPANY_HIERARCHY: &str = "get-company-hierarchy";
pub const START_LOOKALIKE: &str = "start-lookalike";
pub const GET_LOOKALIKE_STATUS: &str = "get-lookalike-status";
pub const CONTACT_SEARCH: &str = "contact-search";
pub const GET_CONTACT_SEARCH_STATUS: &str = "get-contact-search-status";
pub const CONTACT_ENRICH: &str = "contact-enrich";
pub const GET_CONTACT_ENRICH_STATUS: &str = "get-contact-enrich-status";
pub const GET_CONTACT: &str = "get-contact";
pub const LIST_LISTS: &str = "list-lists";
pub const CREATE_LIST: &str = "create-list";
pub const GET_LIST_ITEMS: &str = "get-list-items";
pub const REMOVE_LIST_ITEM: &str = "remove-list-item";
pub const DELETE_LIST: &str = "delete-list";
pub const GET_CREDITS_BALANCE: &str = "get-credits-balance";
pub const HEALTH_CHECK: &str = "health-check";

/// The full tool surface, in stable order.
#[must_use]
pub fn catalog() -> Vec<Tool> {
    vec![
        tool(
            CONFIGURE_CREDENTIAL,
            "Store a Datamerge API token for this session and build the upstream client. \
             Replaces any previously configured client.",
            json!({
                "type": "object",
                "properties": {
                    "token": { "type": "string", "description": "Datamerge API token" },
                    "base_url": { "type": "string", "description": "API base URL override" }
                },
                "required": ["token"]
            }),
        ),
        tool(
            START_ENRICHMENT,
            "Start a company enrichment job for a domain, a company name, or a batch of \
             domains. Returns the job id to poll with get-enrichment-result.",
            json!({
                "type": "object",
                "properties": {
                    "domain": { "type": "string", "description": "Company website domain" },
                    "company_name": { "type": "string", "description": "Company name" },
                    "domains": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Batch of domains to enrich"
                    }
                }
            }),
        ),
        tool(
            START_ENRICHMENT_AND_WAIT,
            "Start a company enrichment job and poll until it completes, fails, or the \
             timeout elapses. On timeout the job id is returned so polling can resume \
             with get-enrichment-result.",
            json!({
                "type": "object",
                "properties": {
                    "domain": { "type": "string", "description": "Company website domain" },
                    "company_name": { "type": "string", "description": "Company name" },
                    "domains": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Batch of domains to enrich"
                    },
                    "poll_interval_seconds": {
                        "type": "integer",
                        "description": "Seconds between status checks (default 5)"
                    },
                    "timeout_seconds": {
                        "type": "integer",
                        "description": "Overall deadline in seconds (default 60)"
                    }
                }
            }),
        ),
        tool(
            GET_ENRICHMENT_RESULT,
            "Fetch the current status and any results of an enrichment job.",
            job_id_schema(),
        ),
        tool(
            GET_COMPANY,
            "Fetch one company record by datamerge_id or record_id.",
            json!({
                "type": "object",
                "properties": {
                    "datamerge_id": { "type": "string", "description": "Datamerge company id" },
                    "record_id": { "type": "string", "description": "Upstream record id" }
                }
            }),
        ),
        tool(
            GET_COMPANY_HIERARCHY,
            "Fetch the corporate hierarchy (parents and children) around a company.",
            json!({
                "type": "object",
                "properties": {
                    "datamerge_id": { "type": "string", "description": "Datamerge company id" },
                    "depth": { "type": "integer", "description": "Hierarchy depth to traverse" }
                },
                "required": ["datamerge_id"]
            }),
        ),
        tool(
            START_LOOKALIKE,
            "Start a lookalike search for companies similar to a seed company. Returns \
             the job id to poll with get-lookalike-status.",
            json!({
                "type": "object",
                "properties": {
                    "datamerge_id": { "type": "string", "description": "Seed company id" },
                    "domain": { "type": "string", "description": "Seed company domain" },
                    "limit": { "type": "integer", "description": "Maximum matches to return" }
                }
            }),
        ),
        tool(
            GET_LOOKALIKE_STATUS,
            "Fetch the current status and any results of a lookalike job.",
            job_id_schema(),
        ),
        tool(
            CONTACT_SEARCH,
            "Search for contacts at a company and wait for the results. On timeout the \
             job id is returned so polling can resume with get-contact-search-status.",
            json!({
                "type": "object",
                "properties": {
                    "datamerge_id": { "type": "string", "description": "Company id to search in" },
                    "domain": { "type": "string", "description": "Company domain to search in" },
                    "job_titles": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Job titles to match"
                    },
                    "seniority": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Seniority levels to match"
                    },
                    "limit": { "type": "integer", "description": "Maximum contacts to return" },
                    "poll_interval_seconds": {
                        "type": "integer",
                        "description": "Seconds between status checks (default 5)"
                    },
                    "timeout_seconds": {
                        "type": "integer",
                        "description": "Overall deadline in seconds (default 60)"
                    }
                }
            }),
        ),
        tool(
            GET_CONTACT_SEARCH_STATUS,
            "Fetch the current status and any results of a contact search job.",
            job_id_schema(),
        ),
        tool(
            CONTACT_ENRICH,
            "Enrich a contact from an email address, LinkedIn URL, or name, and wait for \
             the result. On timeout the job id is returned so polling can resume with \
             get-contact-enrich-status.",
            json!({
                "type": "object",
                "properties": {
                    "email": { "type": "string", "description": "Contact email address" },
                    "linkedin_url": { "type": "string", "description": "Contact LinkedIn URL" },
                    "full_name": { "type": "string", "description": "Contact full name" },
                    "company_domain": {
                        "type": "string",
                        "description": "Company domain, to disambiguate a name"
                    },
                    "poll_interval_seconds": {
                        "type": "integer",
                        "description": "Seconds between status checks (default 5)"
                    },
                    "timeout_seconds": {
                        "type": "integer",
                        "description": "Overall deadline in seconds (default 60)"
                    }
                }
            }),
        ),
        tool(
            GET_CONTACT_ENRICH_STATUS,
            "Fetch the current status and any results of a contact enrichment job.",
            job_id_schema(),
        ),
        tool(
            GET_CONTACT,
            "Fetch one contact record by record id.",
            json!({
                "type": "object",
                "properties": {
                    "record_id": { "type": "string", "description": "Contact record id" }
                },
                "required": ["record_id"]
            }),
        ),
        tool(
            LIST_LISTS,
            "List the account's saved lists.",
            json!({ "type": "object", "properties": {} }),
        ),
        tool(
            CREATE_LIST,
            "Create a new saved list.",
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "List name" }
                },
                "required": ["name"]
            }),
        ),
        tool(
            GET_LIST_ITEMS,
            "Fetch the items of a saved list.",
            json!({
                "type": "object",
                "properties": {
                    "list_id": { "type": "string", "description": "List id" }
                },
                "required": ["list_id"]
            }),
        ),
        tool(
            REMOVE_LIST_ITEM,
            "Remove one item from a saved list.",
            json!({
                "type": "object",
                "properties": {
                    "list_id": { "type": "string", "description": "List id" },
                    "item_id": { "type": "string", "description": "Item id to remove" }
                },
                "required": ["list_id", "item_id"]
            }),
        ),
        tool(
            DELETE_LIST,
            "Delete a saved list.",
            json!({
                "type": "object",
                "properties": {
                    "list_id": { "type": "string", "description": "List id" }
                },
                "required": ["list_id"]
            }),
        ),
        tool(
            GET_CREDITS_BALANCE,
            "Fetch the account's remaining credit balance.",
            json!({ "type": "object", "properties": {} }),
        ),
        tool(
            HEALTH_CHECK,
            "Check that the Datamerge API is reachable with this session's credential.",
            json!({ "type": "object", "properties": {} }),
        ),
    ]
}

fn job_id_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "job_id": { "type": "string", "description": "Job id returned by the start call" }
        },
        "required": ["job_id"]
    })
}

fn tool(name: &'static str, description: &'static str, schema: Value) -> Tool {
    let input_schema = schema
        .as_object()
        .cloned()
        .map_or_else(|| Arc::new(serde_json::Map::new()), Arc::new);
    Tool::new(name, description, input_schema)
}

// ============================================================================
// Typed argument bags
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ConfigureCredentialArgs {
    pub token: String,
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EnrichmentArgs {
    #[serde(flatten)]
    pub query: EnrichmentQuery,
}

impl EnrichmentArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.query.is_empty() {
            return Err("provide at least one of domain, company_name, or domains".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EnrichAndWaitArgs {
    #[serde(flatten)]
    pub query: EnrichmentQuery,
    #[serde(default)]
    pub poll_interval_seconds: Option<u64>,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl EnrichAndWaitArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.query.is_empty() {
            return Err("provide at least one of domain, company_name, or domains".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct JobArgs {
    pub job_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompanyArgs {
    #[serde(default)]
    pub datamerge_id: Option<String>,
    #[serde(default)]
    pub record_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HierarchyArgs {
    pub datamerge_id: String,
    #[serde(default)]
    pub depth: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LookalikeArgs {
    #[serde(flatten)]
    pub query: LookalikeQuery,
}

impl LookalikeArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.query.is_empty() {
            return Err("provide datamerge_id or domain for the seed company".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactSearchArgs {
    #[serde(flatten)]
    pub query: ContactSearchQuery,
    #[serde(default)]
    pub poll_interval_seconds: Option<u64>,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl ContactSearchArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.query.is_empty() {
            return Err("provide datamerge_id or domain for the company to search".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactEnrichArgs {
    #[serde(flatten)]
    pub query: ContactEnrichmentQuery,
    #[serde(default)]
    pub poll_interval_seconds: Option<u64>,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl ContactEnrichArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.query.is_empty() {
            return Err("provide at least one of email, linkedin_url, or full_name".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ContactArgs {
    pub record_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateListArgs {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ListArgs {
    pub list_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveListItemArgs {
    pub list_id: String,
    pub item_id: String,
}
