//! Record normalization for loosely-typed upstream payloads.
//!
//! Datamerge company and contact records are heterogeneous: the same logical
//! attribute arrives under different field names across API revisions.
//! Normalization picks the first present of an ordered candidate list per
//! attribute and fills the canonical field; every original field is preserved
//! via the flattened `extra` map (normalization adds, never removes).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const STATUS_SUCCESS: &str = "success";

/// Upstream "miss" markers that are sometimes spurious: when a record carries
/// substantial identifying data the lookup clearly matched, and the status is
/// corrected to `success` so callers do not discard real data.
const SPURIOUS_MISS_STATUSES: &[&str] = &["not_found", "no_query_match"];

/// One company record. Canonical fields capture their exact upstream names at
/// deserialization; alternate names stay in `extra` and are promoted by
/// [`normalize_company`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datamerge_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CompanyRecord {
    fn has_identifying_data(&self) -> bool {
        non_empty(&self.legal_name)
            || non_empty(&self.display_name)
            || non_empty(&self.domain)
            || non_empty(&self.national_id)
            || self.address.as_ref().is_some_and(is_substantial)
    }
}

/// One contact record, normalized the same way with contact-specific
/// candidates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContactRecord {
    fn has_identifying_data(&self) -> bool {
        non_empty(&self.full_name) || non_empty(&self.email) || non_empty(&self.linkedin_url)
    }
}

/// Corporate hierarchy around one company.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hierarchy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<CompanyRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CompanyRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fill canonical company fields from alternate names and apply the status
/// correction. Original fields are untouched.
#[must_use]
pub fn normalize_company(mut record: CompanyRecord) -> CompanyRecord {
    if record.datamerge_id.is_none() {
        record.datamerge_id = first_id(&record.extra, &["dm_id", "record_id", "id"]);
    }
    if record.legal_name.is_none() {
        record.legal_name = first_string(&record.extra, &["registered_name", "company_legal_name"]);
    }
    if record.display_name.is_none() {
        record.display_name = first_string(&record.extra, &["company_name", "name"]);
    }
    if record.domain.is_none() {
        record.domain = first_string(&record.extra, &["website_domain", "primary_domain", "website"]);
    }
    if record.national_id.is_none() {
        record.national_id = first_id(&record.extra, &["registration_number", "company_number"]);
    }

    if is_spurious_miss(record.status.as_deref()) && record.has_identifying_data() {
        record.status = Some(STATUS_SUCCESS.to_string());
    }
    record
}

/// Fill canonical contact fields from alternate names and apply the status
/// correction.
#[must_use]
pub fn normalize_contact(mut record: ContactRecord) -> ContactRecord {
    if record.record_id.is_none() {
        record.record_id = first_id(&record.extra, &["contact_id", "id"]);
    }
    if record.full_name.is_none() {
        record.full_name = first_string(&record.extra, &["name", "contact_name"]);
    }
    if record.email.is_none() {
        record.email = first_string(&record.extra, &["work_email", "primary_email"]);
    }
    if record.linkedin_url.is_none() {
        record.linkedin_url = first_string(&record.extra, &["linkedin", "linkedin_profile"]);
    }

    if is_spurious_miss(record.status.as_deref()) && record.has_identifying_data() {
        record.status = Some(STATUS_SUCCESS.to_string());
    }
    record
}

/// Normalize every record in a hierarchy response.
#[must_use]
pub fn normalize_hierarchy(mut hierarchy: Hierarchy) -> Hierarchy {
    hierarchy.company = hierarchy.company.map(normalize_company);
    hierarchy.parents = hierarchy.parents.into_iter().map(normalize_company).collect();
    hierarchy.children = hierarchy.children.into_iter().map(normalize_company).collect();
    hierarchy
}

/// Normalize a loose JSON value as a company record. Values that do not parse
/// as a record object are returned unchanged.
#[must_use]
pub fn normalize_company_value(value: Value) -> Value {
    if !value.is_object() {
        return value;
    }
    match serde_json::from_value::<CompanyRecord>(value.clone()) {
        Ok(record) => serde_json::to_value(normalize_company(record)).unwrap_or(value),
        Err(_) => value,
    }
}

/// Normalize a loose JSON value as a contact record.
#[must_use]
pub fn normalize_contact_value(value: Value) -> Value {
    if !value.is_object() {
        return value;
    }
    match serde_json::from_value::<ContactRecord>(value.clone()) {
        Ok(record) => serde_json::to_value(normalize_contact(record)).unwrap_or(value),
        Err(_) => value,
    }
}

fn is_spurious_miss(status: Option<&str>) -> bool {
    status.is_some_and(|s| SPURIOUS_MISS_STATUSES.contains(&s.trim().to_ascii_lowercase().as_str()))
}

fn non_empty(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

fn is_substantial(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

fn first_string(extra: &Map<String, Value>, candidates: &[&str]) -> Option<String> {
    candidates.iter().find_map(|key| {
        extra
            .get(*key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// Like [`first_string`], but tolerates numeric identifiers.
fn first_id(extra: &Map<String, Value>, candidates: &[&str]) -> Option<String> {
    candidates.iter().find_map(|key| match extra.get(*key) {
        Some(Value::String(s)) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
