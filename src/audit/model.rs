use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::EntityId;

/// One audited request, as written to the audit store.
///
/// Identifier fields serialize as JSON strings so values near `i64::MAX`
/// survive clients that parse numbers as doubles.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub user_id: Option<EntityId>,
    pub user_role: Option<String>,
    pub school_id: Option<EntityId>,
    pub branch_id: Option<EntityId>,
    pub course_id: Option<EntityId>,
    pub method: String,
    pub path: String,
    /// Query parameters after redaction, as a key/value object.
    pub query: Option<Value>,
    pub status_code: u16,
    /// `status_code < 400`.
    pub success: bool,
    pub duration_ms: i64,
    /// Request headers after redaction (authorization, cookie).
    pub request_headers: Option<Value>,
    /// Request body after PII redaction, when one was captured.
    pub request_body: Option<Value>,
    /// Truncated error message for non-2xx outcomes.
    pub error_message: Option<String>,
    pub correlation_id: String,
    pub trace_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}
