use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::audit::store::AuditLogFilter;
use crate::ids::EntityId;

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 200;

/// Query string for `GET /api/audit-logs`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogQuery {
    pub user_id: Option<EntityId>,
    pub school_id: Option<EntityId>,
    pub method: Option<String>,
    /// Matches entries whose path starts with this value.
    pub path: Option<String>,
    pub status: Option<u16>,
    pub success: Option<bool>,
    pub correlation_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl AuditLogQuery {
    pub fn into_filter(self) -> AuditLogFilter {
        AuditLogFilter {
            user_id: self.user_id,
            school_id: self.school_id,
            method: self.method,
            path_prefix: self.path,
            status_code: self.status,
            success: self.success,
            correlation_id: self.correlation_id,
            from: self.from,
            to: self.to,
            page: self.page.unwrap_or(1).max(1),
            limit: self
                .limit
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }
}
