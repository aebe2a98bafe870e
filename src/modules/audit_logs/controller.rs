use axum::Json;
use axum::extract::{Query, State};
use serde_json::json;

use super::model::AuditLogQuery;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// `GET /api/audit-logs`
///
/// Platform administrators only. Filterable by user, school, method, path
/// prefix, status, and time range; paginated newest-first.
pub async fn list(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Query(query): Query<AuditLogQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !principal.role.is_platform_admin() {
        return Err(AppError::forbidden(
            "Audit logs are restricted to platform administrators",
        ));
    }

    let filter = query.into_filter();
    let page = state.audit_store.query(&filter).await?;

    Ok(Json(json!({
        "success": true,
        "data": page.entries,
        "meta": {
            "total": page.total,
            "page": filter.page,
            "limit": filter.limit,
        }
    })))
}
