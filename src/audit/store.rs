use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use super::model::AuditLogEntry;
use crate::ids::EntityId;
use crate::utils::errors::AppError;

/// Filter for reading the audit log back out.
#[derive(Clone, Debug, Default)]
pub struct AuditLogFilter {
    pub user_id: Option<EntityId>,
    pub school_id: Option<EntityId>,
    pub method: Option<String>,
    pub path_prefix: Option<String>,
    pub status_code: Option<u16>,
    pub success: Option<bool>,
    pub correlation_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
}

impl AuditLogFilter {
    pub fn offset(&self) -> i64 {
        (self.page.max(1) as i64 - 1) * self.limit as i64
    }

    /// True when `entry` satisfies every set field.
    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        self.user_id.is_none_or(|id| entry.user_id == Some(id))
            && self.school_id.is_none_or(|id| entry.school_id == Some(id))
            && self
                .method
                .as_ref()
                .is_none_or(|m| entry.method.eq_ignore_ascii_case(m))
            && self
                .path_prefix
                .as_ref()
                .is_none_or(|p| entry.path.starts_with(p.as_str()))
            && self.status_code.is_none_or(|s| entry.status_code == s)
            && self.success.is_none_or(|s| entry.success == s)
            && self
                .correlation_id
                .as_ref()
                .is_none_or(|c| entry.correlation_id == *c)
            && self.from.is_none_or(|t| entry.created_at >= t)
            && self.to.is_none_or(|t| entry.created_at <= t)
    }
}

/// One page of audit log entries, newest first.
#[derive(Clone, Debug)]
pub struct AuditLogPage {
    pub entries: Vec<AuditLogEntry>,
    pub total: i64,
}

#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn record(&self, entry: AuditLogEntry) -> Result<(), AppError>;

    async fn query(&self, filter: &AuditLogFilter) -> Result<AuditLogPage, AppError>;
}

/// Audit store backed by the `audit_logs` table.
#[derive(Clone)]
pub struct PgAuditStore {
    pool: PgPool,
}

impl PgAuditStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditStore for PgAuditStore {
    async fn record(&self, entry: AuditLogEntry) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (
                user_id, user_role, school_id, branch_id, course_id,
                method, path, query, status_code, success, duration_ms,
                request_headers, request_body, error_message, correlation_id,
                trace_id, ip_address, user_agent, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(entry.user_id)
        .bind(&entry.user_role)
        .bind(entry.school_id)
        .bind(entry.branch_id)
        .bind(entry.course_id)
        .bind(&entry.method)
        .bind(&entry.path)
        .bind(&entry.query)
        .bind(entry.status_code as i32)
        .bind(entry.success)
        .bind(entry.duration_ms)
        .bind(&entry.request_headers)
        .bind(&entry.request_body)
        .bind(&entry.error_message)
        .bind(&entry.correlation_id)
        .bind(&entry.trace_id)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn query(&self, filter: &AuditLogFilter) -> Result<AuditLogPage, AppError> {
        let mut count_builder = sqlx::QueryBuilder::new("SELECT COUNT(*) AS total FROM audit_logs");
        push_filter(&mut count_builder, filter);
        let total: i64 = count_builder
            .build()
            .fetch_one(&self.pool)
            .await?
            .try_get("total")
            .map_err(AppError::internal)?;

        let mut builder = sqlx::QueryBuilder::new(
            "SELECT user_id, user_role, school_id, branch_id, course_id, method, path, query, \
             status_code, success, duration_ms, request_headers, request_body, error_message, \
             correlation_id, trace_id, ip_address, user_agent, created_at FROM audit_logs",
        );
        push_filter(&mut builder, filter);
        builder.push(" ORDER BY created_at DESC");
        builder.push(" LIMIT ").push_bind(filter.limit as i64);
        builder.push(" OFFSET ").push_bind(filter.offset());

        let rows = builder.build().fetch_all(&self.pool).await?;
        let entries = rows
            .into_iter()
            .map(row_to_entry)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AuditLogPage { entries, total })
    }
}

fn push_filter(builder: &mut sqlx::QueryBuilder<'_, sqlx::Postgres>, filter: &AuditLogFilter) {
    let mut first = true;
    let mut clause = |builder: &mut sqlx::QueryBuilder<'_, sqlx::Postgres>| {
        if first {
            builder.push(" WHERE ");
            first = false;
        } else {
            builder.push(" AND ");
        }
    };

    if let Some(user_id) = filter.user_id {
        clause(builder);
        builder.push("user_id = ").push_bind(user_id);
    }
    if let Some(school_id) = filter.school_id {
        clause(builder);
        builder.push("school_id = ").push_bind(school_id);
    }
    if let Some(method) = &filter.method {
        clause(builder);
        builder.push("method = ").push_bind(method.to_uppercase());
    }
    if let Some(prefix) = &filter.path_prefix {
        clause(builder);
        builder
            .push("path LIKE ")
            .push_bind(format!("{}%", prefix.replace('%', "\\%")));
    }
    if let Some(status) = filter.status_code {
        clause(builder);
        builder.push("status_code = ").push_bind(status as i32);
    }
    if let Some(success) = filter.success {
        clause(builder);
        builder.push("success = ").push_bind(success);
    }
    if let Some(correlation_id) = &filter.correlation_id {
        clause(builder);
        builder
            .push("correlation_id = ")
            .push_bind(correlation_id.clone());
    }
    if let Some(from) = filter.from {
        clause(builder);
        builder.push("created_at >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        clause(builder);
        builder.push("created_at <= ").push_bind(to);
    }
}

fn row_to_entry(row: sqlx::postgres::PgRow) -> Result<AuditLogEntry, AppError> {
    let status_code: i32 = row.try_get("status_code").map_err(AppError::internal)?;
    Ok(AuditLogEntry {
        user_id: row.try_get("user_id").map_err(AppError::internal)?,
        user_role: row.try_get("user_role").map_err(AppError::internal)?,
        school_id: row.try_get("school_id").map_err(AppError::internal)?,
        branch_id: row.try_get("branch_id").map_err(AppError::internal)?,
        course_id: row.try_get("course_id").map_err(AppError::internal)?,
        method: row.try_get("method").map_err(AppError::internal)?,
        path: row.try_get("path").map_err(AppError::internal)?,
        query: row.try_get("query").map_err(AppError::internal)?,
        status_code: status_code as u16,
        success: row.try_get("success").map_err(AppError::internal)?,
        duration_ms: row.try_get("duration_ms").map_err(AppError::internal)?,
        request_headers: row.try_get("request_headers").map_err(AppError::internal)?,
        request_body: row.try_get("request_body").map_err(AppError::internal)?,
        error_message: row.try_get("error_message").map_err(AppError::internal)?,
        correlation_id: row.try_get("correlation_id").map_err(AppError::internal)?,
        trace_id: row.try_get("trace_id").map_err(AppError::internal)?,
        ip_address: row.try_get("ip_address").map_err(AppError::internal)?,
        user_agent: row.try_get("user_agent").map_err(AppError::internal)?,
        created_at: row.try_get("created_at").map_err(AppError::internal)?,
    })
}

/// In-memory audit store for tests. Entries can be inspected with
/// [`entries`](MemoryAuditStore::entries); set `fail` to exercise the
/// recorder's failure isolation.
#[derive(Default)]
pub struct MemoryAuditStore {
    entries: std::sync::Mutex<Vec<AuditLogEntry>>,
    pub fail: std::sync::atomic::AtomicBool,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditLogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn record(&self, entry: AuditLogEntry) -> Result<(), AppError> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(AppError::internal(anyhow::anyhow!(
                "audit store unavailable"
            )));
        }
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }

    async fn query(&self, filter: &AuditLogFilter) -> Result<AuditLogPage, AppError> {
        let entries = self.entries.lock().unwrap();
        let mut matching: Vec<AuditLogEntry> = entries
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let page: Vec<AuditLogEntry> = matching
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit as usize)
            .collect();

        Ok(AuditLogPage {
            entries: page,
            total,
        })
    }
}
