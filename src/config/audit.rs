use std::env;

/// Audit recorder configuration.
#[derive(Clone, Debug)]
pub struct AuditConfig {
    /// Path prefixes that are never audited (health checks, the audit
    /// endpoints themselves). Keeps the log from auditing its own readers.
    pub ignore_prefixes: Vec<String>,
    /// Trusted internal callers can skip auditing with this header.
    pub bypass_header: String,
    /// Largest request body (bytes) captured for the audit record. Bodies
    /// beyond this are recorded as a size marker instead.
    pub max_captured_body_bytes: usize,
    /// String values longer than this are truncated during sanitization.
    pub max_string_len: usize,
    /// Error messages are truncated to this length.
    pub max_error_len: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            ignore_prefixes: vec![
                "/health".to_string(),
                "/api/status".to_string(),
                "/api/audit-logs".to_string(),
            ],
            bypass_header: "x-audit-bypass".to_string(),
            max_captured_body_bytes: 64 * 1024,
            max_string_len: 2048,
            max_error_len: 512,
        }
    }
}

impl AuditConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_captured_body_bytes: env::var("AUDIT_MAX_BODY_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_captured_body_bytes),
            ..defaults
        }
    }
}
