//! Request auditing.
//!
//! Every request that is not explicitly ignored produces one
//! [`model::AuditLogEntry`], sanitized of credentials and PII, and written
//! to the [`store::AuditStore`] off the response path.

pub mod model;
pub mod recorder;
pub mod sanitize;
pub mod store;
