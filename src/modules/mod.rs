//! HTTP feature modules, one directory per resource.

pub mod audit_logs;
pub mod auth;
