//! The request security pipeline.
//!
//! Layer order, outermost first: audit recorder, then credential and scope
//! resolution ([`context`]), then the CSRF guard, then rate limiting. Each
//! layer rejects with a stable error code from
//! [`crate::utils::errors::AppError`].

pub mod auth;
pub mod context;
pub mod csrf;
pub mod rate_limit;
pub mod scope;
