//! Configuration modules.
//!
//! Each submodule owns one concern and loads itself from environment
//! variables with development-safe defaults.
//!
//! - [`audit`]: audit recorder ignore list and capture limits
//! - [`cors`]: origin allow-list
//! - [`csrf`]: double-submit cookie policy
//! - [`database`]: PostgreSQL connection pool
//! - [`jwt`]: credential verification secret and expiry
//! - [`rate_limit`]: fixed-window limits for HTTP and realtime traffic

pub mod audit;
pub mod cors;
pub mod csrf;
pub mod database;
pub mod jwt;
pub mod rate_limit;
