//! Campusgate: the request security and audit pipeline for a multi-tenant
//! school management platform.
//!
//! Every request passes through four stages before reaching a handler:
//!
//! 1. **Audit recorder** — captures who did what, with credentials and PII
//!    redacted, persisted off the response path.
//! 2. **Credential and scope resolution** — verifies the JWT and pins the
//!    request to a school/branch/course scope
//!    ([`middleware::context`]).
//! 3. **CSRF guard** — double-submit cookie check for cookie-borne
//!    sessions ([`middleware::csrf`]).
//! 4. **Rate limiter** — fixed-window counters keyed per user or IP
//!    ([`middleware::rate_limit`]).
//!
//! The same posture extends to the WebSocket channel in [`realtime`].

pub mod audit;
pub mod config;
pub mod directory;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod modules;
pub mod realtime;
pub mod router;
pub mod state;
pub mod utils;
