//! Read API over the audit trail.

pub mod controller;
pub mod model;
pub mod router;
