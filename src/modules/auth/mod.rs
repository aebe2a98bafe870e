//! Authentication: roles, claims, login/logout, and the session cookie.

pub mod controller;
pub mod model;
pub mod router;
