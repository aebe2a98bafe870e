//! Shared utilities.
//!
//! - [`cookies`]: cookie parsing and `Set-Cookie` construction
//! - [`errors`]: application error type with stable error codes
//! - [`jwt`]: access token creation and verification
//! - [`password`]: password hashing and verification

pub mod cookies;
pub mod errors;
pub mod jwt;
pub mod password;
