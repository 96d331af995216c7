//! Router Module Index
//!
//! Splits the HTTP surface by access level. Protection is attached per module with
//! axum layers, so a route cannot become public by accident when it is added to the
//! admin router.

/// Unauthenticated read-only catalogue plus the login gateway. Mounted under `/api`.
pub mod public;

/// Routes that only need a valid bearer token. Mounted under `/api`.
pub mod authenticated;

/// Episode and link management. Mounted under `/api/admin`.
pub mod admin;
