use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Routes for any active administrator holding a valid token. The `require_admin`
/// layer is attached by `create_router`, so handlers here can take `AuthAdmin` without
/// resolving the token a second time.
pub fn authenticated_routes() -> Router<AppState> {
    Router::new()
        // GET /auth/me
        // Profile of the token's owner.
        .route("/auth/me", get(handlers::get_me))
}
