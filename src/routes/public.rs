use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a token.
///
/// Visibility rule: episode reads go through handlers that only ever return PUBLISHED
/// records. A draft answers 404 here exactly like a missing id.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /episodes?skip=&limit=
        // Published episodes, newest publication first.
        .route("/episodes", get(handlers::list_published_episodes))
        // GET /episodes/{id}
        .route("/episodes/{id}", get(handlers::get_published_episode))
        // GET /links
        // Official links in display order.
        .route("/links", get(handlers::list_links))
        // POST /auth/login
        // Password login. The only way to obtain a bearer token; there is no signup.
        .route("/auth/login", post(handlers::login))
}
