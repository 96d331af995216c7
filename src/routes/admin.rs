use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch},
};

/// Admin Router Module
///
/// Full management of episodes and official links.
///
/// Access Control:
/// `create_router` wraps this whole router in the `require_admin` route layer. A request
/// without a valid bearer token for an active administrator is answered with 401 before
/// any of these handlers runs.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // --- Episodes ---
        // GET /episodes?skip=&limit=&status=
        // Every episode, drafts included. `status` accepts exactly DRAFT or PUBLISHED.
        // POST /episodes
        // Creates an episode (201). Status defaults to DRAFT.
        .route(
            "/episodes",
            get(handlers::admin_list_episodes).post(handlers::admin_create_episode),
        )
        .route(
            "/episodes/{id}",
            get(handlers::admin_get_episode)
                .put(handlers::admin_update_episode)
                .delete(handlers::admin_delete_episode),
        )
        // PATCH /episodes/{id}/publish
        // Idempotent: the first publication timestamp is kept.
        .route(
            "/episodes/{id}/publish",
            patch(handlers::admin_publish_episode),
        )
        // PATCH /episodes/{id}/unpublish
        // Back to DRAFT. `published_at` survives.
        .route(
            "/episodes/{id}/unpublish",
            patch(handlers::admin_unpublish_episode),
        )
        // --- Official Links ---
        .route(
            "/links",
            get(handlers::admin_list_links).post(handlers::admin_create_link),
        )
        .route(
            "/links/{id}",
            get(handlers::admin_get_link)
                .put(handlers::admin_update_link)
                .delete(handlers::admin_delete_link),
        )
}
