use axum::{
    Router,
    extract::FromRef,
    http::{HeaderName, HeaderValue},
    middleware,
    routing::get,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod password;
pub mod repository;

// Routing segregated by access level (Public, Authenticated, Admin).
pub mod routes;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::{AppConfig, Env};
pub use error::AppError;
pub use repository::{InMemoryRepository, PostgresRepository, Repository, RepositoryState};

/// ApiDoc
///
/// Aggregates every `#[utoipa::path]` handler and `ToSchema` payload into the OpenAPI
/// document served at `/api-docs/openapi.json` and rendered by Swagger UI at `/docs`.
#[derive(OpenApi)]
#[openapi(
    info(title = "Metocast Hub API", description = "Podcast hub: episodes and official links"),
    paths(
        handlers::root, handlers::health,
        handlers::list_published_episodes, handlers::get_published_episode, handlers::list_links,
        handlers::login, handlers::get_me,
        handlers::admin_list_episodes, handlers::admin_create_episode, handlers::admin_get_episode,
        handlers::admin_update_episode, handlers::admin_delete_episode,
        handlers::admin_publish_episode, handlers::admin_unpublish_episode,
        handlers::admin_list_links, handlers::admin_create_link, handlers::admin_get_link,
        handlers::admin_update_link, handlers::admin_delete_link,
    ),
    components(
        schemas(
            models::Episode, models::EpisodeStatus, models::OfficialLink, models::LinkType,
            models::CreateEpisodeRequest, models::UpdateEpisodeRequest,
            models::CreateLinkRequest, models::UpdateLinkRequest, models::LoginRequest,
            models::TokenResponse, models::AdminProfile, models::MessageResponse,
            models::ErrorResponse, models::HealthResponse, models::ServiceInfo,
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "service", description = "Root and health checks"),
        (name = "episodes", description = "Published episodes"),
        (name = "links", description = "Official links"),
        (name = "auth", description = "Administrator login"),
        (name = "admin-episodes", description = "Episode management"),
        (name = "admin-links", description = "Official link management"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` scheme referenced by the admin paths' `security(...)`.
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// AppState
///
/// The single shared container handed to every handler: the persistence layer and the
/// immutable configuration. Cloning is cheap (an `Arc` plus a small struct).
#[derive(Clone)]
pub struct AppState {
    /// Persistence: Postgres in production, in-memory in tests.
    pub repo: RepositoryState,
    /// The configuration loaded once at startup.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Lets extractors such as `AuthAdmin` pull just the piece of state they need.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// cors_layer
///
/// `Local` accepts any origin. `Production` accepts only `allowed_origins` and allows
/// credentials, which rules out wildcards, so methods and headers are mirrored instead.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    match config.env {
        Env::Local => CorsLayer::new()
            .allow_methods(Any)
            .allow_origin(Any)
            .allow_headers(Any),
        Env::Production => {
            let origins: Vec<HeaderValue> = config
                .allowed_origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(%origin, "ignoring malformed CORS origin");
                        None
                    }
                })
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(AllowMethods::mirror_request())
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true)
        }
    }
}

/// create_router
///
/// Assembles the full routing tree, applies scoped and global middleware, and binds
/// the state.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    // Header name for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 1. The admin router is rejected as a whole unless the bearer resolves.
    let admin_api = admin::admin_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::require_admin,
    ));

    // 2. Public, token-holder and admin routes share the `/api` prefix.
    let api = public::public_routes()
        .merge(authenticated::authenticated_routes().route_layer(
            middleware::from_fn_with_state(state.clone(), auth::require_admin),
        ))
        .nest("/admin", admin_api);

    let base_router = Router::new()
        // Documentation
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .fallback(handlers::not_found)
        .with_state(state);

    // 3. Observability and correlation layers
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID generation (UUID v4) for every incoming request.
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                // 3b. One span per request, tagged with the request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Echo the request ID back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS outermost so preflights never reach the handlers.
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span so every log line of a request carries its method, URI
/// and `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
