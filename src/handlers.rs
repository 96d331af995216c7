use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

use crate::{
    AppState,
    auth::{self, AuthAdmin},
    error::AppError,
    extract::{Params, PathParam, Payload},
    models::{
        AdminProfile, CreateEpisodeRequest, CreateLinkRequest, Episode, EpisodeFilter,
        ErrorResponse, HealthResponse, LoginRequest, MessageResponse, OfficialLink, Pagination,
        ServiceInfo, TokenResponse, UpdateEpisodeRequest, UpdateLinkRequest,
    },
};

const EPISODE_NOT_FOUND: &str = "Episódio não encontrado";
const LINK_NOT_FOUND: &str = "Link não encontrado";

fn episode_not_found() -> AppError {
    AppError::NotFound(EPISODE_NOT_FOUND.to_string())
}

fn link_not_found() -> AppError {
    AppError::NotFound(LINK_NOT_FOUND.to_string())
}

// --- Service Endpoints ---

/// root
///
/// [Public Route] Service metadata: name, version and where the docs live.
#[utoipa::path(
    get,
    path = "/",
    tag = "service",
    responses((status = 200, description = "Service metadata", body = ServiceInfo))
)]
pub async fn root(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: state.config.project_name.clone(),
        version: state.config.version.clone(),
        docs: "/docs".to_string(),
        health: "/health".to_string(),
    })
}

/// health
///
/// [Public Route] Liveness check for load balancers and uptime monitors.
#[utoipa::path(
    get,
    path = "/health",
    tag = "service",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// Fallback for unknown routes, so even a 404 carries the `{"detail"}` envelope.
pub async fn not_found() -> AppError {
    AppError::NotFound("Not Found".to_string())
}

/// Fallback for a known path called with a method it does not serve.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed("Method Not Allowed".to_string())
}

// --- Public Episodes & Links ---

/// list_published_episodes
///
/// [Public Route] Lists PUBLISHED episodes, newest publication first.
///
/// *Security*: The status filter is applied unconditionally in the repository call, so
/// drafts can never leak through this endpoint.
#[utoipa::path(
    get,
    path = "/api/episodes",
    tag = "episodes",
    params(Pagination),
    responses(
        (status = 200, description = "Published episodes", body = [Episode]),
        (status = 400, description = "Invalid pagination", body = ErrorResponse)
    )
)]
pub async fn list_published_episodes(
    State(state): State<AppState>,
    Params(page): Params<Pagination>,
) -> Result<Json<Vec<Episode>>, AppError> {
    let episodes = state
        .repo
        .list_published_episodes(page.skip, page.limit)
        .await?;
    Ok(Json(episodes))
}

/// get_published_episode
///
/// [Public Route] A single episode, only if it is PUBLISHED. A draft answers exactly like
/// a missing id.
#[utoipa::path(
    get,
    path = "/api/episodes/{id}",
    tag = "episodes",
    params(("id" = i64, Path, description = "Episode ID")),
    responses(
        (status = 200, description = "Found", body = Episode),
        (status = 404, description = "Missing or not published", body = ErrorResponse)
    )
)]
pub async fn get_published_episode(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Episode>, AppError> {
    state
        .repo
        .get_episode(id)
        .await?
        .filter(Episode::is_published)
        .map(Json)
        .ok_or_else(episode_not_found)
}

/// list_links
///
/// [Public Route] All official links in display order.
#[utoipa::path(
    get,
    path = "/api/links",
    tag = "links",
    responses((status = 200, description = "Official links", body = [OfficialLink]))
)]
pub async fn list_links(State(state): State<AppState>) -> Result<Json<Vec<OfficialLink>>, AppError> {
    Ok(Json(state.repo.list_links().await?))
}

// --- Authentication ---

/// login
///
/// [Public Route] Exchanges email and password for a bearer token.
///
/// Unknown email, wrong password and inactive account all produce the same 401.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Bad credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Payload(credentials): Payload<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let Some(admin) = state
        .repo
        .authenticate_admin(&credentials.email, &credentials.password)
        .await?
    else {
        tracing::info!("rejected login attempt");
        return Err(AppError::Unauthorized("Email ou senha incorretos".to_string()));
    };

    let access_token = auth::issue_token(
        &admin.email,
        state.config.access_token_ttl,
        &state.config.jwt_secret,
    )?;

    tracing::info!(admin_id = admin.id, "admin logged in");
    Ok(Json(TokenResponse::bearer(access_token)))
}

/// get_me
///
/// [Authenticated Route] Profile of the administrator the bearer token belongs to.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Profile", body = AdminProfile),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn get_me(AuthAdmin(admin): AuthAdmin) -> Json<AdminProfile> {
    Json(AdminProfile::from(admin))
}

// --- Admin Episodes ---

/// admin_list_episodes
///
/// [Admin Route] Every episode, drafts included, with an optional exact status filter.
#[utoipa::path(
    get,
    path = "/api/admin/episodes",
    tag = "admin-episodes",
    security(("bearer" = [])),
    params(EpisodeFilter),
    responses(
        (status = 200, description = "Episodes", body = [Episode]),
        (status = 400, description = "Invalid status or pagination", body = ErrorResponse)
    )
)]
pub async fn admin_list_episodes(
    State(state): State<AppState>,
    Params(filter): Params<EpisodeFilter>,
) -> Result<Json<Vec<Episode>>, AppError> {
    let status = filter.status()?;
    let episodes = state
        .repo
        .list_episodes(filter.skip, filter.limit, status)
        .await?;
    Ok(Json(episodes))
}

/// admin_create_episode
///
/// [Admin Route] Creates an episode, DRAFT unless the payload says otherwise.
#[utoipa::path(
    post,
    path = "/api/admin/episodes",
    tag = "admin-episodes",
    security(("bearer" = [])),
    request_body = CreateEpisodeRequest,
    responses(
        (status = 201, description = "Created", body = Episode),
        (status = 400, description = "Invalid payload", body = ErrorResponse)
    )
)]
pub async fn admin_create_episode(
    State(state): State<AppState>,
    Payload(payload): Payload<CreateEpisodeRequest>,
) -> Result<(StatusCode, Json<Episode>), AppError> {
    let episode = state.repo.create_episode(payload).await?;
    tracing::info!(episode_id = episode.id, status = %episode.status, "episode created");
    Ok((StatusCode::CREATED, Json(episode)))
}

#[utoipa::path(
    get,
    path = "/api/admin/episodes/{id}",
    tag = "admin-episodes",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Episode ID")),
    responses(
        (status = 200, description = "Found", body = Episode),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn admin_get_episode(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Episode>, AppError> {
    state
        .repo
        .get_episode(id)
        .await?
        .map(Json)
        .ok_or_else(episode_not_found)
}

/// admin_update_episode
///
/// [Admin Route] Partial update. Changing `status` here bypasses publish stamping.
#[utoipa::path(
    put,
    path = "/api/admin/episodes/{id}",
    tag = "admin-episodes",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Episode ID")),
    request_body = UpdateEpisodeRequest,
    responses(
        (status = 200, description = "Updated", body = Episode),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn admin_update_episode(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    Payload(changes): Payload<UpdateEpisodeRequest>,
) -> Result<Json<Episode>, AppError> {
    let episode = state
        .repo
        .update_episode(id, changes)
        .await?
        .ok_or_else(episode_not_found)?;
    tracing::info!(episode_id = id, "episode updated");
    Ok(Json(episode))
}

#[utoipa::path(
    delete,
    path = "/api/admin/episodes/{id}",
    tag = "admin-episodes",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Episode ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn admin_delete_episode(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.repo.delete_episode(id).await? {
        return Err(episode_not_found());
    }
    tracing::info!(episode_id = id, "episode deleted");
    Ok(Json(MessageResponse::new("Episódio deletado com sucesso")))
}

/// admin_publish_episode
///
/// [Admin Route] DRAFT → PUBLISHED. `published_at` is stamped on the first publish only,
/// so repeating the call is harmless.
#[utoipa::path(
    patch,
    path = "/api/admin/episodes/{id}/publish",
    tag = "admin-episodes",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Episode ID")),
    responses(
        (status = 200, description = "Published", body = Episode),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn admin_publish_episode(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Episode>, AppError> {
    let episode = state
        .repo
        .publish_episode(id)
        .await?
        .ok_or_else(episode_not_found)?;
    tracing::info!(episode_id = id, published_at = ?episode.published_at, "episode published");
    Ok(Json(episode))
}

/// admin_unpublish_episode
///
/// [Admin Route] PUBLISHED → DRAFT. `published_at` is preserved.
#[utoipa::path(
    patch,
    path = "/api/admin/episodes/{id}/unpublish",
    tag = "admin-episodes",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Episode ID")),
    responses(
        (status = 200, description = "Unpublished", body = Episode),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn admin_unpublish_episode(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Episode>, AppError> {
    let episode = state
        .repo
        .unpublish_episode(id)
        .await?
        .ok_or_else(episode_not_found)?;
    tracing::info!(episode_id = id, "episode unpublished");
    Ok(Json(episode))
}

// --- Admin Links ---

#[utoipa::path(
    get,
    path = "/api/admin/links",
    tag = "admin-links",
    security(("bearer" = [])),
    responses((status = 200, description = "Official links", body = [OfficialLink]))
)]
pub async fn admin_list_links(
    State(state): State<AppState>,
) -> Result<Json<Vec<OfficialLink>>, AppError> {
    Ok(Json(state.repo.list_links().await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/links",
    tag = "admin-links",
    security(("bearer" = [])),
    request_body = CreateLinkRequest,
    responses(
        (status = 201, description = "Created", body = OfficialLink),
        (status = 400, description = "Invalid payload", body = ErrorResponse)
    )
)]
pub async fn admin_create_link(
    State(state): State<AppState>,
    Payload(payload): Payload<CreateLinkRequest>,
) -> Result<(StatusCode, Json<OfficialLink>), AppError> {
    let link = state.repo.create_link(payload).await?;
    tracing::info!(link_id = link.id, "official link created");
    Ok((StatusCode::CREATED, Json(link)))
}

#[utoipa::path(
    get,
    path = "/api/admin/links/{id}",
    tag = "admin-links",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Link ID")),
    responses(
        (status = 200, description = "Found", body = OfficialLink),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn admin_get_link(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<OfficialLink>, AppError> {
    state
        .repo
        .get_link(id)
        .await?
        .map(Json)
        .ok_or_else(link_not_found)
}

#[utoipa::path(
    put,
    path = "/api/admin/links/{id}",
    tag = "admin-links",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Link ID")),
    request_body = UpdateLinkRequest,
    responses(
        (status = 200, description = "Updated", body = OfficialLink),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn admin_update_link(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    Payload(changes): Payload<UpdateLinkRequest>,
) -> Result<Json<OfficialLink>, AppError> {
    let link = state
        .repo
        .update_link(id, changes)
        .await?
        .ok_or_else(link_not_found)?;
    tracing::info!(link_id = id, "official link updated");
    Ok(Json(link))
}

#[utoipa::path(
    delete,
    path = "/api/admin/links/{id}",
    tag = "admin-links",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Link ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not Found", body = ErrorResponse)
    )
)]
pub async fn admin_delete_link(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.repo.delete_link(id).await? {
        return Err(link_not_found());
    }
    tracing::info!(link_id = id, "official link deleted");
    Ok(Json(MessageResponse::new("Link deletado com sucesso")))
}
