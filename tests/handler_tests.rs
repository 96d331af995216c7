use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use metocast_hub::{
    AppConfig, AppError, AppState, InMemoryRepository, Repository, RepositoryState,
    auth::{self, AuthAdmin},
    extract::{Params, PathParam, Payload},
    handlers,
    models::{
        CreateEpisodeRequest, CreateLinkRequest, EpisodeFilter, EpisodeStatus, LinkType,
        LoginRequest, NewAdmin, Pagination, UpdateEpisodeRequest, UpdateLinkRequest,
    },
};
use std::sync::Arc;

// --- Helpers ---

fn test_state() -> AppState {
    AppState {
        repo: Arc::new(InMemoryRepository::new()) as RepositoryState,
        config: AppConfig::default(),
    }
}

fn first_page() -> Params<Pagination> {
    Params(Pagination { skip: 0, limit: 100 })
}

fn all_statuses() -> Params<EpisodeFilter> {
    Params(EpisodeFilter {
        skip: 0,
        limit: 100,
        status: None,
    })
}

async fn create(state: &AppState, title: &str) -> i64 {
    let (status, Json(created)) = handlers::admin_create_episode(
        State(state.clone()),
        Payload(CreateEpisodeRequest {
            title: title.to_string(),
            ..CreateEpisodeRequest::default()
        }),
    )
    .await
    .expect("create must succeed");
    assert_eq!(status, StatusCode::CREATED);
    created.id
}

fn assert_not_found<T: std::fmt::Debug>(result: Result<T, AppError>, detail: &str) {
    match result {
        Err(AppError::NotFound(message)) => assert_eq!(message, detail),
        other => panic!("expected 404 '{detail}', got {other:?}"),
    }
}

// --- Service Endpoints ---

#[tokio::test]
async fn test_root_and_health() {
    let state = test_state();

    let Json(info) = handlers::root(State(state)).await;
    assert_eq!(info.message, "Metocast Hub API");
    assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(info.docs, "/docs");
    assert_eq!(info.health, "/health");

    let Json(health) = handlers::health().await;
    assert_eq!(health.status, "healthy");
}

// --- Public Episodes ---

#[tokio::test]
async fn test_draft_is_hidden_from_public_but_visible_to_admin() {
    let state = test_state();
    let id = create(&state, "Draft").await;

    assert_not_found(
        handlers::get_published_episode(State(state.clone()), PathParam(id)).await,
        "Episódio não encontrado",
    );

    let Json(admin_view) = handlers::admin_get_episode(State(state.clone()), PathParam(id))
        .await
        .unwrap();
    assert_eq!(admin_view.status, EpisodeStatus::Draft);

    let Json(public_list) = handlers::list_published_episodes(State(state), first_page())
        .await
        .unwrap();
    assert!(public_list.is_empty());
}

#[tokio::test]
async fn test_published_episode_is_public() {
    let state = test_state();
    let id = create(&state, "Live").await;

    handlers::admin_publish_episode(State(state.clone()), PathParam(id))
        .await
        .unwrap();

    let Json(found) = handlers::get_published_episode(State(state.clone()), PathParam(id))
        .await
        .unwrap();
    assert_eq!(found.title, "Live");
    assert!(found.published_at.is_some());

    let Json(public_list) = handlers::list_published_episodes(State(state), first_page())
        .await
        .unwrap();
    assert_eq!(public_list.len(), 1);
}

// --- Admin Episodes ---

#[tokio::test]
async fn test_publish_unpublish_scenario() {
    let state = test_state();
    let id = create(&state, "E1").await;

    let Json(published) = handlers::admin_publish_episode(State(state.clone()), PathParam(id))
        .await
        .unwrap();
    let t1 = published.published_at.expect("stamped on first publish");

    let Json(again) = handlers::admin_publish_episode(State(state.clone()), PathParam(id))
        .await
        .unwrap();
    assert_eq!(again.published_at, Some(t1));

    let Json(draft) = handlers::admin_unpublish_episode(State(state), PathParam(id))
        .await
        .unwrap();
    assert_eq!(draft.status, EpisodeStatus::Draft);
    assert_eq!(draft.published_at, Some(t1));
}

#[tokio::test]
async fn test_admin_listing_filters_by_status() {
    let state = test_state();
    let draft = create(&state, "draft").await;
    let live = create(&state, "live").await;
    handlers::admin_publish_episode(State(state.clone()), PathParam(live))
        .await
        .unwrap();

    let Json(everything) = handlers::admin_list_episodes(State(state.clone()), all_statuses())
        .await
        .unwrap();
    assert_eq!(everything.len(), 2);

    let Json(drafts) = handlers::admin_list_episodes(
        State(state.clone()),
        Params(EpisodeFilter {
            status: Some("DRAFT".to_string()),
            ..all_statuses().0
        }),
    )
    .await
    .unwrap();
    assert_eq!(drafts.iter().map(|e| e.id).collect::<Vec<_>>(), vec![draft]);

    let invalid = handlers::admin_list_episodes(
        State(state),
        Params(EpisodeFilter {
            status: Some("ARCHIVED".to_string()),
            ..all_statuses().0
        }),
    )
    .await;
    match invalid {
        Err(AppError::Validation(detail)) => {
            assert_eq!(detail, "Status inválido. Use DRAFT ou PUBLISHED")
        }
        other => panic!("expected 400, got {other:?}"),
    }
}

#[tokio::test]
async fn test_update_and_delete_episode() {
    let state = test_state();
    let id = create(&state, "E1").await;

    let Json(updated) = handlers::admin_update_episode(
        State(state.clone()),
        PathParam(id),
        Payload(UpdateEpisodeRequest {
            spotify_url: Some(Some("https://open.spotify.com/episode/1".to_string())),
            ..UpdateEpisodeRequest::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(updated.title, "E1");
    assert_eq!(
        updated.spotify_url.as_deref(),
        Some("https://open.spotify.com/episode/1")
    );

    let Json(message) = handlers::admin_delete_episode(State(state.clone()), PathParam(id))
        .await
        .unwrap();
    assert_eq!(message.message, "Episódio deletado com sucesso");

    assert_not_found(
        handlers::admin_delete_episode(State(state.clone()), PathParam(id)).await,
        "Episódio não encontrado",
    );
    assert_not_found(
        handlers::admin_update_episode(
            State(state.clone()),
            PathParam(id),
            Payload(UpdateEpisodeRequest::default()),
        )
        .await,
        "Episódio não encontrado",
    );
    assert_not_found(
        handlers::admin_publish_episode(State(state.clone()), PathParam(id)).await,
        "Episódio não encontrado",
    );
    assert_not_found(
        handlers::admin_unpublish_episode(State(state), PathParam(id)).await,
        "Episódio não encontrado",
    );
}

// --- Links ---

#[tokio::test]
async fn test_link_crud_through_handlers() {
    let state = test_state();

    let (status, Json(created)) = handlers::admin_create_link(
        State(state.clone()),
        Payload(CreateLinkRequest {
            label: "Instagram".to_string(),
            url: "https://instagram.com/metocast".to_string(),
            link_type: LinkType::Instagram,
            order: 1,
        }),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);

    let Json(updated) = handlers::admin_update_link(
        State(state.clone()),
        PathParam(created.id),
        Payload(UpdateLinkRequest {
            order: Some(0),
            ..UpdateLinkRequest::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(updated.order, 0);

    let Json(public) = handlers::list_links(State(state.clone())).await.unwrap();
    let Json(admin) = handlers::admin_list_links(State(state.clone())).await.unwrap();
    assert_eq!(public, admin);
    assert_eq!(public.len(), 1);

    let Json(message) = handlers::admin_delete_link(State(state.clone()), PathParam(created.id))
        .await
        .unwrap();
    assert_eq!(message.message, "Link deletado com sucesso");

    assert_not_found(
        handlers::admin_get_link(State(state), PathParam(created.id)).await,
        "Link não encontrado",
    );
}

// --- Authentication ---

#[tokio::test]
async fn test_login_issues_token_for_valid_credentials() {
    let state = test_state();
    state
        .repo
        .create_admin(NewAdmin {
            name: "Admin".to_string(),
            email: "admin@metocast.com".to_string(),
            password: "metocast123".to_string(),
        })
        .await
        .unwrap();

    let Json(token) = handlers::login(
        State(state.clone()),
        Payload(LoginRequest {
            email: "admin@metocast.com".to_string(),
            password: "metocast123".to_string(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(token.token_type, "bearer");
    let subject = auth::verify_token(&token.access_token, &state.config.jwt_secret).unwrap();
    assert_eq!(subject, "admin@metocast.com");

    let wrong = handlers::login(
        State(state),
        Payload(LoginRequest {
            email: "admin@metocast.com".to_string(),
            password: "not-the-password".to_string(),
        }),
    )
    .await;
    match wrong {
        Err(AppError::Unauthorized(detail)) => assert_eq!(detail, "Email ou senha incorretos"),
        other => panic!("expected 401, got {other:?}"),
    }
}

#[tokio::test]
async fn test_get_me_returns_profile() {
    let state = test_state();
    let admin = state
        .repo
        .create_admin(NewAdmin {
            name: "Admin".to_string(),
            email: "admin@metocast.com".to_string(),
            password: "metocast123".to_string(),
        })
        .await
        .unwrap();

    let Json(profile) = handlers::get_me(AuthAdmin(admin.clone())).await;

    assert_eq!(profile.id, admin.id);
    assert_eq!(profile.email, "admin@metocast.com");
    assert_eq!(profile.role, "ADMIN");
    assert_eq!(profile.is_active, 1);
}
