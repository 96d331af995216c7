//! Exercises `PostgresRepository` against a live database. Run with
//! `DATABASE_URL=postgres://... cargo test -- --ignored`.

use metocast_hub::{
    AppError, PostgresRepository, Repository,
    models::{
        CreateEpisodeRequest, CreateLinkRequest, EpisodeStatus, NewAdmin, UpdateAdminRequest,
        UpdateEpisodeRequest,
    },
};
use sqlx::postgres::PgPoolOptions;
use std::time::{SystemTime, UNIX_EPOCH};

async fn setup() -> PostgresRepository {
    dotenv::dotenv().ok();
    let db_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&db_url)
        .await
        .expect("Failed to connect to Postgres in tests");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    PostgresRepository::new(pool)
}

/// Suffix that keeps rows from separate runs apart.
fn unique() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_episode_lifecycle_round_trip() {
    let repo = setup().await;

    let created = repo
        .create_episode(CreateEpisodeRequest {
            title: format!("pg-episode-{}", unique()),
            description: Some("description".to_string()),
            ..CreateEpisodeRequest::default()
        })
        .await
        .unwrap();
    assert_eq!(created.status, EpisodeStatus::Draft);
    assert_eq!(created.published_at, None);
    assert_eq!(created.updated_at, None);

    let published = repo.publish_episode(created.id).await.unwrap().unwrap();
    let stamped = published.published_at.expect("stamped");
    let again = repo.publish_episode(created.id).await.unwrap().unwrap();
    assert_eq!(again.published_at, Some(stamped));

    let draft = repo.unpublish_episode(created.id).await.unwrap().unwrap();
    assert_eq!(draft.status, EpisodeStatus::Draft);
    assert_eq!(draft.published_at, Some(stamped));

    let cleared = repo
        .update_episode(
            created.id,
            UpdateEpisodeRequest {
                description: Some(None),
                ..UpdateEpisodeRequest::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cleared.description, None);
    assert_eq!(cleared.title, created.title);

    let drafts = repo
        .list_episodes(0, 100, Some(EpisodeStatus::Draft))
        .await
        .unwrap();
    assert!(drafts.iter().all(|e| e.status == EpisodeStatus::Draft));

    assert!(repo.delete_episode(created.id).await.unwrap());
    assert_eq!(repo.get_episode(created.id).await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_links_are_ordered() {
    let repo = setup().await;
    let tag = unique();

    let late = repo
        .create_link(CreateLinkRequest {
            label: format!("late-{tag}"),
            url: "https://late.example".to_string(),
            order: 50_000,
            ..CreateLinkRequest::default()
        })
        .await
        .unwrap();
    let early = repo
        .create_link(CreateLinkRequest {
            label: format!("early-{tag}"),
            url: "https://early.example".to_string(),
            order: 0,
            ..CreateLinkRequest::default()
        })
        .await
        .unwrap();

    let links = repo.list_links().await.unwrap();
    let position = |id: i64| links.iter().position(|l| l.id == id).unwrap();
    assert!(position(early.id) < position(late.id));
    assert!(
        links
            .windows(2)
            .all(|w| (w[0].order, w[0].id) <= (w[1].order, w[1].id))
    );

    repo.delete_link(late.id).await.unwrap();
    repo.delete_link(early.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_admin_email_is_unique_and_inactive_cannot_log_in() {
    let repo = setup().await;
    let email = format!("pg-admin-{}@metocast.com", unique());

    let created = repo
        .create_admin(NewAdmin {
            name: "Admin".to_string(),
            email: email.clone(),
            password: "metocast123".to_string(),
        })
        .await
        .unwrap();

    let duplicate = repo
        .create_admin(NewAdmin {
            name: "Other".to_string(),
            email: email.clone(),
            password: "metocast123".to_string(),
        })
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    assert!(
        repo.authenticate_admin(&email, "metocast123")
            .await
            .unwrap()
            .is_some()
    );

    repo.update_admin(
        created.id,
        UpdateAdminRequest {
            is_active: Some(false),
            ..UpdateAdminRequest::default()
        },
    )
    .await
    .unwrap();
    assert!(
        repo.authenticate_admin(&email, "metocast123")
            .await
            .unwrap()
            .is_none()
    );
}
