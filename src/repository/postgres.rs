use async_trait::async_trait;
use sqlx::{PgPool, Postgres, query_builder::QueryBuilder};

use super::Repository;
use crate::{
    error::AppError,
    models::{
        AdminUser, CreateEpisodeRequest, CreateLinkRequest, Episode, EpisodeStatus, NewAdmin,
        OfficialLink, UpdateAdminRequest, UpdateEpisodeRequest, UpdateLinkRequest,
    },
    password,
};

const EPISODE_COLUMNS: &str = "id, title, description, cover_image_url, spotify_url, youtube_url, \
     tags, status, published_at, created_at, updated_at";

const LINK_COLUMNS: &str = r#"id, label, url, type, "order", created_at, updated_at"#;

const ADMIN_COLUMNS: &str =
    "id, name, email, password_hash, role, is_active, created_at, updated_at";

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL. Each call borrows a connection
/// from the pool for its own duration; multi-statement operations run inside a
/// transaction that rolls back if dropped before commit.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps a unique-index violation to a client-facing conflict.
fn email_conflict(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict("Email já cadastrado".to_string())
        }
        _ => AppError::Database(e),
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- EPISODES ---

    async fn get_episode(&self, id: i64) -> Result<Option<Episode>, AppError> {
        let sql = format!("SELECT {EPISODE_COLUMNS} FROM episodes WHERE id = $1");
        let episode = sqlx::query_as::<_, Episode>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(episode)
    }

    /// list_episodes
    ///
    /// Built with `QueryBuilder` so the optional status filter stays parameterized.
    async fn list_episodes(
        &self,
        skip: i64,
        limit: i64,
        status: Option<EpisodeStatus>,
    ) -> Result<Vec<Episode>, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {EPISODE_COLUMNS} FROM episodes"));

        if let Some(status) = status {
            builder.push(" WHERE status = ");
            builder.push_bind(status);
        }

        builder.push(" ORDER BY published_at DESC NULLS LAST, id DESC OFFSET ");
        builder.push_bind(skip);
        builder.push(" LIMIT ");
        builder.push_bind(limit);

        let episodes = builder
            .build_query_as::<Episode>()
            .fetch_all(&self.pool)
            .await?;
        Ok(episodes)
    }

    async fn create_episode(&self, req: CreateEpisodeRequest) -> Result<Episode, AppError> {
        let sql = format!(
            "INSERT INTO episodes (title, description, cover_image_url, spotify_url, youtube_url, tags, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {EPISODE_COLUMNS}"
        );
        let episode = sqlx::query_as::<_, Episode>(&sql)
            .bind(req.title)
            .bind(req.description)
            .bind(req.cover_image_url)
            .bind(req.spotify_url)
            .bind(req.youtube_url)
            .bind(req.tags)
            .bind(req.status.unwrap_or_default())
            .fetch_one(&self.pool)
            .await?;
        Ok(episode)
    }

    /// update_episode
    ///
    /// Loads the row under `FOR UPDATE`, applies the supplied fields in memory, and writes
    /// every column back in one statement, all inside a single transaction.
    async fn update_episode(
        &self,
        id: i64,
        changes: UpdateEpisodeRequest,
    ) -> Result<Option<Episode>, AppError> {
        let mut tx = self.pool.begin().await?;

        let select = format!("SELECT {EPISODE_COLUMNS} FROM episodes WHERE id = $1 FOR UPDATE");
        let Some(mut episode) = sqlx::query_as::<_, Episode>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        changes.apply_to(&mut episode);

        let update = format!(
            "UPDATE episodes SET title = $2, description = $3, cover_image_url = $4, spotify_url = $5, \
             youtube_url = $6, tags = $7, status = $8, updated_at = NOW() \
             WHERE id = $1 RETURNING {EPISODE_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Episode>(&update)
            .bind(id)
            .bind(episode.title)
            .bind(episode.description)
            .bind(episode.cover_image_url)
            .bind(episode.spotify_url)
            .bind(episode.youtube_url)
            .bind(episode.tags)
            .bind(episode.status)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    /// publish_episode
    ///
    /// `COALESCE` keeps the first publication timestamp, which makes the call idempotent.
    async fn publish_episode(&self, id: i64) -> Result<Option<Episode>, AppError> {
        let sql = format!(
            "UPDATE episodes SET status = 'PUBLISHED', published_at = COALESCE(published_at, NOW()), \
             updated_at = NOW() WHERE id = $1 RETURNING {EPISODE_COLUMNS}"
        );
        let episode = sqlx::query_as::<_, Episode>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(episode)
    }

    async fn unpublish_episode(&self, id: i64) -> Result<Option<Episode>, AppError> {
        let sql = format!(
            "UPDATE episodes SET status = 'DRAFT', updated_at = NOW() WHERE id = $1 RETURNING {EPISODE_COLUMNS}"
        );
        let episode = sqlx::query_as::<_, Episode>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(episode)
    }

    async fn delete_episode(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM episodes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- OFFICIAL LINKS ---

    async fn get_link(&self, id: i64) -> Result<Option<OfficialLink>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM official_links WHERE id = $1");
        let link = sqlx::query_as::<_, OfficialLink>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(link)
    }

    async fn list_links(&self) -> Result<Vec<OfficialLink>, AppError> {
        let sql = format!(r#"SELECT {LINK_COLUMNS} FROM official_links ORDER BY "order" ASC, id ASC"#);
        let links = sqlx::query_as::<_, OfficialLink>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(links)
    }

    async fn create_link(&self, req: CreateLinkRequest) -> Result<OfficialLink, AppError> {
        let sql = format!(
            r#"INSERT INTO official_links (label, url, type, "order") VALUES ($1, $2, $3, $4) RETURNING {LINK_COLUMNS}"#
        );
        let link = sqlx::query_as::<_, OfficialLink>(&sql)
            .bind(req.label)
            .bind(req.url)
            .bind(req.link_type)
            .bind(req.order)
            .fetch_one(&self.pool)
            .await?;
        Ok(link)
    }

    async fn update_link(
        &self,
        id: i64,
        changes: UpdateLinkRequest,
    ) -> Result<Option<OfficialLink>, AppError> {
        let mut tx = self.pool.begin().await?;

        let select = format!("SELECT {LINK_COLUMNS} FROM official_links WHERE id = $1 FOR UPDATE");
        let Some(mut link) = sqlx::query_as::<_, OfficialLink>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        changes.apply_to(&mut link);

        let update = format!(
            r#"UPDATE official_links SET label = $2, url = $3, type = $4, "order" = $5, updated_at = NOW()
               WHERE id = $1 RETURNING {LINK_COLUMNS}"#
        );
        let updated = sqlx::query_as::<_, OfficialLink>(&update)
            .bind(id)
            .bind(link.label)
            .bind(link.url)
            .bind(link.link_type)
            .bind(link.order)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn delete_link(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM official_links WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- ADMIN CREDENTIALS ---

    async fn find_admin_by_email(&self, email: &str) -> Result<Option<AdminUser>, AppError> {
        let sql = format!("SELECT {ADMIN_COLUMNS} FROM admin_users WHERE email = $1");
        let admin = sqlx::query_as::<_, AdminUser>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(admin)
    }

    async fn find_admin_by_id(&self, id: i64) -> Result<Option<AdminUser>, AppError> {
        let sql = format!("SELECT {ADMIN_COLUMNS} FROM admin_users WHERE id = $1");
        let admin = sqlx::query_as::<_, AdminUser>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(admin)
    }

    async fn create_admin(&self, admin: NewAdmin) -> Result<AdminUser, AppError> {
        let password_hash = password::hash(&admin.password).await?;
        let sql = format!(
            "INSERT INTO admin_users (name, email, password_hash, role, is_active) \
             VALUES ($1, $2, $3, 'ADMIN', 1) RETURNING {ADMIN_COLUMNS}"
        );
        sqlx::query_as::<_, AdminUser>(&sql)
            .bind(admin.name)
            .bind(admin.email)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(email_conflict)
    }

    async fn update_admin(
        &self,
        id: i64,
        changes: UpdateAdminRequest,
    ) -> Result<Option<AdminUser>, AppError> {
        let password_hash = match changes.password.as_deref() {
            Some(plain) => Some(password::hash(plain).await?),
            None => None,
        };

        let sql = format!(
            "UPDATE admin_users SET name = COALESCE($2, name), email = COALESCE($3, email), \
             password_hash = COALESCE($4, password_hash), is_active = COALESCE($5, is_active), \
             updated_at = NOW() WHERE id = $1 RETURNING {ADMIN_COLUMNS}"
        );
        sqlx::query_as::<_, AdminUser>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.email)
            .bind(password_hash)
            .bind(changes.is_active.map(i32::from))
            .fetch_optional(&self.pool)
            .await
            .map_err(email_conflict)
    }
}
