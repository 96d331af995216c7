use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        AdminUser, CreateEpisodeRequest, CreateLinkRequest, Episode, EpisodeStatus, NewAdmin,
        OfficialLink, UpdateAdminRequest, UpdateEpisodeRequest, UpdateLinkRequest,
    },
    password,
};

mod memory;
mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

/// Repository Trait
///
/// The persistence contract for the three stores (episodes, official links, admin
/// credentials). Handlers only see `Arc<dyn Repository>`, so the Postgres backend and the
/// in-memory backend are interchangeable.
///
/// Every method is one atomic unit of work. Absence is `Ok(None)` / `Ok(false)`, never an
/// error; the API layer turns it into a 404.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Episode Store ---
    async fn get_episode(&self, id: i64) -> Result<Option<Episode>, AppError>;
    /// Ordered by `published_at` descending (unpublished last), then `id` descending.
    async fn list_episodes(
        &self,
        skip: i64,
        limit: i64,
        status: Option<EpisodeStatus>,
    ) -> Result<Vec<Episode>, AppError>;
    async fn create_episode(&self, req: CreateEpisodeRequest) -> Result<Episode, AppError>;
    async fn update_episode(
        &self,
        id: i64,
        changes: UpdateEpisodeRequest,
    ) -> Result<Option<Episode>, AppError>;
    /// Sets PUBLISHED and stamps `published_at` only if it was never set.
    async fn publish_episode(&self, id: i64) -> Result<Option<Episode>, AppError>;
    /// Sets DRAFT; `published_at` is kept.
    async fn unpublish_episode(&self, id: i64) -> Result<Option<Episode>, AppError>;
    async fn delete_episode(&self, id: i64) -> Result<bool, AppError>;

    async fn list_published_episodes(&self, skip: i64, limit: i64) -> Result<Vec<Episode>, AppError> {
        self.list_episodes(skip, limit, Some(EpisodeStatus::Published))
            .await
    }

    // --- Link Store ---
    async fn get_link(&self, id: i64) -> Result<Option<OfficialLink>, AppError>;
    /// The full set, `order` ascending, ties by `id` ascending.
    async fn list_links(&self) -> Result<Vec<OfficialLink>, AppError>;
    async fn create_link(&self, req: CreateLinkRequest) -> Result<OfficialLink, AppError>;
    async fn update_link(
        &self,
        id: i64,
        changes: UpdateLinkRequest,
    ) -> Result<Option<OfficialLink>, AppError>;
    async fn delete_link(&self, id: i64) -> Result<bool, AppError>;

    // --- Credential Store ---
    async fn find_admin_by_email(&self, email: &str) -> Result<Option<AdminUser>, AppError>;
    async fn find_admin_by_id(&self, id: i64) -> Result<Option<AdminUser>, AppError>;
    /// Hashes the password before persisting. Duplicate email → `AppError::Conflict`.
    async fn create_admin(&self, admin: NewAdmin) -> Result<AdminUser, AppError>;
    /// A supplied password is re-hashed. Duplicate email → `AppError::Conflict`.
    async fn update_admin(
        &self,
        id: i64,
        changes: UpdateAdminRequest,
    ) -> Result<Option<AdminUser>, AppError>;

    /// authenticate_admin
    ///
    /// `None` for an unknown email, a wrong password, or an inactive account. The three
    /// cases are indistinguishable to the caller, including in timing for the first one.
    async fn authenticate_admin(
        &self,
        email: &str,
        plain_password: &str,
    ) -> Result<Option<AdminUser>, AppError> {
        let Some(admin) = self.find_admin_by_email(email).await? else {
            password::verify_unknown_account(plain_password).await;
            return Ok(None);
        };

        if !password::verify(plain_password, &admin.password_hash).await || !admin.active() {
            return Ok(None);
        }
        Ok(Some(admin))
    }
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;
