use std::{cmp::Ordering, collections::BTreeMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::Repository;
use crate::{
    error::AppError,
    models::{
        AdminUser, CreateEpisodeRequest, CreateLinkRequest, Episode, EpisodeStatus, NewAdmin,
        OfficialLink, UpdateAdminRequest, UpdateEpisodeRequest, UpdateLinkRequest,
    },
    password,
};

/// InMemoryRepository
///
/// A `Repository` that keeps every table in process memory behind one lock. It mirrors the
/// Postgres semantics (ordering, partial updates, publish stamping, unique emails) and is
/// what the test suite and database-less local runs use.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    episodes: BTreeMap<i64, Episode>,
    links: BTreeMap<i64, OfficialLink>,
    admins: BTreeMap<i64, AdminUser>,
    last_id: i64,
}

impl Tables {
    // One sequence shared by all tables keeps ids unique across record types.
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.admins
            .values()
            .any(|admin| admin.email == email && Some(admin.id) != except)
    }
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest publication first, never-published last, then higher ids first.
fn newest_first(a: &Episode, b: &Episode) -> Ordering {
    let by_published = match (a.published_at, b.published_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_published.then_with(|| b.id.cmp(&a.id))
}

fn page<T>(items: Vec<T>, skip: i64, limit: i64) -> Vec<T> {
    let skip = usize::try_from(skip).unwrap_or(0);
    let limit = usize::try_from(limit).unwrap_or(0);
    items.into_iter().skip(skip).take(limit).collect()
}

fn conflict() -> AppError {
    AppError::Conflict("Email já cadastrado".to_string())
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get_episode(&self, id: i64) -> Result<Option<Episode>, AppError> {
        Ok(self.tables.read().await.episodes.get(&id).cloned())
    }

    async fn list_episodes(
        &self,
        skip: i64,
        limit: i64,
        status: Option<EpisodeStatus>,
    ) -> Result<Vec<Episode>, AppError> {
        let tables = self.tables.read().await;
        let mut episodes: Vec<Episode> = tables
            .episodes
            .values()
            .filter(|episode| status.is_none_or(|wanted| episode.status == wanted))
            .cloned()
            .collect();
        episodes.sort_by(newest_first);
        Ok(page(episodes, skip, limit))
    }

    async fn create_episode(&self, req: CreateEpisodeRequest) -> Result<Episode, AppError> {
        let mut tables = self.tables.write().await;
        let episode = Episode {
            id: tables.next_id(),
            title: req.title,
            description: req.description,
            cover_image_url: req.cover_image_url,
            spotify_url: req.spotify_url,
            youtube_url: req.youtube_url,
            tags: req.tags,
            status: req.status.unwrap_or_default(),
            published_at: None,
            created_at: Utc::now(),
            updated_at: None,
        };
        tables.episodes.insert(episode.id, episode.clone());
        Ok(episode)
    }

    async fn update_episode(
        &self,
        id: i64,
        changes: UpdateEpisodeRequest,
    ) -> Result<Option<Episode>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(episode) = tables.episodes.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply_to(episode);
        episode.updated_at = Some(Utc::now());
        Ok(Some(episode.clone()))
    }

    async fn publish_episode(&self, id: i64) -> Result<Option<Episode>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(episode) = tables.episodes.get_mut(&id) else {
            return Ok(None);
        };
        let now = Utc::now();
        episode.status = EpisodeStatus::Published;
        episode.published_at.get_or_insert(now);
        episode.updated_at = Some(now);
        Ok(Some(episode.clone()))
    }

    async fn unpublish_episode(&self, id: i64) -> Result<Option<Episode>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(episode) = tables.episodes.get_mut(&id) else {
            return Ok(None);
        };
        episode.status = EpisodeStatus::Draft;
        episode.updated_at = Some(Utc::now());
        Ok(Some(episode.clone()))
    }

    async fn delete_episode(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.tables.write().await.episodes.remove(&id).is_some())
    }

    async fn get_link(&self, id: i64) -> Result<Option<OfficialLink>, AppError> {
        Ok(self.tables.read().await.links.get(&id).cloned())
    }

    async fn list_links(&self) -> Result<Vec<OfficialLink>, AppError> {
        let tables = self.tables.read().await;
        let mut links: Vec<OfficialLink> = tables.links.values().cloned().collect();
        links.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        Ok(links)
    }

    async fn create_link(&self, req: CreateLinkRequest) -> Result<OfficialLink, AppError> {
        let mut tables = self.tables.write().await;
        let link = OfficialLink {
            id: tables.next_id(),
            label: req.label,
            url: req.url,
            link_type: req.link_type,
            order: req.order,
            created_at: Utc::now(),
            updated_at: None,
        };
        tables.links.insert(link.id, link.clone());
        Ok(link)
    }

    async fn update_link(
        &self,
        id: i64,
        changes: UpdateLinkRequest,
    ) -> Result<Option<OfficialLink>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(link) = tables.links.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply_to(link);
        link.updated_at = Some(Utc::now());
        Ok(Some(link.clone()))
    }

    async fn delete_link(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.tables.write().await.links.remove(&id).is_some())
    }

    async fn find_admin_by_email(&self, email: &str) -> Result<Option<AdminUser>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .admins
            .values()
            .find(|admin| admin.email == email)
            .cloned())
    }

    async fn find_admin_by_id(&self, id: i64) -> Result<Option<AdminUser>, AppError> {
        Ok(self.tables.read().await.admins.get(&id).cloned())
    }

    async fn create_admin(&self, admin: NewAdmin) -> Result<AdminUser, AppError> {
        let password_hash = password::hash(&admin.password).await?;

        let mut tables = self.tables.write().await;
        if tables.email_taken(&admin.email, None) {
            return Err(conflict());
        }
        let created = AdminUser {
            id: tables.next_id(),
            name: admin.name,
            email: admin.email,
            password_hash,
            role: "ADMIN".to_string(),
            is_active: 1,
            created_at: Utc::now(),
            updated_at: None,
        };
        tables.admins.insert(created.id, created.clone());
        Ok(created)
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

        let mut tables = self.tables.write().await;
        if !tables.admins.contains_key(&id) {
            return Ok(None);
        }
        if let Some(email) = &changes.email {
            if tables.email_taken(email, Some(id)) {
                return Err(conflict());
            }
        }
        let Some(admin) = tables.admins.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            admin.name = name;
        }
        if let Some(email) = changes.email {
            admin.email = email;
        }
        if let Some(password_hash) = password_hash {
            admin.password_hash = password_hash;
        }
        if let Some(is_active) = changes.is_active {
            admin.is_active = i32::from(is_active);
        }
        admin.updated_at = Some(Utc::now());
        Ok(Some(admin.clone()))
    }
}
