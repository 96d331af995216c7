use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

use crate::error::AppError;

pub const MAX_PAGE_SIZE: i64 = 100;

// --- Enumerations (mapped to native Postgres enums) ---

/// EpisodeStatus
///
/// The two lifecycle states of an episode. Only `Published` episodes are visible
/// through the public API.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type,
)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "episode_status", rename_all = "UPPERCASE")]
#[ts(export)]
pub enum EpisodeStatus {
    #[default]
    Draft,
    Published,
}

impl EpisodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EpisodeStatus::Draft => "DRAFT",
            EpisodeStatus::Published => "PUBLISHED",
        }
    }
}

impl fmt::Display for EpisodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EpisodeStatus {
    type Err = AppError;

    /// Accepts exactly `DRAFT` or `PUBLISHED`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(EpisodeStatus::Draft),
            "PUBLISHED" => Ok(EpisodeStatus::Published),
            _ => Err(AppError::Validation(
                "Status inválido. Use DRAFT ou PUBLISHED".to_string(),
            )),
        }
    }
}

/// LinkType
///
/// Platform an official link points at. Purely descriptive; the frontend picks an icon from it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type,
)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "link_type", rename_all = "UPPERCASE")]
#[ts(export)]
pub enum LinkType {
    Instagram,
    Youtube,
    Spotify,
    Site,
    #[default]
    Other,
}

// --- Core Application Schemas (Mapped to Database) ---

/// Episode
///
/// A podcast episode from the `episodes` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Episode {
    #[ts(type = "number")]
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub spotify_url: Option<String>,
    pub youtube_url: Option<String>,
    // Comma-separated, e.g. "ciencia,clima".
    pub tags: Option<String>,
    pub status: EpisodeStatus,
    // Stamped once by the first publish, never cleared afterwards.
    #[ts(type = "string | null")]
    pub published_at: Option<DateTime<Utc>>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string | null")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Episode {
    pub fn is_published(&self) -> bool {
        self.status == EpisodeStatus::Published
    }
}

/// OfficialLink
///
/// A labelled external URL from the `official_links` table, displayed in `order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct OfficialLink {
    #[ts(type = "number")]
    pub id: i64,
    pub label: String,
    pub url: String,
    // `type` is a reserved keyword in Rust; it keeps its name on the wire and in SQL.
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub link_type: LinkType,
    pub order: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string | null")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// AdminUser
///
/// An administrator account from the `admin_users` table. Never serialized directly:
/// handlers answer with `AdminProfile`, which has no password hash.
#[derive(Clone, PartialEq, FromRow)]
pub struct AdminUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    // 1 = active, 0 = inactive.
    pub is_active: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AdminUser {
    pub fn active(&self) -> bool {
        self.is_active != 0
    }
}

impl fmt::Debug for AdminUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminUser")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("is_active", &self.is_active)
            .finish_non_exhaustive()
    }
}

// --- Request Payloads (Input Schemas) ---

/// Request payloads validate themselves before reaching a handler (see `extract::Payload`).
pub trait Validate {
    fn validate(&self) -> Result<(), AppError>;
}

/// Distinguishes an absent field (`None`) from an explicit JSON `null` (`Some(None)`),
/// so partial updates can clear nullable columns.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), AppError> {
    let length = value.chars().count();
    if length < min || length > max {
        return Err(AppError::Validation(format!(
            "{field} deve ter entre {min} e {max} caracteres"
        )));
    }
    Ok(())
}

fn check_optional_length(field: &str, value: Option<&str>, max: usize) -> Result<(), AppError> {
    match value {
        Some(value) => check_length(field, value, 0, max),
        None => Ok(()),
    }
}

fn supplied(field: &Option<Option<String>>) -> Option<&str> {
    field.as_ref().and_then(|value| value.as_deref())
}

fn check_order(order: i32) -> Result<(), AppError> {
    if order < 0 {
        return Err(AppError::Validation(
            "order deve ser maior ou igual a 0".to_string(),
        ));
    }
    Ok(())
}

/// CreateEpisodeRequest
///
/// Input payload for `POST /api/admin/episodes`. `status` defaults to `DRAFT`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateEpisodeRequest {
    pub title: String,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub spotify_url: Option<String>,
    pub youtube_url: Option<String>,
    pub tags: Option<String>,
    pub status: Option<EpisodeStatus>,
}

impl Validate for CreateEpisodeRequest {
    fn validate(&self) -> Result<(), AppError> {
        check_length("title", &self.title, 1, 255)?;
        check_optional_length("cover_image_url", self.cover_image_url.as_deref(), 500)?;
        check_optional_length("spotify_url", self.spotify_url.as_deref(), 500)?;
        check_optional_length("youtube_url", self.youtube_url.as_deref(), 500)?;
        check_optional_length("tags", self.tags.as_deref(), 500)
    }
}

/// UpdateEpisodeRequest
///
/// Partial update payload for `PUT /api/admin/episodes/{id}`. Omitted fields are left
/// untouched; nullable fields sent as `null` are cleared.
///
/// Setting `status` here does not stamp `published_at`; only the publish transition does.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateEpisodeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    #[ts(type = "string | null")]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    #[ts(type = "string | null")]
    pub cover_image_url: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    #[ts(type = "string | null")]
    pub spotify_url: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    #[ts(type = "string | null")]
    pub youtube_url: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    #[ts(type = "string | null")]
    pub tags: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EpisodeStatus>,
}

impl Validate for UpdateEpisodeRequest {
    fn validate(&self) -> Result<(), AppError> {
        if let Some(title) = &self.title {
            check_length("title", title, 1, 255)?;
        }
        check_optional_length("cover_image_url", supplied(&self.cover_image_url), 500)?;
        check_optional_length("spotify_url", supplied(&self.spotify_url), 500)?;
        check_optional_length("youtube_url", supplied(&self.youtube_url), 500)?;
        check_optional_length("tags", supplied(&self.tags), 500)
    }
}

impl UpdateEpisodeRequest {
    /// Overwrites exactly the supplied fields of `episode`.
    pub fn apply_to(self, episode: &mut Episode) {
        if let Some(title) = self.title {
            episode.title = title;
        }
        if let Some(description) = self.description {
            episode.description = description;
        }
        if let Some(cover_image_url) = self.cover_image_url {
            episode.cover_image_url = cover_image_url;
        }
        if let Some(spotify_url) = self.spotify_url {
            episode.spotify_url = spotify_url;
        }
        if let Some(youtube_url) = self.youtube_url {
            episode.youtube_url = youtube_url;
        }
        if let Some(tags) = self.tags {
            episode.tags = tags;
        }
        if let Some(status) = self.status {
            episode.status = status;
        }
    }
}

/// CreateLinkRequest
///
/// Input payload for `POST /api/admin/links`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateLinkRequest {
    pub label: String,
    pub url: String,
    #[serde(rename = "type", default)]
    pub link_type: LinkType,
    #[serde(default)]
    pub order: i32,
}

impl Validate for CreateLinkRequest {
    fn validate(&self) -> Result<(), AppError> {
        check_length("label", &self.label, 1, 100)?;
        check_length("url", &self.url, 1, 500)?;
        check_order(self.order)
    }
}

/// UpdateLinkRequest
///
/// Partial update payload for `PUT /api/admin/links/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateLinkRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub link_type: Option<LinkType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

impl Validate for UpdateLinkRequest {
    fn validate(&self) -> Result<(), AppError> {
        if let Some(label) = &self.label {
            check_length("label", label, 1, 100)?;
        }
        if let Some(url) = &self.url {
            check_length("url", url, 1, 500)?;
        }
        match self.order {
            Some(order) => check_order(order),
            None => Ok(()),
        }
    }
}

impl UpdateLinkRequest {
    pub fn apply_to(self, link: &mut OfficialLink) {
        if let Some(label) = self.label {
            link.label = label;
        }
        if let Some(url) = self.url {
            link.url = url;
        }
        if let Some(link_type) = self.link_type {
            link.link_type = link_type;
        }
        if let Some(order) = self.order {
            link.order = order;
        }
    }
}

/// NewAdmin
///
/// Provisioning input for the credential store. The password is plaintext here and is
/// hashed by the repository before anything is persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Validate for NewAdmin {
    fn validate(&self) -> Result<(), AppError> {
        check_length("name", &self.name, 1, 100)?;
        check_email(&self.email)?;
        check_password(&self.password)
    }
}

/// UpdateAdminRequest
///
/// Partial update of an administrator account. A new password is re-hashed.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateAdminRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
}

impl Validate for UpdateAdminRequest {
    fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = &self.name {
            check_length("name", name, 1, 100)?;
        }
        if let Some(email) = &self.email {
            check_email(email)?;
        }
        match &self.password {
            Some(password) => check_password(password),
            None => Ok(()),
        }
    }
}

fn check_email(email: &str) -> Result<(), AppError> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(AppError::Validation("email inválido".to_string()));
    }
    check_length("email", email, 3, 255)
}

fn check_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < 8 {
        return Err(AppError::Validation(
            "password deve ter pelo menos 8 caracteres".to_string(),
        ));
    }
    Ok(())
}

/// LoginRequest
///
/// Input payload for `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    #[schema(example = "admin@metocast.com")]
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), AppError> {
        check_email(&self.email)
    }
}

// --- Query Parameters ---

/// Pagination
///
/// `skip`/`limit` query parameters of the public episode listing.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    /// Number of records to skip.
    #[serde(default)]
    #[param(minimum = 0)]
    pub skip: i64,
    /// Maximum number of records to return.
    #[serde(default = "default_limit")]
    #[param(minimum = 1, maximum = 100)]
    pub limit: i64,
}

fn default_limit() -> i64 {
    MAX_PAGE_SIZE
}

fn check_page(skip: i64, limit: i64) -> Result<(), AppError> {
    if skip < 0 {
        return Err(AppError::Validation("skip deve ser maior ou igual a 0".to_string()));
    }
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit deve estar entre 1 e {MAX_PAGE_SIZE}"
        )));
    }
    Ok(())
}

impl Validate for Pagination {
    fn validate(&self) -> Result<(), AppError> {
        check_page(self.skip, self.limit)
    }
}

/// EpisodeFilter
///
/// Query parameters of the admin episode listing. `status` is kept as raw text so an
/// unknown value can be answered with a precise 400.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EpisodeFilter {
    #[serde(default)]
    #[param(minimum = 0)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    #[param(minimum = 1, maximum = 100)]
    pub limit: i64,
    /// DRAFT or PUBLISHED.
    pub status: Option<String>,
}

impl EpisodeFilter {
    /// An empty `status` means no filter.
    pub fn status(&self) -> Result<Option<EpisodeStatus>, AppError> {
        match self.status.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some),
        }
    }
}

impl Validate for EpisodeFilter {
    fn validate(&self) -> Result<(), AppError> {
        check_page(self.skip, self.limit)?;
        self.status().map(|_| ())
    }
}

// --- Response Schemas (Output) ---

/// TokenResponse
///
/// Output of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct TokenResponse {
    pub access_token: String,
    #[schema(example = "bearer")]
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// AdminProfile
///
/// Output schema for `GET /api/auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AdminProfile {
    #[ts(type = "number")]
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_active: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl From<AdminUser> for AdminProfile {
    fn from(admin: AdminUser) -> Self {
        Self {
            id: admin.id,
            name: admin.name,
            email: admin.email,
            role: admin.role,
            is_active: admin.is_active,
            created_at: admin.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
}

/// ServiceInfo
///
/// Output of `GET /`: service name, version, and where to find the docs.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
    pub docs: String,
    pub health: String,
}
