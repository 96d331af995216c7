use axum::{
    extract::{FromRef, FromRequestParts, Request},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{config::AppConfig, error::AppError, models::AdminUser, repository::RepositoryState};

/// Claims
///
/// Payload of an access token. The subject is the administrator's email; the account is
/// looked up again on every request, so a deactivated admin loses access immediately even
/// though the token itself stays valid until `exp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the administrator's email.
    pub sub: String,
    /// Expiration time (exp), seconds since the epoch.
    pub exp: i64,
    /// Issued at (iat), seconds since the epoch.
    pub iat: i64,
}

/// issue_token
///
/// Signs an HS256 token for `subject` that expires `ttl` from now.
pub fn issue_token(subject: &str, ttl: Duration, secret: &str) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: subject.to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
}

/// verify_token
///
/// Returns the subject of a well-formed, correctly signed, unexpired token. Every failure
/// collapses into the same `Unauthorized` so callers cannot tell them apart.
pub fn verify_token(token: &str, secret: &str) -> Result<String, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!(kind = ?e.kind(), "rejected bearer token");
        AppError::invalid_credentials()
    })?;

    if data.claims.sub.is_empty() {
        return Err(AppError::invalid_credentials());
    }
    Ok(data.claims.sub)
}

/// The token part of an `Authorization: Bearer <token>` header, if there is one.
/// The scheme name matches case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
}

/// AuthAdmin
///
/// The resolved identity of an authenticated request. Usable as a handler argument; also
/// run by `require_admin` in front of the whole admin router.
#[derive(Debug, Clone)]
pub struct AuthAdmin(pub AdminUser);

/// Resolution order:
/// 1. An identity already resolved by `require_admin` for this request is reused.
/// 2. The bearer token is extracted and verified.
/// 3. The subject is looked up in the credential store; missing or inactive accounts are rejected.
///
/// Rejection: `AppError::Unauthorized` (401 with a `WWW-Authenticate: Bearer` challenge).
impl<S> FromRequestParts<S> for AuthAdmin
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(resolved) = parts.extensions.get::<AuthAdmin>() {
            return Ok(resolved.clone());
        }

        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let token = bearer_token(&parts.headers).ok_or_else(AppError::invalid_credentials)?;
        let email = verify_token(token, &config.jwt_secret)?;

        let admin = repo
            .find_admin_by_email(&email)
            .await?
            .filter(AdminUser::active)
            .ok_or_else(AppError::invalid_credentials)?;

        Ok(AuthAdmin(admin))
    }
}

/// require_admin
///
/// Route layer for the admin router. Rejects the request before any handler runs unless
/// `AuthAdmin` resolves, then stores the identity in the request extensions.
pub async fn require_admin(admin: AuthAdmin, mut request: Request, next: Next) -> Response {
    tracing::debug!(admin_id = admin.0.id, "admin request authorized");
    request.extensions_mut().insert(admin);
    next.run(request).await
}
