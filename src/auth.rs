//! Session-token identity layer.
//!
//! Credentials are stored as argon2 hashes; a successful login issues an
//! opaque UUIDv7 bearer token persisted in the sessions table. Handlers
//! take the acting user as an explicit [`CurrentUser`] argument, resolved
//! from the `Authorization` header per request.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use uuid::Uuid;

use crate::database::UserRow;
use crate::web::{ApiError, AppState};

/// Sessions expire a week after login.
pub const SESSION_TTL_SECS: i64 = 60 * 60 * 24 * 7;

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

pub fn verify_password(hash: &str, password: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

pub fn generate_session_token() -> String {
    Uuid::now_v7().to_string()
}

pub fn session_expiry() -> i64 {
    chrono::Utc::now().timestamp() + SESSION_TTL_SECS
}

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<UserRow> for CurrentUser {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
        }
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| {
                ApiError::Unauthorized("Authentication credentials were not provided.".to_string())
            })?;

        let now = chrono::Utc::now().timestamp();
        let user = state
            .db
            .session_user(token, now)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token.".to_string()))?;

        Ok(user.into())
    }
}
