use axum::{extract::State, http::StatusCode, Json};

use crate::auth::{self, CurrentUser};
use crate::database::DatabaseError;
use crate::models::{LoginRequest, Profile, RegisterRequest, UpdateProfileRequest, User};
use crate::web::{ApiError, AppState};

/// Create a new account.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let (Some(username), Some(email), Some(password)) = (
        req.username.as_deref().filter(|s| !s.is_empty()),
        req.email.as_deref().filter(|s| !s.is_empty()),
        req.password.as_deref().filter(|s| !s.is_empty()),
    ) else {
        return Err(ApiError::Validation(
            "username, email and password are required.".to_string(),
        ));
    };

    let password_hash = auth::hash_password(password)?;

    let user_id = state
        .db
        .create_user(username, email, &password_hash)
        .await
        .map_err(|e| match e {
            DatabaseError::Conflict(_) => {
                ApiError::Conflict("A user with that username already exists.".to_string())
            }
            e => e.into(),
        })?;

    let user = User::from(state.db.get_user_by_id(user_id).await?);

    tracing::info!(user_id, username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "User registered successfully",
            "user": user,
        })),
    ))
}

/// Exchange credentials for a bearer session token.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (Some(username), Some(password)) = (
        req.username.as_deref().filter(|s| !s.is_empty()),
        req.password.as_deref().filter(|s| !s.is_empty()),
    ) else {
        return Err(ApiError::Validation(
            "username and password are required.".to_string(),
        ));
    };

    let user = state
        .db
        .get_user_by_username(username)
        .await
        .map_err(|e| match e {
            DatabaseError::NotFound(_) => {
                ApiError::Unauthorized("Invalid username or password.".to_string())
            }
            e => e.into(),
        })?;

    if !auth::verify_password(&user.password_hash, password) {
        return Err(ApiError::Unauthorized(
            "Invalid username or password.".to_string(),
        ));
    }

    let token = auth::generate_session_token();
    state
        .db
        .create_session(user.id, &token, auth::session_expiry())
        .await?;

    tracing::info!(user_id = user.id, username, "User logged in");

    Ok(Json(serde_json::json!({
        "token": token,
        "user": User::from(user),
    })))
}

/// The logged-in user's profile, created empty on first access.
pub async fn profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let profile = Profile::from(state.db.get_or_create_profile(user.id).await?);

    Ok(Json(serde_json::json!({
        "user": User::from(user),
        "profile": profile,
    })))
}

/// Update bio, skills and interests; absent fields are left alone.
pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let profile = Profile::from(
        state
            .db
            .update_profile(
                user.id,
                req.bio.as_deref(),
                req.skills.as_deref(),
                req.interests.as_deref(),
            )
            .await?,
    );

    tracing::info!(user_id = user.id, "Profile updated");

    Ok(Json(serde_json::json!({
        "message": "Profile updated successfully",
        "profile": profile,
    })))
}
