//! HTTP surface: application state, error mapping, and the route table.

pub mod accounts;
pub mod doubts;
pub mod groups;
pub mod posts;
pub mod social;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use crate::database::{Database, DatabaseError};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

/// Request-level error, rendered as `{"detail": ...}` JSON. Conflict maps
/// to 400 rather than 409, matching the wire contract.
#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Validation(msg) | ApiError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => {
                tracing::error!("{}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error.".to_string(),
                )
            }
        };

        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::NotFound(msg),
            DatabaseError::Conflict(msg) => ApiError::Conflict(msg),
            err => ApiError::Internal(err.to_string()),
        }
    }
}

/// Replaces a store-level NotFound with the endpoint's own wording; other
/// errors pass through untouched.
pub(crate) fn not_found(detail: &'static str) -> impl FnOnce(DatabaseError) -> ApiError {
    move |err| match err {
        DatabaseError::NotFound(_) => ApiError::NotFound(detail.to_string()),
        err => err.into(),
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts/register", post(accounts::register))
        .route("/accounts/login", post(accounts::login))
        .route(
            "/accounts/profile",
            get(accounts::profile).put(accounts::update_profile),
        )
        .route("/groups/", get(groups::list_groups).post(groups::create_group))
        .route("/groups/my/", get(groups::my_groups))
        .route("/groups/{group_id}/join/", post(groups::join_group))
        .route("/groups/{group_id}/leave/", post(groups::leave_group))
        .route("/doubts/", get(doubts::list_doubts).post(doubts::create_doubt))
        .route("/doubts/assigned/", get(doubts::assigned_doubts))
        .route("/doubts/{doubt_id}/reply/", post(doubts::reply_to_doubt))
        .route("/doubts/{doubt_id}/solution/", post(doubts::mark_solution))
        .route("/friends/send/", post(social::send_friend_request))
        .route("/friends/requests/", get(social::pending_requests))
        .route(
            "/friends/requests/{request_id}/respond/",
            post(social::respond_to_request),
        )
        .route("/friends/", get(social::friends))
        .route("/posts/", get(posts::list_posts).post(posts::create_post))
        .route("/posts/{post_id}/comment/", post(posts::add_comment))
        .route("/posts/{post_id}/react/", post(posts::react_to_post))
}
