use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::CurrentUser;
use crate::database::{Database, GroupRow};
use crate::models::{CreateGroupRequest, Group, Membership, User};
use crate::web::{not_found, ApiError, AppState};

/// Attaches the creator and member count a group response carries.
pub(crate) async fn group_response(db: &Database, row: GroupRow) -> Result<Group, ApiError> {
    let created_by = User::from(db.get_user_by_id(row.created_by).await?);
    let members_count = db.count_members(row.id).await?;

    Ok(Group::from_row(row, created_by, members_count))
}

async fn group_responses(db: &Database, rows: Vec<GroupRow>) -> Result<Vec<Group>, ApiError> {
    let mut groups = Vec::with_capacity(rows.len());
    for row in rows {
        groups.push(group_response(db, row).await?);
    }

    Ok(groups)
}

/// All groups, newest first.
pub async fn list_groups(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Vec<Group>>, ApiError> {
    let rows = state.db.list_groups().await?;

    Ok(Json(group_responses(&state.db, rows).await?))
}

/// Create a group; the creator becomes its first member.
pub async fn create_group(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), ApiError> {
    let Some(name) = req.name.as_deref().filter(|s| !s.is_empty()) else {
        return Err(ApiError::Validation("Group name is required.".to_string()));
    };
    let description = req.description.as_deref().unwrap_or("");

    let group_id = state.db.create_group(name, description, user.id).await?;
    let group = group_response(&state.db, state.db.get_group(group_id).await?).await?;

    tracing::info!(group_id, name, user_id = user.id, "Group created");

    Ok((StatusCode::CREATED, Json(group)))
}

/// Groups where the logged-in user is a member.
pub async fn my_groups(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Group>>, ApiError> {
    let rows = state.db.list_groups_for_user(user.id).await?;

    Ok(Json(group_responses(&state.db, rows).await?))
}

/// Join a group by its id.
pub async fn join_group(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(group_id): Path<i64>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let group = state
        .db
        .get_group(group_id)
        .await
        .map_err(not_found("Group not found."))?;

    if state.db.is_member(group.id, user.id).await? {
        return Err(ApiError::Conflict(
            "You are already a member of this group.".to_string(),
        ));
    }

    let row = state.db.add_member(group.id, user.id).await?;
    let membership = Membership::from_row(row, User::from(user.clone()));

    tracing::info!(group_id, user_id = user.id, "Member joined group");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Joined group successfully.",
            "membership": membership,
        })),
    ))
}

/// Leave a group by its id. The last member, the owner included, may
/// leave; the group then simply has no members.
pub async fn leave_group(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(group_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let group = state
        .db
        .get_group(group_id)
        .await
        .map_err(not_found("Group not found."))?;

    if !state.db.remove_member(group.id, user.id).await? {
        return Err(ApiError::Conflict(
            "You are not a member of this group.".to_string(),
        ));
    }

    tracing::info!(group_id, user_id = user.id, "Member left group");

    Ok(Json(serde_json::json!({
        "message": "Left group successfully.",
    })))
}
