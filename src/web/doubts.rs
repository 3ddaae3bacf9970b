use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::auth::CurrentUser;
use crate::database::{Database, DoubtRow};
use crate::models::{
    CreateDoubtRequest, Doubt, DoubtListQuery, DoubtReply, MarkSolutionRequest, ReplyRequest, User,
};
use crate::web::{groups::group_response, not_found, ApiError, AppState};

/// Builds the full doubt representation: group, participants, replies.
pub(crate) async fn doubt_response(db: &Database, row: DoubtRow) -> Result<Doubt, ApiError> {
    let group = group_response(db, db.get_group(row.group_id).await?).await?;
    let asked_by = User::from(db.get_user_by_id(row.asked_by).await?);

    let directed_to = match row.directed_to {
        Some(user_id) => Some(User::from(db.get_user_by_id(user_id).await?)),
        None => None,
    };

    let mut replies = Vec::new();
    for reply in db.list_replies(row.id).await? {
        let user = User::from(db.get_user_by_id(reply.user_id).await?);
        replies.push(DoubtReply::from_row(reply, user));
    }

    Ok(Doubt::from_row(row, group, asked_by, directed_to, replies))
}

async fn doubt_responses(db: &Database, rows: Vec<DoubtRow>) -> Result<Vec<Doubt>, ApiError> {
    let mut doubts = Vec::with_capacity(rows.len());
    for row in rows {
        doubts.push(doubt_response(db, row).await?);
    }

    Ok(doubts)
}

/// All doubts, newest first, optionally filtered by group.
pub async fn list_doubts(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<DoubtListQuery>,
) -> Result<Json<Vec<Doubt>>, ApiError> {
    let rows = state.db.list_doubts(query.group_id).await?;

    Ok(Json(doubt_responses(&state.db, rows).await?))
}

/// Ask a doubt in a group, optionally directed at a specific member.
pub async fn create_doubt(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateDoubtRequest>,
) -> Result<(StatusCode, Json<Doubt>), ApiError> {
    let (Some(group_id), Some(title), Some(body)) = (
        req.group_id,
        req.title.as_deref().filter(|s| !s.is_empty()),
        req.body.as_deref().filter(|s| !s.is_empty()),
    ) else {
        return Err(ApiError::Validation(
            "group_id, title and body are required.".to_string(),
        ));
    };

    let group = state
        .db
        .get_group(group_id)
        .await
        .map_err(not_found("Group not found."))?;

    if !state.db.is_member(group.id, user.id).await? {
        return Err(ApiError::Forbidden(
            "You must be a member of this group to ask a doubt.".to_string(),
        ));
    }

    let directed_to = match req.directed_to_id {
        Some(directed_to_id) => {
            let target = state
                .db
                .get_user_by_id(directed_to_id)
                .await
                .map_err(not_found("Target user not found."))?;

            if !state.db.is_member(group.id, target.id).await? {
                return Err(ApiError::Validation(
                    "Target user is not a member of this group.".to_string(),
                ));
            }

            Some(target.id)
        }
        None => None,
    };

    let row = state
        .db
        .create_doubt(group.id, user.id, directed_to, title, body)
        .await?;

    tracing::info!(doubt_id = row.id, group_id, user_id = user.id, "Doubt created");

    let doubt = doubt_response(&state.db, row).await?;

    Ok((StatusCode::CREATED, Json(doubt)))
}

/// Doubts directed specifically at the logged-in user.
pub async fn assigned_doubts(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Doubt>>, ApiError> {
    let rows = state.db.list_doubts_directed_to(user.id).await?;

    Ok(Json(doubt_responses(&state.db, rows).await?))
}

/// Reply to a doubt. Open to every member of the doubt's group.
pub async fn reply_to_doubt(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(doubt_id): Path<i64>,
    Json(req): Json<ReplyRequest>,
) -> Result<(StatusCode, Json<DoubtReply>), ApiError> {
    let Some(text) = req.text.as_deref().filter(|s| !s.is_empty()) else {
        return Err(ApiError::Validation("Reply text is required.".to_string()));
    };

    let doubt = state
        .db
        .get_doubt(doubt_id)
        .await
        .map_err(not_found("Doubt not found."))?;

    if !state.db.is_member(doubt.group_id, user.id).await? {
        return Err(ApiError::Forbidden(
            "You must be a member of this group to reply.".to_string(),
        ));
    }

    let row = state.db.create_reply(doubt.id, user.id, text).await?;

    tracing::info!(reply_id = row.id, doubt_id, user_id = user.id, "Reply created");

    let reply = DoubtReply::from_row(row, User::from(user));

    Ok((StatusCode::CREATED, Json(reply)))
}

/// Mark a reply as the accepted answer. Asker only; re-marking moves the
/// flag and the doubt stays answered.
pub async fn mark_solution(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(doubt_id): Path<i64>,
    Json(req): Json<MarkSolutionRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Some(reply_id) = req.reply_id else {
        return Err(ApiError::Validation("reply_id is required.".to_string()));
    };

    let doubt = state
        .db
        .get_doubt(doubt_id)
        .await
        .map_err(not_found("Doubt not found."))?;

    if doubt.asked_by != user.id {
        return Err(ApiError::Forbidden(
            "Only the person who asked the doubt can mark a solution.".to_string(),
        ));
    }

    let reply = state
        .db
        .get_reply(doubt.id, reply_id)
        .await
        .map_err(not_found("Reply not found for this doubt."))?;

    state.db.mark_solution(doubt.id, reply.id).await?;

    tracing::info!(doubt_id, reply_id, "Solution marked");

    Ok(Json(serde_json::json!({
        "message": "Solution marked successfully.",
    })))
}

#[cfg(test)]
mod tests {
    use axum::extract::{Path, Query, State};
    use axum::http::StatusCode;
    use axum::Json;

    use super::*;
    use crate::auth::CurrentUser;
    use crate::models::{CreateGroupRequest, DoubtStatus};
    use crate::web::{groups, testing};

    /// A group created by alice that bob has joined.
    async fn group_with_members() -> (AppState, CurrentUser, CurrentUser, i64) {
        let state = testing::state().await;
        let alice = testing::signed_in(&state, "alice").await;
        let bob = testing::signed_in(&state, "bob").await;

        let (_, Json(group)) = groups::create_group(
            State(state.clone()),
            alice.clone(),
            Json(CreateGroupRequest {
                name: Some("CS101".to_string()),
                description: None,
            }),
        )
        .await
        .unwrap();

        groups::join_group(State(state.clone()), bob.clone(), Path(group.id))
            .await
            .unwrap();

        (state, alice, bob, group.id)
    }

    fn doubt_request(group_id: i64, directed_to_id: Option<i64>) -> Json<CreateDoubtRequest> {
        Json(CreateDoubtRequest {
            group_id: Some(group_id),
            title: Some("Lifetimes".to_string()),
            body: Some("Why does this borrow fail?".to_string()),
            directed_to_id,
        })
    }

    #[tokio::test]
    async fn asking_requires_membership() {
        let (state, _alice, _bob, group_id) = group_with_members().await;
        let carol = testing::signed_in(&state, "carol").await;

        let err = create_doubt(State(state.clone()), carol, doubt_request(group_id, None))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn directed_target_must_exist_and_be_member() {
        let (state, alice, _bob, group_id) = group_with_members().await;
        let carol = testing::signed_in(&state, "carol").await;

        let err = create_doubt(
            State(state.clone()),
            alice.clone(),
            doubt_request(group_id, Some(9999)),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err = create_doubt(
            State(state.clone()),
            alice,
            doubt_request(group_id, Some(carol.id)),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn create_doubt_starts_open_and_directed_listing_works() {
        let (state, alice, bob, group_id) = group_with_members().await;

        let (status, Json(doubt)) = create_doubt(
            State(state.clone()),
            alice,
            doubt_request(group_id, Some(bob.id)),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(doubt.status, DoubtStatus::Open);
        assert_eq!(doubt.directed_to.as_ref().map(|u| u.id), Some(bob.id));

        let Json(assigned) = assigned_doubts(State(state.clone()), bob).await.unwrap();
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].id, doubt.id);
    }

    #[tokio::test]
    async fn reply_requires_membership_and_text() {
        let (state, alice, _bob, group_id) = group_with_members().await;
        let carol = testing::signed_in(&state, "carol").await;

        let (_, Json(doubt)) =
            create_doubt(State(state.clone()), alice.clone(), doubt_request(group_id, None))
                .await
                .unwrap();

        let err = reply_to_doubt(
            State(state.clone()),
            alice,
            Path(doubt.id),
            Json(ReplyRequest { text: None }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = reply_to_doubt(
            State(state.clone()),
            carol,
            Path(doubt.id),
            Json(ReplyRequest {
                text: Some("An answer".to_string()),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn mark_solution_moves_flag_and_answers_doubt() {
        let (state, alice, bob, group_id) = group_with_members().await;

        let (_, Json(doubt)) =
            create_doubt(State(state.clone()), alice.clone(), doubt_request(group_id, None))
                .await
                .unwrap();

        let (_, Json(first)) = reply_to_doubt(
            State(state.clone()),
            bob.clone(),
            Path(doubt.id),
            Json(ReplyRequest {
                text: Some("Try a scope".to_string()),
            }),
        )
        .await
        .unwrap();
        let (_, Json(second)) = reply_to_doubt(
            State(state.clone()),
            bob.clone(),
            Path(doubt.id),
            Json(ReplyRequest {
                text: Some("Or clone it".to_string()),
            }),
        )
        .await
        .unwrap();

        mark_solution(
            State(state.clone()),
            alice.clone(),
            Path(doubt.id),
            Json(MarkSolutionRequest {
                reply_id: Some(first.id),
            }),
        )
        .await
        .unwrap();
        mark_solution(
            State(state.clone()),
            alice,
            Path(doubt.id),
            Json(MarkSolutionRequest {
                reply_id: Some(second.id),
            }),
        )
        .await
        .unwrap();

        let replies = state.db.list_replies(doubt.id).await.unwrap();
        let solutions: Vec<_> = replies.iter().filter(|r| r.is_solution).collect();
        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions[0].id, second.id);

        let stored = state.db.get_doubt(doubt.id).await.unwrap();
        assert_eq!(stored.status, "answered");
    }

    #[tokio::test]
    async fn only_asker_marks_solutions() {
        let (state, alice, bob, group_id) = group_with_members().await;

        let (_, Json(doubt)) =
            create_doubt(State(state.clone()), alice.clone(), doubt_request(group_id, None))
                .await
                .unwrap();
        let (_, Json(reply)) = reply_to_doubt(
            State(state.clone()),
            bob.clone(),
            Path(doubt.id),
            Json(ReplyRequest {
                text: Some("An answer".to_string()),
            }),
        )
        .await
        .unwrap();

        let err = mark_solution(
            State(state.clone()),
            bob,
            Path(doubt.id),
            Json(MarkSolutionRequest {
                reply_id: Some(reply.id),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        // A reply id that belongs to another doubt reads as absent.
        let (_, Json(other)) =
            create_doubt(State(state.clone()), alice.clone(), doubt_request(group_id, None))
                .await
                .unwrap();
        let err = mark_solution(
            State(state.clone()),
            alice,
            Path(other.id),
            Json(MarkSolutionRequest {
                reply_id: Some(reply.id),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn listing_filters_by_group() {
        let (state, alice, _bob, group_id) = group_with_members().await;

        let (_, Json(other_group)) = groups::create_group(
            State(state.clone()),
            alice.clone(),
            Json(CreateGroupRequest {
                name: Some("Rust Study".to_string()),
                description: None,
            }),
        )
        .await
        .unwrap();

        create_doubt(State(state.clone()), alice.clone(), doubt_request(group_id, None))
            .await
            .unwrap();
        create_doubt(
            State(state.clone()),
            alice.clone(),
            doubt_request(other_group.id, None),
        )
        .await
        .unwrap();

        let Json(all) = list_doubts(
            State(state.clone()),
            alice.clone(),
            Query(DoubtListQuery { group_id: None }),
        )
        .await
        .unwrap();
        assert_eq!(all.len(), 2);

        let Json(filtered) = list_doubts(
            State(state.clone()),
            alice,
            Query(DoubtListQuery {
                group_id: Some(other_group.id),
            }),
        )
        .await
        .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].group.id, other_group.id);
    }
}
