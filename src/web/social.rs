use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::CurrentUser;
use crate::database::{Database, FriendRequestRow};
use crate::models::{
    FriendRequest, RespondAction, RespondRequest, SendFriendRequestBody, User,
};
use crate::web::{not_found, ApiError, AppState};

async fn request_response(db: &Database, row: FriendRequestRow) -> Result<FriendRequest, ApiError> {
    let sender = User::from(db.get_user_by_id(row.sender_id).await?);
    let receiver = User::from(db.get_user_by_id(row.receiver_id).await?);

    Ok(FriendRequest::from_row(row, sender, receiver))
}

/// Send a friend request to another user. Only the sender-to-receiver
/// direction is checked for duplicates; a rejected request never blocks a
/// resend.
pub async fn send_friend_request(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<SendFriendRequestBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let Some(receiver_id) = req.receiver_id else {
        return Err(ApiError::Validation("receiver_id is required".to_string()));
    };

    if receiver_id == user.id {
        return Err(ApiError::Validation(
            "You cannot send a friend request to yourself.".to_string(),
        ));
    }

    let receiver = state
        .db
        .get_user_by_id(receiver_id)
        .await
        .map_err(not_found("Receiver user not found."))?;

    if state.db.has_active_request(user.id, receiver.id).await? {
        return Err(ApiError::Conflict(
            "Friend request already sent or already friends.".to_string(),
        ));
    }

    let row = state.db.create_friend_request(user.id, receiver.id).await?;

    tracing::info!(
        request_id = row.id,
        sender_id = user.id,
        receiver_id,
        "Friend request sent"
    );

    let request = request_response(&state.db, row).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Friend request sent.",
            "request": request,
        })),
    ))
}

/// Pending requests received by the logged-in user, newest first.
pub async fn pending_requests(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<FriendRequest>>, ApiError> {
    let rows = state.db.list_pending_requests(user.id).await?;

    let mut requests = Vec::with_capacity(rows.len());
    for row in rows {
        requests.push(request_response(&state.db, row).await?);
    }

    Ok(Json(requests))
}

/// Accept or reject a request addressed to the logged-in user. Responding
/// again to an already-handled request is allowed and simply overwrites
/// the status.
pub async fn respond_to_request(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(request_id): Path<i64>,
    Json(req): Json<RespondRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let row = state
        .db
        .get_request_for_receiver(request_id, user.id)
        .await
        .map_err(not_found("Friend request not found."))?;

    let action: RespondAction = req
        .action
        .as_deref()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            ApiError::Validation("Invalid action. Use 'accept' or 'reject'.".to_string())
        })?;

    let status = action.status();
    state.db.set_request_status(row.id, status.as_str()).await?;

    tracing::info!(
        request_id,
        receiver_id = user.id,
        status = status.as_str(),
        "Friend request handled"
    );

    let updated = state.db.get_friend_request(row.id).await?;
    let request = request_response(&state.db, updated).await?;

    Ok(Json(serde_json::json!({
        "message": format!("Friend request {}.", status),
        "request": request,
    })))
}

/// Everyone connected to the logged-in user through an accepted request,
/// either direction, deduplicated.
pub async fn friends(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<User>>, ApiError> {
    let rows = state.db.list_friends(user.id).await?;

    Ok(Json(rows.into_iter().map(User::from).collect()))
}

#[cfg(test)]
mod tests {
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::Json;

    use super::*;
    use crate::models::RequestStatus;
    use crate::web::testing;

    fn send_body(receiver_id: i64) -> Json<SendFriendRequestBody> {
        Json(SendFriendRequestBody {
            receiver_id: Some(receiver_id),
        })
    }

    fn respond_body(action: &str) -> Json<RespondRequest> {
        Json(RespondRequest {
            action: Some(action.to_string()),
        })
    }

    #[tokio::test]
    async fn cannot_friend_yourself() {
        let state = testing::state().await;
        let alice = testing::signed_in(&state, "alice").await;

        let err = send_friend_request(State(state.clone()), alice.clone(), send_body(alice.id))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_receiver_is_not_found() {
        let state = testing::state().await;
        let alice = testing::signed_in(&state, "alice").await;

        let err = send_friend_request(State(state.clone()), alice, send_body(9999))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn duplicate_request_conflicts_until_rejected() {
        let state = testing::state().await;
        let alice = testing::signed_in(&state, "alice").await;
        let bob = testing::signed_in(&state, "bob").await;

        let (status, Json(body)) =
            send_friend_request(State(state.clone()), alice.clone(), send_body(bob.id))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        let request_id = body["request"]["id"].as_i64().unwrap();

        let err = send_friend_request(State(state.clone()), alice.clone(), send_body(bob.id))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));

        respond_to_request(
            State(state.clone()),
            bob.clone(),
            Path(request_id),
            respond_body("reject"),
        )
        .await
        .unwrap();

        // A rejected request does not block resubmission.
        send_friend_request(State(state.clone()), alice, send_body(bob.id))
            .await
            .expect("resend after rejection");
    }

    #[tokio::test]
    async fn opposite_direction_requests_coexist() {
        let state = testing::state().await;
        let alice = testing::signed_in(&state, "alice").await;
        let bob = testing::signed_in(&state, "bob").await;

        send_friend_request(State(state.clone()), alice.clone(), send_body(bob.id))
            .await
            .unwrap();
        send_friend_request(State(state.clone()), bob.clone(), send_body(alice.id))
            .await
            .expect("reverse direction is not checked");

        let Json(for_alice) = pending_requests(State(state.clone()), alice).await.unwrap();
        let Json(for_bob) = pending_requests(State(state.clone()), bob).await.unwrap();
        assert_eq!(for_alice.len(), 1);
        assert_eq!(for_bob.len(), 1);
    }

    #[tokio::test]
    async fn responding_validates_action_and_addressee() {
        let state = testing::state().await;
        let alice = testing::signed_in(&state, "alice").await;
        let bob = testing::signed_in(&state, "bob").await;

        let (_, Json(body)) =
            send_friend_request(State(state.clone()), alice.clone(), send_body(bob.id))
                .await
                .unwrap();
        let request_id = body["request"]["id"].as_i64().unwrap();

        // Only the receiver may respond.
        let err = respond_to_request(
            State(state.clone()),
            alice,
            Path(request_id),
            respond_body("accept"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err = respond_to_request(
            State(state.clone()),
            bob.clone(),
            Path(request_id),
            respond_body("maybe"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let Json(body) = respond_to_request(
            State(state.clone()),
            bob,
            Path(request_id),
            respond_body("accept"),
        )
        .await
        .unwrap();
        assert_eq!(body["message"], "Friend request accepted.");
    }

    #[tokio::test]
    async fn responding_again_overwrites_status() {
        let state = testing::state().await;
        let alice = testing::signed_in(&state, "alice").await;
        let bob = testing::signed_in(&state, "bob").await;

        let (_, Json(body)) =
            send_friend_request(State(state.clone()), alice, send_body(bob.id))
                .await
                .unwrap();
        let request_id = body["request"]["id"].as_i64().unwrap();

        respond_to_request(
            State(state.clone()),
            bob.clone(),
            Path(request_id),
            respond_body("reject"),
        )
        .await
        .unwrap();
        respond_to_request(
            State(state.clone()),
            bob.clone(),
            Path(request_id),
            respond_body("accept"),
        )
        .await
        .expect("re-responding is allowed");

        let stored = state.db.get_friend_request(request_id).await.unwrap();
        assert_eq!(
            stored.status.parse::<RequestStatus>().unwrap(),
            RequestStatus::Accepted
        );
    }

    #[tokio::test]
    async fn friends_lists_both_directions_once() {
        let state = testing::state().await;
        let alice = testing::signed_in(&state, "alice").await;
        let bob = testing::signed_in(&state, "bob").await;
        let carol = testing::signed_in(&state, "carol").await;

        // alice -> bob, accepted; carol -> alice, accepted; and a second
        // accepted pair bob -> alice to prove dedup.
        for (sender, receiver) in [(&alice, &bob), (&carol, &alice), (&bob, &alice)] {
            let (_, Json(body)) = send_friend_request(
                State(state.clone()),
                (*sender).clone(),
                send_body(receiver.id),
            )
            .await
            .unwrap();
            let request_id = body["request"]["id"].as_i64().unwrap();
            respond_to_request(
                State(state.clone()),
                (*receiver).clone(),
                Path(request_id),
                respond_body("accept"),
            )
            .await
            .unwrap();
        }

        let Json(friends_of_alice) = friends(State(state.clone()), alice).await.unwrap();
        let mut names: Vec<_> = friends_of_alice.iter().map(|u| u.username.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["bob", "carol"]);
    }
}
