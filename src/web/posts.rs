use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::CurrentUser;
use crate::database::{Database, PostRow};
use crate::models::{
    Comment, CommentRequest, CreatePostRequest, Post, Reaction, ReactionRequest, User,
};
use crate::web::{not_found, ApiError, AppState};

/// Builds the full post representation: author, group name, comments and
/// the reaction count.
pub(crate) async fn post_response(db: &Database, row: PostRow) -> Result<Post, ApiError> {
    let author = User::from(db.get_user_by_id(row.author_id).await?);

    let group_name = match row.group_id {
        Some(group_id) => Some(db.get_group(group_id).await?.name),
        None => None,
    };

    let mut comments = Vec::new();
    for comment in db.list_comments(row.id).await? {
        let user = User::from(db.get_user_by_id(comment.user_id).await?);
        comments.push(Comment::from_row(comment, user));
    }

    let interactions_count = db.count_interactions(row.id).await?;

    Ok(Post::from_row(row, author, group_name, comments, interactions_count))
}

/// All posts, newest first.
pub async fn list_posts(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Vec<Post>>, ApiError> {
    let rows = state.db.list_posts().await?;

    let mut posts = Vec::with_capacity(rows.len());
    for row in rows {
        posts.push(post_response(&state.db, row).await?);
    }

    Ok(Json(posts))
}

/// Create a post, optionally scoped to a group. `post_type` is taken as
/// given and defaults to "question".
pub async fn create_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let Some(content) = req.content.as_deref().filter(|s| !s.is_empty()) else {
        return Err(ApiError::Validation("Content is required.".to_string()));
    };

    let group_id = match req.group_id {
        Some(group_id) => Some(
            state
                .db
                .get_group(group_id)
                .await
                .map_err(not_found("Invalid group ID."))?
                .id,
        ),
        None => None,
    };

    let post_type = req.post_type.as_deref().unwrap_or("question");

    let row = state
        .db
        .create_post(user.id, group_id, content, post_type, req.image.as_deref())
        .await?;

    tracing::info!(post_id = row.id, user_id = user.id, post_type, "Post created");

    let post = post_response(&state.db, row).await?;

    Ok((StatusCode::CREATED, Json(post)))
}

/// Comment on a post.
pub async fn add_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(post_id): Path<i64>,
    Json(req): Json<CommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let Some(text) = req.text.as_deref().filter(|s| !s.is_empty()) else {
        return Err(ApiError::Validation("Comment text required".to_string()));
    };

    let post = state
        .db
        .get_post(post_id)
        .await
        .map_err(not_found("Post not found"))?;

    let row = state.db.create_comment(post.id, user.id, text).await?;

    tracing::info!(comment_id = row.id, post_id, user_id = user.id, "Comment created");

    let comment = Comment::from_row(row, User::from(user));

    Ok((StatusCode::CREATED, Json(comment)))
}

/// React to a post; a second reaction from the same user replaces the
/// first.
pub async fn react_to_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(post_id): Path<i64>,
    Json(req): Json<ReactionRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let reaction: Reaction = req
        .reaction
        .as_deref()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ApiError::Validation("Invalid reaction type.".to_string()))?;

    let post = state
        .db
        .get_post(post_id)
        .await
        .map_err(not_found("Post not found"))?;

    let existing = state.db.get_reaction(post.id, user.id).await?;
    state
        .db
        .upsert_reaction(post.id, user.id, reaction.as_str())
        .await?;

    tracing::info!(
        post_id,
        user_id = user.id,
        reaction = reaction.as_str(),
        "Reaction recorded"
    );

    let message = if existing.is_some() {
        "Reaction updated."
    } else {
        "Reaction added."
    };

    Ok(Json(serde_json::json!({ "message": message })))
}

#[cfg(test)]
mod tests {
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::Json;

    use super::*;
    use crate::models::CreateGroupRequest;
    use crate::web::{groups, testing};

    fn post_body(content: &str, post_type: Option<&str>, group_id: Option<i64>) -> Json<CreatePostRequest> {
        Json(CreatePostRequest {
            content: Some(content.to_string()),
            post_type: post_type.map(str::to_string),
            group_id,
            image: None,
        })
    }

    #[tokio::test]
    async fn post_requires_content() {
        let state = testing::state().await;
        let alice = testing::signed_in(&state, "alice").await;

        let err = create_post(
            State(state.clone()),
            alice,
            Json(CreatePostRequest {
                content: None,
                post_type: None,
                group_id: None,
                image: None,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn post_type_defaults_and_is_not_validated() {
        let state = testing::state().await;
        let alice = testing::signed_in(&state, "alice").await;

        let (_, Json(defaulted)) =
            create_post(State(state.clone()), alice.clone(), post_body("hi", None, None))
                .await
                .unwrap();
        assert_eq!(defaulted.post_type, "question");

        let (_, Json(custom)) = create_post(
            State(state.clone()),
            alice,
            post_body("hi again", Some("meme"), None),
        )
        .await
        .unwrap();
        assert_eq!(custom.post_type, "meme");
    }

    #[tokio::test]
    async fn unknown_group_is_rejected() {
        let state = testing::state().await;
        let alice = testing::signed_in(&state, "alice").await;

        let err = create_post(State(state.clone()), alice, post_body("hi", None, Some(404)))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn group_scoped_post_carries_group_name() {
        let state = testing::state().await;
        let alice = testing::signed_in(&state, "alice").await;

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

        let (_, Json(post)) = create_post(
            State(state.clone()),
            alice,
            post_body("notes attached", Some("tip"), Some(group.id)),
        )
        .await
        .unwrap();

        assert_eq!(post.group, Some(group.id));
        assert_eq!(post.group_name.as_deref(), Some("CS101"));
    }

    #[tokio::test]
    async fn comments_require_existing_post_and_text() {
        let state = testing::state().await;
        let alice = testing::signed_in(&state, "alice").await;

        let err = add_comment(
            State(state.clone()),
            alice.clone(),
            Path(404),
            Json(CommentRequest {
                text: Some("nice".to_string()),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let (_, Json(post)) =
            create_post(State(state.clone()), alice.clone(), post_body("hi", None, None))
                .await
                .unwrap();

        let err = add_comment(
            State(state.clone()),
            alice.clone(),
            Path(post.id),
            Json(CommentRequest { text: None }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        add_comment(
            State(state.clone()),
            alice.clone(),
            Path(post.id),
            Json(CommentRequest {
                text: Some("nice".to_string()),
            }),
        )
        .await
        .unwrap();

        let Json(posts) = list_posts(State(state.clone()), alice).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].comments.len(), 1);
        assert_eq!(posts[0].comments[0].text, "nice");
    }

    #[tokio::test]
    async fn reacting_again_overwrites_the_reaction() {
        let state = testing::state().await;
        let alice = testing::signed_in(&state, "alice").await;
        let bob = testing::signed_in(&state, "bob").await;

        let (_, Json(post)) =
            create_post(State(state.clone()), alice.clone(), post_body("hi", None, None))
                .await
                .unwrap();

        let Json(body) = react_to_post(
            State(state.clone()),
            bob.clone(),
            Path(post.id),
            Json(ReactionRequest {
                reaction: Some("helpful".to_string()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(body["message"], "Reaction added.");

        let Json(body) = react_to_post(
            State(state.clone()),
            bob.clone(),
            Path(post.id),
            Json(ReactionRequest {
                reaction: Some("not_clear".to_string()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(body["message"], "Reaction updated.");

        let stored = state
            .db
            .get_reaction(post.id, bob.id)
            .await
            .unwrap()
            .expect("one reaction row");
        assert_eq!(stored.reaction, "not_clear");
        assert_eq!(state.db.count_interactions(post.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn invalid_reaction_is_rejected() {
        let state = testing::state().await;
        let alice = testing::signed_in(&state, "alice").await;

        let (_, Json(post)) =
            create_post(State(state.clone()), alice.clone(), post_body("hi", None, None))
                .await
                .unwrap();

        let err = react_to_post(
            State(state.clone()),
            alice,
            Path(post.id),
            Json(ReactionRequest {
                reaction: Some("angry".to_string()),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
