use serde::{Deserialize, Serialize};

use crate::database::{CommentRow, PostRow};
use crate::models::User;

/// Per-user sentiment tag on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reaction {
    Helpful,
    NotClear,
}

impl Reaction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reaction::Helpful => "helpful",
            Reaction::NotClear => "not_clear",
        }
    }
}

impl std::fmt::Display for Reaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Reaction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "helpful" => Ok(Reaction::Helpful),
            "not_clear" => Ok(Reaction::NotClear),
            _ => Err(format!("Invalid reaction: {}", s)),
        }
    }
}

/// A feed post with its comments and reaction count inlined. `post_type`
/// is free-form text; question/tip/project are the conventional values.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: i64,
    pub author: User,
    pub group: Option<i64>,
    pub group_name: Option<String>,
    pub content: String,
    pub post_type: String,
    pub image: Option<String>,
    pub created_at: String,
    pub comments: Vec<Comment>,
    pub interactions_count: i64,
}

impl Post {
    pub fn from_row(
        row: PostRow,
        author: User,
        group_name: Option<String>,
        comments: Vec<Comment>,
        interactions_count: i64,
    ) -> Self {
        Self {
            id: row.id,
            author,
            group: row.group_id,
            group_name,
            content: row.content,
            post_type: row.post_type,
            image: row.image,
            created_at: row.created_at,
            comments,
            interactions_count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: i64,
    pub user: User,
    pub text: String,
    pub created_at: String,
}

impl Comment {
    pub fn from_row(row: CommentRow, user: User) -> Self {
        Self {
            id: row.id,
            user,
            text: row.text,
            created_at: row.created_at,
        }
    }
}

// DTOs for API

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub content: Option<String>,
    pub post_type: Option<String>,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReactionRequest {
    pub reaction: Option<String>,
}
