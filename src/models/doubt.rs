use serde::{Deserialize, Serialize};

use crate::database::{DoubtReplyRow, DoubtRow};
use crate::models::{Group, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoubtStatus {
    Open,
    Answered,
    Closed,
}

impl DoubtStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DoubtStatus::Open => "open",
            DoubtStatus::Answered => "answered",
            DoubtStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for DoubtStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DoubtStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(DoubtStatus::Open),
            "answered" => Ok(DoubtStatus::Answered),
            "closed" => Ok(DoubtStatus::Closed),
            _ => Err(format!("Invalid doubt status: {}", s)),
        }
    }
}

/// A question asked inside a group, with its replies inlined.
#[derive(Debug, Clone, Serialize)]
pub struct Doubt {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub group: Group,
    pub asked_by: User,
    pub directed_to: Option<User>,
    pub status: DoubtStatus,
    pub created_at: String,
    pub replies: Vec<DoubtReply>,
}

impl Doubt {
    pub fn from_row(
        row: DoubtRow,
        group: Group,
        asked_by: User,
        directed_to: Option<User>,
        replies: Vec<DoubtReply>,
    ) -> Self {
        let status = row.status.parse().unwrap_or(DoubtStatus::Open);
        Self {
            id: row.id,
            title: row.title,
            body: row.body,
            group,
            asked_by,
            directed_to,
            status,
            created_at: row.created_at,
            replies,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DoubtReply {
    pub id: i64,
    pub user: User,
    pub text: String,
    pub is_solution: bool,
    pub created_at: String,
}

impl DoubtReply {
    pub fn from_row(row: DoubtReplyRow, user: User) -> Self {
        Self {
            id: row.id,
            user,
            text: row.text,
            is_solution: row.is_solution,
            created_at: row.created_at,
        }
    }
}

// DTOs for API

#[derive(Debug, Deserialize)]
pub struct CreateDoubtRequest {
    pub group_id: Option<i64>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub directed_to_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct DoubtListQuery {
    pub group_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MarkSolutionRequest {
    pub reply_id: Option<i64>,
}
