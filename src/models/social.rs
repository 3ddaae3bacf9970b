use serde::{Deserialize, Serialize};

use crate::database::FriendRequestRow;
use crate::models::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "accepted" => Ok(RequestStatus::Accepted),
            "rejected" => Ok(RequestStatus::Rejected),
            _ => Err(format!("Invalid request status: {}", s)),
        }
    }
}

/// A directional friendship proposal between two users.
#[derive(Debug, Clone, Serialize)]
pub struct FriendRequest {
    pub id: i64,
    pub sender: User,
    pub receiver: User,
    pub status: RequestStatus,
    pub created_at: String,
}

impl FriendRequest {
    pub fn from_row(row: FriendRequestRow, sender: User, receiver: User) -> Self {
        let status = row.status.parse().unwrap_or(RequestStatus::Pending);
        Self {
            id: row.id,
            sender,
            receiver,
            status,
            created_at: row.created_at,
        }
    }
}

/// What a receiver may do with a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespondAction {
    Accept,
    Reject,
}

impl RespondAction {
    /// Status the request moves to.
    pub fn status(&self) -> RequestStatus {
        match self {
            RespondAction::Accept => RequestStatus::Accepted,
            RespondAction::Reject => RequestStatus::Rejected,
        }
    }
}

impl std::str::FromStr for RespondAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(RespondAction::Accept),
            "reject" => Ok(RespondAction::Reject),
            _ => Err(format!("Invalid action: {}", s)),
        }
    }
}

// DTOs for API

#[derive(Debug, Deserialize)]
pub struct SendFriendRequestBody {
    pub receiver_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub action: Option<String>,
}
