use serde::{Deserialize, Serialize};

use crate::database::{GroupRow, MembershipRow};
use crate::models::User;

#[derive(Debug, Clone, Serialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_by: User,
    pub created_at: String,
    pub members_count: i64,
}

impl Group {
    pub fn from_row(row: GroupRow, created_by: User, members_count: i64) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            created_by,
            created_at: row.created_at,
            members_count,
        }
    }
}

/// The join record granting a user visibility and posting rights within a
/// group. `group` carries the group id, matching the wire format.
#[derive(Debug, Clone, Serialize)]
pub struct Membership {
    pub id: i64,
    pub group: i64,
    pub user: User,
    pub joined_at: String,
}

impl Membership {
    pub fn from_row(row: MembershipRow, user: User) -> Self {
        Self {
            id: row.id,
            group: row.group_id,
            user,
            joined_at: row.joined_at,
        }
    }
}

// DTOs for API

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}
