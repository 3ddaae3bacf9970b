use super::{Database, DatabaseError, Result};
use crate::database::UserRow;

/// Database row for the friend_requests table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FriendRequestRow {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub status: String,
    pub created_at: String,
}

impl Database {
    // ========== Friend Request Operations ==========

    /// Whether a non-rejected request from sender to receiver exists. The
    /// check is directional; the reverse pair is not consulted.
    pub async fn has_active_request(&self, sender_id: i64, receiver_id: i64) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            SELECT 1 FROM friend_requests
            WHERE sender_id = ? AND receiver_id = ? AND status != 'rejected'
            "#,
        )
        .bind(sender_id)
        .bind(receiver_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    pub async fn create_friend_request(
        &self,
        sender_id: i64,
        receiver_id: i64,
    ) -> Result<FriendRequestRow> {
        let result = sqlx::query(
            r#"
            INSERT INTO friend_requests (sender_id, receiver_id)
            VALUES (?, ?)
            "#,
        )
        .bind(sender_id)
        .bind(receiver_id)
        .execute(&self.pool)
        .await?;

        self.get_friend_request(result.last_insert_rowid()).await
    }

    pub async fn get_friend_request(&self, id: i64) -> Result<FriendRequestRow> {
        sqlx::query_as::<_, FriendRequestRow>(
            r#"
            SELECT id, sender_id, receiver_id, status, created_at
            FROM friend_requests
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                DatabaseError::NotFound(format!("Friend request with id {} not found", id))
            }
            e => e.into(),
        })
    }

    /// A request addressed to `receiver_id`, whatever its status.
    pub async fn get_request_for_receiver(
        &self,
        id: i64,
        receiver_id: i64,
    ) -> Result<FriendRequestRow> {
        sqlx::query_as::<_, FriendRequestRow>(
            r#"
            SELECT id, sender_id, receiver_id, status, created_at
            FROM friend_requests
            WHERE id = ? AND receiver_id = ?
            "#,
        )
        .bind(id)
        .bind(receiver_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                DatabaseError::NotFound(format!("Friend request with id {} not found", id))
            }
            e => e.into(),
        })
    }

    pub async fn list_pending_requests(&self, receiver_id: i64) -> Result<Vec<FriendRequestRow>> {
        let requests = sqlx::query_as::<_, FriendRequestRow>(
            r#"
            SELECT id, sender_id, receiver_id, status, created_at
            FROM friend_requests
            WHERE receiver_id = ? AND status = 'pending'
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(receiver_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    pub async fn set_request_status(&self, id: i64, status: &str) -> Result<()> {
        sqlx::query("UPDATE friend_requests SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Users on the other end of the user's accepted requests, both
    /// directions, deduplicated.
    pub async fn list_friends(&self, user_id: i64) -> Result<Vec<UserRow>> {
        let friends = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT DISTINCT u.id, u.username, u.email, u.password_hash, u.created_at
            FROM users u
            JOIN friend_requests fr
              ON (fr.receiver_id = u.id AND fr.sender_id = ?)
              OR (fr.sender_id = u.id AND fr.receiver_id = ?)
            WHERE fr.status = 'accepted'
            ORDER BY u.id
            "#,
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(friends)
    }
}
