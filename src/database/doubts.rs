use super::{Database, DatabaseError, Result};

/// Database row for the doubts table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DoubtRow {
    pub id: i64,
    pub group_id: i64,
    pub asked_by: i64,
    pub directed_to: Option<i64>,
    pub title: String,
    pub body: String,
    pub status: String,
    pub created_at: String,
}

/// Database row for the doubt_replies table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DoubtReplyRow {
    pub id: i64,
    pub doubt_id: i64,
    pub user_id: i64,
    pub text: String,
    pub is_solution: bool,
    pub created_at: String,
}

impl Database {
    // ========== Doubt Operations ==========

    pub async fn create_doubt(
        &self,
        group_id: i64,
        asked_by: i64,
        directed_to: Option<i64>,
        title: &str,
        body: &str,
    ) -> Result<DoubtRow> {
        let result = sqlx::query(
            r#"
            INSERT INTO doubts (group_id, asked_by, directed_to, title, body)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(group_id)
        .bind(asked_by)
        .bind(directed_to)
        .bind(title)
        .bind(body)
        .execute(&self.pool)
        .await?;

        self.get_doubt(result.last_insert_rowid()).await
    }

    pub async fn get_doubt(&self, id: i64) -> Result<DoubtRow> {
        sqlx::query_as::<_, DoubtRow>(
            r#"
            SELECT id, group_id, asked_by, directed_to, title, body, status, created_at
            FROM doubts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                DatabaseError::NotFound(format!("Doubt with id {} not found", id))
            }
            e => e.into(),
        })
    }

    /// All doubts, newest first, optionally narrowed to one group.
    pub async fn list_doubts(&self, group_id: Option<i64>) -> Result<Vec<DoubtRow>> {
        let doubts = match group_id {
            Some(group_id) => {
                sqlx::query_as::<_, DoubtRow>(
                    r#"
                    SELECT id, group_id, asked_by, directed_to, title, body, status, created_at
                    FROM doubts
                    WHERE group_id = ?
                    ORDER BY created_at DESC, id DESC
                    "#,
                )
                .bind(group_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, DoubtRow>(
                    r#"
                    SELECT id, group_id, asked_by, directed_to, title, body, status, created_at
                    FROM doubts
                    ORDER BY created_at DESC, id DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(doubts)
    }

    pub async fn list_doubts_directed_to(&self, user_id: i64) -> Result<Vec<DoubtRow>> {
        let doubts = sqlx::query_as::<_, DoubtRow>(
            r#"
            SELECT id, group_id, asked_by, directed_to, title, body, status, created_at
            FROM doubts
            WHERE directed_to = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(doubts)
    }

    // ========== Reply Operations ==========

    pub async fn create_reply(&self, doubt_id: i64, user_id: i64, text: &str) -> Result<DoubtReplyRow> {
        let result = sqlx::query(
            r#"
            INSERT INTO doubt_replies (doubt_id, user_id, text)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(doubt_id)
        .bind(user_id)
        .bind(text)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();

        let reply = sqlx::query_as::<_, DoubtReplyRow>(
            r#"
            SELECT id, doubt_id, user_id, text, is_solution, created_at
            FROM doubt_replies
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(reply)
    }

    /// Replies of one doubt, oldest first.
    pub async fn list_replies(&self, doubt_id: i64) -> Result<Vec<DoubtReplyRow>> {
        let replies = sqlx::query_as::<_, DoubtReplyRow>(
            r#"
            SELECT id, doubt_id, user_id, text, is_solution, created_at
            FROM doubt_replies
            WHERE doubt_id = ?
            ORDER BY id
            "#,
        )
        .bind(doubt_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(replies)
    }

    /// A reply scoped to its doubt, so a reply id from another doubt is
    /// treated as absent.
    pub async fn get_reply(&self, doubt_id: i64, reply_id: i64) -> Result<DoubtReplyRow> {
        sqlx::query_as::<_, DoubtReplyRow>(
            r#"
            SELECT id, doubt_id, user_id, text, is_solution, created_at
            FROM doubt_replies
            WHERE id = ? AND doubt_id = ?
            "#,
        )
        .bind(reply_id)
        .bind(doubt_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => DatabaseError::NotFound(format!(
                "Reply with id {} not found for doubt {}",
                reply_id, doubt_id
            )),
            e => e.into(),
        })
    }

    /// Marks `reply_id` as the accepted answer of `doubt_id` as one logical
    /// unit: every other reply loses the flag, the target gains it, and the
    /// doubt moves to `answered`.
    pub async fn mark_solution(&self, doubt_id: i64, reply_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE doubt_replies SET is_solution = 0 WHERE doubt_id = ? AND is_solution = 1")
            .bind(doubt_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE doubt_replies SET is_solution = 1 WHERE id = ?")
            .bind(reply_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE doubts SET status = 'answered' WHERE id = ?")
            .bind(doubt_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
