use super::{Database, DatabaseError, Result};

/// Database row for the groups table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GroupRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_by: i64,
    pub created_at: String,
}

/// Database row for the group_members table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MembershipRow {
    pub id: i64,
    pub group_id: i64,
    pub user_id: i64,
    pub joined_at: String,
}

impl Database {
    // ========== Group Operations ==========

    /// Creates a group together with its creator's membership. Both inserts
    /// share one transaction.
    pub async fn create_group(
        &self,
        name: &str,
        description: &str,
        created_by: i64,
    ) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO groups (name, description, created_by)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(created_by)
        .execute(&mut *tx)
        .await?;

        let group_id = result.last_insert_rowid();

        sqlx::query(
            r#"
            INSERT INTO group_members (group_id, user_id)
            VALUES (?, ?)
            "#,
        )
        .bind(group_id)
        .bind(created_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(group_id)
    }

    pub async fn get_group(&self, id: i64) -> Result<GroupRow> {
        sqlx::query_as::<_, GroupRow>(
            r#"
            SELECT id, name, description, created_by, created_at
            FROM groups
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                DatabaseError::NotFound(format!("Group with id {} not found", id))
            }
            e => e.into(),
        })
    }

    pub async fn list_groups(&self) -> Result<Vec<GroupRow>> {
        let groups = sqlx::query_as::<_, GroupRow>(
            r#"
            SELECT id, name, description, created_by, created_at
            FROM groups
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }

    pub async fn list_groups_for_user(&self, user_id: i64) -> Result<Vec<GroupRow>> {
        let groups = sqlx::query_as::<_, GroupRow>(
            r#"
            SELECT g.id, g.name, g.description, g.created_by, g.created_at
            FROM groups g
            JOIN group_members m ON m.group_id = g.id
            WHERE m.user_id = ?
            ORDER BY m.joined_at DESC, m.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }

    // ========== Membership Operations ==========

    pub async fn count_members(&self, group_id: i64) -> Result<i64> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM group_members WHERE group_id = ?")
                .bind(group_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count.0)
    }

    pub async fn is_member(&self, group_id: i64, user_id: i64) -> Result<bool> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM group_members WHERE group_id = ? AND user_id = ?")
                .bind(group_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.is_some())
    }

    /// Inserts a membership; the unique (group, user) constraint turns a
    /// duplicate into `Conflict`.
    pub async fn add_member(&self, group_id: i64, user_id: i64) -> Result<MembershipRow> {
        let result = sqlx::query(
            r#"
            INSERT INTO group_members (group_id, user_id)
            VALUES (?, ?)
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        self.get_membership(result.last_insert_rowid()).await
    }

    pub async fn get_membership(&self, id: i64) -> Result<MembershipRow> {
        sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT id, group_id, user_id, joined_at
            FROM group_members
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                DatabaseError::NotFound(format!("Membership with id {} not found", id))
            }
            e => e.into(),
        })
    }

    /// Deletes the membership, reporting whether one existed.
    pub async fn remove_member(&self, group_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM group_members WHERE group_id = ? AND user_id = ?")
            .bind(group_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
