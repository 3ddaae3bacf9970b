use super::{Database, DatabaseError, Result};

/// Database row for the posts table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub id: i64,
    pub author_id: i64,
    pub group_id: Option<i64>,
    pub content: String,
    pub post_type: String,
    pub image: Option<String>,
    pub created_at: String,
}

/// Database row for the comments table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentRow {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub text: String,
    pub created_at: String,
}

/// Database row for the post_interactions table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostInteractionRow {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub reaction: String,
    pub created_at: String,
}

impl Database {
    // ========== Post Operations ==========

    pub async fn create_post(
        &self,
        author_id: i64,
        group_id: Option<i64>,
        content: &str,
        post_type: &str,
        image: Option<&str>,
    ) -> Result<PostRow> {
        let result = sqlx::query(
            r#"
            INSERT INTO posts (author_id, group_id, content, post_type, image)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(author_id)
        .bind(group_id)
        .bind(content)
        .bind(post_type)
        .bind(image)
        .execute(&self.pool)
        .await?;

        self.get_post(result.last_insert_rowid()).await
    }

    pub async fn get_post(&self, id: i64) -> Result<PostRow> {
        sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, author_id, group_id, content, post_type, image, created_at
            FROM posts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                DatabaseError::NotFound(format!("Post with id {} not found", id))
            }
            e => e.into(),
        })
    }

    pub async fn list_posts(&self) -> Result<Vec<PostRow>> {
        let posts = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, author_id, group_id, content, post_type, image, created_at
            FROM posts
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    // ========== Comment Operations ==========

    pub async fn create_comment(&self, post_id: i64, user_id: i64, text: &str) -> Result<CommentRow> {
        let result = sqlx::query(
            r#"
            INSERT INTO comments (post_id, user_id, text)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .bind(text)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();

        let comment = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, post_id, user_id, text, created_at
            FROM comments
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    /// Comments of one post, oldest first.
    pub async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentRow>> {
        let comments = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, post_id, user_id, text, created_at
            FROM comments
            WHERE post_id = ?
            ORDER BY id
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    // ========== Interaction Operations ==========

    pub async fn get_reaction(&self, post_id: i64, user_id: i64) -> Result<Option<PostInteractionRow>> {
        let interaction = sqlx::query_as::<_, PostInteractionRow>(
            r#"
            SELECT id, post_id, user_id, reaction, created_at
            FROM post_interactions
            WHERE post_id = ? AND user_id = ?
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(interaction)
    }

    /// One reaction per (post, user); re-reacting overwrites in place.
    pub async fn upsert_reaction(&self, post_id: i64, user_id: i64, reaction: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO post_interactions (post_id, user_id, reaction)
            VALUES (?, ?, ?)
            ON CONFLICT (post_id, user_id) DO UPDATE SET reaction = excluded.reaction
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .bind(reaction)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn count_interactions(&self, post_id: i64) -> Result<i64> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM post_interactions WHERE post_id = ?")
                .bind(post_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count.0)
    }
}
