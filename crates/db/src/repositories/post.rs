//! Post repository.

use std::collections::HashSet;
use std::sync::Arc;

use crate::entities::{Post, post};
use quill_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

/// Map a database error, surfacing unique-index violations (the
/// `(author_id, slug)` race) as a retryable conflict.
fn map_write_err(e: &sea_orm::DbErr) -> AppError {
    if matches!(e.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_))) {
        AppError::Conflict("Slug already in use for this author".to_string())
    } else {
        AppError::Database(e.to_string())
    }
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by its author's ID and slug.
    pub async fn find_by_author_and_slug(
        &self,
        author_id: &str,
        slug: &str,
    ) -> AppResult<Option<post::Model>> {
        Post::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .filter(post::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_write_err(&e))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| map_write_err(&e))
    }

    /// Delete a post (comments cascade at the storage layer).
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Post::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All published posts, most recently published first. Drafts never
    /// appear here.
    pub async fn find_published(&self) -> AppResult<Vec<post::Model>> {
        Post::find()
            .filter(post::Column::Status.eq(post::Status::Published))
            .order_by_desc(post::Column::Published)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Published posts by one author, most recently published first.
    pub async fn find_published_by_author(&self, author_id: &str) -> AppResult<Vec<post::Model>> {
        Post::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .filter(post::Column::Status.eq(post::Status::Published))
            .order_by_desc(post::Column::Published)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All posts by one author, drafts included (newest first). Only ever
    /// surfaced to the author themselves.
    pub async fn find_by_author(&self, author_id: &str) -> AppResult<Vec<post::Model>> {
        Post::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .order_by_desc(post::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The set of slugs already used by an author, optionally excluding one
    /// post (its own prior slug, when updating).
    pub async fn slugs_for_author(
        &self,
        author_id: &str,
        exclude_post_id: Option<&str>,
    ) -> AppResult<HashSet<String>> {
        let mut query = Post::find()
            .select_only()
            .column(post::Column::Slug)
            .filter(post::Column::AuthorId.eq(author_id));

        if let Some(exclude) = exclude_post_id {
            query = query.filter(post::Column::Id.ne(exclude));
        }

        let slugs: Vec<String> = query
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(slugs.into_iter().collect())
    }

    /// Count published posts by one author.
    pub async fn count_published_by_author(&self, author_id: &str) -> AppResult<u64> {
        Post::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .filter(post::Column::Status.eq(post::Status::Published))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_post(id: &str, author_id: &str, slug: &str, status: post::Status) -> post::Model {
        post::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            title: "title".to_string(),
            body: Some("body".to_string()),
            feature_image: None,
            slug: slug.to_string(),
            status: status.clone(),
            published: match status {
                post::Status::Published => Some(Utc::now().into()),
                post::Status::Draft => None,
            },
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_author_and_slug_found() {
        let post = create_test_post("post1", "user1", "my-title", post::Status::Draft);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post.clone()]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.find_by_author_and_slug("user1", "my-title").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().slug, "my-title");
    }

    #[tokio::test]
    async fn test_find_by_author_and_slug_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.find_by_author_and_slug("user1", "missing").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_find_published_filters_drafts_and_orders_descending() {
        // The listing invariants live in the generated SQL: only published
        // rows, most recently published first.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(Arc::clone(&db));
        repo.find_published().await.unwrap();
        drop(repo);

        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let query = log[0].statements()[0].sql.clone();
        assert!(query.contains(r#""post"."status""#));
        assert!(query.contains("published"));
        assert!(query.contains(r#"ORDER BY "post"."published" DESC"#));
    }

    #[tokio::test]
    async fn test_find_published_by_author_filters_drafts_and_orders_descending() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(Arc::clone(&db));
        repo.find_published_by_author("user1").await.unwrap();
        drop(repo);

        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let query = log[0].statements()[0].sql.clone();
        assert!(query.contains(r#""post"."author_id""#));
        assert!(query.contains(r#""post"."status""#));
        assert!(query.contains("published"));
        assert!(query.contains(r#"ORDER BY "post"."published" DESC"#));
    }

    #[tokio::test]
    async fn test_find_published() {
        let post1 = create_test_post("post1", "user1", "first", post::Status::Published);
        let post2 = create_test_post("post2", "user2", "second", post::Status::Published);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post1, post2]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.find_published().await.unwrap();

        assert_eq!(result.len(), 2);
    }
}
