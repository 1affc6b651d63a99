//! Follow repository.

use std::sync::Arc;

use crate::entities::{Follow, follow};
use quill_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

/// Follow repository for database operations.
#[derive(Clone)]
pub struct FollowRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowRepository {
    /// Create a new follow repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a follow relationship.
    pub async fn create(&self, model: follow::ActiveModel) -> AppResult<follow::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if matches!(
                e.sql_err(),
                Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
            ) {
                AppError::BadRequest("Already following".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Remove a follow relationship.
    pub async fn delete(&self, follower_id: &str, followee_id: &str) -> AppResult<()> {
        Follow::delete_many()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .filter(follow::Column::FolloweeId.eq(followee_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Whether `follower_id` follows `followee_id`.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        let count = Follow::find()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .filter(follow::Column::FolloweeId.eq(followee_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Users following `user_id` (newest first).
    pub async fn find_followers(&self, user_id: &str) -> AppResult<Vec<follow::Model>> {
        Follow::find()
            .filter(follow::Column::FolloweeId.eq(user_id))
            .order_by_desc(follow::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Users `user_id` is following (newest first).
    pub async fn find_following(&self, user_id: &str) -> AppResult<Vec<follow::Model>> {
        Follow::find()
            .filter(follow::Column::FollowerId.eq(user_id))
            .order_by_desc(follow::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count followers of `user_id`.
    pub async fn count_followers(&self, user_id: &str) -> AppResult<u64> {
        Follow::find()
            .filter(follow::Column::FolloweeId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count users `user_id` is following.
    pub async fn count_following(&self, user_id: &str) -> AppResult<u64> {
        Follow::find()
            .filter(follow::Column::FollowerId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
