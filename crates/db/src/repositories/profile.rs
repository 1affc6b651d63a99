//! Profile repository.

use std::sync::Arc;

use crate::entities::{Profile, profile};
use quill_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait};

/// Profile repository for database operations.
#[derive(Clone)]
pub struct ProfileRepository {
    db: Arc<DatabaseConnection>,
}

impl ProfileRepository {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a profile by user ID.
    pub async fn find_by_user_id(&self, user_id: &str) -> AppResult<Option<profile::Model>> {
        Profile::find_by_id(user_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a profile by user ID, returning an error if not found.
    pub async fn get_by_user_id(&self, user_id: &str) -> AppResult<profile::Model> {
        self.find_by_user_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile for user {user_id}")))
    }

    /// Create a new profile.
    pub async fn create(&self, model: profile::ActiveModel) -> AppResult<profile::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a profile.
    pub async fn update(&self, model: profile::ActiveModel) -> AppResult<profile::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
