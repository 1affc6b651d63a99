//! Follow service.
//!
//! Directed follow edges between users. Following yourself is rejected,
//! and a duplicate follow surfaces the storage layer's uniqueness error.

use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{
    entities::{follow, user},
    repositories::{FollowRepository, UserRepository},
};
use sea_orm::Set;

/// Follow service for business logic.
#[derive(Clone)]
pub struct FollowService {
    follow_repo: FollowRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub fn new(follow_repo: FollowRepository, user_repo: UserRepository) -> Self {
        Self {
            follow_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow `username`.
    pub async fn follow(&self, caller: &user::Model, username: &str) -> AppResult<follow::Model> {
        let target = self.user_repo.get_by_username(username).await?;

        if target.id == caller.id {
            return Err(AppError::BadRequest("Cannot follow yourself".to_string()));
        }

        let edge = self
            .follow_repo
            .create(follow::ActiveModel {
                id: Set(self.id_gen.generate()),
                follower_id: Set(caller.id.clone()),
                followee_id: Set(target.id.clone()),
                ..Default::default()
            })
            .await?;

        tracing::debug!(follower = %caller.username, followee = %target.username, "Followed user");

        Ok(edge)
    }

    /// Stop following `username`. Unfollowing someone not followed is a
    /// no-op.
    pub async fn unfollow(&self, caller: &user::Model, username: &str) -> AppResult<()> {
        let target = self.user_repo.get_by_username(username).await?;
        self.follow_repo.delete(&caller.id, &target.id).await?;
        tracing::debug!(follower = %caller.username, followee = %target.username, "Unfollowed user");
        Ok(())
    }

    /// Whether `caller` follows `username`.
    pub async fn is_following(&self, caller: &user::Model, username: &str) -> AppResult<bool> {
        let target = self.user_repo.get_by_username(username).await?;
        self.follow_repo.is_following(&caller.id, &target.id).await
    }
}
