//! Comment service.
//!
//! Comments attach to published posts only. A comment attempt against a
//! draft reports `NotFound`, the same as commenting on a post that does
//! not exist.

use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{
    entities::{comment, post, user},
    repositories::{CommentRepository, PostRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Input for creating a comment.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentInput {
    #[validate(length(min = 1, max = 4096))]
    pub body: String,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub fn new(
        comment_repo: CommentRepository,
        post_repo: PostRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            comment_repo,
            post_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Comment on the published post at `username`/`slug`.
    pub async fn create(
        &self,
        caller: &user::Model,
        username: &str,
        slug: &str,
        input: CreateCommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;

        let author = self.user_repo.get_by_username(username).await?;
        let post = self
            .post_repo
            .find_by_author_and_slug(&author.id, slug)
            .await?
            .filter(|p| p.status == post::Status::Published)
            .ok_or_else(|| AppError::NotFound(format!("post {username}/{slug}")))?;

        let comment = self
            .comment_repo
            .create(comment::ActiveModel {
                id: Set(self.id_gen.generate()),
                post_id: Set(post.id.clone()),
                author_id: Set(caller.id.clone()),
                body: Set(input.body),
                ..Default::default()
            })
            .await?;

        tracing::debug!(comment_id = %comment.id, post_id = %post.id, "Created comment");

        Ok(comment)
    }

    /// Comments on a post, oldest first.
    pub async fn list_for_post(&self, post_id: &str) -> AppResult<Vec<comment::Model>> {
        self.comment_repo.find_by_post(post_id).await
    }
}
