//! Post service.
//!
//! Owns the post lifecycle (draft -> published) and every
//! visibility/authorization decision for reading, previewing, editing,
//! publishing and deleting posts. All operations take the caller identity
//! explicitly; there is no ambient current-user state.
//!
//! Unauthorized access to a draft is reported as [`AppError::NotFound`],
//! never as a "forbidden" error: an outside observer must not be able to
//! tell a private post apart from a nonexistent one.

use std::collections::HashMap;

use chrono::Utc;
use quill_common::{AppError, AppResult, Config, IdGenerator, assign_slug};
use quill_db::{
    entities::{comment, post, user},
    repositories::{CommentRepository, PostRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    comment_repo: CommentRepository,
    id_gen: IdGenerator,
    republish_resets_timestamp: bool,
}

/// Input for creating a new post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostInput {
    #[validate(length(min = 1, max = 512))]
    pub title: String,

    pub body: Option<String>,

    /// Storage key of an already-uploaded feature image.
    pub feature_image: Option<String>,
}

/// Input for editing a post. `None` fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePostInput {
    #[validate(length(min = 1, max = 512))]
    pub title: Option<String>,

    pub body: Option<String>,

    pub feature_image: Option<String>,
}

/// A post paired with its author.
#[derive(Debug, Clone)]
pub struct PostWithAuthor {
    pub post: post::Model,
    pub author: user::Model,
}

/// Outcome of resolving a public post URL.
///
/// The controller decides between rendering and redirecting; the
/// presentation layer only carries the instruction out.
#[derive(Debug)]
pub enum PostDetail {
    /// Render the post page with its comments.
    Page {
        post: post::Model,
        author: user::Model,
        comments: Vec<comment::Model>,
    },
    /// The caller is the author of a draft: redirect to the draft preview.
    DraftRedirect { username: String, slug: String },
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(
        post_repo: PostRepository,
        user_repo: UserRepository,
        comment_repo: CommentRepository,
        config: &Config,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            comment_repo,
            id_gen: IdGenerator::new(),
            republish_resets_timestamp: config.blog.republish_resets_timestamp,
        }
    }

    /// Resolve `(author, post)` for an author-only operation.
    ///
    /// Missing author, missing post, and non-author caller all collapse
    /// into the same `NotFound`.
    async fn resolve_owned(
        &self,
        caller: &user::Model,
        username: &str,
        slug: &str,
    ) -> AppResult<(user::Model, post::Model)> {
        let author = self.user_repo.get_by_username(username).await?;
        let post = self
            .post_repo
            .find_by_author_and_slug(&author.id, slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {username}/{slug}")))?;

        if caller.id != author.id {
            return Err(AppError::NotFound(format!("post {username}/{slug}")));
        }

        Ok((author, post))
    }

    /// Public index listing: all published posts, most recent first.
    pub async fn index(&self) -> AppResult<Vec<PostWithAuthor>> {
        let posts = self.post_repo.find_published().await?;
        self.with_authors(posts).await
    }

    /// Author page listing: published posts by one author, most recent
    /// first. Unknown author is a `NotFound`.
    pub async fn author_page(
        &self,
        username: &str,
    ) -> AppResult<(user::Model, Vec<post::Model>)> {
        let author = self.user_repo.get_by_username(username).await?;
        let posts = self.post_repo.find_published_by_author(&author.id).await?;
        Ok((author, posts))
    }

    /// Resolve a public post URL.
    ///
    /// Published posts render for anyone. A draft redirects its author to
    /// the draft preview; for everyone else it is indistinguishable from a
    /// nonexistent post.
    pub async fn detail(
        &self,
        caller: Option<&user::Model>,
        username: &str,
        slug: &str,
    ) -> AppResult<PostDetail> {
        let author = self.user_repo.get_by_username(username).await?;
        let post = self
            .post_repo
            .find_by_author_and_slug(&author.id, slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {username}/{slug}")))?;

        match post.status {
            post::Status::Published => {
                let comments = self.comment_repo.find_by_post(&post.id).await?;
                Ok(PostDetail::Page {
                    post,
                    author,
                    comments,
                })
            }
            post::Status::Draft => {
                if caller.is_some_and(|u| u.id == author.id) {
                    Ok(PostDetail::DraftRedirect {
                        username: author.username,
                        slug: post.slug,
                    })
                } else {
                    Err(AppError::NotFound(format!("post {username}/{slug}")))
                }
            }
        }
    }

    /// Draft preview: the author sees the post in any state; everyone else
    /// gets a `NotFound`.
    pub async fn draft_preview(
        &self,
        caller: &user::Model,
        username: &str,
        slug: &str,
    ) -> AppResult<PostWithAuthor> {
        let (author, post) = self.resolve_owned(caller, username, slug).await?;
        Ok(PostWithAuthor { post, author })
    }

    /// Create a new draft owned by the caller.
    pub async fn create(
        &self,
        author: &user::Model,
        input: CreatePostInput,
    ) -> AppResult<post::Model> {
        input.validate()?;

        let taken = self.post_repo.slugs_for_author(&author.id, None).await?;
        let slug = assign_slug(&input.title, &taken)?;

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author.id.clone()),
            title: Set(input.title),
            body: Set(input.body),
            feature_image: Set(input.feature_image),
            slug: Set(slug),
            status: Set(post::Status::Draft),
            published: Set(None),
            ..Default::default()
        };

        let post = self.post_repo.create(model).await?;
        tracing::debug!(post_id = %post.id, author = %author.username, "Created draft post");

        Ok(post)
    }

    /// Edit a post. Author only; the slug is recomputed only when the
    /// title actually changed, so an edit that keeps the title keeps the
    /// slug (and the canonical URL).
    pub async fn update(
        &self,
        caller: &user::Model,
        username: &str,
        slug: &str,
        input: UpdatePostInput,
    ) -> AppResult<post::Model> {
        input.validate()?;

        let (author, post) = self.resolve_owned(caller, username, slug).await?;

        let title_changed = input
            .title
            .as_ref()
            .is_some_and(|title| *title != post.title);

        let mut active: post::ActiveModel = post.clone().into();

        if let Some(title) = input.title {
            if title_changed {
                let taken = self
                    .post_repo
                    .slugs_for_author(&author.id, Some(&post.id))
                    .await?;
                // May change the canonical URL of an already-published
                // post; deliberate.
                active.slug = Set(assign_slug(&title, &taken)?);
            }
            active.title = Set(title);
        }
        if let Some(body) = input.body {
            active.body = Set(Some(body));
        }
        if let Some(feature_image) = input.feature_image {
            active.feature_image = Set(Some(feature_image));
        }
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.post_repo.update(active).await?;
        tracing::debug!(post_id = %updated.id, slug = %updated.slug, "Updated post");

        Ok(updated)
    }

    /// Publish a post. Author only.
    ///
    /// Publishing an already-published post keeps its original timestamp
    /// unless `blog.republish_resets_timestamp` is set, in which case the
    /// timestamp is re-stamped to now (bumping the post to the top of the
    /// index).
    pub async fn publish(
        &self,
        caller: &user::Model,
        username: &str,
        slug: &str,
    ) -> AppResult<post::Model> {
        let (_, post) = self.resolve_owned(caller, username, slug).await?;

        let stamp = publish_stamp(post.published.as_ref(), self.republish_resets_timestamp);

        let mut active: post::ActiveModel = post.into();
        active.status = Set(post::Status::Published);
        active.published = Set(Some(stamp));
        active.updated_at = Set(Some(Utc::now().into()));

        let published = self.post_repo.update(active).await?;
        tracing::info!(post_id = %published.id, slug = %published.slug, "Published post");

        Ok(published)
    }

    /// Delete a post. Author only; comments cascade.
    pub async fn delete(
        &self,
        caller: &user::Model,
        username: &str,
        slug: &str,
    ) -> AppResult<()> {
        let (_, post) = self.resolve_owned(caller, username, slug).await?;

        self.post_repo.delete(&post.id).await?;
        tracing::info!(post_id = %post.id, "Deleted post");

        Ok(())
    }

    /// Pair posts with their authors, fetching each author once.
    async fn with_authors(&self, posts: Vec<post::Model>) -> AppResult<Vec<PostWithAuthor>> {
        let mut authors: HashMap<String, user::Model> = HashMap::new();

        let mut result = Vec::with_capacity(posts.len());
        for post in posts {
            let author = match authors.get(&post.author_id) {
                Some(author) => author.clone(),
                None => {
                    let author = self.user_repo.get_by_id(&post.author_id).await?;
                    authors.insert(post.author_id.clone(), author.clone());
                    author
                }
            };
            result.push(PostWithAuthor { post, author });
        }

        Ok(result)
    }
}

/// Decide the `published` timestamp for a publish action.
fn publish_stamp(
    current: Option<&chrono::DateTime<chrono::FixedOffset>>,
    republish_resets: bool,
) -> chrono::DateTime<chrono::FixedOffset> {
    match current {
        Some(existing) if !republish_resets => *existing,
        _ => Utc::now().into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use quill_common::config::{BlogConfig, DatabaseConfig, ServerConfig, StorageConfig};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn create_test_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/test".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            storage: StorageConfig::default(),
            blog: BlogConfig::default(),
        }
    }

    fn create_service(db: Arc<DatabaseConnection>) -> PostService {
        PostService::new(
            PostRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
            CommentRepository::new(db),
            &create_test_config(),
        )
    }

    fn test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            email: format!("{username}@example.com"),
            username: username.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            token: None,
            is_admin: false,
            is_active: true,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_post(id: &str, author_id: &str, slug: &str, status: post::Status) -> post::Model {
        post::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            title: "My Title".to_string(),
            body: Some("This is the post body".to_string()),
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
    async fn test_detail_published_renders_with_comments() {
        let alice = test_user("u1", "alice");
        let post = test_post("p1", "u1", "my-title", post::Status::Published);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[alice.clone()]])
                .append_query_results([[post]])
                .append_query_results([Vec::<comment::Model>::new()])
                .into_connection(),
        );

        let service = create_service(db);
        let detail = service.detail(None, "alice", "my-title").await.unwrap();

        match detail {
            PostDetail::Page { post, author, comments } => {
                assert_eq!(post.slug, "my-title");
                assert_eq!(author.username, "alice");
                assert!(comments.is_empty());
            }
            PostDetail::DraftRedirect { .. } => panic!("Expected a rendered page"),
        }
    }

    #[tokio::test]
    async fn test_detail_draft_anonymous_is_not_found() {
        let alice = test_user("u1", "alice");
        let post = test_post("p1", "u1", "my-title", post::Status::Draft);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[alice]])
                .append_query_results([[post]])
                .into_connection(),
        );

        let service = create_service(db);
        let result = service.detail(None, "alice", "my-title").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_detail_draft_non_author_matches_missing_post() {
        // The error for a hidden draft must be the same kind as for a slug
        // that never existed.
        let alice = test_user("u1", "alice");
        let bob = test_user("u2", "bob");
        let draft = test_post("p1", "u1", "my-title", post::Status::Draft);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[alice.clone()]])
                .append_query_results([[draft]])
                .append_query_results([[alice]])
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let service = create_service(db);

        let hidden = service.detail(Some(&bob), "alice", "my-title").await;
        let missing = service.detail(Some(&bob), "alice", "never-existed").await;

        assert!(matches!(hidden, Err(AppError::NotFound(_))));
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_detail_draft_author_redirects_to_preview() {
        let alice = test_user("u1", "alice");
        let draft = test_post("p1", "u1", "my-title", post::Status::Draft);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[alice.clone()]])
                .append_query_results([[draft]])
                .into_connection(),
        );

        let service = create_service(db);
        let detail = service.detail(Some(&alice), "alice", "my-title").await.unwrap();

        match detail {
            PostDetail::DraftRedirect { username, slug } => {
                assert_eq!(username, "alice");
                assert_eq!(slug, "my-title");
            }
            PostDetail::Page { .. } => panic!("Expected a draft redirect"),
        }
    }

    #[tokio::test]
    async fn test_publish_non_author_is_not_found() {
        let alice = test_user("u1", "alice");
        let bob = test_user("u2", "bob");
        let draft = test_post("p1", "u1", "my-title", post::Status::Draft);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[alice]])
                .append_query_results([[draft]])
                .into_connection(),
        );

        let service = create_service(db);
        let result = service.publish(&bob, "alice", "my-title").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_publish_author_sets_status_and_timestamp() {
        let alice = test_user("u1", "alice");
        let draft = test_post("p1", "u1", "my-title", post::Status::Draft);
        let published = test_post("p1", "u1", "my-title", post::Status::Published);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[alice.clone()]])
                .append_query_results([[draft]])
                .append_query_results([[published]])
                .into_connection(),
        );

        let service = create_service(db);
        let post = service.publish(&alice, "alice", "my-title").await.unwrap();

        assert_eq!(post.status, post::Status::Published);
        assert!(post.published.is_some());
    }

    #[tokio::test]
    async fn test_update_without_title_change_skips_slug_recompute() {
        // Only three queries are mocked: author lookup, post lookup, and
        // the update itself. A slug recompute would issue a fourth and
        // fail the test.
        let alice = test_user("u1", "alice");
        let post = test_post("p1", "u1", "my-title", post::Status::Draft);
        let updated = test_post("p1", "u1", "my-title", post::Status::Draft);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[alice.clone()]])
                .append_query_results([[post]])
                .append_query_results([[updated]])
                .into_connection(),
        );

        let service = create_service(db);
        let input = UpdatePostInput {
            title: Some("My Title".to_string()),
            body: Some("Revised body".to_string()),
            feature_image: None,
        };

        let result = service.update(&alice, "alice", "my-title", input).await.unwrap();
        assert_eq!(result.slug, "my-title");
    }

    #[tokio::test]
    async fn test_delete_non_author_is_not_found() {
        let alice = test_user("u1", "alice");
        let bob = test_user("u2", "bob");
        let post = test_post("p1", "u1", "my-title", post::Status::Published);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[alice]])
                .append_query_results([[post]])
                .into_connection(),
        );

        let service = create_service(db);
        let result = service.delete(&bob, "alice", "my-title").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_publish_stamp_keeps_first_timestamp_by_default() {
        let first: chrono::DateTime<chrono::FixedOffset> =
            "2020-01-01T00:00:00+00:00".parse().unwrap();

        assert_eq!(publish_stamp(Some(&first), false), first);
    }

    #[test]
    fn test_publish_stamp_restamps_when_configured() {
        let first: chrono::DateTime<chrono::FixedOffset> =
            "2020-01-01T00:00:00+00:00".parse().unwrap();

        assert!(publish_stamp(Some(&first), true) > first);
    }

    #[test]
    fn test_publish_stamp_first_publish() {
        assert!(
            publish_stamp(None, false)
                > "2020-01-01T00:00:00+00:00"
                    .parse::<chrono::DateTime<chrono::FixedOffset>>()
                    .unwrap()
        );
    }
}
