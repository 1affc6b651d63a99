//! Profile service.
//!
//! Public profile pages and self-service profile editing. Cropped photo
//! uploads land here after the media service has produced a storage key.

use quill_common::{AppResult, Config};
use quill_db::{
    entities::{profile, user},
    repositories::{FollowRepository, PostRepository, ProfileRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use super::media::PhotoKind;

/// Profile service for business logic.
#[derive(Clone)]
pub struct ProfileService {
    profile_repo: ProfileRepository,
    user_repo: UserRepository,
    post_repo: PostRepository,
    follow_repo: FollowRepository,
    storage_base_url: String,
}

/// Input for editing the caller's own profile. `None` fields are left
/// unchanged; an empty string clears the field.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(max = 128))]
    pub blog_title: Option<String>,

    #[validate(length(max = 4096))]
    pub bio: Option<String>,

    #[validate(length(max = 64))]
    pub city: Option<String>,

    /// Free-text country name as the user wants it displayed.
    #[validate(length(max = 64))]
    pub country: Option<String>,

    #[validate(url)]
    pub website: Option<String>,

    #[validate(length(max = 16))]
    pub twitter: Option<String>,

    #[validate(length(max = 64))]
    pub github: Option<String>,
}

/// Everything needed to render a profile page.
#[derive(Debug)]
pub struct ProfilePage {
    pub user: user::Model,
    pub profile: profile::Model,
    pub location: Option<String>,
    pub post_count: u64,
    pub followers_count: u64,
    pub following_count: u64,
}

impl ProfileService {
    /// Create a new profile service.
    #[must_use]
    pub fn new(
        profile_repo: ProfileRepository,
        user_repo: UserRepository,
        post_repo: PostRepository,
        follow_repo: FollowRepository,
        config: &Config,
    ) -> Self {
        Self {
            profile_repo,
            user_repo,
            post_repo,
            follow_repo,
            storage_base_url: config.storage.base_url.clone(),
        }
    }

    /// Profile page for `username`. Unknown users are a `NotFound`.
    pub async fn page(&self, username: &str) -> AppResult<ProfilePage> {
        let user = self.user_repo.get_by_username(username).await?;
        let profile = self.profile_repo.get_by_user_id(&user.id).await?;

        let post_count = self.post_repo.count_published_by_author(&user.id).await?;
        let followers_count = self.follow_repo.count_followers(&user.id).await?;
        let following_count = self.follow_repo.count_following(&user.id).await?;

        let location = profile.location();

        Ok(ProfilePage {
            user,
            profile,
            location,
            post_count,
            followers_count,
            following_count,
        })
    }

    /// Edit the caller's own profile.
    pub async fn update(
        &self,
        caller: &user::Model,
        input: UpdateProfileInput,
    ) -> AppResult<profile::Model> {
        input.validate()?;

        let profile = self.profile_repo.get_by_user_id(&caller.id).await?;
        let mut active: profile::ActiveModel = profile.into();

        if let Some(blog_title) = input.blog_title {
            active.blog_title = Set(none_if_empty(blog_title));
        }
        if let Some(bio) = input.bio {
            active.bio = Set(none_if_empty(bio));
        }
        if let Some(city) = input.city {
            active.city = Set(none_if_empty(city));
        }
        if let Some(country) = input.country {
            active.country = Set(none_if_empty(country));
        }
        if let Some(website) = input.website {
            active.website = Set(none_if_empty(website));
        }
        if let Some(twitter) = input.twitter {
            active.twitter = Set(none_if_empty(twitter));
        }
        if let Some(github) = input.github {
            active.github = Set(none_if_empty(github));
        }

        let updated = self.profile_repo.update(active).await?;
        tracing::debug!(user_id = %caller.id, "Updated profile");

        Ok(updated)
    }

    /// Record the storage key of a freshly cropped photo and return its
    /// public URL.
    pub async fn set_photo(
        &self,
        caller: &user::Model,
        kind: PhotoKind,
        key: String,
    ) -> AppResult<String> {
        let profile = self.profile_repo.get_by_user_id(&caller.id).await?;
        let mut active: profile::ActiveModel = profile.into();

        let url = format!("{}/{key}", self.storage_base_url);
        match kind {
            PhotoKind::ProfilePicture => active.profile_picture = Set(Some(key)),
            PhotoKind::CoverPhoto => active.cover_photo = Set(Some(key)),
        }

        self.profile_repo.update(active).await?;
        tracing::debug!(user_id = %caller.id, kind = ?kind, "Updated profile photo");

        Ok(url)
    }
}

fn none_if_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
