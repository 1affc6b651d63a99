//! User service.
//!
//! Registration, credential checks, and token lifecycle. Passwords are
//! hashed with Argon2 and stored on the profile row; the token column on
//! the user row is the bearer credential for authenticated requests.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use quill_common::{AppError, AppResult, IdGenerator, is_valid_username};
use quill_db::{
    entities::{profile, user},
    repositories::{ProfileRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    profile_repo: ProfileRepository,
    id_gen: IdGenerator,
}

/// Input for registering a new user.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 3, max = 30))]
    pub username: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(min = 1, max = 64))]
    pub first_name: String,

    #[validate(length(min = 1, max = 64))]
    pub last_name: String,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(user_repo: UserRepository, profile_repo: ProfileRepository) -> Self {
        Self {
            user_repo,
            profile_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new user together with an empty profile.
    ///
    /// The username must already be in slug form, so that author page URLs
    /// never need escaping and can never collide with a normalized slug of
    /// a different name.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        if !is_valid_username(&input.username) {
            return Err(AppError::Validation(
                "Username may only contain lowercase letters, digits and hyphens".to_string(),
            ));
        }

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Validation("Email already registered".to_string()));
        }
        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::Validation("Username already taken".to_string()));
        }

        let password_hash = hash_password(&input.password)?;

        let user = self
            .user_repo
            .create(user::ActiveModel {
                id: Set(self.id_gen.generate()),
                email: Set(input.email),
                username: Set(input.username),
                first_name: Set(input.first_name),
                last_name: Set(input.last_name),
                token: Set(Some(self.id_gen.generate_token())),
                is_admin: Set(false),
                is_active: Set(true),
                ..Default::default()
            })
            .await?;

        self.profile_repo
            .create(profile::ActiveModel {
                user_id: Set(user.id.clone()),
                password: Set(Some(password_hash)),
                ..Default::default()
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "Registered user");

        Ok(user)
    }

    /// Verify email/password credentials and rotate the access token.
    ///
    /// Both an unknown email and a wrong password produce the same
    /// `Unauthorized`.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !user.is_active {
            return Err(AppError::Unauthorized);
        }

        let profile = self.profile_repo.get_by_user_id(&user.id).await?;
        let stored = profile.password.ok_or(AppError::Unauthorized)?;
        if !verify_password(password, &stored) {
            return Err(AppError::Unauthorized);
        }

        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(self.id_gen.generate_token()));
        let user = self.user_repo.update(active).await?;

        tracing::debug!(user_id = %user.id, "User logged in");

        Ok(user)
    }

    /// Invalidate the caller's access token.
    pub async fn logout(&self, caller: user::Model) -> AppResult<()> {
        let mut active: user::ActiveModel = caller.into();
        active.token = Set(None);
        self.user_repo.update(active).await?;
        Ok(())
    }

    /// Resolve a bearer token to a user. Used by the auth middleware.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !user.is_active {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}
