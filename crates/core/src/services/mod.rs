//! Business logic services.

#![allow(missing_docs)]

pub mod comment;
pub mod follow;
pub mod media;
pub mod post;
pub mod profile;
pub mod user;

pub use comment::{CommentService, CreateCommentInput};
pub use follow::FollowService;
pub use media::{CropRect, MediaService, PhotoKind};
pub use post::{CreatePostInput, PostDetail, PostService, UpdatePostInput};
pub use profile::{ProfilePage, ProfileService, UpdateProfileInput};
pub use user::{CreateUserInput, UserService};
