//! Database repositories.

mod comment;
mod follow;
mod post;
mod profile;
mod user;

pub use comment::CommentRepository;
pub use follow::FollowRepository;
pub use post::PostRepository;
pub use profile::ProfileRepository;
pub use user::UserRepository;
