//! Database entities.

pub mod comment;
pub mod follow;
pub mod post;
pub mod profile;
pub mod user;

pub use comment::Entity as Comment;
pub use follow::Entity as Follow;
pub use post::Entity as Post;
pub use profile::Entity as Profile;
pub use user::Entity as User;
