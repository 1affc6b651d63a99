//! Common utilities and shared types for quill.
//!
//! This crate provides foundational components used across all quill crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Slugs**: URL-safe post identifiers via [`slugify`] and [`assign_slug`]
//! - **Storage**: File storage backend for uploaded images
//!
//! # Example
//!
//! ```no_run
//! use quill_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {}", id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod slug;
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use slug::{assign_slug, is_valid_username, slugify};
pub use storage::{LocalStorage, StorageBackend, UploadedFile};
