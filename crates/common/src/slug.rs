//! Slug normalization and per-author unique assignment.
//!
//! A slug is the URL-safe identifier of a post, unique within the scope of
//! its author: the storage layer enforces a unique `(author, slug)` pair,
//! so the same slug may recur across different authors.

use std::collections::HashSet;

use crate::{AppError, AppResult};

/// Normalize a title to its URL-safe, lowercase, hyphenated form.
///
/// Alphanumeric characters and underscores are kept (lowercased); every
/// other run of characters collapses into a single hyphen. Leading and
/// trailing hyphens and underscores are stripped, so `"  My Title!  "`
/// becomes `"my-title"` and a title with no slug-safe characters
/// normalizes to the empty string.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars() {
        if c.is_alphanumeric() || c == '_' {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_hyphen = true;
        }
    }

    slug.trim_matches(['-', '_']).to_string()
}

/// Compute a slug for `title` that does not collide with `taken`.
///
/// `taken` is the set of slugs already used by the same author, excluding
/// the post's own current slug when updating. If the base slug is free it
/// is used unchanged; otherwise numeric suffixes `-2`, `-3`, … are tried in
/// order and the smallest free one wins. This suffix scheme is part of the
/// contract: the second "My Title" by an author becomes `my-title-2`.
///
/// Fails with [`AppError::InvalidTitle`] when the title normalizes to an
/// empty string.
pub fn assign_slug(title: &str, taken: &HashSet<String>) -> AppResult<String> {
    let base = slugify(title);
    if base.is_empty() {
        return Err(AppError::InvalidTitle);
    }

    if !taken.contains(&base) {
        return Ok(base);
    }

    let mut n: u64 = 2;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken.contains(&candidate) {
            return Ok(candidate);
        }
        n += 1;
    }
}

/// Whether `username` is a valid, slug-normalized username.
///
/// A username must already equal its own slug form (lowercase, slug-safe
/// characters only), so author page URLs never need escaping and never
/// collide with the normalized form of a different name.
#[must_use]
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty() && slugify(username) == username
}
