//! Media service.
//!
//! Decodes an uploaded image, applies the crop rectangle the browser-side
//! cropper selected, scales the result to the fixed dimensions of the
//! photo slot, and persists it through the storage backend.

use std::io::Cursor;
use std::sync::Arc;

use chrono::Utc;
use image::{ImageFormat, imageops::FilterType};
use quill_common::{AppError, AppResult, StorageBackend, UploadedFile};
use serde::Deserialize;

/// Which profile photo slot an upload targets. Each slot has fixed output
/// dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoKind {
    /// 200x200 avatar.
    ProfilePicture,
    /// 1920x300 page banner.
    CoverPhoto,
}

impl PhotoKind {
    /// Output dimensions `(width, height)` for this slot.
    #[must_use]
    pub const fn dimensions(self) -> (u32, u32) {
        match self {
            Self::ProfilePicture => (200, 200),
            Self::CoverPhoto => (1920, 300),
        }
    }
}

/// Crop rectangle in source-image pixels, as reported by the browser-side
/// cropper (fractional values are rounded).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Media service for image processing and storage.
#[derive(Clone)]
pub struct MediaService {
    storage: Arc<dyn StorageBackend>,
}

impl MediaService {
    /// Create a new media service.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// Crop, resize and store a profile photo for `username`.
    pub async fn store_photo(
        &self,
        username: &str,
        kind: PhotoKind,
        data: &[u8],
        rect: CropRect,
    ) -> AppResult<UploadedFile> {
        let format = image::guess_format(data)
            .map_err(|e| AppError::InvalidImage(format!("Unrecognized image format: {e}")))?;

        let processed = crop_and_resize(data, rect, kind.dimensions())?;

        let stamp = Utc::now().format("%Y-%m-%d-%H%M%S");
        let key = format!("uploads/profiles/{username}_{stamp}.{}", extension(format));

        let file = self
            .storage
            .upload(&key, &processed, content_type(format))
            .await?;

        tracing::debug!(key = %file.key, size = file.size, "Stored cropped photo");

        Ok(file)
    }
}

/// Crop `data` to `rect` and scale the result to `target` dimensions,
/// re-encoding in the source format.
fn crop_and_resize(data: &[u8], rect: CropRect, target: (u32, u32)) -> AppResult<Vec<u8>> {
    let format = image::guess_format(data)
        .map_err(|e| AppError::InvalidImage(format!("Unrecognized image format: {e}")))?;
    let img = image::load_from_memory(data)
        .map_err(|e| AppError::InvalidImage(format!("Undecodable image: {e}")))?;

    if rect.width < 1.0 || rect.height < 1.0 || rect.x < 0.0 || rect.y < 0.0 {
        return Err(AppError::InvalidImage(
            "Crop rectangle has non-positive size or negative origin".to_string(),
        ));
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (x, y, w, h) = (
        rect.x.round() as u32,
        rect.y.round() as u32,
        rect.width.round() as u32,
        rect.height.round() as u32,
    );

    if x.saturating_add(w) > img.width() || y.saturating_add(h) > img.height() {
        return Err(AppError::InvalidImage(format!(
            "Crop rectangle {w}x{h}+{x}+{y} exceeds image bounds {}x{}",
            img.width(),
            img.height()
        )));
    }

    let (target_w, target_h) = target;
    let cropped = img
        .crop_imm(x, y, w, h)
        .resize_exact(target_w, target_h, FilterType::Lanczos3);

    let mut out = Cursor::new(Vec::new());
    cropped
        .write_to(&mut out, encode_format(format))
        .map_err(|e| AppError::Internal(format!("Failed to encode image: {e}")))?;

    Ok(out.into_inner())
}

/// Formats we can write back; anything else is stored as PNG.
const fn encode_format(format: ImageFormat) -> ImageFormat {
    match format {
        ImageFormat::Jpeg | ImageFormat::Gif | ImageFormat::WebP => format,
        _ => ImageFormat::Png,
    }
}

const fn extension(format: ImageFormat) -> &'static str {
    match encode_format(format) {
        ImageFormat::Jpeg => "jpg",
        ImageFormat::Gif => "gif",
        ImageFormat::WebP => "webp",
        _ => "png",
    }
}

const fn content_type(format: ImageFormat) -> &'static str {
    match encode_format(format) {
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        _ => "image/png",
    }
}
