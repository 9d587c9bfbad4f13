//! Validation and naming for product photo uploads.
//!
//! Only the local part lives here: the caller sends the file with the plan's
//! folder, public id, tags and alt text to the image host.

use crate::model::Material;
use crate::normalize::slugify;
use crate::{CatalogImportError, CatalogResult};

pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/avif"];
pub const STORE_TAG: &str = "diego-joyero";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUploadPlan {
    /// `base_folder/oro` or `base_folder/plata`.
    pub folder: String,
    pub public_id: String,
    pub extension: String,
    pub alt: String,
    pub tags: Vec<String>,
}

impl ImageUploadPlan {
    /// Id the host is expected to report back.
    pub fn expected_id(&self) -> String {
        format!("{}/{}", self.folder, self.public_id)
    }
}

/// Check a photo against the upload limits and derive where it goes.
///
/// `stamp` and `nonce` make the public id unique; the caller picks them
/// (typically a compact UTC timestamp and a short random token).
pub fn plan_image_upload(
    file_name: &str,
    mime: &str,
    size: u64,
    material: Material,
    base_folder: &str,
    stamp: &str,
    nonce: &str,
) -> CatalogResult<ImageUploadPlan> {
    if !ALLOWED_IMAGE_TYPES.contains(&mime) {
        return Err(CatalogImportError::UnsupportedImageType(mime.to_string()));
    }
    if size > MAX_IMAGE_BYTES {
        return Err(CatalogImportError::ImageTooLarge {
            size,
            max: MAX_IMAGE_BYTES,
        });
    }

    // Extension is whatever follows the last dot, possibly empty. The stem only
    // loses a non-empty, slash-free extension, so "foo." keeps its dot.
    let extension = file_name.rsplit('.').next().unwrap_or_default().to_lowercase();
    let stem = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() && !ext.contains('/') => stem,
        _ => file_name,
    };
    let alt = if stem.is_empty() { "producto" } else { stem };
    let slug = match slugify(alt) {
        s if s.is_empty() => "pieza".to_string(),
        s => s,
    };

    let base_folder = base_folder.trim().trim_end_matches('/');
    let folder = if base_folder.is_empty() {
        material.folder().to_string()
    } else {
        format!("{base_folder}/{}", material.folder())
    };

    Ok(ImageUploadPlan {
        folder,
        public_id: format!("{stamp}-{nonce}-{slug}"),
        extension,
        alt: alt.to_string(),
        tags: vec![STORE_TAG.to_string(), material.to_string()],
    })
}
