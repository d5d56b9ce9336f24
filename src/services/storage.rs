//! Filesystem-backed object storage for garden photos and verification
//! documents.
//!
//! Objects live at `<root>/<bucket>/<path>`. Paths are checked segment by
//! segment before they touch the filesystem.

use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult, ValidationError};

pub const MAX_OBJECT_BYTES: usize = 5 * 1024 * 1024;

const IMAGE_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    /// Public read, any signed-in user may upload images
    GardenImages,
    /// Private; the first path segment is the owning user's id
    VerificationDocuments,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::GardenImages => "garden-images",
            Bucket::VerificationDocuments => "verification-documents",
        }
    }
}

impl FromStr for Bucket {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "garden-images" => Ok(Bucket::GardenImages),
            "verification-documents" => Ok(Bucket::VerificationDocuments),
            _ => Err(AppError::NotFound(format!("bucket {}", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredObject {
    pub bucket: String,
    pub path: String,
    pub size: usize,
    pub content_type: String,
}

/// Splits `path` into safe segments: no empty, `.` or `..` segments, no
/// backslashes, no leading slash.
pub fn validate_object_path(path: &str) -> Result<Vec<&str>, ValidationError> {
    if path.is_empty() {
        return Err(ValidationError::new("path", "is required"));
    }
    if path.starts_with('/') {
        return Err(ValidationError::new("path", "must be relative"));
    }
    if path.contains('\\') || path.contains('\0') {
        return Err(ValidationError::new("path", "contains forbidden characters"));
    }

    let segments: Vec<&str> = path.split('/').collect();
    if segments
        .iter()
        .any(|s| s.is_empty() || *s == "." || *s == "..")
    {
        return Err(ValidationError::new(
            "path",
            "must not contain empty, '.' or '..' segments",
        ));
    }
    Ok(segments)
}

pub fn content_type_for(path: &str) -> &'static str {
    let extension = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// The owner namespace of verification documents is the first segment
fn ensure_owner_namespace(segments: &[&str], user_id: Uuid) -> AppResult<()> {
    match segments.first().map(|s| Uuid::parse_str(s)) {
        Some(Ok(owner)) if owner == user_id => Ok(()),
        _ => Err(AppError::Forbidden(
            "verification documents are only accessible to their owner".to_string(),
        )),
    }
}

#[derive(Debug, Clone)]
pub struct ObjectStorage {
    root: PathBuf,
}

impl ObjectStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, bucket: Bucket, segments: &[&str]) -> PathBuf {
        let mut full = self.root.join(bucket.as_str());
        for segment in segments {
            full.push(segment);
        }
        full
    }

    pub async fn put(
        &self,
        bucket: Bucket,
        path: &str,
        content_type: Option<&str>,
        body: &[u8],
        user_id: Uuid,
    ) -> AppResult<StoredObject> {
        let segments = validate_object_path(path)?;

        if body.len() > MAX_OBJECT_BYTES {
            return Err(ValidationError::new("body", "object exceeds the 5 MiB limit").into());
        }

        let content_type = content_type
            .map(|c| c.split(';').next().unwrap_or(c).trim().to_lowercase())
            .unwrap_or_else(|| content_type_for(path).to_string());

        match bucket {
            Bucket::GardenImages => {
                if !IMAGE_CONTENT_TYPES.contains(&content_type.as_str()) {
                    return Err(ValidationError::new(
                        "content_type",
                        "garden images must be jpeg, png or webp",
                    )
                    .into());
                }
            }
            Bucket::VerificationDocuments => ensure_owner_namespace(&segments, user_id)?,
        }

        let full = self.object_path(bucket, &segments);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, body).await?;

        tracing::info!(
            "Stored {} bytes at {}/{} for {}",
            body.len(),
            bucket.as_str(),
            path,
            user_id
        );

        Ok(StoredObject {
            bucket: bucket.as_str().to_string(),
            path: path.to_string(),
            size: body.len(),
            content_type,
        })
    }

    /// Returns the object bytes and their content type. `viewer` is `None`
    /// for anonymous reads, which only the public bucket allows.
    pub async fn get(
        &self,
        bucket: Bucket,
        path: &str,
        viewer: Option<Uuid>,
    ) -> AppResult<(Vec<u8>, &'static str)> {
        let segments = validate_object_path(path)?;

        if bucket == Bucket::VerificationDocuments {
            let viewer = viewer.ok_or(AppError::Unauthorized)?;
            ensure_owner_namespace(&segments, viewer)?;
        }

        let full = self.object_path(bucket, &segments);
        match tokio::fs::read(&full).await {
            Ok(bytes) => Ok((bytes, content_type_for(path))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound("object".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
