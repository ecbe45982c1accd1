/*
 * Responsibility
 * - itinerary submission: image -> blob store, record -> repo
 * - listing joined with owner display fields
 */
use std::sync::Arc;

use uuid::Uuid;

use crate::error::AppError;
use crate::repos::itinerary_repo::{ItineraryRepo, ItineraryRow, ItineraryWithOwner, NewItinerary};
use crate::services::blob::{BlobStore, blob_name};

/// Raster formats accepted for upload. Anything a browser could execute (HTML, SVG)
/// is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageKind {
    /// Maps a declared `Content-Type`; `None` for anything outside the raster allowlist.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/gif" => Some(Self::Gif),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Identifies the format from its magic bytes.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        match data {
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(Self::Png),
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(Self::Gif),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }
}

pub const UNSUPPORTED_IMAGE: &str = "Only PNG, JPEG, GIF or WebP images are allowed";

#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ItinerarySubmission {
    pub title: String,
    pub description: String,
    pub location: String,
    pub owner_id: Uuid,
    pub image: UploadedImage,
}

pub struct ItineraryService {
    repo: Arc<dyn ItineraryRepo>,
    blobs: Arc<dyn BlobStore>,
}

impl ItineraryService {
    pub fn new(repo: Arc<dyn ItineraryRepo>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { repo, blobs }
    }

    pub async fn add(&self, submission: ItinerarySubmission) -> Result<ItineraryRow, AppError> {
        // The stored extension follows the bytes, not the client's filename or header.
        let kind = ImageKind::sniff(&submission.image.data)
            .ok_or_else(|| AppError::bad_request(UNSUPPORTED_IMAGE))?;
        let name = blob_name(
            submission.image.file_name.as_deref(),
            kind.extension(),
            chrono::Utc::now().timestamp_millis(),
        );
        let image_url = self.blobs.put(&name, &submission.image.data).await?;

        let inserted = self
            .repo
            .insert(&NewItinerary {
                title: submission.title,
                description: submission.description,
                location: submission.location,
                image_url,
                user_id: submission.owner_id,
            })
            .await;

        match inserted {
            Ok(row) => {
                tracing::info!(itinerary_id = %row.id, owner = %row.user_id, "itinerary stored");
                Ok(row)
            }
            Err(err) => {
                if let Err(cleanup) = self.blobs.delete(&name).await {
                    tracing::warn!(blob = %name, error = ?cleanup, "orphaned upload left behind");
                }
                Err(err.into())
            }
        }
    }

    pub async fn list_all(&self) -> Result<Vec<ItineraryWithOwner>, AppError> {
        Ok(self.repo.list_with_owner().await?)
    }
}
