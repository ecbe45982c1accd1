/*
 * Responsibility
 * - /itinerary response DTOs (the request side is multipart, parsed in the handler)
 */
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::repos::itinerary_repo::ItineraryWithOwner;

#[derive(Debug, Serialize)]
pub struct OwnerView {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub image_url: String,
    /// `null` when the owner profile no longer exists.
    pub user: Option<OwnerView>,
    pub created_at: DateTime<Utc>,
}

impl From<ItineraryWithOwner> for ItineraryResponse {
    fn from(row: ItineraryWithOwner) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            location: row.location,
            image_url: row.image_url,
            user: row.owner_id.map(|id| OwnerView {
                id,
                name: row.owner_name,
                email: row.owner_email,
            }),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ItineraryCreatedResponse {
    pub message: &'static str,
    pub id: Uuid,
}
