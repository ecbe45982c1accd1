/*
 * Responsibility
 * - itineraries: insert + list joined with the owner's display fields
 * - `user_id` is a weak reference (no FK); a deleted owner leaves owner_* NULL
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ItineraryRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub image_url: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ItineraryWithOwner {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub image_url: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub owner_id: Option<Uuid>,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewItinerary {
    pub title: String,
    pub description: String,
    pub location: String,
    pub image_url: String,
    pub user_id: Uuid,
}

#[async_trait]
pub trait ItineraryRepo: Send + Sync {
    async fn insert(&self, new: &NewItinerary) -> RepoResult<ItineraryRow>;

    /// Newest first.
    async fn list_with_owner(&self) -> RepoResult<Vec<ItineraryWithOwner>>;
}

#[derive(Clone, Debug)]
pub struct PgItineraryRepo {
    pool: PgPool,
}

impl PgItineraryRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItineraryRepo for PgItineraryRepo {
    async fn insert(&self, new: &NewItinerary) -> RepoResult<ItineraryRow> {
        let row = sqlx::query_as::<_, ItineraryRow>(
            r#"
            INSERT INTO itineraries (title, description, location, image_url, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, location, image_url, user_id, created_at
            "#,
        )
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.location)
        .bind(&new.image_url)
        .bind(new.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn list_with_owner(&self) -> RepoResult<Vec<ItineraryWithOwner>> {
        let rows = sqlx::query_as::<_, ItineraryWithOwner>(
            r#"
            SELECT
                i.id, i.title, i.description, i.location, i.image_url, i.user_id, i.created_at,
                u.id AS owner_id,
                u.name AS owner_name,
                u.email AS owner_email
            FROM itineraries i
            LEFT JOIN users u ON u.id = i.user_id
            ORDER BY i.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
