/*
 * Responsibility
 * - /user request/response DTOs
 * - profile responses are camelCase (profilePicture, createdAt)
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::user_repo::{ProfileFields, UserRow};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub uid: String,
    pub email: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for ProfileResponse {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            uid: row.uid,
            email: row.email,
            name: row.name,
            bio: row.bio,
            location: row.location,
            profile_picture: row.profile_picture,
            created_at: row.created_at,
        }
    }
}

/// Public listing shape; bio/location stay private to the owner.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub uid: String,
    pub email: String,
    pub name: Option<String>,
}

impl From<UserRow> for UserSummary {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            uid: row.uid,
            email: row.email,
            name: row.name,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub profile_picture: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(self) -> Result<ProfileFields, &'static str> {
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err("name cannot be empty");
        }
        if let Some(url) = &self.profile_picture
            && url.len() > 2048
        {
            return Err("profilePicture must be <= 2048 chars");
        }

        Ok(ProfileFields {
            name: self.name,
            bio: self.bio,
            location: self.location,
            profile_picture: self.profile_picture,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UpdateAccountRequest {
    pub fn validate(self) -> Result<(Option<String>, Option<String>), &'static str> {
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err("name cannot be empty");
        }
        let email = self.email.map(|e| e.trim().to_lowercase());
        if let Some(email) = &email
            && !email.contains('@')
        {
            return Err("A valid email is required");
        }

        Ok((self.name, email))
    }
}

#[derive(Debug, Serialize)]
pub struct UserUpdatedResponse<T> {
    pub message: &'static str,
    pub user: T,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
