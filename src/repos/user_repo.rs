/*
 * Responsibility
 * - the user directory: local mirror of identity-provider accounts, keyed by `uid`
 * - `UserDirectory` trait so services can run against an in-memory fake
 * - `PgUserDirectory`: SQLx implementation on the `users` table
 * - unique violations (uid / email) come back as RepoError::Conflict
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub uid: String,
    pub email: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub uid: String,
    pub email: String,
    pub name: Option<String>,
}

/// Mutable profile fields. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFields {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub profile_picture: Option<String>,
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn list(&self) -> RepoResult<Vec<UserRow>>;

    async fn find_by_uid(&self, uid: &str) -> RepoResult<Option<UserRow>>;

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRow>>;

    async fn insert(&self, new: &NewUser) -> RepoResult<UserRow>;

    /// Set the provided fields on `uid`, inserting `{uid, email}` first if no row exists.
    /// `email` is only used on insert.
    async fn upsert_profile(
        &self,
        uid: &str,
        email: &str,
        fields: &ProfileFields,
    ) -> RepoResult<UserRow>;

    async fn update_profile(&self, uid: &str, fields: &ProfileFields)
    -> RepoResult<Option<UserRow>>;

    async fn update_account(
        &self,
        uid: &str,
        name: Option<&str>,
        email: Option<&str>,
    ) -> RepoResult<Option<UserRow>>;

    async fn delete(&self, uid: &str) -> RepoResult<bool>;
}

const USER_COLUMNS: &str = "id, uid, email, name, bio, location, profile_picture, created_at";

#[derive(Clone, Debug)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn list(&self) -> RepoResult<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_by_uid(&self, uid: &str) -> RepoResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE uid = $1"
        ))
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn insert(&self, new: &NewUser) -> RepoResult<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (uid, email, name)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.uid)
        .bind(&new.email)
        .bind(new.name.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn upsert_profile(
        &self,
        uid: &str,
        email: &str,
        fields: &ProfileFields,
    ) -> RepoResult<UserRow> {
        // Single statement: atomic per row. COALESCE keeps stored values for absent
        // fields, so replaying the same field set converges to the same row.
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (uid, email, name, bio, location, profile_picture)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (uid) DO UPDATE
            SET
                name = COALESCE(EXCLUDED.name, users.name),
                bio = COALESCE(EXCLUDED.bio, users.bio),
                location = COALESCE(EXCLUDED.location, users.location),
                profile_picture = COALESCE(EXCLUDED.profile_picture, users.profile_picture)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(uid)
        .bind(email)
        .bind(fields.name.as_deref())
        .bind(fields.bio.as_deref())
        .bind(fields.location.as_deref())
        .bind(fields.profile_picture.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn update_profile(
        &self,
        uid: &str,
        fields: &ProfileFields,
    ) -> RepoResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET
                name = COALESCE($2, name),
                bio = COALESCE($3, bio),
                location = COALESCE($4, location),
                profile_picture = COALESCE($5, profile_picture)
            WHERE uid = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(uid)
        .bind(fields.name.as_deref())
        .bind(fields.bio.as_deref())
        .bind(fields.location.as_deref())
        .bind(fields.profile_picture.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update_account(
        &self,
        uid: &str,
        name: Option<&str>,
        email: Option<&str>,
    ) -> RepoResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET
                name = COALESCE($2, name),
                email = COALESCE($3, email)
            WHERE uid = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(uid)
        .bind(name)
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn delete(&self, uid: &str) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE uid = $1
            "#,
        )
        .bind(uid)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
