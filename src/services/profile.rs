/*
 * Responsibility
 * - reconcile provider identities with the local user directory
 *   - register: local duplicate check -> provider account -> local insert
 *   - login / get: verified uid -> local profile (NotFound if unprovisioned)
 *   - upsert: update provided fields, create on first sight
 * - no retries; the first failure fails the request
 */
use std::sync::Arc;

use crate::error::{AppError, EMAIL_TAKEN};
use crate::repos::error::RepoError;
use crate::repos::user_repo::{NewUser, ProfileFields, UserDirectory, UserRow};
use crate::services::identity::{Claims, IdentityProvider, NewIdentity};

#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

pub struct ProfileService {
    identity: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserDirectory>,
}

impl ProfileService {
    pub fn new(identity: Arc<dyn IdentityProvider>, users: Arc<dyn UserDirectory>) -> Self {
        Self { identity, users }
    }

    pub async fn register(&self, registration: Registration) -> Result<UserRow, AppError> {
        // Fast path only. The unique index on users.email is what actually closes the
        // race between two concurrent registrations.
        if self
            .users
            .find_by_email(&registration.email)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(EMAIL_TAKEN));
        }

        let created = self
            .identity
            .create_account(&NewIdentity {
                email: registration.email.clone(),
                password: registration.password,
                display_name: registration.display_name.clone(),
            })
            .await?;

        tracing::info!(uid = %created.uid, "provider account created");

        let inserted = self
            .users
            .insert(&NewUser {
                uid: created.uid.clone(),
                email: created.email,
                name: Some(registration.display_name),
            })
            .await;

        match inserted {
            Ok(row) => {
                tracing::info!(uid = %row.uid, user_id = %row.id, "user profile created");
                Ok(row)
            }
            Err(err) => {
                // The provider account now has no local mirror. Left for manual cleanup.
                tracing::error!(
                    uid = %created.uid,
                    error = ?err,
                    "local profile insert failed after provider account creation; provider identity is orphaned"
                );
                Err(match err {
                    RepoError::Conflict => AppError::conflict(EMAIL_TAKEN),
                    other => other.into(),
                })
            }
        }
    }

    pub async fn login(&self, token: &str) -> Result<UserRow, AppError> {
        let claims = self.identity.verify_token(token).await?;
        self.users
            .find_by_uid(&claims.uid)
            .await?
            .ok_or(AppError::not_found("User"))
    }

    pub async fn get_profile(&self, uid: &str) -> Result<UserRow, AppError> {
        self.users
            .find_by_uid(uid)
            .await?
            .ok_or(AppError::not_found("User profile"))
    }

    /// Update-if-exists-else-create for the caller's own profile.
    pub async fn upsert_profile(
        &self,
        claims: &Claims,
        fields: &ProfileFields,
    ) -> Result<UserRow, AppError> {
        let row = match claims.email.as_deref() {
            Some(email) => self
                .users
                .upsert_profile(&claims.uid, email, fields)
                .await
                .map_err(|err| match err {
                    RepoError::Conflict => AppError::conflict(EMAIL_TAKEN),
                    other => other.into(),
                })?,
            // Without a verified email there is nothing valid to create from.
            None => self
                .users
                .update_profile(&claims.uid, fields)
                .await?
                .ok_or_else(|| {
                    AppError::bad_request("A verified email is required to create a profile")
                })?,
        };

        Ok(row)
    }

    pub async fn list_profiles(&self) -> Result<Vec<UserRow>, AppError> {
        Ok(self.users.list().await?)
    }

    pub async fn update_account(
        &self,
        uid: &str,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<UserRow, AppError> {
        self.users
            .update_account(uid, name, email)
            .await
            .map_err(|err| match err {
                RepoError::Conflict => AppError::conflict(EMAIL_TAKEN),
                other => other.into(),
            })?
            .ok_or(AppError::not_found("User"))
    }

    /// Hard delete. Itineraries keep their (now dangling) owner id.
    pub async fn delete_profile(&self, uid: &str) -> Result<(), AppError> {
        if self.users.delete(uid).await? {
            tracing::info!(%uid, "user profile deleted");
            Ok(())
        } else {
            Err(AppError::not_found("User"))
        }
    }
}
