use async_trait::async_trait;
use jsonwebtoken::{Algorithm, Validation};
use serde::{Deserialize, Serialize};

use crate::services::identity::jwks::JwksCache;
use crate::services::identity::{
    Claims, CreatedIdentity, IdentityError, IdentityProvider, NewIdentity,
};

const MAX_UID_LEN: usize = 128;

/// Raw Firebase ID token payload.
///
/// `aud`/`iss`/`exp` are checked by `jsonwebtoken::Validation`; the rest is checked in
/// [`IdTokenClaims::into_claims`].
#[derive(Debug, Clone, Deserialize)]
struct IdTokenClaims {
    sub: String,
    exp: i64,
    iat: i64,
    auth_time: i64,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
    #[serde(default)]
    name: Option<String>,
}

impl IdTokenClaims {
    fn into_claims(self, now: i64, leeway: i64) -> Result<Claims, IdentityError> {
        if self.sub.trim().is_empty() {
            return Err(IdentityError::unauthenticated("token has an empty 'sub' claim"));
        }
        if self.sub.len() > MAX_UID_LEN {
            return Err(IdentityError::unauthenticated(
                "token 'sub' claim exceeds 128 characters",
            ));
        }
        if self.iat > now + leeway {
            return Err(IdentityError::unauthenticated("token issued in the future"));
        }
        if self.auth_time > now + leeway {
            return Err(IdentityError::unauthenticated(
                "token 'auth_time' is in the future",
            ));
        }

        Ok(Claims {
            uid: self.sub,
            email: self.email,
            email_verified: self.email_verified.unwrap_or(false),
            name: self.name,
            issued_at: self.iat,
            expires_at: self.exp,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: ProviderError,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: String,
}

/// Firebase Authentication adapter.
///
/// - ID tokens: RS256, verified locally against Google's published keys
/// - accounts: Identity Toolkit `accounts:signUp` with the project API key
///
/// The API key is intentionally not printable via Debug.
pub struct FirebaseIdentity {
    http: reqwest::Client,
    project_id: String,
    api_key: String,
    identity_base_url: String,
    keys: JwksCache,
    validation: Validation,
    leeway_seconds: i64,
}

impl std::fmt::Debug for FirebaseIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseIdentity")
            .field("project_id", &self.project_id)
            .field("identity_base_url", &self.identity_base_url)
            .field("keys", &self.keys)
            .finish()
    }
}

impl FirebaseIdentity {
    pub fn new(
        http: reqwest::Client,
        project_id: &str,
        api_key: &str,
        identity_base_url: &str,
        keys: JwksCache,
        leeway_seconds: u64,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[format!("https://securetoken.google.com/{project_id}")]);
        validation.set_audience(&[project_id]);
        validation.set_required_spec_claims(&["exp", "iat", "iss", "aud", "sub"]);
        validation.leeway = leeway_seconds;

        Self {
            http,
            project_id: project_id.to_string(),
            api_key: api_key.to_string(),
            identity_base_url: identity_base_url.trim_end_matches('/').to_string(),
            keys,
            validation,
            leeway_seconds: i64::try_from(leeway_seconds).unwrap_or(i64::MAX),
        }
    }

    fn sign_up_url(&self) -> String {
        format!("{}/accounts:signUp?key={}", self.identity_base_url, self.api_key)
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn verify_token(&self, token: &str) -> Result<Claims, IdentityError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(IdentityError::unauthenticated("no token"));
        }

        let header = jsonwebtoken::decode_header(token)
            .map_err(|e| IdentityError::unauthenticated(format!("malformed token: {e}")))?;
        if header.alg != Algorithm::RS256 {
            return Err(IdentityError::unauthenticated(format!(
                "unexpected signing algorithm {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| IdentityError::unauthenticated("token has no 'kid' header"))?;

        let key = self.keys.decoding_key(&self.http, &kid).await?;

        let data = jsonwebtoken::decode::<IdTokenClaims>(token, &key, &self.validation)
            .map_err(|e| IdentityError::unauthenticated(format!("token rejected: {e}")))?;

        data.claims
            .into_claims(chrono::Utc::now().timestamp(), self.leeway_seconds)
    }

    async fn create_account(&self, new: &NewIdentity) -> Result<CreatedIdentity, IdentityError> {
        let response = self
            .http
            .post(self.sign_up_url())
            .json(&SignUpRequest {
                email: &new.email,
                password: &new.password,
                display_name: &new.display_name,
                return_secure_token: false,
            })
            .send()
            .await
            .map_err(|e| IdentityError::Upstream(e.to_string()))?;

        if response.status().is_success() {
            let body: SignUpResponse = response
                .json()
                .await
                .map_err(|e| IdentityError::Upstream(format!("malformed signUp response: {e}")))?;

            return Ok(CreatedIdentity {
                uid: body.local_id,
                email: body.email.unwrap_or_else(|| new.email.clone()),
            });
        }

        let status = response.status();
        let body: ProviderErrorBody = response.json().await.map_err(|e| {
            IdentityError::Upstream(format!("signUp failed with {status}: {e}"))
        })?;

        Err(classify_provider_error(body.error.message))
    }
}

// Identity Toolkit errors look like "EMAIL_EXISTS" or
// "WEAK_PASSWORD : Password should be at least 6 characters".
fn classify_provider_error(message: String) -> IdentityError {
    let code = message.split(':').next().unwrap_or_default().trim();
    match code {
        "EMAIL_EXISTS" => IdentityError::EmailExists,
        "INVALID_EMAIL" | "WEAK_PASSWORD" | "MISSING_PASSWORD" | "MISSING_EMAIL" => {
            IdentityError::Rejected(message)
        }
        _ => IdentityError::Upstream(message),
    }
}
