/// Factory: build the identity provider from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::services::identity::{FirebaseIdentity, IdentityProvider, jwks::JwksCache};

pub fn build_identity_provider(config: &Config) -> Result<Arc<dyn IdentityProvider>, AppError> {
    // One client for key fetches and account calls; the timeout bounds every provider round trip.
    let http = reqwest::Client::builder()
        .timeout(config.identity_timeout)
        .build()
        .map_err(|e| {
            tracing::error!(error = %e, "failed to build identity http client");
            AppError::Internal
        })?;

    let firebase = FirebaseIdentity::new(
        http,
        &config.firebase_project_id,
        &config.firebase_api_key,
        &config.identity_base_url,
        JwksCache::remote(config.jwks_url.clone()),
        config.id_token_leeway_seconds,
    );

    Ok(Arc::new(firebase))
}
