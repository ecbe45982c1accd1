//! Cached signing keys for ID token verification.
//!
//! Keys are fetched from the provider's JWKS endpoint and kept for the
//! `Cache-Control: max-age` it advertises. A token naming an unknown `kid` may force
//! a refresh (key rotation), but at most once per `MIN_FORCED_REFRESH`; concurrent
//! misses wait on the same fetch instead of issuing their own.
use std::time::{Duration, Instant};

use axum::http::{HeaderMap, header};
use jsonwebtoken::{DecodingKey, jwk::JwkSet};
use tokio::sync::{Mutex, RwLock};

use crate::services::identity::IdentityError;

const FALLBACK_TTL: Duration = Duration::from_secs(60 * 60);
const MIN_FORCED_REFRESH: Duration = Duration::from_secs(60);

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
    expires_at: Instant,
}

enum Lookup {
    Hit(DecodingKey),
    Miss { fetched_recently: bool },
}

pub struct JwksCache {
    // None: fixed key set, never refreshed
    url: Option<String>,
    cached: RwLock<Option<CachedKeys>>,
    // held for the whole of a remote fetch
    refresh_gate: Mutex<()>,
}

impl std::fmt::Debug for JwksCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwksCache").field("url", &self.url).finish()
    }
}

impl JwksCache {
    pub fn remote(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            cached: RwLock::new(None),
            refresh_gate: Mutex::new(()),
        }
    }

    /// A key set that is never refreshed (emulators, tests).
    pub fn fixed(keys: JwkSet) -> Self {
        Self {
            url: None,
            cached: RwLock::new(Some(CachedKeys {
                keys,
                fetched_at: Instant::now(),
                expires_at: far_future(),
            })),
            refresh_gate: Mutex::new(()),
        }
    }

    pub async fn decoding_key(
        &self,
        http: &reqwest::Client,
        kid: &str,
    ) -> Result<DecodingKey, IdentityError> {
        if let Lookup::Hit(key) = self.lookup(kid).await? {
            return Ok(key);
        }

        let Some(url) = self.url.as_deref() else {
            return Err(unknown_kid(kid));
        };

        let _gate = self.refresh_gate.lock().await;

        // Another caller may have refreshed while we waited.
        match self.lookup(kid).await? {
            Lookup::Hit(key) => return Ok(key),
            Lookup::Miss {
                fetched_recently: true,
            } => {
                tracing::debug!(kid, "unknown kid, key set fetched too recently to refresh");
                return Err(unknown_kid(kid));
            }
            Lookup::Miss { .. } => {}
        }

        let keys = self.refresh(http, url).await?;
        find_key(&keys, kid)?.ok_or_else(|| unknown_kid(kid))
    }

    async fn lookup(&self, kid: &str) -> Result<Lookup, IdentityError> {
        let guard = self.cached.read().await;
        let Some(cached) = guard.as_ref() else {
            return Ok(Lookup::Miss {
                fetched_recently: false,
            });
        };

        let fresh = cached.expires_at > Instant::now() || self.url.is_none();
        if fresh && let Some(key) = find_key(&cached.keys, kid)? {
            return Ok(Lookup::Hit(key));
        }

        Ok(Lookup::Miss {
            fetched_recently: fresh && cached.fetched_at.elapsed() < MIN_FORCED_REFRESH,
        })
    }

    async fn refresh(&self, http: &reqwest::Client, url: &str) -> Result<JwkSet, IdentityError> {
        let response = http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                tracing::warn!(error = %e, "failed to fetch signing keys");
                IdentityError::unauthenticated(format!("failed to fetch signing keys: {e}"))
            })?;

        let ttl = max_age(response.headers()).unwrap_or(FALLBACK_TTL);
        let keys: JwkSet = response.json().await.map_err(|e| {
            IdentityError::unauthenticated(format!("malformed signing key set: {e}"))
        })?;

        tracing::debug!(count = keys.keys.len(), ttl_secs = ttl.as_secs(), "signing keys refreshed");

        let mut guard = self.cached.write().await;
        let now = Instant::now();
        *guard = Some(CachedKeys {
            keys: keys.clone(),
            fetched_at: now,
            expires_at: now + ttl,
        });

        Ok(keys)
    }
}

fn unknown_kid(kid: &str) -> IdentityError {
    IdentityError::unauthenticated(format!("no signing key matches kid '{kid}'"))
}

fn find_key(keys: &JwkSet, kid: &str) -> Result<Option<DecodingKey>, IdentityError> {
    let Some(jwk) = keys.find(kid) else {
        return Ok(None);
    };

    DecodingKey::from_jwk(jwk)
        .map(Some)
        .map_err(|e| IdentityError::unauthenticated(format!("unusable signing key: {e}")))
}

/// `Cache-Control: public, max-age=19204, must-revalidate` -> 19204s
pub fn max_age(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(header::CACHE_CONTROL)?
        .to_str()
        .ok()?
        .split(',')
        .filter_map(|directive| directive.trim().strip_prefix("max-age="))
        .find_map(|secs| secs.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn far_future() -> Instant {
    Instant::now() + Duration::from_secs(60 * 60 * 24 * 365)
}
