/*
 * Responsibility
 * - the "authenticated context" a handler sees
 * - the access middleware verifies the bearer token and stores this in request extensions;
 *   handlers only ever receive this type
 */
use crate::services::identity::Claims;

/// Context attached to a request that passed the access middleware.
///
/// `claims` is exactly what the identity provider returned; nothing is rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub claims: Claims,
}

impl AuthCtx {
    pub fn new(claims: Claims) -> Self {
        Self { claims }
    }

    pub fn uid(&self) -> &str {
        &self.claims.uid
    }
}
