/*
 * Responsibility
 * - Router-level middleware
 *   - auth: bearer gate for protected routes
 *   - cors / http / security_headers / rate_limit: applied once in app.rs
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod rate_limit;
pub mod security_headers;
