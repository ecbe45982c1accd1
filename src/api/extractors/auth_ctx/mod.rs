/*!
 * Authentication context extractor
 *
 * - AuthCtx: the verified claims of the caller
 * - AuthCtxExtractor: hands it to handlers (axum-facing part lives in core)
 */

mod core;
mod types;

pub use core::AuthCtxExtractor;
pub use types::AuthCtx;
