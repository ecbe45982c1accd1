pub mod auth_ctx;
mod json;
mod path;

pub use auth_ctx::{AuthCtx, AuthCtxExtractor};
pub use json::AppJson;
pub use path::AppPath;
