//! Opaque blob storage for uploaded images.
//!
//! Callers pick the name; the store returns the public reference path
//! (`/uploads/<name>`) that gets persisted on the record.
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("invalid blob name: {0}")]
    InvalidName(String),
    #[error("blob io error")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `name`; returns the reference path.
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<String, BlobError>;

    async fn delete(&self, name: &str) -> Result<(), BlobError>;
}

/// Blobs as plain files under one directory, served back by `ServeDir`.
#[derive(Clone, Debug)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_prefix: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.into(),
        }
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, BlobError> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.root.join(name)),
            _ => Err(BlobError::InvalidName(name.to_string())),
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<String, BlobError> {
        let path = self.path_for(name)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, bytes).await?;

        Ok(format!("{}/{}", self.public_prefix.trim_end_matches('/'), name))
    }

    async fn delete(&self, name: &str) -> Result<(), BlobError> {
        let path = self.path_for(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// `<unix-millis>-<8 hex>-<sanitized original stem>.<extension>`.
///
/// The extension is chosen by the caller from the verified content, never taken from the
/// client filename, so `ServeDir` can only ever guess an image MIME type.
pub fn blob_name(original: Option<&str>, extension: &str, now_millis: i64) -> String {
    let base = original
        .and_then(|raw| raw.rsplit(['/', '\\']).next())
        .unwrap_or_default();
    let stem = match base.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => base,
    };

    let mut sanitized: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    sanitized = sanitized.trim_matches('_').to_string();
    if sanitized.is_empty() {
        sanitized = "upload".to_string();
    }
    sanitized.truncate(100);

    let nonce = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}.{}", now_millis, &nonce[..8], sanitized, extension)
}
