/// Image storage for post pictures
///
/// Stored names are `<unix-nanos>-<sanitized original name>` and are what
/// ends up in `posts.image_path`.
use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist `bytes`; returns the stored name
    async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String>;

    /// Remove a stored image; removing a missing image succeeds
    async fn delete(&self, stored_name: &str) -> Result<()>;
}

/// Images as files under one directory
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the root directory if needed
    pub async fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(root);
        tokio::fs::create_dir_all(&store.root).await?;
        info!(root = %store.root.display(), "Image storage ready");
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, stored_name: &str) -> Result<PathBuf> {
        let is_plain_name = !stored_name.is_empty()
            && !stored_name.contains(['/', '\\'])
            && stored_name != "."
            && stored_name != "..";
        if !is_plain_name {
            return Err(AppError::Validation(format!(
                "invalid image name: {stored_name}"
            )));
        }
        Ok(self.root.join(stored_name))
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String> {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let stored_name = format!("{}-{}", nanos, sanitize_file_name(original_name));
        let path = self.path_of(&stored_name)?;

        tokio::fs::write(&path, bytes).await?;
        debug!(image = %stored_name, size = bytes.len(), "Stored image");
        Ok(stored_name)
    }

    async fn delete(&self, stored_name: &str) -> Result<()> {
        let path = self.path_of(stored_name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(image = %stored_name, "Deleted image");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keep ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned.to_string()
    }
}
