use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs;

use super::StorageBackend;
use crate::prelude::Result;

/// Filesystem store, the degraded fallback when the remote backend is
/// unreachable. References are static paths with no expiry semantics.
pub struct LocalStore {
    base_dir: PathBuf,
    serve_path: String,
}

impl LocalStore {
    pub fn new(base_dir: &str, serve_path: &str) -> Self {
        LocalStore {
            base_dir: PathBuf::from(base_dir),
            serve_path: serve_path.trim_end_matches('/').to_string(),
        }
    }

    fn reference(&self, key: &str) -> String {
        format!("{}/{}", self.serve_path, key)
    }
}

#[async_trait]
impl StorageBackend for LocalStore {
    async fn put(&self, key: &str, data: &[u8], _content_type: &str) -> Result<String> {
        let path = self.base_dir.join(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, data).await?;
        tracing::debug!("stored {}", path.display());
        Ok(self.reference(key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.base_dir.join(key);
        if path.exists() {
            fs::remove_file(&path).await?;
            tracing::debug!("deleted {}", path.display());
        } else {
            tracing::debug!("file already gone: {}", path.display());
        }
        Ok(())
    }

    async fn signed_get(&self, key: &str, _ttl: Duration) -> Result<String> {
        Ok(self.reference(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_delete_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = LocalStore::new(dir.path().to_str().unwrap(), "/static/resumes/");

        let reference = store.put("123-abc.pdf", b"%PDF-", "application/pdf").await?;
        assert_eq!(reference, "/static/resumes/123-abc.pdf");
        assert_eq!(fs::read(dir.path().join("123-abc.pdf")).await?, b"%PDF-");

        let url = store
            .signed_get("123-abc.pdf", Duration::from_secs(60))
            .await?;
        assert_eq!(url, reference);

        store.delete("123-abc.pdf").await?;
        assert!(!dir.path().join("123-abc.pdf").exists());
        // deleting a missing object is not an error
        store.delete("123-abc.pdf").await?;
        Ok(())
    }
}
