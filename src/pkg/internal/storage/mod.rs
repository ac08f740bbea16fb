use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::Utc;
use rand::{distr::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use standard_error::{StandardError, Status};

use crate::prelude::Result;

pub mod local;
pub mod remote;

/// Which backend currently holds a stored artifact. Persisted on the resume
/// record and never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "storage_backend", rename_all = "lowercase")]
pub enum BackendKind {
    Remote,
    Local,
}

#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Stores the object and returns a resolvable display reference.
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<String>;
    async fn delete(&self, key: &str) -> Result<()>;
    async fn signed_get(&self, key: &str, ttl: Duration) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub backend: BackendKind,
    pub key: String,
    pub reference: String,
}

/// Write path policy: one remote attempt, then an immediate local fallback
/// with the same key. No retries, resume upload is a synchronous request.
pub struct StorageRouter {
    remote: Option<Box<dyn StorageBackend>>,
    local: Box<dyn StorageBackend>,
    signed_url_ttl: Duration,
}

impl StorageRouter {
    pub fn new(
        remote: Option<Box<dyn StorageBackend>>,
        local: Box<dyn StorageBackend>,
        signed_url_ttl: Duration,
    ) -> Self {
        StorageRouter {
            remote,
            local,
            signed_url_ttl,
        }
    }

    pub async fn from_settings() -> Self {
        use crate::conf::settings;
        let remote: Option<Box<dyn StorageBackend>> = if settings.remote_storage_enabled() {
            Some(Box::new(remote::RemoteStore::from_settings().await))
        } else {
            tracing::warn!("remote storage credentials missing, running local-only");
            None
        };
        let local = Box::new(local::LocalStore::new(
            &settings.local_storage_dir,
            &settings.local_serve_path,
        ));
        StorageRouter::new(remote, local, Duration::from_secs(settings.signed_url_ttl_secs))
    }

    pub fn remote_enabled(&self) -> bool {
        self.remote.is_some()
    }

    pub async fn store(&self, key: &str, data: &[u8], content_type: &str) -> Result<StoredObject> {
        if let Some(remote) = &self.remote {
            match remote.put(key, data, content_type).await {
                Ok(reference) => {
                    return Ok(StoredObject {
                        backend: BackendKind::Remote,
                        key: key.to_string(),
                        reference,
                    });
                }
                Err(err) => {
                    tracing::warn!(key, "remote put failed, falling back to local: {}", err.message);
                }
            }
        }
        match self.local.put(key, data, content_type).await {
            Ok(reference) => Ok(StoredObject {
                backend: BackendKind::Local,
                key: key.to_string(),
                reference,
            }),
            Err(err) => {
                tracing::error!(key, "local put failed: {}", err.message);
                Err(StandardError::new("ERR-STORAGE-UNAVAILABLE")
                    .code(StatusCode::SERVICE_UNAVAILABLE))
            }
        }
    }

    /// Best-effort delete: failures are logged so operators can detect
    /// orphaned objects, never surfaced to the caller.
    pub async fn remove(&self, backend: BackendKind, key: &str) {
        let result = match backend {
            BackendKind::Remote => match &self.remote {
                Some(remote) => remote.delete(key).await,
                None => Err(StandardError::new("ERR-STORAGE-UNAVAILABLE")),
            },
            BackendKind::Local => self.local.delete(key).await,
        };
        if let Err(err) = result {
            tracing::warn!(
                key,
                backend = ?backend,
                "storage delete failed, object may be orphaned: {}",
                err.message
            );
        }
    }

    pub async fn signed_url(&self, backend: BackendKind, key: &str) -> Result<String> {
        match backend {
            BackendKind::Remote => match &self.remote {
                Some(remote) => remote.signed_get(key, self.signed_url_ttl).await,
                None => Err(StandardError::new("ERR-STORAGE-UNAVAILABLE")
                    .code(StatusCode::SERVICE_UNAVAILABLE)),
            },
            BackendKind::Local => self.local.signed_get(key, self.signed_url_ttl).await,
        }
    }
}

/// Keys are `<millis>-<random>.<ext>`, unique across backends so a remote
/// write and its local fallback always address the same object.
pub fn generate_storage_key(extension: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("{}-{}.{}", Utc::now().timestamp_millis(), suffix, extension)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use tracing_test::traced_test;

    use super::*;

    struct FakeStore {
        objects: Mutex<HashMap<String, Vec<u8>>>,
        fail_puts: bool,
        fail_deletes: bool,
        url_prefix: String,
    }

    impl FakeStore {
        fn new(url_prefix: &str) -> Self {
            FakeStore {
                objects: Mutex::new(HashMap::new()),
                fail_puts: false,
                fail_deletes: false,
                url_prefix: url_prefix.to_string(),
            }
        }

        fn failing(url_prefix: &str) -> Self {
            FakeStore {
                fail_puts: true,
                fail_deletes: true,
                ..FakeStore::new(url_prefix)
            }
        }

        fn contains(&self, key: &str) -> bool {
            self.objects.lock().unwrap().contains_key(key)
        }
    }

    #[async_trait]
    impl StorageBackend for &'static FakeStore {
        async fn put(&self, key: &str, data: &[u8], _content_type: &str) -> Result<String> {
            if self.fail_puts {
                return Err(StandardError::new("ERR-STORAGE-REMOTE"));
            }
            self.objects
                .lock()
                .unwrap()
                .insert(key.to_string(), data.to_vec());
            Ok(format!("{}/{}", self.url_prefix, key))
        }

        async fn delete(&self, key: &str) -> Result<()> {
            if self.fail_deletes {
                return Err(StandardError::new("ERR-STORAGE-REMOTE"));
            }
            self.objects.lock().unwrap().remove(key);
            Ok(())
        }

        async fn signed_get(&self, key: &str, _ttl: Duration) -> Result<String> {
            Ok(format!("{}/{}?signed", self.url_prefix, key))
        }
    }

    fn router(remote: Option<&'static FakeStore>, local: &'static FakeStore) -> StorageRouter {
        StorageRouter::new(
            remote.map(|r| Box::new(r) as Box<dyn StorageBackend>),
            Box::new(local),
            Duration::from_secs(60),
        )
    }

    fn leak(store: FakeStore) -> &'static FakeStore {
        Box::leak(Box::new(store))
    }

    #[tokio::test]
    async fn stores_on_remote_when_available() {
        let remote = leak(FakeStore::new("https://remote"));
        let local = leak(FakeStore::new("/static"));
        let stored = router(Some(remote), local)
            .store("k.pdf", b"data", "application/pdf")
            .await
            .unwrap();
        assert_eq!(stored.backend, BackendKind::Remote);
        assert_eq!(stored.reference, "https://remote/k.pdf");
        assert!(remote.contains("k.pdf"));
        assert!(!local.contains("k.pdf"));
    }

    #[traced_test]
    #[tokio::test]
    async fn falls_back_to_local_with_same_key() {
        let remote = leak(FakeStore::failing("https://remote"));
        let local = leak(FakeStore::new("/static"));
        let stored = router(Some(remote), local)
            .store("k.pdf", b"data", "application/pdf")
            .await
            .unwrap();
        assert_eq!(stored.backend, BackendKind::Local);
        assert_eq!(stored.key, "k.pdf");
        assert!(local.contains("k.pdf"));
        assert!(logs_contain("remote put failed"));
    }

    #[tokio::test]
    async fn both_backends_failing_is_storage_unavailable() {
        let remote = leak(FakeStore::failing("https://remote"));
        let local = leak(FakeStore::failing("/static"));
        let err = router(Some(remote), local)
            .store("k.pdf", b"data", "application/pdf")
            .await
            .unwrap_err();
        assert_eq!(err.err_code, "ERR-STORAGE-UNAVAILABLE");
        assert_eq!(err.status_code, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!remote.contains("k.pdf"));
        assert!(!local.contains("k.pdf"));
    }

    #[tokio::test]
    async fn local_only_router_stores_locally() {
        let local = leak(FakeStore::new("/static"));
        let r = router(None, local);
        assert!(!r.remote_enabled());
        let stored = r.store("k.doc", b"data", "application/msword").await.unwrap();
        assert_eq!(stored.backend, BackendKind::Local);
    }

    #[tokio::test]
    async fn remove_swallows_backend_failures() {
        let remote = leak(FakeStore::failing("https://remote"));
        let local = leak(FakeStore::new("/static"));
        // must not panic or surface the error
        router(Some(remote), local)
            .remove(BackendKind::Remote, "gone.pdf")
            .await;
    }

    #[tokio::test]
    async fn signed_url_dispatches_on_recorded_backend() {
        let remote = leak(FakeStore::new("https://remote"));
        let local = leak(FakeStore::new("/static"));
        let r = router(Some(remote), local);
        let url = r.signed_url(BackendKind::Remote, "k.pdf").await.unwrap();
        assert_eq!(url, "https://remote/k.pdf?signed");
        let url = r.signed_url(BackendKind::Local, "k.pdf").await.unwrap();
        assert_eq!(url, "/static/k.pdf?signed");
    }

    #[tokio::test]
    async fn signed_url_for_remote_record_without_remote_fails() {
        let local = leak(FakeStore::new("/static"));
        let err = router(None, local)
            .signed_url(BackendKind::Remote, "k.pdf")
            .await
            .unwrap_err();
        assert_eq!(err.status_code, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn storage_keys_carry_timestamp_suffix_and_extension() {
        let key = generate_storage_key("pdf");
        let (stem, ext) = key.rsplit_once('.').unwrap();
        assert_eq!(ext, "pdf");
        let (millis, suffix) = stem.split_once('-').unwrap();
        assert!(millis.parse::<i64>().unwrap() > 0);
        assert_eq!(suffix.len(), 8);
        assert_ne!(generate_storage_key("pdf"), key);
    }
}
