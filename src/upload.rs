//! Transient upload storage. Each request owns exactly one artifact; the
//! artifact is deleted after the forecast process exits, on every path.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Storage for per-request upload files. The directory is injected rather
/// than resolved from ambient state so tests can run against isolated
/// locations.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist uploaded bytes under a collision-resistant name: a UUIDv4
    /// token plus the original file's extension. Creates the storage
    /// directory on first use.
    pub async fn store(
        &self,
        original_filename: &str,
        bytes: &[u8],
    ) -> std::io::Result<UploadedArtifact> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let extension = Path::new(original_filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();

        let path = self.dir.join(format!("{}{}", Uuid::new_v4(), extension));
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!("Stored upload {} ({} bytes)", path.display(), bytes.len());

        Ok(UploadedArtifact {
            path,
            original_extension: extension,
            created_at: Utc::now(),
            cleaned: false,
        })
    }
}

/// A stored upload scoped to one request. `cleanup` must run once the
/// forecast process has exited; if the request future is dropped first, the
/// `Drop` impl removes the file best-effort.
#[derive(Debug)]
pub struct UploadedArtifact {
    path: PathBuf,
    original_extension: String,
    created_at: DateTime<Utc>,
    cleaned: bool,
}

impl UploadedArtifact {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn original_extension(&self) -> &str {
        &self.original_extension
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Attempt deletion exactly once. Failure is logged and swallowed: the
    /// response for the request has already been determined by the time this
    /// runs, and a leftover file must not change it.
    pub async fn cleanup(&mut self) {
        if self.cleaned {
            return;
        }
        self.cleaned = true;

        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => tracing::debug!("Deleted upload {} after processing", self.path.display()),
            Err(e) => tracing::warn!("Could not delete upload {}: {}", self.path.display(), e),
        }
    }
}

impl Drop for UploadedArtifact {
    fn drop(&mut self) {
        if !self.cleaned {
            if let Err(e) = std::fs::remove_file(&self.path) {
                tracing::warn!(
                    "Could not delete abandoned upload {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_writes_bytes_under_fresh_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let a = store.store("demand.csv", b"ds,y\n").await.unwrap();
        let b = store.store("demand.csv", b"ds,y\n").await.unwrap();

        assert_ne!(a.path(), b.path());
        assert_eq!(a.original_extension(), ".csv");
        assert!(a.path().to_string_lossy().ends_with(".csv"));
        assert_eq!(tokio::fs::read(a.path()).await.unwrap(), b"ds,y\n");
    }

    #[tokio::test]
    async fn store_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path().join("nested/uploads"));

        let artifact = store.store("history", b"data").await.unwrap();
        assert!(artifact.path().exists());
        assert_eq!(artifact.original_extension(), "");
    }

    #[tokio::test]
    async fn cleanup_removes_the_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let mut artifact = store.store("demand.csv", b"data").await.unwrap();
        let path = artifact.path().to_path_buf();

        artifact.cleanup().await;
        assert!(!path.exists());

        // Second attempt is a no-op, not an error.
        artifact.cleanup().await;
    }

    #[tokio::test]
    async fn drop_removes_the_file_when_cleanup_never_ran() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let artifact = store.store("demand.csv", b"data").await.unwrap();
        let path = artifact.path().to_path_buf();
        assert!(path.exists());

        drop(artifact);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn cleanup_failure_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let mut artifact = store.store("demand.csv", b"data").await.unwrap();
        tokio::fs::remove_file(artifact.path()).await.unwrap();

        artifact.cleanup().await;
    }
}
