use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Object storage seam for uploaded attachments. The production target
/// is an external object store; the filesystem implementation below is
/// the bundled default.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store the bytes under `key`, returning the public URL.
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<String>;
}

pub struct FsObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<String> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(key);
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!(key, size = bytes.len(), "Stored attachment");
        Ok(format!("{}/{}", self.public_base_url.trim_end_matches('/'), key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_writes_file_and_returns_url() {
        let dir = std::env::temp_dir().join(format!("stackpath-store-{}", uuid::Uuid::new_v4()));
        let store = FsObjectStore::new(&dir, "/uploads/");

        let url = store.put("abc-notes.txt", b"hello").await.unwrap();
        assert_eq!(url, "/uploads/abc-notes.txt");
        assert_eq!(std::fs::read(dir.join("abc-notes.txt")).unwrap(), b"hello");

        std::fs::remove_dir_all(&dir).ok();
    }
}
