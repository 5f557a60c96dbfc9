//! Blob storage collaborator for theatre images.
//!
//! Files live in one flat configured directory under generated names, so
//! stored reference names never contain path separators. `resolve` rejects
//! anything that would escape the directory.

use std::io;
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

use crate::config::StorageConfig;

#[derive(Clone)]
pub struct StorageService {
    dir: PathBuf,
}

impl StorageService {
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            dir: PathBuf::from(&config.image_dir),
        }
    }

    pub async fn init(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Stores the bytes under a fresh name and returns the reference name the
    /// caller persists on the theatre row.
    pub async fn store(&self, bytes: &[u8], extension: &str) -> io::Result<String> {
        let extension: String = extension
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        let name = if extension.is_empty() {
            Uuid::new_v4().simple().to_string()
        } else {
            format!("{}.{}", Uuid::new_v4().simple(), extension)
        };

        let path = self.resolve(&name)?;
        tokio::fs::write(&path, bytes).await?;
        info!("stored image {} ({} bytes)", name, bytes.len());
        Ok(name)
    }

    pub async fn load(&self, name: &str) -> io::Result<Vec<u8>> {
        let path = self.resolve(name)?;
        tokio::fs::read(&path).await
    }

    pub async fn delete(&self, name: &str) -> io::Result<()> {
        let path = self.resolve(name)?;
        tokio::fs::remove_file(&path).await
    }

    fn resolve(&self, name: &str) -> io::Result<PathBuf> {
        if name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name.contains("..")
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid image reference '{}'", name),
            ));
        }
        Ok(self.dir.join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_service() -> StorageService {
        let dir = std::env::temp_dir().join(format!("movie-booking-{}", Uuid::new_v4().simple()));
        StorageService { dir }
    }

    #[tokio::test]
    async fn store_load_delete_round_trip() {
        let storage = temp_service();
        storage.init().await.unwrap();

        let name = storage.store(b"poster-bytes", "png").await.unwrap();
        assert!(name.ends_with(".png"));

        let bytes = storage.load(&name).await.unwrap();
        assert_eq!(bytes, b"poster-bytes");

        storage.delete(&name).await.unwrap();
        assert!(storage.load(&name).await.is_err());
    }

    #[tokio::test]
    async fn generated_names_are_unique() {
        let storage = temp_service();
        storage.init().await.unwrap();

        let first = storage.store(b"a", "jpg").await.unwrap();
        let second = storage.store(b"b", "jpg").await.unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn rejects_path_traversal_references() {
        let storage = temp_service();
        assert!(storage.resolve("../etc/passwd").is_err());
        assert!(storage.resolve("a/b.png").is_err());
        assert!(storage.resolve("").is_err());
        assert!(storage.resolve("ok.png").is_ok());
    }
}
