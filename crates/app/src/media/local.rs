//! Local-disk media storage.

use std::{
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};

use async_trait::async_trait;
use jiff::Timestamp;
use tokio::fs;
use tracing::debug;

use crate::media::{MediaKind, MediaStorage, MediaStorageError, MediaUpload, PUBLIC_PREFIX};

/// Stores uploads below a root directory that the HTTP server exposes at
/// [`PUBLIC_PREFIX`].
#[derive(Debug, Clone)]
pub struct LocalMediaStorage {
    root: PathBuf,
}

impl LocalMediaStorage {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, public_path: &str) -> Result<Option<PathBuf>, MediaStorageError> {
        let Some(relative) = public_path.strip_prefix(PUBLIC_PREFIX) else {
            return Ok(None);
        };

        let relative = Path::new(relative);

        if !relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
        {
            return Err(MediaStorageError::InvalidPath);
        }

        Ok(Some(self.root.join(relative)))
    }
}

fn stored_file_name(kind: MediaKind, extension: &str) -> String {
    format!(
        "{}-{}-{}.{extension}",
        kind.file_prefix(),
        Timestamp::now().as_millisecond(),
        rand::random::<u32>()
    )
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn store(
        &self,
        kind: MediaKind,
        upload: MediaUpload,
    ) -> Result<String, MediaStorageError> {
        let extension = kind.validate(&upload)?;
        let file_name = stored_file_name(kind, &extension);

        let (directory, public_path) = match kind.folder() {
            Some(folder) => (
                self.root.join(folder),
                format!("{PUBLIC_PREFIX}{folder}/{file_name}"),
            ),
            None => (self.root.clone(), format!("{PUBLIC_PREFIX}{file_name}")),
        };

        fs::create_dir_all(&directory).await?;
        fs::copy(&upload.path, directory.join(&file_name)).await?;

        debug!(public_path, size = upload.size, "stored media file");

        Ok(public_path)
    }

    async fn remove(&self, public_path: &str) -> Result<(), MediaStorageError> {
        let Some(path) = self.resolve(public_path)? else {
            return Ok(());
        };

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(source) if source.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(source.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    async fn write_upload(dir: &Path, name: &str, content_type: &str) -> TestResult<MediaUpload> {
        let path = dir.join("incoming.tmp");

        fs::write(&path, b"media-bytes").await?;

        Ok(MediaUpload {
            file_name: Some(name.to_owned()),
            content_type: Some(content_type.to_owned()),
            size: 11,
            path,
        })
    }

    #[tokio::test]
    async fn stores_promotion_media_in_its_own_folder() -> TestResult {
        let dir = tempfile::tempdir()?;
        let storage = LocalMediaStorage::new(dir.path().join("uploads"));
        let upload = write_upload(dir.path(), "banner.PNG", "image/png").await?;

        let public_path = storage.store(MediaKind::Promotion, upload).await?;

        assert!(public_path.starts_with("/uploads/promotions/promo-"));
        assert!(public_path.ends_with(".png"));

        let stored = storage.resolve(&public_path)?.ok_or("path should resolve")?;

        assert_eq!(fs::read(stored).await?, b"media-bytes");

        Ok(())
    }

    #[tokio::test]
    async fn stores_images_at_the_upload_root() -> TestResult {
        let dir = tempfile::tempdir()?;
        let storage = LocalMediaStorage::new(dir.path());
        let upload = write_upload(dir.path(), "avatar.jpg", "image/jpeg").await?;

        let public_path = storage.store(MediaKind::Image, upload).await?;

        assert!(public_path.starts_with("/uploads/img-"));
        assert!(!public_path.trim_start_matches(PUBLIC_PREFIX).contains('/'));

        Ok(())
    }

    #[tokio::test]
    async fn rejected_uploads_are_not_copied() -> TestResult {
        let dir = tempfile::tempdir()?;
        let storage = LocalMediaStorage::new(dir.path().join("uploads"));
        let upload = write_upload(dir.path(), "notes.txt", "text/plain").await?;

        let result = storage.store(MediaKind::Image, upload).await;

        assert_eq!(result, Err(MediaStorageError::UnsupportedType));
        assert!(!dir.path().join("uploads").exists());

        Ok(())
    }

    #[tokio::test]
    async fn remove_deletes_file_and_tolerates_missing_ones() -> TestResult {
        let dir = tempfile::tempdir()?;
        let storage = LocalMediaStorage::new(dir.path());
        let upload = write_upload(dir.path(), "avatar.png", "image/png").await?;
        let public_path = storage.store(MediaKind::Image, upload).await?;

        storage.remove(&public_path).await?;
        storage.remove(&public_path).await?;

        let stored = storage.resolve(&public_path)?.ok_or("path should resolve")?;

        assert!(!stored.exists());

        Ok(())
    }

    #[tokio::test]
    async fn remove_ignores_foreign_paths_and_rejects_traversal() -> TestResult {
        let dir = tempfile::tempdir()?;
        let storage = LocalMediaStorage::new(dir.path());

        storage.remove("https://cdn.example.com/banner.png").await?;

        let result = storage.remove("/uploads/../secrets").await;

        assert_eq!(result, Err(MediaStorageError::InvalidPath));

        Ok(())
    }
}
