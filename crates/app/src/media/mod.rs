//! Uploaded media storage.
//!
//! Handlers hand over the temporary file produced by multipart parsing as a
//! [`MediaUpload`]; a [`MediaStorage`] validates it against the rules of its
//! [`MediaKind`] and moves it somewhere publicly served under [`PUBLIC_PREFIX`].

use std::path::PathBuf;

use async_trait::async_trait;
use mockall::automock;

mod errors;
mod local;

pub use errors::MediaStorageError;
pub use local::LocalMediaStorage;

/// URL prefix for every stored file.
pub const PUBLIC_PREFIX: &str = "/uploads/";

const MEGABYTE: u64 = 1024 * 1024;

const IMAGE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif", "webp"];

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov"];

/// A file received from a client, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    /// Client-supplied file name.
    pub file_name: Option<String>,

    /// Client-supplied MIME type.
    pub content_type: Option<String>,

    /// Size in bytes.
    pub size: u64,

    /// Temporary location on disk.
    pub path: PathBuf,
}

impl MediaUpload {
    fn extension(&self) -> Option<String> {
        self.file_name
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, extension)| extension.trim().to_ascii_lowercase())
            .filter(|extension| !extension.is_empty())
    }
}

/// What an upload is for; decides limits, accepted types and target folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Campaign creative: images, gifs and short videos.
    Promotion,

    /// Question illustrations and user avatars.
    Image,
}

impl MediaKind {
    /// Maximum accepted size in bytes.
    #[must_use]
    pub const fn max_bytes(self) -> u64 {
        match self {
            Self::Promotion => 50 * MEGABYTE,
            Self::Image => 5 * MEGABYTE,
        }
    }

    const fn folder(self) -> Option<&'static str> {
        match self {
            Self::Promotion => Some("promotions"),
            Self::Image => None,
        }
    }

    const fn file_prefix(self) -> &'static str {
        match self {
            Self::Promotion => "promo",
            Self::Image => "img",
        }
    }

    /// Check an upload against this kind's rules, returning the normalised
    /// file extension to store it under.
    ///
    /// # Errors
    ///
    /// Returns [`MediaStorageError::TooLarge`] or
    /// [`MediaStorageError::UnsupportedType`].
    pub fn validate(self, upload: &MediaUpload) -> Result<String, MediaStorageError> {
        if upload.size > self.max_bytes() {
            return Err(MediaStorageError::TooLarge {
                limit: self.max_bytes(),
            });
        }

        // Stored files are served from the API's own origin, so the
        // extension decides how browsers treat them.
        let extension = upload
            .extension()
            .filter(|extension| self.accepts_extension(extension))
            .ok_or(MediaStorageError::UnsupportedType)?;

        if self == Self::Image {
            let is_image = upload
                .content_type
                .as_deref()
                .is_some_and(|content_type| content_type.starts_with("image/"));

            if !is_image {
                return Err(MediaStorageError::UnsupportedType);
            }
        }

        Ok(extension)
    }

    fn accepts_extension(self, extension: &str) -> bool {
        match self {
            Self::Promotion => {
                IMAGE_EXTENSIONS.contains(&extension) || VIDEO_EXTENSIONS.contains(&extension)
            }
            Self::Image => IMAGE_EXTENSIONS.contains(&extension),
        }
    }
}

#[automock]
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Validate and persist an upload, returning its public path.
    async fn store(&self, kind: MediaKind, upload: MediaUpload)
    -> Result<String, MediaStorageError>;

    /// Delete a previously stored file. Missing files and paths outside
    /// [`PUBLIC_PREFIX`] are ignored.
    async fn remove(&self, public_path: &str) -> Result<(), MediaStorageError>;
}

/// Remove a replaced or orphaned file, logging instead of failing.
pub(crate) async fn discard(storage: &dyn MediaStorage, public_path: Option<&str>) {
    let Some(public_path) = public_path else {
        return;
    };

    if let Err(source) = storage.remove(public_path).await {
        tracing::warn!(public_path, "failed to remove media file: {source}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(file_name: &str, content_type: &str, size: u64) -> MediaUpload {
        MediaUpload {
            file_name: Some(file_name.to_owned()),
            content_type: Some(content_type.to_owned()),
            size,
            path: PathBuf::from("/tmp/upload"),
        }
    }

    #[test]
    fn promotion_media_accepts_videos_up_to_fifty_megabytes() {
        let accepted = MediaKind::Promotion.validate(&upload("Clip.MP4", "video/mp4", 50 * MEGABYTE));

        assert_eq!(accepted, Ok("mp4".to_owned()));
    }

    #[test]
    fn promotion_media_rejects_unknown_extensions() {
        let rejected = MediaKind::Promotion.validate(&upload("payload.exe", "image/png", 10));

        assert_eq!(rejected, Err(MediaStorageError::UnsupportedType));
    }

    #[test]
    fn images_are_limited_to_five_megabytes() {
        let rejected = MediaKind::Image.validate(&upload("sign.png", "image/png", 5 * MEGABYTE + 1));

        assert_eq!(
            rejected,
            Err(MediaStorageError::TooLarge {
                limit: 5 * MEGABYTE
            })
        );
    }

    #[test]
    fn images_require_an_image_mime_type() {
        let rejected = MediaKind::Image.validate(&upload("sign.png", "application/pdf", 10));

        assert_eq!(rejected, Err(MediaStorageError::UnsupportedType));
    }

    #[test]
    fn images_only_keep_image_extensions() {
        let markup = MediaKind::Image.validate(&upload("pwn.html", "image/png", 10));
        let video = MediaKind::Image.validate(&upload("clip.mp4", "image/png", 10));
        let bare = MediaKind::Image.validate(&upload("avatar", "image/png", 10));
        let webp = MediaKind::Image.validate(&upload("avatar.WEBP", "image/webp", 10));

        assert_eq!(markup, Err(MediaStorageError::UnsupportedType), "markup");
        assert_eq!(video, Err(MediaStorageError::UnsupportedType), "video");
        assert_eq!(bare, Err(MediaStorageError::UnsupportedType), "no extension");
        assert_eq!(webp, Ok("webp".to_owned()), "webp");
    }

    #[test]
    fn promotion_media_rejects_markup_with_an_image_mime_type() {
        let rejected = MediaKind::Promotion.validate(&upload("banner.svg", "image/svg+xml", 10));

        assert_eq!(rejected, Err(MediaStorageError::UnsupportedType));
    }

    #[tokio::test]
    async fn discard_ignores_storage_failures() {
        let mut storage = MockMediaStorage::new();

        storage
            .expect_remove()
            .once()
            .withf(|path| path == "/uploads/old.png")
            .return_once(|_| Err(MediaStorageError::UnsupportedType));

        discard(&storage, Some("/uploads/old.png")).await;
        discard(&storage, None).await;
    }
}
