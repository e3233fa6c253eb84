//! Media storage errors.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaStorageError {
    #[error("file exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },

    #[error("file type is not allowed")]
    UnsupportedType,

    #[error("media path is invalid")]
    InvalidPath,

    #[error("filesystem error")]
    Io(#[from] io::Error),
}

impl MediaStorageError {
    /// Whether the client can fix the request by sending a different file.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::TooLarge { .. } | Self::UnsupportedType)
    }
}

impl PartialEq for MediaStorageError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::TooLarge { limit: left }, Self::TooLarge { limit: right }) => left == right,
            (Self::UnsupportedType, Self::UnsupportedType)
            | (Self::InvalidPath, Self::InvalidPath) => true,
            (Self::Io(left), Self::Io(right)) => left.kind() == right.kind(),
            _ => false,
        }
    }
}
