//! Upload handling: turn user-supplied bytes or a file path into an
//! [`UploadedImage`].
//!
//! Only JPEG and PNG are accepted, identified from the magic bytes rather
//! than the file extension. Size is checked before the file is read so an
//! oversized upload never lands in memory.

use crate::error::AuditError;
use image::ImageFormat;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The two accepted upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
        }
    }
}

/// One uploaded screenshot. Immutable once constructed.
#[derive(Clone)]
pub struct UploadedImage {
    bytes: Vec<u8>,
    kind: ImageKind,
    name: Option<String>,
}

impl std::fmt::Debug for UploadedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedImage")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl UploadedImage {
    /// Validate in-memory bytes as a JPEG/PNG upload no larger than `max_bytes`.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, max_bytes: u64) -> Result<Self, AuditError> {
        let bytes = bytes.into();
        let size = bytes.len() as u64;
        if size > max_bytes {
            return Err(AuditError::ImageTooLarge {
                size,
                limit: max_bytes,
            });
        }
        let kind = detect_kind(&bytes)?;
        debug!("Accepted {} upload, {} bytes", kind.mime_type(), size);
        Ok(Self {
            bytes,
            kind,
            name: None,
        })
    }

    /// Read and validate an image file.
    pub async fn from_path(path: impl AsRef<Path>, max_bytes: u64) -> Result<Self, AuditError> {
        let path = path.as_ref();
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|e| io_error(path.to_path_buf(), e))?;
        if !meta.is_file() {
            return Err(AuditError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        if meta.len() > max_bytes {
            return Err(AuditError::ImageTooLarge {
                size: meta.len(),
                limit: max_bytes,
            });
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| io_error(path.to_path_buf(), e))?;

        let mut image = Self::from_bytes(bytes, max_bytes)?;
        image.name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        Ok(image)
    }

    /// Attach a display name (e.g. the original upload filename).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn kind(&self) -> ImageKind {
        self.kind
    }

    pub fn mime_type(&self) -> &'static str {
        self.kind.mime_type()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn detect_kind(bytes: &[u8]) -> Result<ImageKind, AuditError> {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Jpeg) => Ok(ImageKind::Jpeg),
        Ok(ImageFormat::Png) => Ok(ImageKind::Png),
        Ok(other) => Err(AuditError::UnsupportedImage {
            detail: format!("{other:?} images are not accepted"),
        }),
        Err(_) => {
            let head: Vec<u8> = bytes.iter().take(4).copied().collect();
            Err(AuditError::UnsupportedImage {
                detail: format!("unrecognised file signature {head:?}"),
            })
        }
    }
}

fn io_error(path: PathBuf, e: std::io::Error) -> AuditError {
    match e.kind() {
        std::io::ErrorKind::PermissionDenied => AuditError::PermissionDenied { path },
        _ => AuditError::FileNotFound { path },
    }
}
