use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::DomainError;

pub const CAPTURE_MIME_TYPE: &str = "image/jpeg";

static NEXT_BLOB_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique handle for one loaded photo. Clones of an [`ImageBlob`]
/// share it, so it plays the role of reference identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlobId(u64);

impl BlobId {
    fn next() -> Self {
        Self(NEXT_BLOB_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Deduplication key: file name plus modification time in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhotoKey {
    pub name: String,
    pub modified_ms: i64,
}

impl PhotoKey {
    pub fn new(name: impl Into<String>, modified_ms: i64) -> Self {
        Self {
            name: name.into(),
            modified_ms,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageBlob {
    id: BlobId,
    key: PhotoKey,
    mime_type: String,
    bytes: Arc<[u8]>,
}

impl ImageBlob {
    pub fn new(
        key: PhotoKey,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<Self, DomainError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(DomainError::EmptyImage(key.name));
        }
        Ok(Self {
            id: BlobId::next(),
            key,
            mime_type: mime_type.into(),
            bytes,
        })
    }

    /// A still taken from the camera, named after its capture time.
    pub fn capture(captured_at_ms: i64, jpeg: Vec<u8>) -> Result<Self, DomainError> {
        Self::new(
            PhotoKey::new(format!("capture-{captured_at_ms}.jpg"), captured_at_ms),
            CAPTURE_MIME_TYPE,
            jpeg,
        )
    }

    pub fn id(&self) -> BlobId {
        self.id
    }

    pub fn key(&self) -> &PhotoKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_image(&self) -> bool {
        is_image_mime(&self.mime_type)
    }
}

pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type.trim().to_ascii_lowercase().starts_with("image/")
}
