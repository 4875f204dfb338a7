use tracing::{info, warn};

use crate::domain::errors::CardError;
use crate::domain::signed_url::{SignatureError, UrlSigner};
use crate::storage::blob_store::{content_type_for, BlobStore};
use shared::STORAGE_PREFIX;

/// A file pulled out of a multipart upload
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Stores uploaded images and serves them back through signed links
#[derive(Clone)]
pub struct UploadService {
    blobs: BlobStore,
    signer: UrlSigner,
    max_bytes: usize,
}

impl UploadService {
    pub fn new(blobs: BlobStore, signer: UrlSigner, max_bytes: usize) -> Self {
        Self { blobs, signer, max_bytes }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Store an image and return its `storage/<filename>` reference
    pub async fn store_upload(&self, file: UploadedFile) -> Result<String, CardError> {
        if file.bytes.is_empty() {
            return Err(CardError::Validation("No file provided".to_string()));
        }
        if file.bytes.len() > self.max_bytes {
            warn!("Upload of {} bytes over limit", file.bytes.len());
            return Err(CardError::PayloadTooLarge { limit: self.max_bytes });
        }

        let content_type = file.content_type.as_deref().unwrap_or("");
        if !content_type.starts_with("image/") || content_type.starts_with(SVG_CONTENT_TYPE) {
            return Err(CardError::UnsupportedMedia(content_type.to_string()));
        }

        let extension = pick_extension(file.file_name.as_deref(), content_type);
        // Scriptable formats are never stored, whatever the declared type
        if extension == "svg" || extension == "svgz" {
            return Err(CardError::UnsupportedMedia(format!("{} (.{})", content_type, extension)));
        }
        let stored = self.blobs.save(&file.bytes, &extension).await?;
        info!("Uploaded file: {}", stored);
        Ok(format!("{}{}", STORAGE_PREFIX, stored))
    }

    /// Read a stored file through a signed link. Returns the bytes and content type.
    pub async fn open_signed(
        &self,
        path: &str,
        expires: i64,
        signature: &str,
    ) -> Result<(Vec<u8>, &'static str), CardError> {
        let now = chrono::Utc::now().timestamp();
        if let Err(e) = self.signer.verify(path, expires, signature, now) {
            match e {
                SignatureError::Expired => warn!("Expired link for {}", path),
                SignatureError::Mismatch => warn!("Bad signature for {}", path),
            }
            return Err(CardError::Forbidden);
        }

        match self.blobs.read(path).await? {
            Some(bytes) => Ok((bytes, content_type_for(path))),
            None => Err(CardError::FileNotFound),
        }
    }
}

const SVG_CONTENT_TYPE: &str = "image/svg+xml";

/// Extension from the uploaded name, else from the content type
fn pick_extension(file_name: Option<&str>, content_type: &str) -> String {
    let from_name = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    from_name.unwrap_or_else(|| match content_type {
        "image/jpeg" => "jpg".to_string(),
        other => other
            .strip_prefix("image/")
            .filter(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or("bin")
            .to_string(),
    })
}
