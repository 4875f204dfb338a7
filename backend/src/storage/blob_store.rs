//! Filesystem store for uploaded images.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

/// Directory of uploaded files. Names are generated on save and never reused.
#[derive(Clone, Debug)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Open the store, creating `root` if needed
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("Failed to create upload directory {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` under a fresh `<millis>-<random>.<ext>` name and return the name
    pub async fn save(&self, bytes: &[u8], extension: &str) -> Result<String> {
        let file_name = generate_file_name(shared::now_millis(), extension);
        let path = self.root.join(&file_name);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Stored upload {} ({} bytes)", file_name, bytes.len());
        Ok(file_name)
    }

    /// Read a stored file. Names that could escape the directory read as missing.
    pub async fn read(&self, file_name: &str) -> Result<Option<Vec<u8>>> {
        if !is_safe_name(file_name) {
            warn!("Rejected blob name {:?}", file_name);
            return Ok(None);
        }
        match tokio::fs::read(self.root.join(file_name)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read blob {}", file_name)),
        }
    }
}

fn generate_file_name(millis: i64, extension: &str) -> String {
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}.{}", millis, &random[..8], extension)
}

fn is_safe_name(file_name: &str) -> bool {
    !file_name.is_empty()
        && !file_name.starts_with('.')
        && file_name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Content type for a stored file, from its extension
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        _ => "application/octet-stream",
    }
}
