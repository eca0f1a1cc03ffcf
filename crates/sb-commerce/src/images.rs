//! Attaching uploaded images to products.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Value, json};

use crate::error::{CommerceError, CommerceResult};
use crate::gateway::CommerceGateway;
use crate::products::{entity_id, find_product};

/// Content type for an image file, from its extension. `None` for
/// anything that is not a supported image.
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => Some("image/jpeg"),
        Some("png") => Some("image/png"),
        Some("gif") => Some("image/gif"),
        Some("webp") => Some("image/webp"),
        _ => None,
    }
}

/// Content type from the file's signature bytes.
pub fn sniff_content_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

/// Uploads an image to the media library and sets it as a product's
/// main image.
///
/// With an upload directory set, only files inside it are accepted and
/// relative paths are resolved against it.
pub struct ImageAssociator {
    gateway: Arc<dyn CommerceGateway>,
    upload_dir: Option<PathBuf>,
}

impl ImageAssociator {
    pub fn new(gateway: Arc<dyn CommerceGateway>) -> Self {
        Self {
            gateway,
            upload_dir: None,
        }
    }

    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = Some(dir.into());
        self
    }

    /// Associate the image at `path` with the product named `product_name`.
    pub async fn associate(&self, path: &Path, product_name: &str) -> CommerceResult<String> {
        let product_name = product_name.trim();
        if product_name.is_empty() {
            return Err(CommerceError::InvalidParameter("missing parameter product_name".into()));
        }

        let path = self.resolve(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        let Some(declared) = content_type_for(&path) else {
            return Err(CommerceError::UnsupportedImage(file_name));
        };

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CommerceError::not_found(format!("תמונה {}", path.display())));
            }
            Err(e) => return Err(CommerceError::Io(e.to_string())),
        };
        let content_type = match sniff_content_type(&bytes) {
            Some(sniffed) => sniffed,
            None => {
                tracing::warn!(file = %file_name, declared, "file content is not an image");
                return Err(CommerceError::UnsupportedImage(file_name));
            }
        };

        // Resolve the product before uploading so a typo leaves no orphan media.
        let product = find_product(self.gateway.as_ref(), product_name).await?;
        let product_id = entity_id(&product)?;

        let media = self
            .gateway
            .upload_media(&file_name, content_type, bytes)
            .await?
            .into_success()?;
        let media_id = media
            .get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| CommerceError::Decode("media upload returned no id".into()))?;

        self.gateway
            .put(
                &format!("products/{product_id}"),
                &json!({"images": [{"id": media_id}]}),
            )
            .await?
            .into_success()?;

        tracing::info!(product_id, media_id, file = %file_name, "image associated with product");
        Ok(format!("התמונה שויכה בהצלחה למוצר '{product_name}'"))
    }

    /// Canonical path of an existing file, confined to the upload directory
    /// when one is set.
    async fn resolve(&self, path: &Path) -> CommerceResult<PathBuf> {
        let candidate = match &self.upload_dir {
            Some(dir) => dir.join(path),
            None => path.to_path_buf(),
        };
        let outside = || CommerceError::PermissionDenied(format!("{} is outside the upload directory", path.display()));

        let resolved = match tokio::fs::canonicalize(&candidate).await {
            Ok(resolved) => resolved,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if self.upload_dir.as_ref().is_some_and(|dir| !candidate.starts_with(dir)) {
                    return Err(outside());
                }
                return Err(CommerceError::not_found(format!("תמונה {}", path.display())));
            }
            Err(e) => return Err(CommerceError::Io(e.to_string())),
        };

        if let Some(dir) = &self.upload_dir {
            let dir = tokio::fs::canonicalize(dir)
                .await
                .map_err(|e| CommerceError::Config(format!("upload directory {}: {e}", dir.display())))?;
            if !resolved.starts_with(&dir) {
                tracing::warn!(path = %path.display(), "image path outside the upload directory rejected");
                return Err(outside());
            }
        }
        Ok(resolved)
    }
}
