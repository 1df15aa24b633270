use crate::error::{Error, Result};
use bytes::Bytes;
use std::path::Path;
use tokio::fs;
use uuid::Uuid;

#[derive(Debug, Clone, serde::Serialize)]
pub struct StoredFile {
    pub url: String,
    pub public_id: String,
}

/// Disk-backed media store. Stored files are addressed by an opaque
/// public id so callers can delete them without knowing the layout.
#[derive(Clone)]
pub struct MediaService {
    uploads_dir: String,
}

const ALLOWED_EXTS: [&str; 9] = [
    "pdf", "doc", "docx", "txt", "rtf", "jpg", "jpeg", "png", "webp",
];

impl MediaService {
    pub fn new(uploads_dir: String) -> Self {
        Self { uploads_dir }
    }

    pub async fn store(&self, filename: &str, data: &Bytes) -> Result<StoredFile> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_else(|| "bin".to_string());

        if !ALLOWED_EXTS.contains(&ext.as_str()) {
            return Err(Error::BadRequest(format!(
                "File type .{} is not allowed",
                ext
            )));
        }

        if ext == "pdf" && !data.starts_with(b"%PDF") {
            return Err(Error::BadRequest("Invalid PDF file content".into()));
        }
        if (ext == "jpg" || ext == "jpeg") && !data.starts_with(&[0xFF, 0xD8]) {
            return Err(Error::BadRequest("Invalid JPEG file content".into()));
        }
        if ext == "png" && !data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Err(Error::BadRequest("Invalid PNG file content".into()));
        }

        fs::create_dir_all(&self.uploads_dir)
            .await
            .map_err(|e| Error::Internal(format!("Failed to create uploads dir: {}", e)))?;

        let public_id = format!("{}.{}", Uuid::new_v4(), ext);
        let file_path = format!("{}/{}", self.uploads_dir, public_id);

        fs::write(&file_path, data).await.map_err(|e| {
            tracing::error!("Failed to write uploaded file: {}", e);
            Error::Internal(format!("Failed to save file: {}", e))
        })?;

        Ok(StoredFile {
            url: format!("/uploads/{}", public_id),
            public_id,
        })
    }

    /// Compensating cleanup after a failed post-upload step. Best effort;
    /// a missing file is not an error.
    pub async fn delete(&self, public_id: &str) -> Result<()> {
        let file_path = format!("{}/{}", self.uploads_dir, public_id);
        match fs::remove_file(&file_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                tracing::warn!(public_id, "failed to delete stored file: {}", e);
                Err(Error::Io(e))
            }
        }
    }
}
