//! Local document staging
//!
//! Received media is written to `{base}/{chat_id}/{prefix}_{timestamp_ms}.{ext}`
//! and handed to the gateway as a `PendingUpload`.

use std::path::{Path, PathBuf};

use zailo_bot_core::{DocumentField, MediaAttachment, PendingUpload};

use crate::DocumentError;

#[derive(Debug, Clone)]
pub struct DocumentStore {
    base_dir: PathBuf,
}

impl DocumentStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Write `media` into the chat's staging directory
    pub async fn save(
        &self,
        chat_id: &str,
        field: DocumentField,
        media: &MediaAttachment,
    ) -> Result<PendingUpload, DocumentError> {
        if chat_id.is_empty()
            || chat_id.contains(['/', '\\'])
            || chat_id.starts_with('.')
        {
            return Err(DocumentError::InvalidChatId(chat_id.to_string()));
        }

        let dir = self.base_dir.join(chat_id);
        tokio::fs::create_dir_all(&dir).await?;

        let extension = media.extension();
        let mut timestamp = chrono::Utc::now().timestamp_millis();
        let mut path = dir.join(format!("{}_{}.{}", field.file_prefix(), timestamp, extension));
        // Two documents in the same millisecond must not overwrite each other
        while tokio::fs::try_exists(&path).await.unwrap_or(false) {
            timestamp += 1;
            path = dir.join(format!("{}_{}.{}", field.file_prefix(), timestamp, extension));
        }

        tokio::fs::write(&path, &media.data).await?;
        tracing::info!(
            chat_id = %chat_id,
            path = %path.display(),
            bytes = media.data.len(),
            "Document staged"
        );

        Ok(PendingUpload::new(field, path, media.mime_type.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_names_file_by_purpose() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        let media = MediaAttachment::new("image/jpeg", vec![1, 2, 3]);

        let upload = store
            .save("5511@c.us", DocumentField::RgPhoto, &media)
            .await
            .unwrap();

        assert!(upload.path.starts_with(dir.path().join("5511@c.us")));
        let name = upload.file_name();
        assert!(name.starts_with("rg_"));
        assert!(name.ends_with(".jpeg"));
        assert_eq!(tokio::fs::read(&upload.path).await.unwrap(), vec![1, 2, 3]);
        assert_eq!(upload.mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_same_millisecond_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        let media = MediaAttachment::new("image/png", vec![0]);

        let first = store
            .save("1@c.us", DocumentField::TradeInPhoto, &media)
            .await
            .unwrap();
        let second = store
            .save("1@c.us", DocumentField::TradeInPhoto, &media)
            .await
            .unwrap();
        assert_ne!(first.path, second.path);
    }

    #[tokio::test]
    async fn test_missing_subtype_uses_bin() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        let media = MediaAttachment::new("application", vec![0]);

        let upload = store
            .save("1@c.us", DocumentField::IncomeProof, &media)
            .await
            .unwrap();
        assert!(upload.file_name().starts_with("comprovante_renda_"));
        assert!(upload.file_name().ends_with(".bin"));
    }

    #[tokio::test]
    async fn test_rejects_path_like_chat_ids() {
        let store = DocumentStore::new("/tmp/unused");
        let media = MediaAttachment::new("image/png", vec![0]);

        for chat_id in ["../etc", "a/b", ""] {
            assert!(matches!(
                store.save(chat_id, DocumentField::RgPhoto, &media).await,
                Err(DocumentError::InvalidChatId(_))
            ));
        }
    }
}
