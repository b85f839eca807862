//! On-disk storage for record attachments.
//!
//! Files land in `<root>/<kind directory>/<millis>-<name>` and are exposed to
//! clients as `uploads/<kind directory>/<millis>-<name>`, which the router
//! serves statically from the same root. A name already taken on disk gets a
//! counter after the timestamp (`<millis>-<n>-<name>`); existing files are
//! never overwritten.

use axum::body::Bytes;
use core_types::AttachmentKind;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// URL prefix under which the upload root is served.
pub const PUBLIC_PREFIX: &str = "uploads";

/// How many disambiguated names are tried before giving up on a save.
const MAX_NAME_ATTEMPTS: u32 = 10_000;

/// A file received in a request, not yet written.
#[derive(Debug, Clone)]
pub struct PendingFile {
    pub original_name: String,
    pub data: Bytes,
}

/// A file written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub kind: AttachmentKind,
    pub disk_path: PathBuf,
    pub public_path: String,
}

/// Every file written for one request.
#[derive(Debug, Clone, Default)]
pub struct StoredAttachments {
    files: Vec<StoredFile>,
}

impl StoredAttachments {
    /// The public relative path of the file stored for `kind`, if any.
    pub fn public_path(&self, kind: AttachmentKind) -> Option<String> {
        self.files
            .iter()
            .find(|f| f.kind == kind)
            .map(|f| f.public_path.clone())
    }

    pub fn files(&self) -> &[StoredFile] {
        &self.files
    }
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn directory(&self, kind: AttachmentKind) -> PathBuf {
        self.root.join(kind.directory())
    }

    /// Creates the per-kind directories if they are missing.
    pub async fn ensure_directories(&self) -> io::Result<()> {
        for kind in AttachmentKind::ALL {
            tokio::fs::create_dir_all(self.directory(kind)).await?;
        }
        Ok(())
    }

    /// Writes one file verbatim and returns where it went.
    ///
    /// The file is created exclusively, so concurrent saves of the same
    /// client name in the same millisecond each get their own path.
    pub async fn save(&self, kind: AttachmentKind, file: &PendingFile) -> io::Result<StoredFile> {
        let directory = self.directory(kind);
        tokio::fs::create_dir_all(&directory).await?;
        let timestamp_millis = chrono::Utc::now().timestamp_millis();

        let mut attempt = 0;
        let (file_name, disk_path, mut handle) = loop {
            let file_name = stored_file_name(&file.original_name, timestamp_millis, attempt);
            let disk_path = directory.join(&file_name);
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&disk_path)
                .await
            {
                Ok(handle) => break (file_name, disk_path, handle),
                Err(e)
                    if e.kind() == io::ErrorKind::AlreadyExists && attempt < MAX_NAME_ATTEMPTS =>
                {
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        let written = async {
            handle.write_all(&file.data).await?;
            handle.flush().await
        }
        .await;
        if let Err(e) = written {
            drop(handle);
            let _ = tokio::fs::remove_file(&disk_path).await;
            return Err(e);
        }

        tracing::debug!(
            field = kind.field_name(),
            path = %disk_path.display(),
            bytes = file.data.len(),
            "Stored upload."
        );
        Ok(StoredFile {
            kind,
            disk_path,
            public_path: format!("{PUBLIC_PREFIX}/{}/{file_name}", kind.directory()),
        })
    }

    /// Writes every pending file. If any write fails, the files already
    /// written for this call are removed before the error is returned.
    pub async fn save_all(
        &self,
        pending: Vec<(AttachmentKind, PendingFile)>,
    ) -> io::Result<StoredAttachments> {
        let mut stored = StoredAttachments::default();
        for (kind, file) in pending {
            match self.save(kind, &file).await {
                Ok(written) => stored.files.push(written),
                Err(e) => {
                    self.discard(&stored).await;
                    return Err(e);
                }
            }
        }
        Ok(stored)
    }

    /// Best-effort removal of files whose record was never written.
    pub async fn discard(&self, stored: &StoredAttachments) {
        for file in &stored.files {
            match tokio::fs::remove_file(&file.disk_path).await {
                Ok(()) => {
                    tracing::info!(path = %file.disk_path.display(), "Removed orphaned upload.")
                }
                Err(e) => tracing::warn!(
                    path = %file.disk_path.display(),
                    error = %e,
                    "Failed to remove orphaned upload."
                ),
            }
        }
    }
}

/// Derives the stored name: `<millis>-<client name>` with whitespace turned
/// into underscores, or `<millis>-<attempt>-<client name>` when an earlier
/// attempt collided. Only the last path component of the client name is kept.
pub fn stored_file_name(original: &str, timestamp_millis: i64, attempt: u32) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or_default();
    let base = if base.is_empty() || base == "." || base == ".." {
        "file"
    } else {
        base
    };
    let sanitized: String = base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    if attempt == 0 {
        format!("{timestamp_millis}-{sanitized}")
    } else {
        format!("{timestamp_millis}-{attempt}-{sanitized}")
    }
}
