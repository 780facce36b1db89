//! Receipt file storage on the local filesystem
//!
//! Files land under `<root>/<company>/<YYYY-MM-DD>/<millis>_<name>` and are
//! served back read-only from `/files/`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// URL prefix the stored files are served under
pub const FILES_URL_PREFIX: &str = "/files";

/// Name used when an upload carries no file name
const FALLBACK_NAME: &str = "upload";

/// Replace every character outside `[A-Za-z0-9._-]` with `_`
pub fn safe_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// A file written by [`ReceiptStorage::store`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Sanitized original file name
    pub file_name: String,
    /// Path relative to the storage root, `/`-separated
    pub relative_path: String,
    pub public_url: String,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct ReceiptStorage {
    root: PathBuf,
}

impl ReceiptStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Relative storage path for an upload received at `at`
    ///
    /// Dot-only names are replaced so no segment can walk out of the root.
    pub fn relative_path(company_context: &str, original_name: &str, at: DateTime<Utc>) -> (String, String) {
        let file_name = match safe_name(original_name.trim()) {
            n if n.is_empty() || n.chars().all(|c| c == '.') => FALLBACK_NAME.to_string(),
            n => n,
        };
        let company = match safe_name(company_context.trim()) {
            c if c.chars().all(|ch| ch == '.') => "_".to_string(),
            c => c,
        };

        let relative = format!(
            "{}/{}/{}_{}",
            company,
            at.format("%Y-%m-%d"),
            at.timestamp_millis(),
            file_name
        );
        (file_name, relative)
    }

    /// Write `bytes` as a new file; never overwrites an existing one
    pub async fn store(
        &self,
        company_context: &str,
        original_name: &str,
        bytes: &[u8],
        at: DateTime<Utc>,
    ) -> std::io::Result<StoredFile> {
        let (file_name, relative_path) = Self::relative_path(company_context, original_name, at);
        let full_path = self.root.join(&relative_path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full_path)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        debug!("Stored receipt file {} ({} bytes)", full_path.display(), bytes.len());

        Ok(StoredFile {
            file_name,
            public_url: format!("{}/{}", FILES_URL_PREFIX, relative_path),
            relative_path,
            size: bytes.len() as u64,
        })
    }

    /// Best-effort removal of a file written by [`ReceiptStorage::store`]
    pub async fn discard(&self, relative_path: &str) {
        let full_path = self.root.join(relative_path);
        if let Err(e) = tokio::fs::remove_file(&full_path).await {
            warn!("Could not remove orphaned receipt file {}: {}", full_path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_safe_name() {
        assert_eq!(safe_name("receipt (1).jpg"), "receipt__1_.jpg");
        assert_eq!(safe_name("a-b_c.PDF"), "a-b_c.PDF");
        assert_eq!(safe_name("../etc/passwd"), ".._etc_passwd");
        assert_eq!(safe_name("café"), "caf_");
    }

    #[test]
    fn test_relative_path_layout() {
        let at = Utc.with_ymd_and_hms(2025, 3, 9, 14, 30, 0).unwrap();
        let (name, path) = ReceiptStorage::relative_path("xes", "Home Depot.png", at);
        assert_eq!(name, "Home_Depot.png");
        assert_eq!(path, format!("xes/2025-03-09/{}_Home_Depot.png", at.timestamp_millis()));
    }

    #[test]
    fn test_relative_path_never_escapes_root() {
        let at = Utc.with_ymd_and_hms(2025, 3, 9, 0, 0, 0).unwrap();
        let (name, path) = ReceiptStorage::relative_path("..", "..", at);
        assert_eq!(name, "upload");
        assert!(path.starts_with("_/2025-03-09/"));

        let (_, path) = ReceiptStorage::relative_path("../../tmp", "x.txt", at);
        assert!(path.starts_with(".._.._tmp/"));
    }

    #[tokio::test]
    async fn test_store_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ReceiptStorage::new(dir.path());
        let at = Utc.with_ymd_and_hms(2025, 3, 9, 14, 30, 0).unwrap();

        let stored = storage.store("gxs", "r.txt", b"total 12.50", at).await.unwrap();
        assert_eq!(stored.size, 11);
        assert_eq!(stored.public_url, format!("/files/{}", stored.relative_path));

        let written = std::fs::read(dir.path().join(&stored.relative_path)).unwrap();
        assert_eq!(written, b"total 12.50");

        // Same name at the same millisecond is refused rather than overwritten
        assert!(storage.store("gxs", "r.txt", b"other", at).await.is_err());

        storage.discard(&stored.relative_path).await;
        assert!(!dir.path().join(&stored.relative_path).exists());
        // A second discard only logs
        storage.discard(&stored.relative_path).await;
    }
}
