//! Asset Fetcher
//!
//! Turns a remote URL into a stored, deduplicated asset.
//!
//! **Algorithm:**
//! 1. Derive the file name from the last segment of the URL path
//! 2. Look up an asset registered under the slug of that name; if found,
//!    return it without any network access
//! 3. GET the URL with a bounded timeout; anything but 200 is a fetch error
//! 4. Write the bytes to a new file `<asset_dir>/<file name>`; if that name
//!    is taken, `<stem>-1.<ext>`, `<stem>-2.<ext>`, ...
//! 5. Register the asset (content type inferred from the bytes)
//!
//! At most one asset exists per derived name: the second URL ending in
//! `doc.pdf` reuses the first download, whatever its host. Stored files are
//! never overwritten, even when two lookup names sanitize to the same file
//! name (`a(1).pdf` and `a1.pdf`).

use reqwest::Url;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::error::{ImportError, ImportResult};
use crate::models::{AssetMetadata, FetchedAsset};
use crate::store::{AssetStore, NetworkFetcher, Sanitizer};

/// Last non-empty path segment of an http(s) URL
pub fn derive_file_name(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }

    parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}

/// Content type from magic bytes, then extension
pub fn detect_content_type(bytes: &[u8], file_name: &str) -> String {
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type().to_string();
    }

    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("txt") => "text/plain",
        Some("csv") => "text/csv",
        Some("svg") => "image/svg+xml",
        Some("html") | Some("htm") => "text/html",
        Some("json") => "application/json",
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// Candidate file name for attempt `n` (0 is the name itself)
fn numbered_file_name(file_name: &str, n: u32) -> String {
    if n == 0 {
        return file_name.to_string();
    }

    let path = Path::new(file_name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(file_name);
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!("{}-{}.{}", stem, n, ext),
        None => format!("{}-{}", stem, n),
    }
}

/// Create a file under `dir` that did not exist before
///
/// **Returns:** the file name actually used and the open file
async fn create_unused_file(dir: &Path, file_name: &str) -> std::io::Result<(String, File)> {
    let mut n = 0;
    loop {
        let candidate = numbered_file_name(file_name, n);
        let opened = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dir.join(&candidate))
            .await;

        match opened {
            Ok(file) => return Ok((candidate, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err(e),
        }
    }
}

pub struct AssetFetcher {
    assets: Arc<dyn AssetStore>,
    network: Arc<dyn NetworkFetcher>,
    sanitizer: Arc<dyn Sanitizer>,
    asset_dir: PathBuf,
    asset_base_url: String,
    timeout: Duration,
}

impl AssetFetcher {
    pub fn new(
        assets: Arc<dyn AssetStore>,
        network: Arc<dyn NetworkFetcher>,
        sanitizer: Arc<dyn Sanitizer>,
        asset_dir: PathBuf,
        asset_base_url: String,
        timeout: Duration,
    ) -> Self {
        Self {
            assets,
            network,
            sanitizer,
            asset_dir,
            asset_base_url,
            timeout,
        }
    }

    fn locator_for(&self, file_name: &str) -> String {
        format!("{}/{}", self.asset_base_url.trim_end_matches('/'), file_name)
    }

    /// Write `bytes` under a file name no stored asset uses yet
    async fn write_new_file(&self, file_name: &str, bytes: &[u8]) -> ImportResult<String> {
        let write_error = |e: std::io::Error| {
            ImportError::Write(format!(
                "Failed to save {}: {}",
                self.asset_dir.join(file_name).display(),
                e
            ))
        };

        let (used_name, mut file) = create_unused_file(&self.asset_dir, file_name)
            .await
            .map_err(write_error)?;
        file.write_all(bytes).await.map_err(write_error)?;
        file.flush().await.map_err(write_error)?;

        if used_name != file_name {
            tracing::debug!(requested = %file_name, used = %used_name, "Asset file name taken, using a numbered one");
        }
        Ok(used_name)
    }

    /// Return the stored asset for `url`, downloading it only if its name is new
    ///
    /// **Errors:** `Fetch` (bad URL, transport failure, non-200),
    /// `Write` (asset directory), `Registration` (store insert). All are
    /// row-local; callers drop the asset and carry on.
    pub async fn fetch_or_reuse(&self, url: &str) -> ImportResult<FetchedAsset> {
        let url = url.trim();
        let raw_name = derive_file_name(url)
            .ok_or_else(|| ImportError::Fetch(format!("Cannot derive a file name from {}", url)))?;

        let file_name = self.sanitizer.file_name(&raw_name);
        let lookup_name = self.sanitizer.slug(&raw_name);
        if file_name.is_empty() || lookup_name.is_empty() {
            return Err(ImportError::Fetch(format!(
                "Unusable file name '{}' in {}",
                raw_name, url
            )));
        }

        if let Some(asset) = self.assets.find(&lookup_name).await? {
            let locator = self.assets.locator_of(&asset).await?;
            tracing::debug!(url = %url, asset_id = %asset.id, name = %lookup_name, "Reusing stored asset");
            return Ok(FetchedAsset {
                asset,
                locator,
                reused: true,
            });
        }

        let response = self
            .network
            .get(url, self.timeout)
            .await
            .map_err(|e| ImportError::Fetch(format!("Failed to fetch {}: {}", url, e)))?;

        if response.status != 200 {
            return Err(ImportError::Fetch(format!(
                "Failed to fetch {}: HTTP {}",
                url, response.status
            )));
        }

        let file_name = self.write_new_file(&file_name, &response.body).await?;
        let file_path = self.asset_dir.join(&file_name);

        let metadata = AssetMetadata {
            name: lookup_name,
            title: file_name.clone(),
            file_path,
            locator: self.locator_for(&file_name),
            content_type: detect_content_type(&response.body, &file_name),
        };

        let asset = match self.assets.store(&response.body, &metadata).await {
            Ok(asset) => asset,
            Err(e) => {
                // Unregistered file; nothing refers to it
                if let Err(remove_err) = tokio::fs::remove_file(&metadata.file_path).await {
                    tracing::warn!(
                        file = %metadata.file_path.display(),
                        error = %remove_err,
                        "Failed to remove unregistered asset file"
                    );
                }
                return Err(ImportError::Registration(format!(
                    "Failed to register {}: {}",
                    file_name, e
                )));
            }
        };

        tracing::info!(
            url = %url,
            asset_id = %asset.id,
            file_name = %file_name,
            bytes = response.body.len(),
            content_type = %metadata.content_type,
            "Stored new asset"
        );

        Ok(FetchedAsset {
            asset,
            locator: metadata.locator,
            reused: false,
        })
    }
}
