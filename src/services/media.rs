// SPDX-License-Identifier: MIT

//! Media classification.
//!
//! Classifies a linked piece of media by fetching its content and
//! inspecting the content type and magic bytes, falling back to
//! embeddable-link recognition for video hosts. The decision logic is
//! pure so it tests without a network.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use crate::error::{Result, SyncError};

/// Broad media classification result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Gif,
    Video,
    Other,
}

/// Classification seam, so the bridge can be tested with a stub.
#[async_trait]
pub trait ClassifyMedia: Send + Sync {
    async fn classify(&self, url: &str) -> Result<MediaKind>;
}

/// Network-backed classifier.
#[derive(Clone, Default)]
pub struct MediaClassifier {
    http: reqwest::Client,
}

impl MediaClassifier {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClassifyMedia for MediaClassifier {
    async fn classify(&self, url: &str) -> Result<MediaKind> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| SyncError::Classification(format!("Malformed URL: {e}")))?;

        let response = self
            .http
            .get(parsed)
            .send()
            .await
            .map_err(|e| SyncError::Classification(format!("Malformed response: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(SyncError::Classification(format!(
                "Malformed response: HTTP {status}"
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                SyncError::Classification("Malformed response: missing content type".to_string())
            })?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SyncError::Classification(format!("Malformed response: {e}")))?;

        Ok(classify_content(&content_type, &bytes, url))
    }
}

/// The classification decision, separated from the fetch.
pub fn classify_content(content_type: &str, bytes: &[u8], url: &str) -> MediaKind {
    if content_type.ends_with("gif") && looks_like_raster(bytes) {
        MediaKind::Gif
    } else if content_type.starts_with("image") && looks_like_raster(bytes) {
        MediaKind::Image
    } else if normalize_embed(url).is_some() {
        MediaKind::Video
    } else {
        MediaKind::Other
    }
}

/// Magic-byte check for the raster formats the app serves.
fn looks_like_raster(bytes: &[u8]) -> bool {
    bytes.starts_with(b"GIF87a")
        || bytes.starts_with(b"GIF89a")
        || bytes.starts_with(b"\x89PNG\r\n\x1a\n")
        || bytes.starts_with(&[0xFF, 0xD8, 0xFF])
}

/// Normalize a recognized video-host URL into its embeddable form.
///
/// Two shapes are recognized by substring containment: short links
/// ("youtu.be", split once on ".be/") and watch links ("youtube",
/// split once on "watch?v="). Exactly one segment after the marker is
/// required; anything else is unrecognized.
pub fn normalize_embed(url: &str) -> Option<reqwest::Url> {
    let code = if url.contains("youtu.be") {
        capture_after(url, ".be/")?
    } else if url.contains("youtube") {
        capture_after(url, "watch?v=")?
    } else {
        return None;
    };

    reqwest::Url::parse(&format!("https://www.youtube.com/embed/{code}")).ok()
}

fn capture_after<'a>(url: &'a str, marker: &str) -> Option<&'a str> {
    let parts: Vec<&str> = url.split(marker).collect();
    match parts.as_slice() {
        [_, code] if !code.is_empty() => Some(code),
        _ => None,
    }
}
