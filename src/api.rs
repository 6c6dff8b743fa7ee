/// Remote gallery API client
///
/// Thin wrapper over reqwest for the gallery server's HTTP contract:
/// paged listing, favorite toggle, delete, multipart upload and raw
/// asset fetches. Every method returns a typed `ApiError` so callers
/// can tell a dead network from a server-side rejection.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::state::data::MediaRecord;
use crate::state::filter::FilterState;

/// Failures the remote API can produce
///
/// Carries strings rather than source errors so values stay `Clone`
/// and can travel inside UI messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never completed (DNS, connect, timeout, bad body)
    #[error("network error: {0}")]
    Network(String),
    /// The server answered with a non-success status
    #[error("server returned status {status}")]
    Server { status: u16 },
    /// The mutation target no longer exists on the server
    #[error("media no longer exists on the server")]
    NotFound,
    /// A single file in an upload batch failed
    #[error("upload of {file} failed: {reason}")]
    Upload { file: String, reason: String },
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

impl ApiError {
    /// Map a non-success HTTP status onto the error taxonomy
    fn from_status(status: reqwest::StatusCode) -> Self {
        if status == reqwest::StatusCode::NOT_FOUND {
            ApiError::NotFound
        } else {
            ApiError::Server {
                status: status.as_u16(),
            }
        }
    }
}

/// Response body of POST /favorite/{id}
#[derive(Debug, Deserialize)]
struct FavoriteResponse {
    is_favorite: bool,
}

/// Response body of POST /upload
#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[allow(dead_code)]
    count: usize,
    #[serde(default)]
    images: Vec<MediaRecord>,
}

/// Client for one gallery server
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("aura/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        // Trailing slashes would produce double-slash asset paths
        let base_url = base_url.trim_end_matches('/').to_string();

        ApiClient { http, base_url }
    }

    /// Server base URL, without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch one page of the listing under the given filter
    ///
    /// The caller owns pagination state; this method is stateless.
    pub async fn list_page(
        &self,
        offset: usize,
        limit: usize,
        filter: &FilterState,
    ) -> Result<Vec<MediaRecord>, ApiError> {
        let response = self
            .http
            .get(format!("{}/api/images", self.base_url))
            .query(&[
                ("offset", offset.to_string()),
                ("limit", limit.to_string()),
                ("search", filter.search_text.clone()),
                ("favorites", filter.favorites_only.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::from_status(response.status()));
        }

        Ok(response.json().await?)
    }

    /// Flip the favorite flag server-side and return the confirmed value
    ///
    /// Not idempotent: every call toggles, so the caller must apply the
    /// returned value rather than its own guess.
    pub async fn toggle_favorite(&self, id: i64) -> Result<bool, ApiError> {
        let response = self
            .http
            .post(format!("{}/favorite/{}", self.base_url, id))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::from_status(response.status()));
        }

        let body: FavoriteResponse = response.json().await?;
        Ok(body.is_favorite)
    }

    /// Delete a record and its stored assets
    pub async fn delete_media(&self, id: i64) -> Result<(), ApiError> {
        let response = self
            .http
            .delete(format!("{}/delete/{}", self.base_url, id))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::from_status(response.status()));
        }

        Ok(())
    }

    /// Upload a single file and return the records the server created
    ///
    /// Uploads go one file per request so that a failure stays scoped
    /// to that file; batch coordination lives in the upload queue.
    pub async fn upload_file(&self, path: &Path) -> Result<Vec<MediaRecord>, ApiError> {
        let file_label = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let upload_err = |reason: String| ApiError::Upload {
            file: file_label.clone(),
            reason,
        };

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| upload_err(e.to_string()))?;

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_label.clone())
            .mime_str(mime_for_path(path))
            .map_err(|e| upload_err(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("files", part);

        let response = self
            .http
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| upload_err(e.to_string()))?;

        if !response.status().is_success() {
            return Err(upload_err(format!("status {}", response.status().as_u16())));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| upload_err(e.to_string()))?;
        Ok(body.images)
    }

    /// Fetch a display asset (thumbnail or preview) as raw bytes
    pub async fn fetch_asset(&self, url: String) -> Result<Vec<u8>, ApiError> {
        let response = self.http.get(url).send().await?;

        if !response.status().is_success() {
            return Err(ApiError::from_status(response.status()));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Content type for an upload, from the file extension
///
/// The server routes on the part's content type, so unknown
/// extensions fall back to a generic binary type and let the
/// server decide whether to accept the file.
fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from_status(reqwest::StatusCode::NOT_FOUND),
            ApiError::NotFound
        );
        assert_eq!(
            ApiError::from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::Server { status: 500 }
        );
        assert_eq!(
            ApiError::from_status(reqwest::StatusCode::BAD_GATEWAY),
            ApiError::Server { status: 502 }
        );
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = ApiClient::new("http://localhost:8000/".to_string());
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("a/b/photo.JPG")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("clip.mp4")), "video/mp4");
        assert_eq!(mime_for_path(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn test_parse_upload_response() {
        let body: UploadResponse = serde_json::from_str(
            r#"{"count": 1, "images": [{"id": 9, "filename": "k", "original_name": "k.png"}]}"#,
        )
        .unwrap();
        assert_eq!(body.images.len(), 1);
        assert_eq!(body.images[0].id, 9);
    }
}
