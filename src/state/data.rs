/// Shared data structures for the application state
///
/// These structs represent the media records that flow between
/// the remote API layer and the UI layer. The wire format is the
/// server's snake_case JSON; serde maps it onto these types.

use chrono::NaiveDateTime;
use serde::Deserialize;

/// Whether a record is a still image or a video clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl Default for MediaType {
    fn default() -> Self {
        MediaType::Image
    }
}

/// Represents a single media record in the gallery
///
/// The `id` is assigned by the server and is unique within one
/// collection. `filename` is the opaque storage key the server uses
/// to address the derived assets (thumbnail, preview, original);
/// the client never invents or rewrites it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MediaRecord {
    /// Unique server-side ID
    pub id: i64,
    /// Storage key, used to derive asset URLs
    pub filename: String,
    /// Name the file had when it was uploaded
    #[serde(rename = "original_name")]
    pub display_name: String,
    /// Image or video
    #[serde(default)]
    pub media_type: MediaType,
    /// Favorite flag, server is the source of truth
    #[serde(default)]
    pub is_favorite: bool,
    /// Pixel dimensions, if the server has analyzed the file
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// When the file was uploaded (server clock, no timezone)
    #[serde(default)]
    pub upload_date: Option<NaiveDateTime>,
    /// Analysis tags, empty when the file has not been analyzed
    #[serde(default)]
    pub tags: Vec<String>,
    /// Number of faces detected by server-side analysis
    #[serde(default)]
    pub face_count: Option<u32>,
    /// Detected pose description, if any
    #[serde(default)]
    pub pose: Option<String>,
}

impl MediaRecord {
    /// URL of the grid thumbnail (always an image, also the video poster)
    pub fn thumbnail_url(&self, base: &str) -> String {
        format!("{}/thumbnails/{}.webp", base, self.filename)
    }

    /// URL of the full-screen preview variant
    pub fn preview_url(&self, base: &str) -> String {
        format!("{}/previews/{}.webp", base, self.filename)
    }

    /// URL of the original upload (the playable file for videos)
    pub fn original_url(&self, base: &str) -> String {
        format!("{}/uploads/{}", base, self.filename)
    }

    /// URL of the asset the viewer displays for this record
    ///
    /// Videos show their poster frame; playback is delegated to an
    /// external player via the original URL.
    pub fn display_url(&self, base: &str) -> String {
        match self.media_type {
            MediaType::Image => self.preview_url(base),
            MediaType::Video => self.thumbnail_url(base),
        }
    }

    /// Upload date formatted for display, e.g. "03 Jan 2024"
    pub fn display_date(&self) -> String {
        match self.upload_date {
            Some(date) => date.format("%d %b %Y").to_string(),
            None => "undated".to_string(),
        }
    }
}
