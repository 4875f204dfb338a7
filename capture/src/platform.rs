//! # Platform Seams
//!
//! Everything the pipeline needs from the outside world. All traits are
//! `?Send` because the browser implementation lives on a single thread and
//! holds JS handles.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::FetchError;

/// One `<img>` inside the capture target.
///
/// Handles are cheap clones that refer to the same element, so a handle
/// stored in the restoration map can still write to the live element later.
#[async_trait(?Send)]
pub trait CaptureImage: Clone {
    /// Current `src` attribute, `None` when missing
    fn src(&self) -> Option<String>;
    fn set_src(&self, src: &str);
    fn is_complete(&self) -> bool;
    fn natural_width(&self) -> u32;
    /// Whether an explicit decode step exists on this platform
    fn supports_decode(&self) -> bool;
    async fn decode(&self) -> Result<(), String>;
    /// Resolves on the next load or error signal, whichever comes first
    async fn wait_for_load_or_error(&self);
}

/// The DOM subtree being captured
pub trait CaptureTarget {
    type Image: CaptureImage;

    fn images(&self) -> Vec<Self::Image>;
    /// Full scrollable size in CSS pixels
    fn scroll_size(&self) -> (u32, u32);
    /// Show or hide the decorative texture layer that causes raster artifacts
    fn set_overlay_hidden(&self, hidden: bool);
}

/// Options handed to the rasterization primitive
#[derive(Debug, Clone, PartialEq)]
pub struct RasterOptions {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f64,
    pub background_color: String,
    pub cache_bust: bool,
}

/// Serializes a target subtree into a self-contained image (a data URL)
#[async_trait(?Send)]
pub trait Rasterizer<T: ?Sized> {
    async fn rasterize(&self, target: &T, options: &RasterOptions) -> Result<String, String>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Plain GET against the CORS relay
#[async_trait(?Send)]
pub trait ImageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, FetchError>;
}

/// A finished image ready to leave the page
#[derive(Debug, Clone, PartialEq)]
pub struct SharePayload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShareResult {
    Shared,
    /// User dismissed the share sheet
    Cancelled,
    /// The platform refused without showing a sheet; falls back to download
    Unavailable,
    Failed(String),
}

/// Native share-sheet capability
#[async_trait(?Send)]
pub trait ShareTarget {
    fn is_available(&self) -> bool;
    fn can_accept(&self, payload: &SharePayload) -> bool;
    async fn share(&self, payload: &SharePayload) -> ShareResult;
}

/// Direct download. Fire-and-forget, there is no confirmation.
pub trait FileSaver {
    fn save(&self, bytes: &[u8], mime_type: &str, file_name: &str);
}

#[async_trait(?Send)]
pub trait Timer {
    async fn sleep(&self, duration: Duration);
}

pub trait Platform {
    /// Touch browsers hide the console, so failures get a blocking alert
    fn is_touch_device(&self) -> bool;
    fn alert(&self, message: &str);
}
