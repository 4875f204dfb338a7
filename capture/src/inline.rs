//! # Image Inlining
//!
//! Rasterizing a subtree that contains cross-origin images taints the canvas.
//! Every remote image is therefore re-fetched through a CORS relay and
//! swapped for a self-contained `data:` URL before the raster pass.

use std::rc::Rc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, warn};

use crate::error::CaptureError;
use crate::platform::{FetchedImage, ImageFetcher, Timer};
use crate::timeout::with_timeout;

const DEFAULT_MIME: &str = "image/png";

/// Converts image sources into embedded data URLs
#[derive(Clone)]
pub struct ImageInliner {
    fetcher: Rc<dyn ImageFetcher>,
    timer: Rc<dyn Timer>,
    relay_base: String,
    relay_output: String,
    fetch_timeout: Duration,
}

impl ImageInliner {
    pub fn new(
        fetcher: Rc<dyn ImageFetcher>,
        timer: Rc<dyn Timer>,
        relay_base: impl Into<String>,
        relay_output: impl Into<String>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            timer,
            relay_base: relay_base.into(),
            relay_output: relay_output.into(),
            fetch_timeout,
        }
    }

    /// Inline one image source.
    ///
    /// Returns the source unchanged when it is already a data URL, and `None`
    /// when it cannot be converted: empty, not an http(s) URL, or the relay
    /// fetch failed or timed out. Never returns an error.
    pub async fn inline(&self, src: &str) -> Option<String> {
        if src.starts_with("data:") {
            return Some(src.to_string());
        }
        if src.is_empty() || !src.starts_with("http") {
            debug!("Image source is not convertible: {:?}", src);
            return None;
        }

        let url = relay_url(&self.relay_base, src, &self.relay_output);
        match with_timeout(self.timer.as_ref(), self.fetch_timeout, self.fetcher.fetch(&url)).await {
            Some(Ok(image)) if image.bytes.is_empty() => {
                warn!("Inlining {} failed: relay returned an empty body", src);
                None
            }
            Some(Ok(image)) => Some(to_data_url(&image)),
            Some(Err(e)) => {
                warn!("Inlining {} failed: {}", src, e);
                None
            }
            None => {
                warn!("Inlining {} timed out after {}ms", src, self.fetch_timeout.as_millis());
                None
            }
        }
    }
}

/// `<relay>?url=<percent-encoded src>&output=<format>`
pub fn relay_url(relay_base: &str, src: &str, output: &str) -> String {
    let separator = if relay_base.contains('?') { '&' } else { '?' };
    format!("{}{}url={}&output={}", relay_base, separator, encode_uri_component(src), output)
}

/// Percent-encode everything outside the `encodeURIComponent` unreserved set
pub fn encode_uri_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len() * 3);
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Encode fetched bytes as `data:<mime>;base64,...`
pub fn to_data_url(image: &FetchedImage) -> String {
    let mime = image
        .content_type
        .as_deref()
        .and_then(|ct| ct.split(';').next())
        .map(str::trim)
        .filter(|ct| ct.starts_with("image/"))
        .unwrap_or(DEFAULT_MIME);
    format!("data:{};base64,{}", mime, STANDARD.encode(&image.bytes))
}

/// Split a base64 data URL into its mime type and raw bytes
pub fn decode_data_url(data_url: &str) -> Result<(String, Vec<u8>), CaptureError> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| CaptureError::InvalidRaster("missing data: scheme".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| CaptureError::InvalidRaster("missing payload separator".to_string()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| CaptureError::InvalidRaster("payload is not base64".to_string()))?;
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| CaptureError::InvalidRaster(e.to_string()))?;
    if bytes.is_empty() {
        return Err(CaptureError::InvalidRaster("empty image".to_string()));
    }
    let mime = if mime.is_empty() { DEFAULT_MIME } else { mime };
    Ok((mime.to_string(), bytes))
}
