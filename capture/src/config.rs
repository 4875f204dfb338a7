use std::time::Duration;

/// Tunables for one capture pipeline instance
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfig {
    /// Same-origin-safe relay that re-serves remote images with CORS headers
    pub relay_base: String,
    /// Output format requested from the relay
    pub relay_output: String,
    /// Pause after all images decoded, before the first raster pass
    pub settle_delay: Duration,
    pub fetch_timeout: Duration,
    /// Per-image bound on the load/decode wait
    pub load_timeout: Duration,
    pub raster_timeout: Duration,
    pub pixel_ratio: f64,
    pub background_color: String,
    pub share_title: String,
    pub share_text: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            relay_base: "https://wsrv.nl/".to_string(),
            relay_output: "png".to_string(),
            settle_delay: Duration::from_millis(200),
            fetch_timeout: Duration::from_secs(10),
            load_timeout: Duration::from_secs(10),
            raster_timeout: Duration::from_secs(30),
            pixel_ratio: 3.0,
            background_color: "#fdf2f4".to_string(),
            share_title: "ความทรงจำวาเลนไทน์ของเรา 💖".to_string(),
            share_text: "ดูการ์ดวาเลนไทน์สวยๆ ใบนี้สิ! 💌".to_string(),
        }
    }
}
