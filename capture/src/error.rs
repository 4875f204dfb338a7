use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Pipeline phase, used in logs and timeout errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStep {
    Preparing,
    Synchronizing,
    Rasterizing,
    Dispatching,
    Cleanup,
}

impl fmt::Display for CaptureStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CaptureStep::Preparing => "preparing",
            CaptureStep::Synchronizing => "synchronizing",
            CaptureStep::Rasterizing => "rasterizing",
            CaptureStep::Dispatching => "dispatching",
            CaptureStep::Cleanup => "cleanup",
        };
        f.write_str(name)
    }
}

/// Errors that end a capture attempt. Cleanup has always run by the time
/// one of these reaches the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CaptureError {
    #[error("rasterization failed: {0}")]
    Rasterize(String),

    #[error("{step} timed out after {}ms", .after.as_millis())]
    Timeout { step: CaptureStep, after: Duration },

    #[error("raster output is not a usable data URL: {0}")]
    InvalidRaster(String),

    /// Share sheet failed for a reason other than the user dismissing it.
    /// The platform message is kept verbatim.
    #[error("share failed: {0}")]
    Share(String),
}

/// Per-image fetch failure. Never escapes the inliner.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("could not read response body: {0}")]
    Body(String),
}
