//! Load/decode synchronization.
//!
//! A freshly swapped `src` is fetched and decoded asynchronously; rasterizing
//! before that finishes captures a blank or half-decoded image.

use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::platform::{CaptureImage, Timer};
use crate::timeout::with_timeout;

/// Resolve once `img` has loaded (or failed to) and, where supported, decoded.
/// Never fails: an error signal or a decode failure just means "move on".
///
/// A complete image with zero natural width already failed to load and will
/// not signal again, so it resolves at once.
pub async fn wait_for_image<I: CaptureImage>(img: &I) {
    if img.is_complete() {
        if img.natural_width() == 0 {
            debug!("Image already broken, not waiting: {:?}", img.src());
            return;
        }
    } else {
        img.wait_for_load_or_error().await;
    }
    if img.supports_decode() {
        if let Err(e) = img.decode().await {
            debug!("Image decode skipped: {}", e);
        }
    }
}

/// Drive every waiter concurrently and join them all. Each waiter gives up
/// after `limit`.
pub async fn wait_for_all<I: CaptureImage>(images: &[I], timer: &dyn Timer, limit: Duration) {
    join_all(images.iter().map(|img| async move {
        if with_timeout(timer, limit, wait_for_image(img)).await.is_none() {
            warn!("Gave up waiting for {:?} after {}ms", img.src(), limit.as_millis());
        }
    }))
    .await;
}
