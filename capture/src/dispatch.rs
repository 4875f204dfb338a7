//! # Share / Download Dispatch
//!
//! Picks how a finished image leaves the page.
//!
//! | Condition | Action |
//! |---|---|
//! | share available and accepts the file | share; cancel = success, other error = failure |
//! | share available, file not accepted | download |
//! | share absent | download |

use std::rc::Rc;

use tracing::{info, warn};

use crate::error::CaptureError;
use crate::platform::{FileSaver, SharePayload, ShareResult, ShareTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryRoute {
    Share,
    Download,
}

/// How the artifact was delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Shared,
    /// User closed the share sheet; not an error
    ShareCancelled,
    Downloaded { file_name: String },
}

/// Decision table for a payload
pub fn choose_route(share_available: bool, accepts_payload: bool) -> DeliveryRoute {
    if share_available && accepts_payload {
        DeliveryRoute::Share
    } else {
        DeliveryRoute::Download
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    share: Rc<dyn ShareTarget>,
    saver: Rc<dyn FileSaver>,
}

impl Dispatcher {
    pub fn new(share: Rc<dyn ShareTarget>, saver: Rc<dyn FileSaver>) -> Self {
        Self { share, saver }
    }

    pub async fn deliver(&self, payload: &SharePayload) -> Result<Delivery, CaptureError> {
        let available = self.share.is_available();
        let route = choose_route(available, available && self.share.can_accept(payload));

        if route == DeliveryRoute::Share {
            match self.share.share(payload).await {
                ShareResult::Shared => {
                    info!("Shared {} via share sheet", payload.file_name);
                    return Ok(Delivery::Shared);
                }
                ShareResult::Cancelled => {
                    info!("Share sheet dismissed by user");
                    return Ok(Delivery::ShareCancelled);
                }
                ShareResult::Failed(message) => {
                    warn!("Share failed: {}", message);
                    return Err(CaptureError::Share(message));
                }
                ShareResult::Unavailable => {
                    info!("Share unavailable at call time, falling back to download");
                }
            }
        }

        self.saver.save(&payload.bytes, &payload.mime_type, &payload.file_name);
        info!("Download triggered for {}", payload.file_name);
        Ok(Delivery::Downloaded { file_name: payload.file_name.clone() })
    }
}
