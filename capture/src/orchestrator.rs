//! # Capture Orchestrator
//!
//! Coordinates one export attempt end to end.
//!
//! Preparing and Synchronizing degrade per image and never abort.
//! Rasterizing and Dispatching abort on the first error. Cleanup runs in
//! every case, before the outcome reaches the caller. Nothing is retried
//! automatically; the user triggers again.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::config::CaptureConfig;
use crate::dispatch::{Delivery, Dispatcher};
use crate::error::{CaptureError, CaptureStep};
use crate::inline::{decode_data_url, ImageInliner};
use crate::platform::{
    CaptureImage, CaptureTarget, FileSaver, ImageFetcher, Platform, RasterOptions, Rasterizer, SharePayload,
    ShareTarget, Timer,
};
use crate::session::CaptureSession;
use crate::timeout::with_timeout;
use crate::wait::wait_for_all;

/// Collaborators injected into the orchestrator
pub struct CaptureDeps<T> {
    pub fetcher: Rc<dyn ImageFetcher>,
    pub rasterizer: Rc<dyn Rasterizer<T>>,
    pub share: Rc<dyn ShareTarget>,
    pub saver: Rc<dyn FileSaver>,
    pub timer: Rc<dyn Timer>,
    pub platform: Rc<dyn Platform>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Delivered(Delivery),
    /// A capture was already running; this trigger did nothing
    AlreadyRunning,
}

/// One per summary page instance. Holds the in-progress flag that keeps at
/// most one capture session alive at a time.
pub struct CaptureOrchestrator<T: CaptureTarget> {
    config: CaptureConfig,
    inliner: ImageInliner,
    rasterizer: Rc<dyn Rasterizer<T>>,
    dispatcher: Dispatcher,
    timer: Rc<dyn Timer>,
    platform: Rc<dyn Platform>,
    in_progress: Cell<bool>,
    last_log: RefCell<Vec<String>>,
}

impl<T: CaptureTarget> CaptureOrchestrator<T> {
    pub fn new(config: CaptureConfig, deps: CaptureDeps<T>) -> Self {
        let inliner = ImageInliner::new(
            deps.fetcher,
            deps.timer.clone(),
            config.relay_base.clone(),
            config.relay_output.clone(),
            config.fetch_timeout,
        );
        Self {
            inliner,
            rasterizer: deps.rasterizer,
            dispatcher: Dispatcher::new(deps.share, deps.saver),
            timer: deps.timer,
            platform: deps.platform,
            in_progress: Cell::new(false),
            last_log: RefCell::new(Vec::new()),
            config,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress.get()
    }

    /// Step log of the most recent finished session
    pub fn last_log(&self) -> Vec<String> {
        self.last_log.borrow().clone()
    }

    /// Capture `target` and deliver it as `valentine-card-<card_id>.png`.
    ///
    /// A trigger while another capture is running returns
    /// [`CaptureOutcome::AlreadyRunning`] without touching the target.
    pub async fn capture(&self, target: &T, card_id: &str) -> Result<CaptureOutcome, CaptureError> {
        if self.in_progress.replace(true) {
            info!("Capture already in progress, ignoring trigger for card {}", card_id);
            return Ok(CaptureOutcome::AlreadyRunning);
        }

        info!("Starting capture for card {}", card_id);
        let session = CaptureSession::new(target, &self.in_progress);
        let result = self.run(&session, target, card_id).await;
        let log = session.finish();

        match &result {
            Ok(delivery) => info!("Capture for card {} finished: {:?}", card_id, delivery),
            Err(e) => {
                error!("Capture for card {} failed: {}", card_id, e);
                if self.platform.is_touch_device() {
                    self.platform.alert(&format!("{}\n\n{}", e, log.join("\n")));
                }
            }
        }
        *self.last_log.borrow_mut() = log;
        result.map(CaptureOutcome::Delivered)
    }

    async fn run(&self, session: &CaptureSession<'_, T>, target: &T, card_id: &str) -> Result<Delivery, CaptureError> {
        let images = target.images();

        self.prepare(session, &images).await;

        session.log(CaptureStep::Synchronizing, format!("waiting for {} image(s)", images.len()));
        wait_for_all(&images, self.timer.as_ref(), self.config.load_timeout).await;
        self.timer.sleep(self.config.settle_delay).await;

        session.hide_overlay();
        let (width, height) = target.scroll_size();
        let options = RasterOptions {
            width,
            height,
            pixel_ratio: self.config.pixel_ratio,
            background_color: self.config.background_color.clone(),
            cache_bust: true,
        };
        session.log(CaptureStep::Rasterizing, format!("{}x{} @{}x", width, height, options.pixel_ratio));
        let data_url = capture_raster(
            self.rasterizer.as_ref(),
            self.timer.as_ref(),
            target,
            &options,
            self.config.raster_timeout,
        )
        .await?;

        let (mime_type, bytes) = decode_data_url(&data_url)?;
        session.log(CaptureStep::Dispatching, format!("{} bytes of {}", bytes.len(), mime_type));
        let payload = SharePayload {
            file_name: shared::capture_filename(card_id),
            mime_type,
            bytes,
            title: self.config.share_title.clone(),
            text: self.config.share_text.clone(),
        };
        self.dispatcher.deliver(&payload).await
    }

    /// Inline every image it can, one at a time. Failures leave the image on
    /// its original source.
    async fn prepare(&self, session: &CaptureSession<'_, T>, images: &[T::Image]) {
        for img in images {
            let Some(src) = img.src().filter(|s| !s.is_empty()) else {
                continue;
            };
            match self.inliner.inline(&src).await {
                Some(inlined) if inlined != src => session.swap_source(img, src, &inlined),
                Some(_) => {}
                None => {
                    warn!("Keeping original source for {}", src);
                    session.log(CaptureStep::Preparing, format!("skipped {}", src));
                }
            }
        }
        session.log(CaptureStep::Preparing, format!("inlined {} of {} image(s)", session.swapped_count(), images.len()));
    }
}

/// Rasterize `target` twice and keep the second result.
///
/// A single pass sometimes samples the pre-swap pixels; the discarded first
/// pass forces the renderer to materialize the inlined sources. Both passes
/// use identical options and each is bounded by `limit`.
pub async fn capture_raster<T: ?Sized>(
    rasterizer: &dyn Rasterizer<T>,
    timer: &dyn Timer,
    target: &T,
    options: &RasterOptions,
    limit: Duration,
) -> Result<String, CaptureError> {
    raster_once(rasterizer, timer, target, options, limit).await?;
    raster_once(rasterizer, timer, target, options, limit).await
}

async fn raster_once<T: ?Sized>(
    rasterizer: &dyn Rasterizer<T>,
    timer: &dyn Timer,
    target: &T,
    options: &RasterOptions,
    limit: Duration,
) -> Result<String, CaptureError> {
    match with_timeout(timer, limit, rasterizer.rasterize(target, options)).await {
        Some(Ok(data_url)) => Ok(data_url),
        Some(Err(message)) => Err(CaptureError::Rasterize(message)),
        None => Err(CaptureError::Timeout { step: CaptureStep::Rasterizing, after: limit }),
    }
}
