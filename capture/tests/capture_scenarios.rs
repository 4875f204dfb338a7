use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use capture::{
    CaptureConfig, CaptureDeps, CaptureError, CaptureImage, CaptureOrchestrator, CaptureOutcome, CaptureTarget,
    Delivery, FetchError, FetchedImage, FileSaver, ImageFetcher, Platform, RasterOptions, Rasterizer, SharePayload,
    ShareResult, ShareTarget, Timer,
};

const SENDER_URL: &str = "https://cdn.test/sender.jpg";
const GIFT_URL: &str = "https://cdn.test/roses.jpg";
const DEAD_URL: &str = "https://unreachable.test/teddy.jpg";
const RASTER_OUTPUT: &str = "data:image/png;base64,iVBORw0KGgo=";

#[derive(Debug)]
struct ImageState {
    src: Option<String>,
    complete: bool,
    natural_width: u32,
    /// Never fires load or error again
    stalled: bool,
}

#[derive(Clone)]
struct FakeImage(Rc<RefCell<ImageState>>);

impl FakeImage {
    fn loaded(src: &str) -> Self {
        Self(Rc::new(RefCell::new(ImageState {
            src: Some(src.to_string()),
            complete: true,
            natural_width: 400,
            stalled: false,
        })))
    }

    /// What a browser reports for an `<img>` whose load already failed
    fn broken(src: &str) -> Self {
        Self(Rc::new(RefCell::new(ImageState {
            src: Some(src.to_string()),
            complete: true,
            natural_width: 0,
            stalled: true,
        })))
    }

    /// Still loading, and the network never answers
    fn pending(src: &str) -> Self {
        Self(Rc::new(RefCell::new(ImageState {
            src: Some(src.to_string()),
            complete: false,
            natural_width: 0,
            stalled: true,
        })))
    }

    fn current_src(&self) -> Option<String> {
        self.0.borrow().src.clone()
    }
}

#[async_trait(?Send)]
impl CaptureImage for FakeImage {
    fn src(&self) -> Option<String> {
        self.current_src()
    }

    fn set_src(&self, src: &str) {
        let mut state = self.0.borrow_mut();
        state.src = Some(src.to_string());
        state.complete = false;
        state.natural_width = 0;
        state.stalled = false;
    }

    fn is_complete(&self) -> bool {
        self.0.borrow().complete
    }

    fn natural_width(&self) -> u32 {
        self.0.borrow().natural_width
    }

    fn supports_decode(&self) -> bool {
        true
    }

    async fn decode(&self) -> Result<(), String> {
        Ok(())
    }

    async fn wait_for_load_or_error(&self) {
        if self.0.borrow().stalled {
            futures::future::pending::<()>().await;
        }
        let mut state = self.0.borrow_mut();
        state.complete = true;
        state.natural_width = 400;
    }
}

struct FakeTarget {
    images: Vec<FakeImage>,
    overlay_hidden: Cell<bool>,
}

impl FakeTarget {
    fn new(srcs: &[&str]) -> Self {
        Self::with_images(srcs.iter().map(|s| FakeImage::loaded(s)).collect())
    }

    fn with_images(images: Vec<FakeImage>) -> Self {
        Self { images, overlay_hidden: Cell::new(false) }
    }

    fn srcs(&self) -> Vec<Option<String>> {
        self.images.iter().map(FakeImage::current_src).collect()
    }
}

impl CaptureTarget for FakeTarget {
    type Image = FakeImage;

    fn images(&self) -> Vec<FakeImage> {
        self.images.clone()
    }

    fn scroll_size(&self) -> (u32, u32) {
        (640, 960)
    }

    fn set_overlay_hidden(&self, hidden: bool) {
        self.overlay_hidden.set(hidden);
    }
}

/// What the rasterizer observed on one pass
#[derive(Debug, Clone)]
struct Pass {
    srcs: Vec<Option<String>>,
    overlay_hidden: bool,
    options: RasterOptions,
}

enum RasterBehavior {
    Succeed,
    Fail(&'static str),
    Hang,
}

struct FakeRasterizer {
    behavior: RasterBehavior,
    passes: RefCell<Vec<Pass>>,
}

impl FakeRasterizer {
    fn new(behavior: RasterBehavior) -> Rc<Self> {
        Rc::new(Self { behavior, passes: RefCell::new(Vec::new()) })
    }
}

#[async_trait(?Send)]
impl Rasterizer<FakeTarget> for FakeRasterizer {
    async fn rasterize(&self, target: &FakeTarget, options: &RasterOptions) -> Result<String, String> {
        self.passes.borrow_mut().push(Pass {
            srcs: target.srcs(),
            overlay_hidden: target.overlay_hidden.get(),
            options: options.clone(),
        });
        match self.behavior {
            RasterBehavior::Succeed => Ok(RASTER_OUTPUT.to_string()),
            RasterBehavior::Fail(message) => Err(message.to_string()),
            RasterBehavior::Hang => futures::future::pending().await,
        }
    }
}

#[derive(Default)]
struct FakeFetcher {
    calls: RefCell<Vec<String>>,
}

#[async_trait(?Send)]
impl ImageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, FetchError> {
        self.calls.borrow_mut().push(url.to_string());
        if url.contains("unreachable.test") {
            return Err(FetchError::Network("connection refused".to_string()));
        }
        Ok(FetchedImage { bytes: vec![1, 2, 3], content_type: Some("image/png".to_string()) })
    }
}

struct FakeShare {
    available: bool,
    accepts: bool,
    result: ShareResult,
    shared: RefCell<Vec<SharePayload>>,
}

impl FakeShare {
    fn unsupported() -> Rc<Self> {
        Rc::new(Self { available: false, accepts: false, result: ShareResult::Shared, shared: RefCell::new(Vec::new()) })
    }

    fn answering(result: ShareResult) -> Rc<Self> {
        Rc::new(Self { available: true, accepts: true, result, shared: RefCell::new(Vec::new()) })
    }
}

#[async_trait(?Send)]
impl ShareTarget for FakeShare {
    fn is_available(&self) -> bool {
        self.available
    }

    fn can_accept(&self, _payload: &SharePayload) -> bool {
        self.accepts
    }

    async fn share(&self, payload: &SharePayload) -> ShareResult {
        self.shared.borrow_mut().push(payload.clone());
        self.result.clone()
    }
}

#[derive(Default)]
struct RecordingSaver {
    files: RefCell<Vec<(String, String, usize)>>,
}

impl FileSaver for RecordingSaver {
    fn save(&self, bytes: &[u8], mime_type: &str, file_name: &str) {
        self.files.borrow_mut().push((file_name.to_string(), mime_type.to_string(), bytes.len()));
    }
}

struct TokioTimer;

#[async_trait(?Send)]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Default)]
struct FakePlatform {
    touch: bool,
    alerts: RefCell<Vec<String>>,
}

impl Platform for FakePlatform {
    fn is_touch_device(&self) -> bool {
        self.touch
    }

    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }
}

struct Harness {
    orchestrator: CaptureOrchestrator<FakeTarget>,
    rasterizer: Rc<FakeRasterizer>,
    fetcher: Rc<FakeFetcher>,
    share: Rc<FakeShare>,
    saver: Rc<RecordingSaver>,
    platform: Rc<FakePlatform>,
}

fn test_config() -> CaptureConfig {
    CaptureConfig {
        relay_base: "https://relay.test/".to_string(),
        settle_delay: Duration::from_millis(5),
        fetch_timeout: Duration::from_millis(200),
        load_timeout: Duration::from_millis(200),
        raster_timeout: Duration::from_millis(200),
        ..CaptureConfig::default()
    }
}

fn harness(config: CaptureConfig, behavior: RasterBehavior, share: Rc<FakeShare>, touch: bool) -> Harness {
    let rasterizer = FakeRasterizer::new(behavior);
    let fetcher = Rc::new(FakeFetcher::default());
    let saver = Rc::new(RecordingSaver::default());
    let platform = Rc::new(FakePlatform { touch, ..Default::default() });
    let orchestrator = CaptureOrchestrator::new(
        config,
        CaptureDeps {
            fetcher: fetcher.clone(),
            rasterizer: rasterizer.clone(),
            share: share.clone(),
            saver: saver.clone(),
            timer: Rc::new(TokioTimer),
            platform: platform.clone(),
        },
    );
    Harness { orchestrator, rasterizer, fetcher, share, saver, platform }
}

fn original_srcs(urls: &[&str]) -> Vec<Option<String>> {
    urls.iter().map(|u| Some(u.to_string())).collect()
}

#[tokio::test]
async fn test_scenario_a_download_when_share_unsupported() {
    let h = harness(test_config(), RasterBehavior::Succeed, FakeShare::unsupported(), false);
    let target = FakeTarget::new(&[SENDER_URL, GIFT_URL]);

    let outcome = h.orchestrator.capture(&target, "card42").await.unwrap();

    assert_eq!(
        outcome,
        CaptureOutcome::Delivered(Delivery::Downloaded { file_name: "valentine-card-card42.png".to_string() })
    );
    let files = h.saver.files.borrow();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].0, "valentine-card-card42.png");
    assert_eq!(files[0].1, "image/png");

    // Restored after the capture
    assert_eq!(target.srcs(), original_srcs(&[SENDER_URL, GIFT_URL]));
    assert!(!target.overlay_hidden.get());
    assert!(!h.orchestrator.is_in_progress());
}

#[tokio::test]
async fn test_scenario_a_raster_sees_inlined_sources_twice() {
    let h = harness(test_config(), RasterBehavior::Succeed, FakeShare::unsupported(), false);
    let target = FakeTarget::new(&[SENDER_URL, GIFT_URL]);

    h.orchestrator.capture(&target, "card42").await.unwrap();

    let passes = h.rasterizer.passes.borrow();
    assert_eq!(passes.len(), 2);
    for pass in passes.iter() {
        assert!(pass.overlay_hidden);
        assert!(pass.srcs.iter().all(|s| s.as_deref() == Some("data:image/png;base64,AQID")));
        assert_eq!(pass.options.width, 640);
        assert_eq!(pass.options.height, 960);
        assert_eq!(pass.options.pixel_ratio, 3.0);
        assert_eq!(pass.options.background_color, "#fdf2f4");
        assert!(pass.options.cache_bust);
    }
    assert_eq!(h.fetcher.calls.borrow().len(), 2);
}

#[tokio::test]
async fn test_scenario_b_share_accepted() {
    let h = harness(test_config(), RasterBehavior::Succeed, FakeShare::answering(ShareResult::Shared), false);
    let target = FakeTarget::new(&[SENDER_URL, GIFT_URL]);

    let outcome = h.orchestrator.capture(&target, "card42").await.unwrap();

    assert_eq!(outcome, CaptureOutcome::Delivered(Delivery::Shared));
    assert!(h.saver.files.borrow().is_empty());
    let shared = h.share.shared.borrow();
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].file_name, "valentine-card-card42.png");
    assert_eq!(shared[0].title, CaptureConfig::default().share_title);
}

#[tokio::test]
async fn test_scenario_c_unreachable_image_keeps_original_source() {
    let h = harness(test_config(), RasterBehavior::Succeed, FakeShare::unsupported(), false);
    let target = FakeTarget::with_images(vec![FakeImage::loaded(SENDER_URL), FakeImage::broken(DEAD_URL)]);

    let outcome = tokio::time::timeout(Duration::from_secs(2), h.orchestrator.capture(&target, "card42"))
        .await
        .expect("capture must not hang on a broken image")
        .unwrap();

    assert!(matches!(outcome, CaptureOutcome::Delivered(Delivery::Downloaded { .. })));
    let passes = h.rasterizer.passes.borrow();
    assert_eq!(passes[1].srcs[0].as_deref(), Some("data:image/png;base64,AQID"));
    assert_eq!(passes[1].srcs[1].as_deref(), Some(DEAD_URL));
    assert!(h.orchestrator.last_log().iter().any(|line| line.contains("skipped") && line.contains(DEAD_URL)));
    assert_eq!(target.srcs(), original_srcs(&[SENDER_URL, DEAD_URL]));
}

#[tokio::test]
async fn test_image_that_never_loads_is_bounded() {
    let config = CaptureConfig { load_timeout: Duration::from_millis(30), ..test_config() };
    let h = harness(config, RasterBehavior::Succeed, FakeShare::unsupported(), false);
    let target = FakeTarget::with_images(vec![FakeImage::loaded(SENDER_URL), FakeImage::pending(DEAD_URL)]);

    let outcome = tokio::time::timeout(Duration::from_secs(2), h.orchestrator.capture(&target, "card42"))
        .await
        .expect("load wait must be bounded")
        .unwrap();

    assert!(matches!(outcome, CaptureOutcome::Delivered(Delivery::Downloaded { .. })));
    assert!(!h.orchestrator.is_in_progress());
    assert_eq!(target.srcs(), original_srcs(&[SENDER_URL, DEAD_URL]));
}

#[tokio::test]
async fn test_share_cancelled_is_success() {
    let h = harness(test_config(), RasterBehavior::Succeed, FakeShare::answering(ShareResult::Cancelled), true);
    let target = FakeTarget::new(&[SENDER_URL]);

    let outcome = h.orchestrator.capture(&target, "card42").await.unwrap();

    assert_eq!(outcome, CaptureOutcome::Delivered(Delivery::ShareCancelled));
    assert!(h.saver.files.borrow().is_empty());
    assert!(h.platform.alerts.borrow().is_empty());
}

#[tokio::test]
async fn test_share_failure_surfaces_and_restores() {
    let h = harness(
        test_config(),
        RasterBehavior::Succeed,
        FakeShare::answering(ShareResult::Failed("AbortError: share interrupted".to_string())),
        false,
    );
    let target = FakeTarget::new(&[SENDER_URL, GIFT_URL]);

    let err = h.orchestrator.capture(&target, "card42").await.unwrap_err();

    assert_eq!(err, CaptureError::Share("AbortError: share interrupted".to_string()));
    assert!(h.saver.files.borrow().is_empty());
    assert_eq!(target.srcs(), original_srcs(&[SENDER_URL, GIFT_URL]));
}

#[tokio::test]
async fn test_raster_failure_restores_and_alerts_on_touch() {
    let h = harness(test_config(), RasterBehavior::Fail("SecurityError: tainted"), FakeShare::unsupported(), true);
    let target = FakeTarget::new(&[SENDER_URL, GIFT_URL]);

    let err = h.orchestrator.capture(&target, "card42").await.unwrap_err();

    assert_eq!(err, CaptureError::Rasterize("SecurityError: tainted".to_string()));
    assert_eq!(target.srcs(), original_srcs(&[SENDER_URL, GIFT_URL]));
    assert!(!target.overlay_hidden.get());
    assert!(!h.orchestrator.is_in_progress());
    assert!(h.saver.files.borrow().is_empty());

    let alerts = h.platform.alerts.borrow();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].contains("SecurityError: tainted"));
    assert!(alerts[0].contains("[preparing]"));
}

#[tokio::test]
async fn test_raster_failure_on_desktop_does_not_alert() {
    let h = harness(test_config(), RasterBehavior::Fail("boom"), FakeShare::unsupported(), false);
    let target = FakeTarget::new(&[SENDER_URL]);

    assert!(h.orchestrator.capture(&target, "card42").await.is_err());
    assert!(h.platform.alerts.borrow().is_empty());
}

#[tokio::test]
async fn test_hung_rasterizer_times_out_and_restores() {
    let config = CaptureConfig { raster_timeout: Duration::from_millis(20), ..test_config() };
    let h = harness(config, RasterBehavior::Hang, FakeShare::unsupported(), false);
    let target = FakeTarget::new(&[SENDER_URL]);

    let err = h.orchestrator.capture(&target, "card42").await.unwrap_err();

    assert!(matches!(err, CaptureError::Timeout { .. }));
    assert_eq!(target.srcs(), original_srcs(&[SENDER_URL]));
}

#[tokio::test]
async fn test_second_trigger_while_running_is_noop() {
    let h = harness(test_config(), RasterBehavior::Succeed, FakeShare::unsupported(), false);
    let target = FakeTarget::new(&[SENDER_URL, GIFT_URL]);

    let (first, second) = futures::join!(
        h.orchestrator.capture(&target, "card42"),
        h.orchestrator.capture(&target, "card42"),
    );

    assert!(matches!(first.unwrap(), CaptureOutcome::Delivered(_)));
    assert_eq!(second.unwrap(), CaptureOutcome::AlreadyRunning);
    assert_eq!(h.saver.files.borrow().len(), 1);
    assert_eq!(h.rasterizer.passes.borrow().len(), 2);
    assert_eq!(h.fetcher.calls.borrow().len(), 2);
}

#[tokio::test]
async fn test_retrigger_after_failure_runs_again() {
    let h = harness(test_config(), RasterBehavior::Fail("boom"), FakeShare::unsupported(), false);
    let target = FakeTarget::new(&[SENDER_URL]);

    assert!(h.orchestrator.capture(&target, "card42").await.is_err());
    assert!(h.orchestrator.capture(&target, "card42").await.is_err());
    // Warm-up pass fails each time, so one pass per attempt
    assert_eq!(h.rasterizer.passes.borrow().len(), 2);
}

#[tokio::test]
async fn test_dropped_capture_still_restores() {
    let config = CaptureConfig { raster_timeout: Duration::from_secs(60), ..test_config() };
    let h = harness(config, RasterBehavior::Hang, FakeShare::unsupported(), false);
    let target = FakeTarget::new(&[SENDER_URL, GIFT_URL]);

    let result = tokio::time::timeout(Duration::from_millis(50), h.orchestrator.capture(&target, "card42")).await;

    assert!(result.is_err());
    assert_eq!(target.srcs(), original_srcs(&[SENDER_URL, GIFT_URL]));
    assert!(!target.overlay_hidden.get());
    assert!(!h.orchestrator.is_in_progress());
}

#[tokio::test]
async fn test_embedded_sources_are_not_fetched() {
    let h = harness(test_config(), RasterBehavior::Succeed, FakeShare::unsupported(), false);
    let embedded = "data:image/jpeg;base64,/9j/4AAQ";
    let target = FakeTarget::new(&[embedded, GIFT_URL]);

    h.orchestrator.capture(&target, "card42").await.unwrap();

    assert_eq!(h.fetcher.calls.borrow().len(), 1);
    assert_eq!(h.rasterizer.passes.borrow()[1].srcs[0].as_deref(), Some(embedded));
    assert_eq!(target.srcs(), original_srcs(&[embedded, GIFT_URL]));
}
