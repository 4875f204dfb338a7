//! # Browser Capture Adapters
//!
//! Binds the `capture` pipeline to the live DOM: `<img>` elements, the
//! `html-to-image` library (loaded as the `htmlToImage` global), the CORS
//! relay over fetch, the Web Share API and anchor downloads.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use capture::{
    CaptureDeps, CaptureImage, CaptureTarget, FetchError, FetchedImage, FileSaver, ImageFetcher, Platform,
    RasterOptions, Rasterizer, SharePayload, ShareResult, ShareTarget, Timer,
};
use gloo::events::EventListener;
use gloo::net::http::Request;
use gloo::timers::callback::Timeout;
use gloo::timers::future::TimeoutFuture;
use js_sys::{Array, Function, Object, Promise, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, Element, File, FilePropertyBag, HtmlAnchorElement, HtmlElement, HtmlImageElement, Url};

/// How long a download's object URL stays alive
const REVOKE_DELAY_MS: u32 = 40_000;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = htmlToImage, js_name = toPng)]
    fn html_to_png(node: &Element, options: &JsValue) -> Result<Promise, JsValue>;
}

/// Best-effort text for a thrown JS value
fn js_error_message(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    let name = Reflect::get(value, &"name".into()).ok().and_then(|v| v.as_string());
    let message = Reflect::get(value, &"message".into()).ok().and_then(|v| v.as_string());
    match (name, message) {
        (Some(name), Some(message)) => format!("{}: {}", name, message),
        (None, Some(message)) => message,
        (Some(name), None) => name,
        (None, None) => format!("{:?}", value),
    }
}

#[derive(Clone)]
pub struct DomImage(HtmlImageElement);

#[async_trait(?Send)]
impl CaptureImage for DomImage {
    fn src(&self) -> Option<String> {
        self.0.get_attribute("src")
    }

    fn set_src(&self, src: &str) {
        let _ = self.0.set_attribute("src", src);
    }

    fn is_complete(&self) -> bool {
        self.0.complete()
    }

    fn natural_width(&self) -> u32 {
        self.0.natural_width()
    }

    fn supports_decode(&self) -> bool {
        Reflect::get(&self.0, &"decode".into()).map(|f| f.is_function()).unwrap_or(false)
    }

    async fn decode(&self) -> Result<(), String> {
        JsFuture::from(self.0.decode()).await.map(|_| ()).map_err(|e| js_error_message(&e))
    }

    async fn wait_for_load_or_error(&self) {
        let (tx, rx) = futures::channel::oneshot::channel::<()>();
        let tx = Rc::new(RefCell::new(Some(tx)));
        let fire = move |_: &web_sys::Event| {
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(());
            }
        };
        let _on_load = EventListener::once(&self.0, "load", fire.clone());
        let _on_error = EventListener::once(&self.0, "error", fire);
        let _ = rx.await;
    }
}

/// The summary card element plus its decorative texture layer
pub struct DomTarget {
    root: Element,
    overlay: Option<HtmlElement>,
}

impl DomTarget {
    pub fn new(root: Element, overlay: Option<HtmlElement>) -> Self {
        Self { root, overlay }
    }
}

impl CaptureTarget for DomTarget {
    type Image = DomImage;

    fn images(&self) -> Vec<DomImage> {
        let Ok(nodes) = self.root.query_selector_all("img") else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<HtmlImageElement>().ok())
            .map(DomImage)
            .collect()
    }

    fn scroll_size(&self) -> (u32, u32) {
        (self.root.scroll_width().max(0) as u32, self.root.scroll_height().max(0) as u32)
    }

    fn set_overlay_hidden(&self, hidden: bool) {
        let Some(overlay) = &self.overlay else {
            return;
        };
        let style = overlay.style();
        if hidden {
            let _ = style.set_property("opacity", "0");
        } else {
            let _ = style.remove_property("opacity");
        }
    }
}

pub struct HtmlToImageRasterizer;

#[async_trait(?Send)]
impl Rasterizer<DomTarget> for HtmlToImageRasterizer {
    async fn rasterize(&self, target: &DomTarget, options: &RasterOptions) -> Result<String, String> {
        let js_options = Object::new();
        let set = |key: &str, value: JsValue| Reflect::set(&js_options, &key.into(), &value).map(|_| ());
        set("width", options.width.into())
            .and_then(|_| set("height", options.height.into()))
            .and_then(|_| set("pixelRatio", options.pixel_ratio.into()))
            .and_then(|_| set("quality", JsValue::from_f64(1.0)))
            .and_then(|_| set("backgroundColor", options.background_color.as_str().into()))
            .and_then(|_| set("cacheBust", options.cache_bust.into()))
            .map_err(|e| js_error_message(&e))?;

        let promise = html_to_png(&target.root, &js_options).map_err(|e| js_error_message(&e))?;
        let data_url = JsFuture::from(promise).await.map_err(|e| js_error_message(&e))?;
        data_url.as_string().ok_or_else(|| "toPng resolved to a non-string value".to_string())
    }
}

/// GET through the relay with credentials omitted
pub struct RelayFetcher;

#[async_trait(?Send)]
impl ImageFetcher for RelayFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, FetchError> {
        let response = Request::get(url)
            .mode(web_sys::RequestMode::Cors)
            .credentials(web_sys::RequestCredentials::Omit)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        if !response.ok() {
            return Err(FetchError::Status(response.status()));
        }
        let content_type = response.headers().get("content-type");
        let bytes = response.binary().await.map_err(|e| FetchError::Body(e.to_string()))?;
        Ok(FetchedImage { bytes, content_type })
    }
}

fn bytes_to_array(bytes: &[u8]) -> Array {
    let parts = Array::new();
    parts.push(&Uint8Array::from(bytes));
    parts
}

/// `navigator.share` with a single image file
pub struct NavigatorShare;

impl NavigatorShare {
    fn navigator_fn(name: &str) -> Option<(JsValue, Function)> {
        let navigator: JsValue = gloo::utils::window().navigator().into();
        let f = Reflect::get(&navigator, &name.into()).ok()?.dyn_into::<Function>().ok()?;
        Some((navigator, f))
    }

    fn share_data(payload: &SharePayload) -> Result<Object, JsValue> {
        let options = FilePropertyBag::new();
        options.set_type(&payload.mime_type);
        let file = File::new_with_u8_array_sequence_and_options(&bytes_to_array(&payload.bytes), &payload.file_name, &options)?;

        let files = Array::new();
        files.push(&file);
        let data = Object::new();
        Reflect::set(&data, &"files".into(), &files)?;
        Reflect::set(&data, &"title".into(), &payload.title.as_str().into())?;
        Reflect::set(&data, &"text".into(), &payload.text.as_str().into())?;
        Ok(data)
    }
}

#[async_trait(?Send)]
impl ShareTarget for NavigatorShare {
    fn is_available(&self) -> bool {
        Self::navigator_fn("share").is_some() && Self::navigator_fn("canShare").is_some()
    }

    fn can_accept(&self, payload: &SharePayload) -> bool {
        let (Some((navigator, can_share)), Ok(data)) = (Self::navigator_fn("canShare"), Self::share_data(payload)) else {
            return false;
        };
        can_share.call1(&navigator, &data).map(|v| v.is_truthy()).unwrap_or(false)
    }

    async fn share(&self, payload: &SharePayload) -> ShareResult {
        let Some((navigator, share)) = Self::navigator_fn("share") else {
            return ShareResult::Unavailable;
        };
        let data = match Self::share_data(payload) {
            Ok(data) => data,
            Err(e) => return ShareResult::Failed(js_error_message(&e)),
        };
        let promise = match share.call1(&navigator, &data).map(|p| p.dyn_into::<Promise>()) {
            Ok(Ok(promise)) => promise,
            Ok(Err(_)) => return ShareResult::Failed("navigator.share did not return a promise".to_string()),
            Err(e) => return ShareResult::Failed(js_error_message(&e)),
        };

        match JsFuture::from(promise).await {
            Ok(_) => ShareResult::Shared,
            Err(e) => {
                let name = Reflect::get(&e, &"name".into()).ok().and_then(|v| v.as_string());
                match name.as_deref() {
                    Some("AbortError") => ShareResult::Cancelled,
                    _ => ShareResult::Failed(js_error_message(&e)),
                }
            }
        }
    }
}

/// Share a page link through `navigator.share`. Errors when the API is
/// missing, refuses the data, or the user backs out.
pub async fn share_link(title: &str, text: &str, url: &str) -> Result<(), String> {
    let (Some((navigator, share)), Some((_, can_share))) =
        (NavigatorShare::navigator_fn("share"), NavigatorShare::navigator_fn("canShare"))
    else {
        return Err("Web Share API not supported".to_string());
    };

    let data = Object::new();
    for (key, value) in [("title", title), ("text", text), ("url", url)] {
        Reflect::set(&data, &key.into(), &value.into()).map_err(|e| js_error_message(&e))?;
    }
    if !can_share.call1(&navigator, &data).map(|v| v.is_truthy()).unwrap_or(false) {
        return Err("Share data rejected".to_string());
    }

    let promise = share
        .call1(&navigator, &data)
        .map_err(|e| js_error_message(&e))?
        .dyn_into::<Promise>()
        .map_err(|_| "navigator.share did not return a promise".to_string())?;
    JsFuture::from(promise).await.map(|_| ()).map_err(|e| js_error_message(&e))
}

/// Download through a temporary object URL and anchor click
pub struct AnchorDownloadSaver;

impl FileSaver for AnchorDownloadSaver {
    fn save(&self, bytes: &[u8], mime_type: &str, file_name: &str) {
        let options = BlobPropertyBag::new();
        options.set_type(mime_type);
        let Ok(blob) = Blob::new_with_u8_array_sequence_and_options(&bytes_to_array(bytes), &options) else {
            gloo::console::error!("Could not build download blob");
            return;
        };
        let Ok(url) = Url::create_object_url_with_blob(&blob) else {
            gloo::console::error!("Could not create object URL");
            return;
        };

        let document = gloo::utils::document();
        if let Ok(anchor) = document.create_element("a").map(|el| el.unchecked_into::<HtmlAnchorElement>()) {
            anchor.set_href(&url);
            anchor.set_download(file_name);
            if let Some(body) = document.body() {
                let _ = body.append_child(&anchor);
                anchor.click();
                let _ = body.remove_child(&anchor);
            }
        }
        // Some browsers read the blob after click() returns
        Timeout::new(REVOKE_DELAY_MS, move || {
            let _ = Url::revoke_object_url(&url);
        })
        .forget();
    }
}

pub struct GlooTimer;

#[async_trait(?Send)]
impl Timer for GlooTimer {
    async fn sleep(&self, duration: Duration) {
        TimeoutFuture::new(duration.as_millis().min(u32::MAX as u128) as u32).await;
    }
}

pub struct BrowserPlatform;

impl Platform for BrowserPlatform {
    fn is_touch_device(&self) -> bool {
        let window = gloo::utils::window();
        Reflect::has(&window, &"ontouchstart".into()).unwrap_or(false) || window.navigator().max_touch_points() > 0
    }

    fn alert(&self, message: &str) {
        let _ = gloo::utils::window().alert_with_message(message);
    }
}

/// Browser implementations of every capture collaborator
pub fn browser_capture_deps() -> CaptureDeps<DomTarget> {
    CaptureDeps {
        fetcher: Rc::new(RelayFetcher),
        rasterizer: Rc::new(HtmlToImageRasterizer),
        share: Rc::new(NavigatorShare),
        saver: Rc::new(AnchorDownloadSaver),
        timer: Rc::new(GlooTimer),
        platform: Rc::new(BrowserPlatform),
    }
}
