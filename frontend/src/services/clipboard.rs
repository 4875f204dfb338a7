use js_sys::{Function, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlDocument, HtmlTextAreaElement};

/// Copy `text`, trying the async clipboard API first and a hidden textarea
/// with `execCommand("copy")` second. Returns whether either worked.
pub async fn copy_to_clipboard(text: &str) -> bool {
    if let Some(promise) = clipboard_write_text(text) {
        if JsFuture::from(promise).await.is_ok() {
            return true;
        }
    }
    fallback_copy(text)
}

fn clipboard_write_text(text: &str) -> Option<Promise> {
    let navigator = gloo::utils::window().navigator();
    let clipboard = Reflect::get(&navigator, &JsValue::from_str("clipboard")).ok()?;
    if clipboard.is_undefined() || clipboard.is_null() {
        return None;
    }
    let write_text: Function = Reflect::get(&clipboard, &JsValue::from_str("writeText")).ok()?.dyn_into().ok()?;
    write_text.call1(&clipboard, &JsValue::from_str(text)).ok()?.dyn_into().ok()
}

fn fallback_copy(text: &str) -> bool {
    let document = gloo::utils::document();
    let Some(body) = document.body() else {
        return false;
    };
    let Ok(text_area) = document.create_element("textarea").map(|el| el.unchecked_into::<HtmlTextAreaElement>()) else {
        return false;
    };

    text_area.set_value(text);
    let _ = text_area.set_attribute(
        "style",
        "position:fixed;top:0;left:0;width:2em;height:2em;padding:0;border:none;outline:none;box-shadow:none;background:transparent;opacity:0",
    );
    if body.append_child(&text_area).is_err() {
        return false;
    }
    let _ = text_area.focus();
    text_area.select();

    let copied = document
        .dyn_ref::<HtmlDocument>()
        .map(|doc| doc.exec_command("copy").unwrap_or(false))
        .unwrap_or(false);
    let _ = body.remove_child(&text_area);
    copied
}
