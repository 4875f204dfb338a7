//! The "Forever Memory" page: both polaroids, the message, and the export
//! and share buttons.

use capture::{CaptureConfig, CaptureOrchestrator, CaptureOutcome, Delivery};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, HtmlElement};
use yew::prelude::*;

use crate::components::loading::LoadingScreen;
use crate::components::toast::{use_toaster, Toaster};
use crate::hooks::use_card::{use_card, use_home_on_error};
use crate::router::{absolute_url, use_navigator, Route};
use crate::services::clipboard::copy_to_clipboard;
use crate::services::dom_capture::{browser_capture_deps, share_link, DomTarget};
use crate::services::logging::Logger;

/// Toast text for a finished export; a closed share sheet gets none
fn delivery_message(delivery: &Delivery) -> Option<&'static str> {
    match delivery {
        Delivery::Shared => Some("แชร์ความทรงจำเรียบร้อยแล้ว! ✨"),
        Delivery::Downloaded { .. } => Some("บันทึกความทรงจำไว้ในเครื่องแล้ว! 💖"),
        Delivery::ShareCancelled => None,
    }
}

async fn copy_link(url: &str, toaster: &Toaster) {
    if copy_to_clipboard(url).await {
        toaster.success("คัดลอกลิงก์แล้ว! แชร์ให้แฟนวาเลนไทน์ของคุณเลยนะ 💖");
    } else {
        toaster.error("คัดลอกลิงก์ไม่ได้ กรุณาคัดลอก URL ด้วยตัวเองนะ");
    }
}

#[derive(Properties, PartialEq)]
pub struct CardSummaryProps {
    pub card_id: String,
}

#[function_component(CardSummary)]
pub fn card_summary(props: &CardSummaryProps) -> Html {
    let navigator = use_navigator();
    let toaster = use_toaster();
    let state = use_card(&props.card_id);
    let generating = use_state(|| false);
    let card_ref = use_node_ref();
    let texture_ref = use_node_ref();
    let orchestrator = use_memo((), |_| CaptureOrchestrator::<DomTarget>::new(CaptureConfig::default(), browser_capture_deps()));
    use_home_on_error(&state);

    {
        let navigator = navigator.clone();
        let card_id = props.card_id.clone();
        use_effect_with(state.card.clone(), move |card| {
            if let Some(card) = card {
                if card.chosen_gift().is_none() {
                    navigator.push(Route::GiftSelection(card_id));
                }
            }
            || ()
        });
    }

    let Some(card) = state.card.clone() else {
        return html! { <LoadingScreen message="กำลังโหลดความทรงจำ..." /> };
    };
    let Some(gift) = card.chosen_gift().cloned() else {
        return html! { <LoadingScreen message="กำลังโหลดความทรงจำ..." /> };
    };

    let on_save = {
        let generating = generating.clone();
        let toaster = toaster.clone();
        let card_ref = card_ref.clone();
        let texture_ref = texture_ref.clone();
        let orchestrator = orchestrator.clone();
        let card_id = props.card_id.clone();
        Callback::from(move |_: MouseEvent| {
            if orchestrator.is_in_progress() {
                return;
            }
            let Some(root) = card_ref.cast::<Element>() else {
                return;
            };
            let target = DomTarget::new(root, texture_ref.cast::<HtmlElement>());
            let generating = generating.clone();
            let toaster = toaster.clone();
            let orchestrator = orchestrator.clone();
            let card_id = card_id.clone();

            generating.set(true);
            let toast_id = toaster.loading("กำลังบันทึกความทรงจำของคุณ... 📸");
            spawn_local(async move {
                match orchestrator.capture(&target, &card_id).await {
                    Ok(CaptureOutcome::Delivered(delivery)) => match delivery_message(&delivery) {
                        Some(message) => toaster.resolve_success(toast_id, message),
                        None => toaster.dismiss(toast_id),
                    },
                    Ok(CaptureOutcome::AlreadyRunning) => toaster.dismiss(toast_id),
                    Err(e) => {
                        Logger::error_with_component("card-summary", &format!("Error saving image: {}", e));
                        toaster.resolve_error(toast_id, "บันทึกรูปไม่สำเร็จ ลองใหม่อีกครั้งนะ");
                    }
                }
                generating.set(false);
            });
        })
    };

    let on_share = {
        let toaster = toaster.clone();
        let url = absolute_url(&Route::CardSummary(props.card_id.clone()));
        let CaptureConfig { share_title, share_text, .. } = CaptureConfig::default();
        Callback::from(move |_: MouseEvent| {
            let toaster = toaster.clone();
            let url = url.clone();
            let (title, text) = (share_title.clone(), share_text.clone());
            spawn_local(async move {
                match share_link(&title, &text, &url).await {
                    Ok(()) => toaster.success("แชร์สำเร็จแล้ว! ✨"),
                    Err(e) => {
                        Logger::info_with_component("card-summary", &format!("Sharing failed, falling back to clipboard: {}", e));
                        copy_link(&url, &toaster).await;
                    }
                }
            });
        })
    };

    let go_home = Callback::from(move |_: MouseEvent| navigator.push(Route::Home));

    html! {
        <div class="page card-summary">
            <div class="memory-card" ref={card_ref}>
                <div class="memory-texture" ref={texture_ref}></div>
                <div class="memory-header">
                    <div class="heart-badge pulse">{"💖"}</div>
                    <h1 class="memory-title">{"Forever Memory"}</h1>
                    <p class="muted">{"วันวาเลนไทน์ 2026 ❤️"}</p>
                </div>

                <div class="memory-polaroids">
                    <div class="polaroid tilt-left">
                        <div class="polaroid-photo">
                            <img src={card.sender_image.clone()} alt="Valentine" crossorigin="anonymous" />
                        </div>
                        <p class="polaroid-label">{"From me 💌"}</p>
                        <div class="tape"></div>
                    </div>
                    <div class="polaroid tilt-right">
                        <div class="polaroid-photo">
                            <img src={gift.image.clone()} alt={gift.name.clone()} crossorigin="anonymous" />
                        </div>
                        <p class="polaroid-label">{ gift.name.clone() }</p>
                        <div class="tape"></div>
                    </div>
                </div>

                <div class="memory-message">
                    <div class="handwriting">{ format!("\"{}\"", card.message) }</div>
                </div>
                <div class="memory-footer">{"💕"}</div>
            </div>

            <div class="button-row">
                <button class="btn btn-primary" disabled={*generating} onclick={on_save}>
                    { if *generating { "กำลังบันทึก..." } else { "บันทึกความทรงจำนี้" } }
                </button>
                <button class="btn btn-outline" onclick={on_share}>{"แชร์ความทรงจำ"}</button>
            </div>
            <button class="btn btn-link fade-in" onclick={go_home}>{"กลับหน้าหลัก"}</button>
        </div>
    }
}
