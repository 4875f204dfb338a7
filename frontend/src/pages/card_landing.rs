use gloo::timers::callback::Timeout;
use web_sys::{HtmlElement, HtmlImageElement};
use yew::prelude::*;

use crate::components::loading::LoadingScreen;
use crate::hooks::use_card::use_card;
use crate::router::{use_navigator, Route};
use crate::services::logging::Logger;

const MAX_ESCAPES: u32 = 10;
const EDGE_PADDING: f64 = 12.0;

const TOOLTIP_MESSAGES: [&str; 15] = [
    "เอ๊ะ! กดไม่ได้นะ 😜",
    "อย่าปฏิเสธเลย~ 🥺",
    "ลองอีกที ก็ยังไม่ได้ 😏",
    "ยืนยันเลยว่าเปิดนะ! 💕",
    "กดเปิดซะดีกว่า 💖",
    "ปุ่มนี้มีไว้ประดับเฉยๆ นะ 😂",
    "กดปุ่มชมพูเถอะ เชื่อเรา...",
    "หนีเร็วกว่าที่คิดใช่ไหมล่าาา",
    "ยอมแพ้แล้วกด Open Card เถอะ 🙏",
    "รักนะถึงได้แกล้ง 💖",
    "ลองใหม่อีก 100 รอบก็ไม่ได้กดหรอก!",
    "มือไวไม่เท่าใจรักหรอกนะ 🥰",
    "ไม่ได้กดแน่ๆ ล้านเปอร์เซ็นต์ ✨",
    "อย่าเพิ่งท้อสิ พยายามเข้า! ✌️",
    "ทางโน้นนนน ไปทางโน้นแล้ววว 🏃‍♂️",
];

/// Button geometry without its current translation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Pick a translation that keeps the button fully inside the viewport.
/// `rx` and `ry` are uniform samples in `[0, 1)`.
pub fn dodge_offset(button: ButtonBox, viewport: (f64, f64), rx: f64, ry: f64) -> (i32, i32) {
    let (vw, vh) = viewport;
    let min_x = -button.left + EDGE_PADDING;
    let max_x = vw - button.left - button.width - EDGE_PADDING;
    let min_y = -button.top + EDGE_PADDING;
    let max_y = vh - button.top - button.height - EDGE_PADDING;

    let x = min_x + rx * (max_x - min_x).max(0.0);
    let y = min_y + ry * (max_y - min_y).max(0.0);
    (x.round() as i32, y.round() as i32)
}

/// Tooltip shown after the `escapes`-th run-away; the last message repeats
pub fn tooltip_for(escapes: u32) -> &'static str {
    let index = (escapes.max(1) as usize - 1).min(TOOLTIP_MESSAGES.len() - 1);
    TOOLTIP_MESSAGES[index]
}

/// Warm the browser cache so later pages render without flicker
fn prefetch_images<'a>(urls: impl IntoIterator<Item = &'a str>) {
    for url in urls.into_iter().filter(|u| !u.is_empty()) {
        if let Ok(img) = HtmlImageElement::new() {
            img.set_src(url);
        }
    }
}

fn viewport() -> (f64, f64) {
    let window = gloo::utils::window();
    let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(375.0);
    let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(667.0);
    (width, height)
}

#[derive(Properties, PartialEq)]
pub struct CardLandingProps {
    pub card_id: String,
}

#[function_component(CardLanding)]
pub fn card_landing(props: &CardLandingProps) -> Html {
    let navigator = use_navigator();
    let state = use_card(&props.card_id);
    let position = use_state(|| (0i32, 0i32));
    let escapes = use_state(|| 0u32);
    let show_tooltip = use_state(|| false);
    let tooltip_timer = use_mut_ref(|| Option::<Timeout>::None);
    let no_thanks_ref = use_node_ref();

    use_effect_with(state.card.clone(), |card| {
        if let Some(card) = card {
            prefetch_images(card.image_refs());
        }
        || ()
    });

    if state.loading {
        return html! { <LoadingScreen message="กำลังโหลดการ์ดของคุณ..." /> };
    }

    if state.card.is_none() {
        let go_home = Callback::from(move |_: MouseEvent| navigator.push(Route::Home));
        return html! {
            <div class="page page-center">
                <div class="panel">
                    <div class="heart-badge muted">{"🤍"}</div>
                    <h2>{"ไม่พบการ์ด"}</h2>
                    <p class="muted">{"การ์ดนี้ไม่มีอยู่จริงหรือหมดอายุแล้ว"}</p>
                    <button class="btn btn-primary" onclick={go_home}>{"กลับหน้าหลัก"}</button>
                </div>
            </div>
        };
    }

    let open_card = {
        let navigator = navigator.clone();
        let card_id = props.card_id.clone();
        Callback::from(move |_: MouseEvent| navigator.push(Route::CardReveal(card_id.clone())))
    };

    let dodge = {
        let position = position.clone();
        let escapes = escapes.clone();
        let show_tooltip = show_tooltip.clone();
        let tooltip_timer = tooltip_timer.clone();
        let no_thanks_ref = no_thanks_ref.clone();
        Callback::from(move |_: ()| {
            let (vw, vh) = viewport();
            let (dx, dy) = *position;
            let button = match no_thanks_ref.cast::<HtmlElement>() {
                Some(el) => {
                    let rect = el.get_bounding_client_rect();
                    ButtonBox {
                        left: rect.left() - dx as f64,
                        top: rect.top() - dy as f64,
                        width: rect.width(),
                        height: rect.height(),
                    }
                }
                None => ButtonBox { left: vw / 2.0 - 150.0, top: vh / 2.0 - 50.0, width: 200.0, height: 56.0 },
            };
            position.set(dodge_offset(button, (vw, vh), js_sys::Math::random(), js_sys::Math::random()));

            let next = *escapes + 1;
            Logger::debug_with_component("no-thanks-button", &format!("Run-aways: {}", next));
            escapes.set(next);
            show_tooltip.set(true);

            let show_tooltip = show_tooltip.clone();
            *tooltip_timer.borrow_mut() = Some(Timeout::new(1_500, move || show_tooltip.set(false)));
        })
    };
    let on_mouse_enter = dodge.reform(|_: MouseEvent| ());
    let on_touch_start = dodge.reform(|e: TouchEvent| e.prevent_default());

    let (dx, dy) = *position;

    html! {
        <div class="page page-center card-landing">
            <div class="envelope-icon bounce">{"💌"}</div>
            <h1 class="title">{"คุณได้รับการ์ดวาเลนไทน์แล้ว 💌"}</h1>
            <p class="subtitle">{"มีคนพิเศษส่งของหวานๆ มาให้คุณ..."}</p>
            <div class="button-stack">
                <button id="open-card-button" class="btn btn-primary btn-block" onclick={open_card}>
                    {"เปิดการ์ด 💖"}
                </button>
                if *escapes < MAX_ESCAPES {
                    <div class="no-thanks-wrap">
                        <button
                            id="no-thanks-button"
                            ref={no_thanks_ref}
                            class="btn btn-outline btn-block no-thanks"
                            style={format!("transform: translate({}px, {}px)", dx, dy)}
                            aria-label="No thanks button - try to click it!"
                            onmouseenter={on_mouse_enter}
                            ontouchstart={on_touch_start}
                        >
                            {"เปิดการ์ด 💖 xxxx"}
                        </button>
                        if *show_tooltip {
                            <div class="dodge-tooltip">{ tooltip_for(*escapes) }</div>
                        }
                    </div>
                }
            </div>
        </div>
    }
}
