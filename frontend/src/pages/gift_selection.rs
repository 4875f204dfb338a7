use gloo::timers::callback::Timeout;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::components::loading::LoadingScreen;
use crate::components::toast::use_toaster;
use crate::hooks::use_card::{use_card, use_home_on_error};
use crate::router::{use_navigator, Route};
use crate::services::api::ApiClient;
use crate::services::logging::Logger;

const CONFETTI: [&str; 12] = ["💖", "💝", "💕", "💗", "✨", "🌸", "🌷", "🎀", "🤍", "🎁", "💌", "🍫"];
const SUMMARY_DELAY_MS: u32 = 2_000;

#[derive(Properties, PartialEq)]
pub struct GiftSelectionProps {
    pub card_id: String,
}

#[function_component(GiftSelection)]
pub fn gift_selection(props: &GiftSelectionProps) -> Html {
    let navigator = use_navigator();
    let toaster = use_toaster();
    let state = use_card(&props.card_id);
    let selected = use_state(|| Option::<String>::None);
    let saving = use_state(|| false);
    let celebrating = use_state(|| false);
    let redirect = use_mut_ref(|| Option::<Timeout>::None);
    use_home_on_error(&state);

    let Some(card) = state.card.clone() else {
        return html! { <LoadingScreen message="รอแป๊บนึงน้าาา..." /> };
    };

    let on_confirm = {
        let selected = selected.clone();
        let saving = saving.clone();
        let celebrating = celebrating.clone();
        let card_id = props.card_id.clone();
        Callback::from(move |_: MouseEvent| {
            let Some(gift_id) = (*selected).clone() else {
                return;
            };
            let saving = saving.clone();
            let celebrating = celebrating.clone();
            let navigator = navigator.clone();
            let toaster = toaster.clone();
            let redirect = redirect.clone();
            let card_id = card_id.clone();
            saving.set(true);
            spawn_local(async move {
                match ApiClient::new().update_choice(&card_id, &gift_id).await {
                    Ok(_) => {
                        Logger::info_with_component("gift-selection", &format!("Card {} chose {}", card_id, gift_id));
                        celebrating.set(true);
                        *redirect.borrow_mut() = Some(Timeout::new(SUMMARY_DELAY_MS, move || {
                            navigator.push(Route::CardSummary(card_id));
                        }));
                    }
                    Err(e) => {
                        Logger::error_with_component("gift-selection", &format!("Failed to save choice: {}", e));
                        toaster.error("บันทึกตัวเลือกไม่สำเร็จ ลองใหม่อีกครั้งนะ");
                        saving.set(false);
                    }
                }
            });
        })
    };

    html! {
        <div class="page gift-selection">
            <div class="page-heading">
                <div class="gift-icon wiggle">{"🎁"}</div>
                <h1 class="title">{"เลือกอันที่เธอชอบหน่อยนะ"}</h1>
                <p class="subtitle">{"เราอยากรู้จังว่าเธอจะชอบอันไหนมากที่สุด?"}</p>
            </div>

            <div class="gift-grid">
                { for card.gifts.iter().enumerate().map(|(index, gift)| {
                    let is_selected = selected.as_deref() == Some(gift.id.as_str());
                    let dimmed = selected.is_some() && !is_selected;
                    let on_pick = {
                        let selected = selected.clone();
                        let gift_id = gift.id.clone();
                        Callback::from(move |_: MouseEvent| selected.set(Some(gift_id.clone())))
                    };
                    html! {
                        <div
                            key={gift.id.clone()}
                            class={classes!(
                                "gift-card",
                                if index % 2 == 0 { "tilt-left" } else { "tilt-right" },
                                is_selected.then_some("selected"),
                                dimmed.then_some("dimmed"),
                            )}
                            onclick={on_pick}
                        >
                            <div class="gift-photo">
                                <img src={gift.image.clone()} alt={gift.name.clone()} />
                                if is_selected {
                                    <div class="check-badge">{"✓"}</div>
                                }
                            </div>
                            <h3 class="gift-name">{ gift.name.clone() }</h3>
                            <div class="tape"></div>
                        </div>
                    }
                }) }
            </div>

            <button
                class="btn btn-primary btn-large"
                disabled={selected.is_none() || *saving}
                onclick={on_confirm}
            >
                { if *saving { "รอแป๊บนึงน้าาา..." } else { "💝 ตกลงเอาอันนี้นะ" } }
            </button>

            if *celebrating {
                <div class="confetti-layer" aria-hidden="true">
                    { for (0..40usize).map(|i| {
                        let dx = ((i * 53) % 100) as i32 - 50;
                        let dy = ((i * 29) % 100) as i32 - 50;
                        html! {
                            <span
                                class="confetti"
                                style={format!("--dx: {}vw; --dy: {}vh; animation-delay: {}ms", dx * 3 / 2, dy * 3 / 2, (i % 8) * 40)}
                            >
                                { CONFETTI[i % CONFETTI.len()] }
                            </span>
                        }
                    }) }
                    <div class="celebration-message">{"ว่าแล้ว เธอต้องเลือกอันนี้แน่ ๆ! 🥰"}</div>
                </div>
            }
        </div>
    }
}
