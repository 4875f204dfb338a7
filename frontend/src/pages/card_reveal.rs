use yew::prelude::*;

use crate::components::loading::LoadingScreen;
use crate::hooks::use_card::{use_card, use_home_on_error};
use crate::router::{use_navigator, Route};

const TYPE_START_SECS: f64 = 2.2;
const TYPE_STEP_SECS: f64 = 0.05;

fn message_size_class(len: usize) -> &'static str {
    match len {
        0..=120 => "message-lg",
        121..=200 => "message-md",
        _ => "message-sm",
    }
}

#[derive(Properties, PartialEq)]
struct HandwritingProps {
    text: AttrValue,
}

/// Types the message out one character at a time
#[function_component(HandwritingMessage)]
fn handwriting_message(props: &HandwritingProps) -> Html {
    let size = message_size_class(props.text.chars().count());
    html! {
        <div class={classes!("handwriting", size)}>
            { for props.text.chars().enumerate().map(|(index, c)| {
                let delay = TYPE_START_SECS + index as f64 * TYPE_STEP_SECS;
                html! { <span class="type-char" style={format!("animation-delay: {:.2}s", delay)}>{ c }</span> }
            }) }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct CardRevealProps {
    pub card_id: String,
}

#[function_component(CardReveal)]
pub fn card_reveal(props: &CardRevealProps) -> Html {
    let navigator = use_navigator();
    let state = use_card(&props.card_id);
    let is_open = use_state(|| false);
    use_home_on_error(&state);

    let Some(card) = state.card.clone() else {
        return html! { <LoadingScreen message="รอแป๊บนึงน้าาาาาาา... 💖" /> };
    };

    let open = {
        let is_open = is_open.clone();
        Callback::from(move |_: MouseEvent| {
            if !*is_open {
                is_open.set(true);
            }
        })
    };
    let to_gifts = {
        let card_id = props.card_id.clone();
        Callback::from(move |_: MouseEvent| navigator.push(Route::GiftSelection(card_id.clone())))
    };

    html! {
        <div class="page page-center card-reveal">
            <div class={classes!("flip-card", is_open.then_some("open"))} onclick={open}>
                <div class="flip-face flip-back">
                    <div class="envelope-icon pulse">{"💌"}</div>
                    <p class="muted">{"เปิดเลยละกัน..."}</p>
                </div>
                <div class="flip-face flip-front polaroid">
                    <div class="polaroid-photo">
                        <img src={card.sender_image.clone()} alt="Valentine" />
                        <div class="flash"></div>
                    </div>
                    <div class="polaroid-caption">
                        if *is_open {
                            <HandwritingMessage text={card.message.clone()} />
                        }
                    </div>
                </div>
            </div>
            if *is_open {
                <button class="btn btn-primary fab delayed-in" onclick={to_gifts}>
                    <span class="wiggle">{"🎁"}</span>
                    <span>{"เลือกดูนะ ว่าเธออยากได้อะไร"}</span>
                </button>
                <div class="floating-hearts" aria-hidden="true">
                    { for (0..12).map(|i| html! {
                        <span class="float-heart" style={format!("left: {}%; animation-delay: {}s", (i * 37) % 100, i as f64 * 1.5)}>{"💖"}</span>
                    }) }
                </div>
            }
        </div>
    }
}
