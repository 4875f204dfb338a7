use shared::Card;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::router::{use_navigator, Route};
use crate::services::api::ApiClient;
use crate::services::logging::Logger;

#[derive(Clone, PartialEq)]
pub struct CardState {
    pub card: Option<Card>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Load a card once per `card_id`
#[hook]
pub fn use_card(card_id: &str) -> CardState {
    let card = use_state(|| Option::<Card>::None);
    let loading = use_state(|| true);
    let error = use_state(|| Option::<String>::None);

    use_effect_with(card_id.to_string(), {
        let card = card.clone();
        let loading = loading.clone();
        let error = error.clone();

        move |card_id: &String| {
            let card_id = card_id.clone();
            loading.set(true);
            spawn_local(async move {
                match ApiClient::new().get_card(&card_id).await {
                    Ok(data) => {
                        card.set(Some(data));
                        error.set(None);
                    }
                    Err(e) => {
                        Logger::warn_with_component("use-card", &format!("Failed to load card {}: {}", card_id, e));
                        error.set(Some(e));
                    }
                }
                loading.set(false);
            });
            || ()
        }
    });

    CardState {
        card: (*card).clone(),
        loading: *loading,
        error: (*error).clone(),
    }
}

/// Send the visitor home when the card fails to load
#[hook]
pub fn use_home_on_error(state: &CardState) {
    let navigator = use_navigator();
    use_effect_with(state.error.is_some(), move |failed| {
        if *failed {
            navigator.push(Route::Home);
        }
        || ()
    });
}
