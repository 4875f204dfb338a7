use yew::prelude::*;

mod components;
mod hooks;
mod pages;
mod router;
mod services;

use components::toast::ToastProvider;
use pages::{CardLanding, CardReveal, CardSummary, CreateCard, GiftSelection, Home, NotFound};
use router::{use_history_sync, Navigator, Route};
use services::logging::Logger;

fn switch(route: &Route) -> Html {
    match route.clone() {
        Route::Home => html! { <Home /> },
        Route::Create => html! { <CreateCard /> },
        Route::CardLanding(card_id) => html! { <CardLanding {card_id} /> },
        Route::CardReveal(card_id) => html! { <CardReveal {card_id} /> },
        Route::GiftSelection(card_id) => html! { <GiftSelection {card_id} /> },
        Route::CardSummary(card_id) => html! { <CardSummary {card_id} /> },
        Route::NotFound => html! { <NotFound /> },
    }
}

#[function_component(App)]
fn app() -> Html {
    let route = use_state(Route::current);
    use_history_sync(route.clone());

    let navigator = {
        let route = route.clone();
        Navigator::new(Callback::from(move |next: Route| route.set(next)))
    };

    use_effect_with((*route).clone(), |route| {
        Logger::debug_with_component("router", &format!("Showing {}", route.to_path()));
        || ()
    });

    html! {
        <ContextProvider<Navigator> context={navigator}>
            <ToastProvider>
                <main class="app">
                    { switch(&route) }
                </main>
            </ToastProvider>
        </ContextProvider<Navigator>>
    }
}

fn main() {
    yew::Renderer::<App>::new().render();
}
