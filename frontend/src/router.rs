//! Client-side routes and history navigation.

use gloo::events::EventListener;
use wasm_bindgen::JsValue;
use yew::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Create,
    CardLanding(String),
    CardReveal(String),
    GiftSelection(String),
    CardSummary(String),
    NotFound,
}

impl Route {
    /// Match a location path (query and fragment are ignored)
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["create"] => Route::Create,
            ["card", id, rest @ ..] if is_card_id(id) => {
                let id = id.to_string();
                match rest {
                    [] => Route::CardLanding(id),
                    ["reveal"] => Route::CardReveal(id),
                    ["gift"] => Route::GiftSelection(id),
                    ["summary"] => Route::CardSummary(id),
                    _ => Route::NotFound,
                }
            }
            _ => Route::NotFound,
        }
    }

    pub fn to_path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Create => "/create".to_string(),
            Route::CardLanding(id) => format!("/card/{}", id),
            Route::CardReveal(id) => format!("/card/{}/reveal", id),
            Route::GiftSelection(id) => format!("/card/{}/gift", id),
            Route::CardSummary(id) => format!("/card/{}/summary", id),
            Route::NotFound => "/404".to_string(),
        }
    }

    /// Route for the page the browser is currently showing
    pub fn current() -> Self {
        let path = gloo::utils::window().location().pathname().unwrap_or_default();
        Self::parse(&path)
    }
}

fn is_card_id(id: &str) -> bool {
    id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Absolute link to a route on this site, for sharing
pub fn absolute_url(route: &Route) -> String {
    let origin = gloo::utils::window().location().origin().unwrap_or_default();
    format!("{}{}", origin, route.to_path())
}

/// Handle for changing pages, provided by the app root
#[derive(Clone, PartialEq)]
pub struct Navigator {
    on_change: Option<Callback<Route>>,
}

impl Navigator {
    pub fn new(on_change: Callback<Route>) -> Self {
        Self { on_change: Some(on_change) }
    }

    pub fn push(&self, route: Route) {
        let path = route.to_path();
        match &self.on_change {
            Some(on_change) => {
                if let Ok(history) = gloo::utils::window().history() {
                    let _ = history.push_state_with_url(&JsValue::NULL, "", Some(&path));
                }
                gloo::utils::window().scroll_to_with_x_and_y(0.0, 0.0);
                on_change.emit(route);
            }
            // Outside the app root: fall back to a full page load
            None => {
                let _ = gloo::utils::window().location().set_href(&path);
            }
        }
    }
}

#[hook]
pub fn use_navigator() -> Navigator {
    use_context::<Navigator>().unwrap_or(Navigator { on_change: None })
}

/// Keep `route` in sync with back/forward buttons
#[hook]
pub fn use_history_sync(route: UseStateHandle<Route>) {
    use_effect_with((), move |_| {
        let listener = EventListener::new(&gloo::utils::window(), "popstate", move |_| {
            route.set(Route::current());
        });
        move || drop(listener)
    });
}

#[derive(Properties, PartialEq)]
pub struct LinkProps {
    pub to: Route,
    #[prop_or_default]
    pub class: Classes,
    #[prop_or_default]
    pub children: Html,
}

/// In-app anchor that navigates without a page load
#[function_component(Link)]
pub fn link(props: &LinkProps) -> Html {
    let navigator = use_navigator();
    let onclick = {
        let to = props.to.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            navigator.push(to.clone());
        })
    };

    html! {
        <a href={props.to.to_path()} class={props.class.clone()} {onclick}>
            { props.children.clone() }
        </a>
    }
}
