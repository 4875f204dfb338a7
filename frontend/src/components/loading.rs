use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct LoadingScreenProps {
    pub message: AttrValue,
}

#[function_component(LoadingScreen)]
pub fn loading_screen(props: &LoadingScreenProps) -> Html {
    html! {
        <div class="page page-center">
            <div class="spinner" aria-hidden="true"></div>
            <p class="muted">{ props.message.clone() }</p>
        </div>
    }
}
