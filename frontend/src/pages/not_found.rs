use yew::prelude::*;

use crate::router::{use_navigator, Route};

#[function_component(NotFound)]
pub fn not_found() -> Html {
    let navigator = use_navigator();
    let go_home = Callback::from(move |_: MouseEvent| navigator.push(Route::Home));

    html! {
        <div class="page page-center">
            <div class="panel">
                <div class="heart-badge">{"💔"}</div>
                <h2>{"ไม่พบหน้านี้"}</h2>
                <p class="muted">{"โอ้ย! หน้านี้ไม่มีอยู่จริง 💔"}</p>
                <button class="btn btn-primary" onclick={go_home}>{"กลับหน้าหลัก"}</button>
            </div>
        </div>
    }
}
