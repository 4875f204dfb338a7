use yew::prelude::*;

use crate::router::{Link, Route};

#[function_component(Home)]
pub fn home() -> Html {
    html! {
        <div class="page page-center home">
            <div class="heart-badge">{"💝"}</div>
            <h1 class="title">{"Valentine Card"}</h1>
            <p class="subtitle">
                {"สร้างการ์ดวาเลนไทน์สุดพิเศษ"}<br />
                {"พร้อมรูปและของขวัญสุดเซอร์ไพรส์ 💖"}
            </p>
            <Link to={Route::Create} class={classes!("btn", "btn-primary", "btn-large")}>
                {"สร้างการ์ดของคุณ ✨"}
            </Link>
        </div>
    }
}
