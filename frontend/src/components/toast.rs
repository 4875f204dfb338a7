//! Toast notifications shared by every page.

use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

use gloo::timers::callback::Timeout;
use yew::prelude::*;

const TOAST_DURATION_MS: u32 = 3000;

static NEXT_TOAST_ID: AtomicU32 = AtomicU32::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u32,
    pub kind: ToastKind,
    pub text: String,
}

pub enum ToastAction {
    /// Add a toast, or replace the one with the same id
    Show(Toast),
    Dismiss(u32),
}

#[derive(Debug, Default, PartialEq)]
pub struct ToastList {
    pub toasts: Vec<Toast>,
}

impl Reducible for ToastList {
    type Action = ToastAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut toasts = self.toasts.clone();
        match action {
            ToastAction::Show(toast) => match toasts.iter_mut().find(|t| t.id == toast.id) {
                Some(existing) => *existing = toast,
                None => toasts.push(toast),
            },
            ToastAction::Dismiss(id) => toasts.retain(|t| t.id != id),
        }
        Rc::new(ToastList { toasts })
    }
}

/// Handle for raising toasts from any component
#[derive(Clone, PartialEq)]
pub struct Toaster {
    dispatch: Option<UseReducerDispatcher<ToastList>>,
}

impl Toaster {
    /// Spinner toast that stays until replaced by `success`/`error` with its id
    pub fn loading(&self, text: &str) -> u32 {
        self.show(None, ToastKind::Loading, text)
    }

    pub fn success(&self, text: &str) {
        self.show(None, ToastKind::Success, text);
    }

    pub fn error(&self, text: &str) {
        self.show(None, ToastKind::Error, text);
    }

    pub fn resolve_success(&self, id: u32, text: &str) {
        self.show(Some(id), ToastKind::Success, text);
    }

    pub fn resolve_error(&self, id: u32, text: &str) {
        self.show(Some(id), ToastKind::Error, text);
    }

    pub fn dismiss(&self, id: u32) {
        if let Some(dispatch) = &self.dispatch {
            dispatch.dispatch(ToastAction::Dismiss(id));
        }
    }

    fn show(&self, id: Option<u32>, kind: ToastKind, text: &str) -> u32 {
        let id = id.unwrap_or_else(|| NEXT_TOAST_ID.fetch_add(1, Ordering::Relaxed));
        let Some(dispatch) = self.dispatch.clone() else {
            gloo::console::log!(text.to_string());
            return id;
        };

        dispatch.dispatch(ToastAction::Show(Toast { id, kind, text: text.to_string() }));
        if kind != ToastKind::Loading {
            Timeout::new(TOAST_DURATION_MS, move || dispatch.dispatch(ToastAction::Dismiss(id))).forget();
        }
        id
    }
}

#[hook]
pub fn use_toaster() -> Toaster {
    use_context::<Toaster>().unwrap_or(Toaster { dispatch: None })
}

#[derive(Properties, PartialEq)]
pub struct ToastProviderProps {
    #[prop_or_default]
    pub children: Html,
}

#[function_component(ToastProvider)]
pub fn toast_provider(props: &ToastProviderProps) -> Html {
    let list = use_reducer(ToastList::default);
    let toaster = Toaster { dispatch: Some(list.dispatcher()) };

    html! {
        <ContextProvider<Toaster> context={toaster}>
            { props.children.clone() }
            <div class="toast-stack">
                { for list.toasts.iter().map(|toast| {
                    let class = match toast.kind {
                        ToastKind::Loading => "toast toast-loading",
                        ToastKind::Success => "toast toast-success",
                        ToastKind::Error => "toast toast-error",
                    };
                    html! { <div key={toast.id} {class}>{ toast.text.clone() }</div> }
                }) }
            </div>
        </ContextProvider<Toaster>>
    }
}
