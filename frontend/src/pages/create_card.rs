//! Two-step card builder: photo and message, then 2 to 8 gifts.

use std::rc::Rc;

use gloo::storage::{SessionStorage, Storage};
use shared::{CardLimits, CreateCardRequest, Gift};
use wasm_bindgen_futures::spawn_local;
use web_sys::{File, HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

use crate::components::toast::{use_toaster, Toaster};
use crate::router::{absolute_url, use_navigator, Route};
use crate::services::api::ApiClient;
use crate::services::clipboard::copy_to_clipboard;
use crate::services::logging::Logger;

const DRAFT_MESSAGE_KEY: &str = "draft_message";
const ACCEPTED_IMAGES: &str = "image/jpeg,image/png,image/heic,image/heif";

#[derive(Debug, Clone, PartialEq)]
pub enum GiftImage {
    Empty,
    Uploading,
    Ready(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GiftDraft {
    pub id: String,
    pub name: String,
    pub image: GiftImage,
    pub preview: Option<String>,
}

impl GiftDraft {
    fn new(id: u32) -> Self {
        Self { id: id.to_string(), name: String::new(), image: GiftImage::Empty, preview: None }
    }
}

/// Everything typed or uploaded so far. Upload results arrive as actions,
/// so text edited while an upload is running is never overwritten.
#[derive(Debug, Clone, PartialEq)]
pub struct CardDraft {
    pub message: String,
    pub sender_image: Option<String>,
    pub sender_preview: Option<String>,
    pub uploading_sender: bool,
    pub gifts: Vec<GiftDraft>,
    next_gift_id: u32,
    limits: CardLimits,
}

impl Default for CardDraft {
    fn default() -> Self {
        Self::with_message(String::new())
    }
}

pub enum DraftAction {
    SetMessage(String),
    SenderUploadStarted,
    SenderPreview(String),
    SenderUploaded(String),
    SenderUploadFailed,
    AddGift,
    RemoveGift(String),
    SetGiftName(String, String),
    GiftUploadStarted(String),
    GiftPreview(String, String),
    GiftUploaded(String, String),
    GiftUploadFailed(String),
    Reset,
}

impl CardDraft {
    pub fn with_message(message: String) -> Self {
        let limits = CardLimits::default();
        let gifts = (1..=limits.min_gifts as u32).map(GiftDraft::new).collect();
        Self {
            message,
            sender_image: None,
            sender_preview: None,
            uploading_sender: false,
            gifts,
            next_gift_id: limits.min_gifts as u32 + 1,
            limits,
        }
    }

    pub fn can_proceed_to_gifts(&self) -> bool {
        !self.uploading_sender && self.sender_image.is_some() && !self.message.trim().is_empty()
    }

    pub fn can_finish(&self) -> bool {
        self.gifts
            .iter()
            .all(|g| !g.name.trim().is_empty() && matches!(g.image, GiftImage::Ready(_)))
    }

    pub fn can_add_gift(&self) -> bool {
        self.gifts.len() < self.limits.max_gifts
    }

    pub fn can_remove_gift(&self) -> bool {
        self.gifts.len() > self.limits.min_gifts
    }

    pub fn message_len(&self) -> usize {
        self.message.chars().count()
    }

    pub fn max_message_len(&self) -> usize {
        self.limits.max_message_length
    }

    /// The create request, once every field is filled in
    pub fn to_request(&self) -> Option<CreateCardRequest> {
        if !self.can_proceed_to_gifts() || !self.can_finish() {
            return None;
        }
        let gifts = self
            .gifts
            .iter()
            .map(|g| match &g.image {
                GiftImage::Ready(path) => Some(Gift { id: g.id.clone(), name: g.name.trim().to_string(), image: path.clone() }),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()?;
        Some(CreateCardRequest {
            card_id: None,
            sender_image: self.sender_image.clone()?,
            message: self.message.clone(),
            gifts,
        })
    }

    fn gift_mut(&mut self, gift_id: &str) -> Option<&mut GiftDraft> {
        self.gifts.iter_mut().find(|g| g.id == gift_id)
    }
}

impl Reducible for CardDraft {
    type Action = DraftAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            DraftAction::SetMessage(message) => {
                if message.chars().count() <= next.limits.max_message_length {
                    next.message = message;
                }
            }
            DraftAction::SenderUploadStarted => next.uploading_sender = true,
            DraftAction::SenderPreview(preview) => next.sender_preview = Some(preview),
            DraftAction::SenderUploaded(path) => {
                next.uploading_sender = false;
                next.sender_image = Some(path);
            }
            DraftAction::SenderUploadFailed => next.uploading_sender = false,
            DraftAction::AddGift => {
                if next.can_add_gift() {
                    next.gifts.push(GiftDraft::new(next.next_gift_id));
                    next.next_gift_id += 1;
                }
            }
            DraftAction::RemoveGift(gift_id) => {
                if next.can_remove_gift() {
                    next.gifts.retain(|g| g.id != gift_id);
                }
            }
            DraftAction::SetGiftName(gift_id, name) => {
                let max_gift_name_length = next.limits.max_gift_name_length;
                if let Some(gift) = next.gift_mut(&gift_id) {
                    if name.chars().count() <= max_gift_name_length {
                        gift.name = name;
                    }
                }
            }
            DraftAction::GiftUploadStarted(gift_id) => {
                if let Some(gift) = next.gift_mut(&gift_id) {
                    gift.image = GiftImage::Uploading;
                }
            }
            DraftAction::GiftPreview(gift_id, preview) => {
                if let Some(gift) = next.gift_mut(&gift_id) {
                    gift.preview = Some(preview);
                }
            }
            DraftAction::GiftUploaded(gift_id, path) => {
                if let Some(gift) = next.gift_mut(&gift_id) {
                    gift.image = GiftImage::Ready(path);
                }
            }
            DraftAction::GiftUploadFailed(gift_id) => {
                if let Some(gift) = next.gift_mut(&gift_id) {
                    gift.image = GiftImage::Empty;
                    gift.preview = None;
                }
            }
            DraftAction::Reset => next = CardDraft::default(),
        }
        Rc::new(next)
    }
}

fn selected_file(e: &Event) -> Option<File> {
    let input: HtmlInputElement = e.target_unchecked_into();
    let file = input.files().and_then(|files| files.get(0));
    input.set_value("");
    file
}

/// Rejects oversized files up front; the server enforces the same limit
fn check_size(file: &File, toaster: &Toaster) -> bool {
    if file.size() > CardLimits::default().max_upload_bytes as f64 {
        toaster.error("รูปต้องมีขนาดไม่เกิน 5MB นะ");
        return false;
    }
    true
}

async fn read_preview(file: &File) -> Option<String> {
    gloo::file::futures::read_as_data_url(&gloo::file::File::from(file.clone())).await.ok()
}

#[function_component(CreateCard)]
pub fn create_card() -> Html {
    let toaster = use_toaster();
    let navigator = use_navigator();
    let draft = use_reducer(|| CardDraft::with_message(SessionStorage::get(DRAFT_MESSAGE_KEY).unwrap_or_default()));
    let step = use_state(|| 1u8);
    let creating = use_state(|| false);
    let card_link = use_state(|| Option::<String>::None);

    let on_message = {
        let draft = draft.dispatcher();
        Callback::from(move |e: InputEvent| {
            let area: HtmlTextAreaElement = e.target_unchecked_into();
            let value = area.value();
            let _ = SessionStorage::set(DRAFT_MESSAGE_KEY, &value);
            draft.dispatch(DraftAction::SetMessage(value));
        })
    };

    let on_sender_file = {
        let draft = draft.dispatcher();
        let toaster = toaster.clone();
        Callback::from(move |e: Event| {
            let Some(file) = selected_file(&e) else {
                return;
            };
            if !check_size(&file, &toaster) {
                return;
            }
            let draft = draft.clone();
            let toaster = toaster.clone();
            draft.dispatch(DraftAction::SenderUploadStarted);
            spawn_local(async move {
                if let Some(preview) = read_preview(&file).await {
                    draft.dispatch(DraftAction::SenderPreview(preview));
                }
                match ApiClient::new().upload_image(&file).await {
                    Ok(path) => {
                        draft.dispatch(DraftAction::SenderUploaded(path));
                        toaster.success("อัปโหลดรูปเรียบร้อยแล้ว! 📸");
                    }
                    Err(e) => {
                        Logger::error_with_component("create-card", &format!("Sender upload failed: {}", e));
                        draft.dispatch(DraftAction::SenderUploadFailed);
                        toaster.error("อัปโหลดรูปไม่สำเร็จ ลองใหม่อีกครั้งนะ");
                    }
                }
            });
        })
    };

    let on_gift_file = {
        let draft = draft.dispatcher();
        let toaster = toaster.clone();
        Callback::from(move |(gift_id, e): (String, Event)| {
            let Some(file) = selected_file(&e) else {
                return;
            };
            if !check_size(&file, &toaster) {
                return;
            }
            let draft = draft.clone();
            let toaster = toaster.clone();
            draft.dispatch(DraftAction::GiftUploadStarted(gift_id.clone()));
            spawn_local(async move {
                if let Some(preview) = read_preview(&file).await {
                    draft.dispatch(DraftAction::GiftPreview(gift_id.clone(), preview));
                }
                match ApiClient::new().upload_image(&file).await {
                    Ok(path) => {
                        draft.dispatch(DraftAction::GiftUploaded(gift_id, path));
                        toaster.success("อัปโหลดรูปของขวัญเรียบร้อยแล้ว! 🎁");
                    }
                    Err(e) => {
                        Logger::error_with_component("create-card", &format!("Gift upload failed: {}", e));
                        draft.dispatch(DraftAction::GiftUploadFailed(gift_id));
                        toaster.error("อัปโหลดรูปของขวัญไม่สำเร็จ ลองใหม่อีกครั้งนะ");
                    }
                }
            });
        })
    };

    let on_finish = {
        let draft = draft.clone();
        let creating = creating.clone();
        let card_link = card_link.clone();
        let toaster = toaster.clone();
        Callback::from(move |_: MouseEvent| {
            let Some(request) = draft.to_request() else {
                return;
            };
            let creating = creating.clone();
            let card_link = card_link.clone();
            let toaster = toaster.clone();
            creating.set(true);
            spawn_local(async move {
                match ApiClient::new().create_card(request).await {
                    Ok(response) => {
                        SessionStorage::delete(DRAFT_MESSAGE_KEY);
                        Logger::info_with_component("create-card", &format!("Created card {}", response.card_id));
                        card_link.set(Some(absolute_url(&Route::CardLanding(response.card_id))));
                        toaster.success("สร้างการ์ดเรียบร้อยแล้ว! 🎉");
                    }
                    Err(e) => {
                        Logger::error_with_component("create-card", &format!("Create failed: {}", e));
                        toaster.error("สร้างการ์ดไม่สำเร็จ ลองใหม่อีกครั้งนะ");
                    }
                }
                creating.set(false);
            });
        })
    };

    if let Some(link) = (*card_link).clone() {
        let on_copy = {
            let link = link.clone();
            let toaster = toaster.clone();
            Callback::from(move |_: MouseEvent| {
                let link = link.clone();
                let toaster = toaster.clone();
                spawn_local(async move {
                    if copy_to_clipboard(&link).await {
                        toaster.success("คัดลอกลิงก์แล้ว! 💖");
                    } else {
                        toaster.error("คัดลอกไม่สำเร็จ กรุณาคัดลอกด้วยตัวเองนะ");
                    }
                });
            })
        };
        let on_new = {
            let draft = draft.dispatcher();
            let navigator = navigator.clone();
            Callback::from(move |_: MouseEvent| {
                draft.dispatch(DraftAction::Reset);
                navigator.push(Route::Home);
            })
        };

        return html! {
            <div class="page page-center">
                <div class="panel success-panel">
                    <div class="heart-badge">{"💌"}</div>
                    <h2>{"สร้างการ์ดเสร็จแล้ว! 🎉"}</h2>
                    <p class="muted">{"แชร์ลิงก์นี้ให้คนพิเศษของคุณเลยนะ"}</p>
                    <div class="link-box">{ link }</div>
                    <button class="btn btn-primary" onclick={on_copy}>{"คัดลอกลิงก์ 📋"}</button>
                    <button class="btn btn-ghost" onclick={on_new}>{"สร้างการ์ดใหม่อีกใบ"}</button>
                </div>
            </div>
        };
    }

    let stepper = html! {
        <div class="stepper">
            <div class={classes!("step-dot", (*step >= 1).then_some("active"))}>{"1"}</div>
            <div class={classes!("step-line", (*step >= 2).then_some("active"))}></div>
            <div class={classes!("step-dot", (*step >= 2).then_some("active"))}>{"2"}</div>
        </div>
    };

    let body = if *step == 1 {
        let to_gifts = {
            let step = step.clone();
            Callback::from(move |_: MouseEvent| step.set(2))
        };
        let upload_label = if draft.uploading_sender { "กำลังอัปโหลด..." } else { "กดเพื่ออัปโหลด" };
        let next_label = if draft.uploading_sender { "กำลังอัปโหลดรูป..." } else { "ถัดไป →" };

        html! {
            <div class="panel">
                <h2>{"สร้างการ์ดของคุณ"}</h2>
                <label class="field-label">{"อัปโหลดรูปหวานๆ 📸"}</label>
                <label class="upload-box">
                    <input type="file" accept={ACCEPTED_IMAGES} class="hidden-input" onchange={on_sender_file} />
                    {
                        match &draft.sender_preview {
                            Some(preview) => html! { <img src={preview.clone()} alt="preview" class="upload-preview" /> },
                            None => html! { <span class="muted">{ upload_label }</span> },
                        }
                    }
                </label>

                <div class="field-row">
                    <label class="field-label">{"เขียนข้อความของคุณ... 💌"}</label>
                    <span class="muted">{ format!("{}/{}", draft.message_len(), draft.max_message_len()) }</span>
                </div>
                <textarea
                    class="message-input"
                    rows="4"
                    maxlength={draft.max_message_len().to_string()}
                    placeholder="บอกเขาว่าเขาพิเศษแค่ไหน..."
                    value={draft.message.clone()}
                    oninput={on_message}
                />

                <button class="btn btn-primary btn-block" disabled={!draft.can_proceed_to_gifts()} onclick={to_gifts}>
                    { next_label }
                </button>
            </div>
        }
    } else {
        let back = {
            let step = step.clone();
            Callback::from(move |_: MouseEvent| step.set(1))
        };
        let add_gift = {
            let draft = draft.dispatcher();
            Callback::from(move |_: MouseEvent| draft.dispatch(DraftAction::AddGift))
        };

        html! {
            <div class="panel">
                <h2>{ format!("เลือกของขวัญ ({})", draft.gifts.len()) }</h2>
                <div class="gift-editor-list">
                    { for draft.gifts.iter().enumerate().map(|(index, gift)| {
                        let gift_id = gift.id.clone();
                        let on_remove = {
                            let draft = draft.dispatcher();
                            let gift_id = gift_id.clone();
                            Callback::from(move |_: MouseEvent| draft.dispatch(DraftAction::RemoveGift(gift_id.clone())))
                        };
                        let on_name = {
                            let draft = draft.dispatcher();
                            let gift_id = gift_id.clone();
                            Callback::from(move |e: InputEvent| {
                                let input: HtmlInputElement = e.target_unchecked_into();
                                draft.dispatch(DraftAction::SetGiftName(gift_id.clone(), input.value()));
                            })
                        };
                        let on_file = {
                            let on_gift_file = on_gift_file.clone();
                            let gift_id = gift_id.clone();
                            Callback::from(move |e: Event| on_gift_file.emit((gift_id.clone(), e)))
                        };
                        let image_status = match (&gift.image, &gift.preview) {
                            (_, Some(preview)) => html! {
                                <div class="gift-preview-wrap">
                                    <img src={preview.clone()} alt={gift.name.clone()} class="upload-preview" />
                                    if gift.image == GiftImage::Uploading {
                                        <span class="overlay-label">{"กำลังอัปโหลด..."}</span>
                                    } else {
                                        <span class="overlay-label">{"เปลี่ยน"}</span>
                                    }
                                </div>
                            },
                            (GiftImage::Uploading, None) => html! { <span class="muted">{"กำลังอัปโหลด..."}</span> },
                            _ => html! { <span class="muted">{"กดเพื่ออัปโหลด"}</span> },
                        };

                        html! {
                            <div class="gift-editor" key={gift.id.clone()}>
                                <div class="gift-editor-head">
                                    <span class="gift-number">{ format!("#{}", index + 1) }</span>
                                    if draft.can_remove_gift() {
                                        <button class="btn-icon" aria-label="remove gift" onclick={on_remove}>{"✕"}</button>
                                    }
                                </div>
                                <label class="field-label">{"รูปของขวัญ"}</label>
                                <label class="upload-box upload-box-small">
                                    <input type="file" accept={ACCEPTED_IMAGES} class="hidden-input" onchange={on_file} />
                                    { image_status }
                                </label>
                                <label class="field-label">{"ชื่อของขวัญ"}</label>
                                <input
                                    type="text"
                                    class="text-input"
                                    placeholder="เช่น ช็อกโกแลต"
                                    value={gift.name.clone()}
                                    oninput={on_name}
                                />
                            </div>
                        }
                    }) }
                </div>
                if draft.can_add_gift() {
                    <button class="btn btn-dashed btn-block" onclick={add_gift}>{"+ เพิ่มของขวัญ"}</button>
                }
                <div class="button-row">
                    <button class="btn btn-ghost" onclick={back}>{"← ย้อนกลับ"}</button>
                    <button class="btn btn-primary" disabled={!draft.can_finish() || *creating} onclick={on_finish}>
                        { if *creating { "กำลังสร้าง..." } else { "เสร็จสิ้น ✨" } }
                    </button>
                </div>
            </div>
        }
    };

    html! {
        <div class="page create-card">
            { stepper }
            <p class="step-title">{ if *step == 1 { "สร้างการ์ดของคุณ" } else { "เลือกของขวัญ" } }</p>
            { body }
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(draft: CardDraft, actions: Vec<DraftAction>) -> CardDraft {
        let mut state = Rc::new(draft);
        for action in actions {
            state = state.reduce(action);
        }
        (*state).clone()
    }

    #[test]
    fn test_starts_with_two_gifts() {
        let draft = CardDraft::default();
        assert_eq!(draft.gifts.len(), 2);
        assert!(!draft.can_remove_gift());
        assert!(!draft.can_proceed_to_gifts());
    }

    #[test]
    fn test_message_limit_keeps_previous_value() {
        let draft = apply(
            CardDraft::default(),
            vec![DraftAction::SetMessage("ก".repeat(120)), DraftAction::SetMessage("ก".repeat(121))],
        );
        assert_eq!(draft.message_len(), 120);
    }

    #[test]
    fn test_gift_count_bounds() {
        let draft = apply(CardDraft::default(), (0..10).map(|_| DraftAction::AddGift).collect());
        assert_eq!(draft.gifts.len(), 8);

        let ids: Vec<String> = draft.gifts.iter().map(|g| g.id.clone()).collect();
        let draft = apply(draft, ids.into_iter().map(DraftAction::RemoveGift).collect());
        assert_eq!(draft.gifts.len(), 2);
    }

    #[test]
    fn test_name_typed_during_upload_survives() {
        let draft = apply(
            CardDraft::default(),
            vec![
                DraftAction::GiftUploadStarted("1".to_string()),
                DraftAction::SetGiftName("1".to_string(), "Roses".to_string()),
                DraftAction::GiftUploaded("1".to_string(), "storage/roses.png".to_string()),
            ],
        );
        assert_eq!(draft.gifts[0].name, "Roses");
        assert_eq!(draft.gifts[0].image, GiftImage::Ready("storage/roses.png".to_string()));
    }

    #[test]
    fn test_request_only_when_complete() {
        let mut actions = vec![
            DraftAction::SetMessage("Be mine".to_string()),
            DraftAction::SenderUploadStarted,
            DraftAction::SenderUploaded("storage/me.jpg".to_string()),
            DraftAction::SetGiftName("1".to_string(), "Roses".to_string()),
            DraftAction::GiftUploaded("1".to_string(), "storage/roses.png".to_string()),
            DraftAction::SetGiftName("2".to_string(), " Teddy ".to_string()),
        ];
        let partial = apply(CardDraft::default(), actions.drain(..).collect());
        assert!(partial.can_proceed_to_gifts());
        assert!(partial.to_request().is_none());

        let complete = apply(partial, vec![DraftAction::GiftUploaded("2".to_string(), "storage/teddy.png".to_string())]);
        let request = complete.to_request().expect("complete draft");
        assert_eq!(request.card_id, None);
        assert_eq!(request.sender_image, "storage/me.jpg");
        assert_eq!(request.gifts[1].name, "Teddy");
    }

    #[test]
    fn test_failed_upload_clears_gift_image() {
        let draft = apply(
            CardDraft::default(),
            vec![
                DraftAction::GiftUploadStarted("2".to_string()),
                DraftAction::GiftPreview("2".to_string(), "data:image/png;base64,AA==".to_string()),
                DraftAction::GiftUploadFailed("2".to_string()),
            ],
        );
        assert_eq!(draft.gifts[1].image, GiftImage::Empty);
        assert!(draft.gifts[1].preview.is_none());
    }
}
