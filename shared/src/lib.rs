use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix marking an image reference that lives in the server's blob store
/// and must be resolved to a signed URL before a browser can load it.
pub const STORAGE_PREFIX: &str = "storage/";

/// A single gift option offered by the sender
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gift {
    /// Unique within its card
    pub id: String,
    pub name: String,
    /// Direct URL or a `storage/...` reference
    pub image: String,
}

/// A Valentine card record as stored and served by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub card_id: String,
    /// Direct URL or a `storage/...` reference
    pub sender_image: String,
    pub message: String,
    pub gifts: Vec<Gift>,
    /// Gift id picked by the receiver, set exactly once
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_choice: Option<String>,
    /// Epoch milliseconds
    pub created_at: i64,
}

/// Request body for `POST /api/cards`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    /// Client-chosen id; the server generates one when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_id: Option<String>,
    pub sender_image: String,
    pub message: String,
    pub gifts: Vec<Gift>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardResponse {
    pub success: bool,
    pub card_id: String,
}

/// Request body for `PUT /api/cards/:card_id/choice`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChoiceRequest {
    pub receiver_choice: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    /// `storage/<filename>` reference to put into a card
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Error body returned by every failing API call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Log line forwarded from the browser to the server log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRequest {
    pub level: String,
    pub message: String,
    pub component: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogResponse {
    pub success: bool,
}

/// Limits applied when a card is created
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardLimits {
    pub max_message_length: usize,
    pub min_gifts: usize,
    pub max_gifts: usize,
    pub max_gift_name_length: usize,
    pub max_upload_bytes: usize,
    pub max_card_id_length: usize,
}

impl Default for CardLimits {
    fn default() -> Self {
        Self {
            max_message_length: 120,
            min_gifts: 2,
            max_gifts: 8,
            max_gift_name_length: 50,
            max_upload_bytes: 5 * 1024 * 1024,
            max_card_id_length: 64,
        }
    }
}

impl Card {
    /// Build a fresh card with no receiver choice
    pub fn new(card_id: String, sender_image: String, message: String, gifts: Vec<Gift>, created_at: i64) -> Self {
        Self {
            card_id,
            sender_image,
            message,
            gifts,
            receiver_choice: None,
            created_at,
        }
    }

    /// Find a gift by id
    pub fn gift(&self, gift_id: &str) -> Option<&Gift> {
        self.gifts.iter().find(|g| g.id == gift_id)
    }

    /// The gift the receiver picked, if any
    pub fn chosen_gift(&self) -> Option<&Gift> {
        self.receiver_choice.as_deref().and_then(|id| self.gift(id))
    }

    /// Check that `gift_id` may become this card's receiver choice.
    ///
    /// Choosing the same gift again is allowed so that a retried request
    /// does not fail.
    pub fn validate_choice(&self, gift_id: &str) -> Result<(), ChoiceError> {
        if self.gift(gift_id).is_none() {
            return Err(ChoiceError::UnknownGift(gift_id.to_string()));
        }
        match &self.receiver_choice {
            Some(existing) if existing != gift_id => Err(ChoiceError::AlreadyChosen(existing.clone())),
            _ => Ok(()),
        }
    }

    /// Every image reference on the card, sender first
    pub fn image_refs(&self) -> Vec<&str> {
        std::iter::once(self.sender_image.as_str())
            .chain(self.gifts.iter().map(|g| g.image.as_str()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChoiceError {
    UnknownGift(String),
    AlreadyChosen(String),
}

impl fmt::Display for ChoiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChoiceError::UnknownGift(id) => write!(f, "Gift {} is not part of this card", id),
            ChoiceError::AlreadyChosen(id) => write!(f, "A different gift ({}) was already chosen", id),
        }
    }
}

impl std::error::Error for ChoiceError {}

#[derive(Debug, Clone, PartialEq)]
pub enum CardIdError {
    Empty,
    TooLong,
    InvalidCharacter(char),
}

impl fmt::Display for CardIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardIdError::Empty => write!(f, "Card ID cannot be empty"),
            CardIdError::TooLong => write!(f, "Card ID is too long"),
            CardIdError::InvalidCharacter(c) => write!(f, "Card ID contains invalid character '{}'", c),
        }
    }
}

impl std::error::Error for CardIdError {}

/// Generate an opaque, globally unique card id
pub fn generate_card_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Card ids end up in URLs and file names, so only `[A-Za-z0-9_-]` is allowed
pub fn validate_card_id(card_id: &str, limits: &CardLimits) -> Result<(), CardIdError> {
    if card_id.is_empty() {
        return Err(CardIdError::Empty);
    }
    if card_id.len() > limits.max_card_id_length {
        return Err(CardIdError::TooLong);
    }
    if let Some(c) = card_id.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_')) {
        return Err(CardIdError::InvalidCharacter(c));
    }
    Ok(())
}

/// File name used when a summary image is downloaded
pub fn capture_filename(card_id: &str) -> String {
    format!("valentine-card-{}.png", card_id)
}

/// Whether an image reference points into the blob store
pub fn is_storage_ref(image: &str) -> bool {
    image.starts_with(STORAGE_PREFIX)
}

/// Current time as epoch milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
