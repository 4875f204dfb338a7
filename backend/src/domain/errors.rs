use shared::{CardIdError, ChoiceError};
use thiserror::Error;

/// Failures surfaced by the card and upload services
#[derive(Debug, Error)]
pub enum CardError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid card ID: {0}")]
    InvalidCardId(#[from] CardIdError),

    #[error("Card not found")]
    NotFound,

    #[error("{0}")]
    InvalidChoice(String),

    #[error("Gift already chosen: {0}")]
    ChoiceAlreadyMade(String),

    #[error("A card with ID {0} already exists")]
    DuplicateCard(String),

    #[error("Invalid or expired file link")]
    Forbidden,

    #[error("File exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    #[error("Unsupported file type: {0}")]
    UnsupportedMedia(String),

    #[error("File not found")]
    FileNotFound,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl From<ChoiceError> for CardError {
    fn from(e: ChoiceError) -> Self {
        match e {
            ChoiceError::UnknownGift(_) => CardError::InvalidChoice(e.to_string()),
            ChoiceError::AlreadyChosen(existing) => CardError::ChoiceAlreadyMade(existing),
        }
    }
}
