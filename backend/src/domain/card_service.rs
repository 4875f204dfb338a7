use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::errors::CardError;
use crate::domain::signed_url::UrlSigner;
use crate::storage::CardStorage;
use shared::{Card, CardLimits, CreateCardRequest, CreateCardResponse, Gift, STORAGE_PREFIX};

/// Service for creating cards and recording the receiver's gift choice
#[derive(Clone)]
pub struct CardService {
    storage: Arc<dyn CardStorage>,
    signer: UrlSigner,
    limits: CardLimits,
}

impl CardService {
    pub fn new(storage: Arc<dyn CardStorage>, signer: UrlSigner) -> Self {
        Self { storage, signer, limits: CardLimits::default() }
    }

    /// Create a new card. A server-generated id is used when the request has none.
    pub async fn create_card(&self, request: CreateCardRequest) -> Result<CreateCardResponse, CardError> {
        info!("Creating card: id={:?}, gifts={}", request.card_id, request.gifts.len());

        self.validate_create_request(&request)?;

        let card_id = match request.card_id {
            Some(id) => {
                shared::validate_card_id(&id, &self.limits)?;
                id
            }
            None => shared::generate_card_id(),
        };

        let card = Card::new(
            card_id,
            request.sender_image,
            request.message.trim().to_string(),
            request.gifts.into_iter().map(trim_gift).collect(),
            shared::now_millis(),
        );

        if !self.storage.store_card(&card).await? {
            warn!("Card ID already taken: {}", card.card_id);
            return Err(CardError::DuplicateCard(card.card_id));
        }

        info!("Created card: {}", card.card_id);
        Ok(CreateCardResponse { success: true, card_id: card.card_id })
    }

    /// Load a card with every `storage/` image resolved to a signed URL
    pub async fn get_card(&self, card_id: &str) -> Result<Card, CardError> {
        info!("Getting card: {}", card_id);

        let mut card = self.load(card_id).await?;
        let now = chrono::Utc::now().timestamp();
        card.sender_image = self.resolve_image(&card.sender_image, now);
        for gift in &mut card.gifts {
            gift.image = self.resolve_image(&gift.image, now);
        }
        Ok(card)
    }

    /// Record the receiver's gift. Repeating the same choice succeeds;
    /// switching to a different gift does not.
    pub async fn set_choice(&self, card_id: &str, gift_id: &str) -> Result<Card, CardError> {
        info!("Setting choice for card {}: {}", card_id, gift_id);

        if gift_id.trim().is_empty() {
            return Err(CardError::Validation("Missing receiverChoice".to_string()));
        }

        let card = self.load(card_id).await?;
        card.validate_choice(gift_id)?;

        if card.receiver_choice.as_deref() == Some(gift_id) {
            info!("Choice for card {} unchanged", card_id);
            return Ok(card);
        }

        let mut chosen = card.clone();
        chosen.receiver_choice = Some(gift_id.to_string());
        if !self.storage.replace_card(&card, &chosen).await? {
            // Another request recorded a choice first
            let current = self.load(card_id).await?;
            current.validate_choice(gift_id)?;
            info!("Choice for card {} already recorded as {}", card_id, gift_id);
            return Ok(current);
        }
        info!("Updated choice for card {}: {}", card_id, gift_id);
        Ok(chosen)
    }

    async fn load(&self, card_id: &str) -> Result<Card, CardError> {
        match self.storage.get_card(card_id).await? {
            Some(card) => Ok(card),
            None => {
                warn!("Card not found: {}", card_id);
                Err(CardError::NotFound)
            }
        }
    }

    fn resolve_image(&self, image: &str, now: i64) -> String {
        if !shared::is_storage_ref(image) {
            return image.to_string();
        }
        self.signer.signed_url(&image[STORAGE_PREFIX.len()..], now)
    }

    fn validate_create_request(&self, request: &CreateCardRequest) -> Result<(), CardError> {
        if request.sender_image.trim().is_empty() {
            return Err(CardError::Validation("Sender image is required".to_string()));
        }

        let message_len = request.message.trim().chars().count();
        if message_len == 0 {
            return Err(CardError::Validation("Message cannot be empty".to_string()));
        }
        if message_len > self.limits.max_message_length {
            return Err(CardError::Validation(format!(
                "Message cannot exceed {} characters",
                self.limits.max_message_length
            )));
        }

        let count = request.gifts.len();
        if count < self.limits.min_gifts || count > self.limits.max_gifts {
            return Err(CardError::Validation(format!(
                "A card needs between {} and {} gifts, got {}",
                self.limits.min_gifts, self.limits.max_gifts, count
            )));
        }

        let mut seen = HashSet::new();
        for gift in &request.gifts {
            if gift.id.trim().is_empty() {
                return Err(CardError::Validation("Gift ID cannot be empty".to_string()));
            }
            if !seen.insert(gift.id.as_str()) {
                return Err(CardError::Validation(format!("Duplicate gift ID: {}", gift.id)));
            }
            let name_len = gift.name.trim().chars().count();
            if name_len == 0 {
                return Err(CardError::Validation("Gift name cannot be empty".to_string()));
            }
            if name_len > self.limits.max_gift_name_length {
                return Err(CardError::Validation(format!(
                    "Gift name cannot exceed {} characters",
                    self.limits.max_gift_name_length
                )));
            }
            if gift.image.trim().is_empty() {
                return Err(CardError::Validation(format!("Gift {} needs an image", gift.id)));
            }
        }

        Ok(())
    }
}

fn trim_gift(gift: Gift) -> Gift {
    Gift { name: gift.name.trim().to_string(), ..gift }
}
