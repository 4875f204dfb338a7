//! [`CardStorage`] over the key-value table.

use anyhow::{Context, Result};
use async_trait::async_trait;
use shared::Card;
use tracing::debug;

use super::db::DbConnection;
use super::traits::CardStorage;

fn card_key(card_id: &str) -> String {
    format!("card:{}", card_id)
}

#[async_trait]
impl CardStorage for DbConnection {
    async fn store_card(&self, card: &Card) -> Result<bool> {
        let json = serde_json::to_string(card)?;
        let inserted = self.insert_value(&card_key(&card.card_id), &json).await?;
        debug!("store_card {} inserted={}", card.card_id, inserted);
        Ok(inserted)
    }

    async fn get_card(&self, card_id: &str) -> Result<Option<Card>> {
        let Some(json) = self.get_value(&card_key(card_id)).await? else {
            return Ok(None);
        };
        let card = serde_json::from_str(&json).with_context(|| format!("Corrupt card record {}", card_id))?;
        Ok(Some(card))
    }

    async fn replace_card(&self, current: &Card, updated: &Card) -> Result<bool> {
        let expected = serde_json::to_string(current)?;
        let json = serde_json::to_string(updated)?;
        let swapped = self.compare_and_swap(&card_key(&updated.card_id), &expected, &json).await?;
        debug!("replace_card {} swapped={}", updated.card_id, swapped);
        Ok(swapped)
    }
}
