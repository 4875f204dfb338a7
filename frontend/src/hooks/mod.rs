pub mod use_card;
