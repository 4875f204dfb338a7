pub mod card_landing;
pub mod card_reveal;
pub mod card_summary;
pub mod create_card;
pub mod gift_selection;
pub mod home;
pub mod not_found;

pub use card_landing::CardLanding;
pub use card_reveal::CardReveal;
pub use card_summary::CardSummary;
pub use create_card::CreateCard;
pub use gift_selection::GiftSelection;
pub use home::Home;
pub use not_found::NotFound;
