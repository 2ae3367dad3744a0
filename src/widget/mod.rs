//! Display widgets built on the component engine.

pub mod photo_card;

pub use photo_card::PhotoCard;
