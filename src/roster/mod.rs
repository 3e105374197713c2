//! Character catalog and player creation
//!
//! These collaborators turn a character id into a ready-to-queue `Player`.

pub mod catalog;
pub mod factory;

pub use catalog::{CharacterCatalog, CharacterRoster};
pub use factory::{PlayerFactory, RatingRange};
