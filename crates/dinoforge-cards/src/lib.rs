//! Card model for Dinoforge.
//!
//! Pure data plus validation, no concurrency:
//!
//! - [`CardDefinition`] / [`CardInPlay`]: catalogue entries and the
//!   physical copies that move around a match
//! - [`Dino`]: a head plus up to four joint-linked body parts
//! - [`Catalogue`] / [`DeckSource`]: where a match's deck comes from

mod card;
mod catalogue;
mod dino;
mod error;

pub use card::{CardDefinition, CardId, CardInPlay, CardInstanceId, Element, Joints, PartType};
pub use catalogue::{Catalogue, DeckSource, FixedDeck, ShuffledDeck};
pub use dino::{Dino, DinoId, DinoSlot};
pub use error::AssemblyError;
