//! Error types for dino assembly.

use crate::{CardInstanceId, PartType};

/// Why a card could not become part of a dino.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblyError {
    /// The card's part type cannot go where it was played, e.g. an arch
    /// card attached to a dino or a torso played as a head.
    #[error("card {card} is not a valid body part ({part})")]
    NotABodyPart {
        card: CardInstanceId,
        part: PartType,
    },

    /// The dino already has a card in the slot this part would occupy.
    #[error("dino already has a {0} attached")]
    SlotOccupied(PartType),

    /// The dino's open connector and the card's complementary connector
    /// don't line up (or the connector the part hangs from is missing).
    #[error("card {card} has an incompatible joint for the {part} slot")]
    IncompatibleJoint {
        card: CardInstanceId,
        part: PartType,
    },

    /// The card is already part of this dino.
    #[error("card {0} is already used")]
    AlreadyUsed(CardInstanceId),
}
