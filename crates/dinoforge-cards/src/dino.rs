//! Dino assembly: one head plus optional torso, legs and two arms.
//!
//! Cards snap together through joints. The head sits on top and hangs the
//! torso from its `bottom` joint; everything else hangs from the torso:
//!
//! ```text
//!                [ head ]
//!                 bottom
//!                   |
//!                  top
//!   [left arm] right-left [ torso ] right-left [right arm]
//!                 bottom
//!                   |
//!                  top
//!                [ legs ]
//! ```
//!
//! A part attaches only when the connector it hangs from is present on the
//! dino side AND the complementary connector is present on the card.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{AssemblyError, CardInPlay, CardInstanceId, Element, PartType};

/// Identifies a dino, sequential per owning player (1, 2, 3, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DinoId(pub u32);

impl fmt::Display for DinoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D-{}", self.0)
    }
}

/// The slot a body part occupies on a dino.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum DinoSlot {
    Torso,
    Legs,
    LeftArm,
    RightArm,
}

/// A player-assembled creature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dino {
    pub id: DinoId,
    pub head: CardInPlay,
    pub torso: Option<CardInPlay>,
    pub legs: Option<CardInPlay>,
    pub left_arm: Option<CardInPlay>,
    pub right_arm: Option<CardInPlay>,
}

impl Dino {
    /// Creates a dino from a head card.
    ///
    /// # Errors
    /// [`AssemblyError::NotABodyPart`] if the card is not a head.
    pub fn from_head(id: DinoId, head: CardInPlay) -> Result<Self, AssemblyError> {
        if head.part() != PartType::Head {
            return Err(AssemblyError::NotABodyPart {
                card: head.instance_id,
                part: head.part(),
            });
        }
        Ok(Self {
            id,
            head,
            torso: None,
            legs: None,
            left_arm: None,
            right_arm: None,
        })
    }

    /// Element of the dino, fixed by its head.
    pub fn element(&self) -> Option<Element> {
        self.head.element()
    }

    /// Sum of the power of every attached card.
    pub fn total_power(&self) -> u32 {
        self.cards().map(CardInPlay::power).sum()
    }

    /// Every card making up this dino, head first.
    pub fn cards(&self) -> impl Iterator<Item = &CardInPlay> {
        std::iter::once(&self.head).chain(
            [&self.torso, &self.legs, &self.left_arm, &self.right_arm]
                .into_iter()
                .flatten(),
        )
    }

    /// Consumes the dino and returns its cards, head first.
    pub fn into_cards(self) -> Vec<CardInPlay> {
        let mut cards = vec![self.head];
        cards.extend(
            [self.torso, self.legs, self.left_arm, self.right_arm]
                .into_iter()
                .flatten(),
        );
        cards
    }

    /// Returns `true` if the card instance is already part of this dino.
    pub fn contains(&self, card: CardInstanceId) -> bool {
        self.cards().any(|c| c.instance_id == card)
    }

    /// Checks whether `card` could be attached and returns the slot it
    /// would occupy. Does not modify the dino.
    pub fn check_attachment(&self, card: &CardInPlay) -> Result<DinoSlot, AssemblyError> {
        if self.contains(card.instance_id) {
            return Err(AssemblyError::AlreadyUsed(card.instance_id));
        }

        let joints = card.joints();
        let incompatible = || AssemblyError::IncompatibleJoint {
            card: card.instance_id,
            part: card.part(),
        };

        match card.part() {
            PartType::Torso => {
                if self.torso.is_some() {
                    return Err(AssemblyError::SlotOccupied(PartType::Torso));
                }
                if self.head.joints().bottom && joints.top {
                    Ok(DinoSlot::Torso)
                } else {
                    Err(incompatible())
                }
            }
            PartType::Legs => {
                if self.legs.is_some() {
                    return Err(AssemblyError::SlotOccupied(PartType::Legs));
                }
                let torso = self.torso.as_ref().ok_or_else(incompatible)?;
                if torso.joints().bottom && joints.top {
                    Ok(DinoSlot::Legs)
                } else {
                    Err(incompatible())
                }
            }
            PartType::Arms => {
                if self.left_arm.is_some() && self.right_arm.is_some() {
                    return Err(AssemblyError::SlotOccupied(PartType::Arms));
                }
                let torso = self.torso.as_ref().ok_or_else(incompatible)?.joints();
                if self.left_arm.is_none() && torso.left && joints.right {
                    Ok(DinoSlot::LeftArm)
                } else if self.right_arm.is_none() && torso.right && joints.left {
                    Ok(DinoSlot::RightArm)
                } else {
                    Err(incompatible())
                }
            }
            part @ (PartType::Head | PartType::Arch) => Err(AssemblyError::NotABodyPart {
                card: card.instance_id,
                part,
            }),
        }
    }

    /// Attaches `card` to the first compatible open slot.
    ///
    /// On error the dino is unchanged.
    pub fn attach(&mut self, card: CardInPlay) -> Result<DinoSlot, AssemblyError> {
        let slot = self.check_attachment(&card)?;
        let target = match slot {
            DinoSlot::Torso => &mut self.torso,
            DinoSlot::Legs => &mut self.legs,
            DinoSlot::LeftArm => &mut self.left_arm,
            DinoSlot::RightArm => &mut self.right_arm,
        };
        *target = Some(card);
        Ok(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CardDefinition, Joints};

    fn card(id: u32, def: CardDefinition) -> CardInPlay {
        CardInPlay::new(CardInstanceId(id), def)
    }

    fn head(id: u32) -> CardInPlay {
        card(
            id,
            CardDefinition::head(1, 3, Element::Sand, Joints::new(false, true, false, false)),
        )
    }

    fn torso(id: u32) -> CardInPlay {
        card(id, CardDefinition::body(10, 2, PartType::Torso, Joints::ALL))
    }

    #[test]
    fn test_from_head_rejects_torso() {
        let result = Dino::from_head(DinoId(1), torso(5));
        assert!(matches!(
            result,
            Err(AssemblyError::NotABodyPart { part: PartType::Torso, .. })
        ));
    }

    #[test]
    fn test_element_comes_from_head() {
        let dino = Dino::from_head(DinoId(1), head(1)).unwrap();
        assert_eq!(dino.element(), Some(Element::Sand));
    }

    #[test]
    fn test_attach_torso_then_power_sums() {
        let mut dino = Dino::from_head(DinoId(1), head(1)).unwrap();
        let slot = dino.attach(torso(2)).unwrap();
        assert_eq!(slot, DinoSlot::Torso);
        assert_eq!(dino.total_power(), 5);
    }

    #[test]
    fn test_attach_torso_without_head_bottom_joint_fails() {
        let capped = card(
            1,
            CardDefinition::head(2, 3, Element::Water, Joints::NONE),
        );
        let mut dino = Dino::from_head(DinoId(1), capped).unwrap();
        let result = dino.attach(torso(2));
        assert!(matches!(result, Err(AssemblyError::IncompatibleJoint { .. })));
        assert!(dino.torso.is_none());
    }

    #[test]
    fn test_attach_legs_without_torso_fails() {
        let mut dino = Dino::from_head(DinoId(1), head(1)).unwrap();
        let legs = card(3, CardDefinition::body(20, 2, PartType::Legs, Joints::ALL));
        assert!(matches!(
            dino.attach(legs),
            Err(AssemblyError::IncompatibleJoint { part: PartType::Legs, .. })
        ));
    }

    #[test]
    fn test_attach_arms_fill_left_then_right() {
        let mut dino = Dino::from_head(DinoId(1), head(1)).unwrap();
        dino.attach(torso(2)).unwrap();
        let arm = |id| card(id, CardDefinition::body(30, 1, PartType::Arms, Joints::ALL));

        assert_eq!(dino.attach(arm(3)).unwrap(), DinoSlot::LeftArm);
        assert_eq!(dino.attach(arm(4)).unwrap(), DinoSlot::RightArm);
        assert!(matches!(
            dino.attach(arm(5)),
            Err(AssemblyError::SlotOccupied(PartType::Arms))
        ));
    }

    #[test]
    fn test_attach_right_arm_only_when_left_joint_missing() {
        let mut dino = Dino::from_head(DinoId(1), head(1)).unwrap();
        dino.attach(torso(2)).unwrap();
        // Exposes only its left joint, so it can only hang on the torso's right side.
        let joints = Joints::new(false, false, true, false);
        let arm = card(3, CardDefinition::body(31, 1, PartType::Arms, joints));
        assert_eq!(dino.attach(arm).unwrap(), DinoSlot::RightArm);
    }

    #[test]
    fn test_attach_same_card_twice_is_already_used() {
        let mut dino = Dino::from_head(DinoId(1), head(1)).unwrap();
        let t = torso(2);
        dino.attach(t).unwrap();
        assert_eq!(dino.attach(t), Err(AssemblyError::AlreadyUsed(CardInstanceId(2))));
    }

    #[test]
    fn test_attach_arch_is_not_a_body_part() {
        let mut dino = Dino::from_head(DinoId(1), head(1)).unwrap();
        let arch = card(9, CardDefinition::arch(40, 2, Element::Wind));
        assert!(matches!(
            dino.attach(arch),
            Err(AssemblyError::NotABodyPart { part: PartType::Arch, .. })
        ));
    }

    #[test]
    fn test_into_cards_returns_head_first() {
        let mut dino = Dino::from_head(DinoId(1), head(1)).unwrap();
        dino.attach(torso(2)).unwrap();
        let ids: Vec<_> = dino.into_cards().iter().map(|c| c.instance_id.0).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
