//! Card definitions and card-in-play instances.
//!
//! A [`CardDefinition`] is the immutable catalogue entry: power, element,
//! body part and the joints it exposes. A [`CardInPlay`] wraps a
//! definition with an instance id that is unique inside one match, so two
//! copies of the same catalogue card can be told apart as they move
//! between hands, dinos, piles and the board.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifies a catalogue entry (the card "type"), not a physical copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u32);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

/// Identifies one physical copy of a card inside a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardInstanceId(pub u32);

impl fmt::Display for CardInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Element / PartType / Joints
// ---------------------------------------------------------------------------

/// Army type of a card. The central board keeps one army pile per element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Element {
    Sand,
    Water,
    Wind,
}

impl Element {
    /// Every element, in board order.
    pub const ALL: [Element; 3] = [Element::Sand, Element::Water, Element::Wind];

    /// Position of this element's army pile on the board.
    pub fn index(self) -> usize {
        match self {
            Self::Sand => 0,
            Self::Water => 1,
            Self::Wind => 2,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sand => write!(f, "Sand"),
            Self::Water => write!(f, "Water"),
            Self::Wind => write!(f, "Wind"),
        }
    }
}

/// Which body part a card is.
///
/// `Arch` cards are not body parts at all: they are army units that
/// always go to the central board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum PartType {
    Head,
    Torso,
    Legs,
    Arms,
    Arch,
}

impl PartType {
    /// Returns `true` for parts that can be attached to an existing dino.
    pub fn is_attachable(self) -> bool {
        matches!(self, Self::Torso | Self::Legs | Self::Arms)
    }
}

impl fmt::Display for PartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Head => write!(f, "Head"),
            Self::Torso => write!(f, "Torso"),
            Self::Legs => write!(f, "Legs"),
            Self::Arms => write!(f, "Arms"),
            Self::Arch => write!(f, "Arch"),
        }
    }
}

/// The four connectors a card may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Joints {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl Joints {
    /// No connectors at all (arch cards).
    pub const NONE: Joints = Joints {
        top: false,
        bottom: false,
        left: false,
        right: false,
    };

    /// Every connector open.
    pub const ALL: Joints = Joints {
        top: true,
        bottom: true,
        left: true,
        right: true,
    };

    pub const fn new(top: bool, bottom: bool, left: bool, right: bool) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }
}

// ---------------------------------------------------------------------------
// CardDefinition
// ---------------------------------------------------------------------------

/// Immutable catalogue attributes of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub card_id: CardId,
    pub power: u32,
    /// Heads and arch cards carry an element; other body parts are neutral.
    pub element: Option<Element>,
    pub part: PartType,
    pub joints: Joints,
    /// The supreme boss is an arch card that sits in the board's boss slot
    /// instead of an army pile.
    pub supreme_boss: bool,
}

impl CardDefinition {
    /// A head card of the given element.
    pub const fn head(card_id: u32, power: u32, element: Element, joints: Joints) -> Self {
        Self {
            card_id: CardId(card_id),
            power,
            element: Some(element),
            part: PartType::Head,
            joints,
            supreme_boss: false,
        }
    }

    /// An element-neutral torso, legs or arms card.
    pub const fn body(card_id: u32, power: u32, part: PartType, joints: Joints) -> Self {
        Self {
            card_id: CardId(card_id),
            power,
            element: None,
            part,
            joints,
            supreme_boss: false,
        }
    }

    /// An army unit that belongs on the central board.
    pub const fn arch(card_id: u32, power: u32, element: Element) -> Self {
        Self {
            card_id: CardId(card_id),
            power,
            element: Some(element),
            part: PartType::Arch,
            joints: Joints::NONE,
            supreme_boss: false,
        }
    }

    /// The supreme boss of the given element.
    pub const fn supreme_boss(card_id: u32, power: u32, element: Element) -> Self {
        Self {
            card_id: CardId(card_id),
            power,
            element: Some(element),
            part: PartType::Arch,
            joints: Joints::NONE,
            supreme_boss: true,
        }
    }

    /// Returns `true` for cards that never enter a hand or a dino.
    pub fn is_arch(&self) -> bool {
        self.part == PartType::Arch
    }
}

// ---------------------------------------------------------------------------
// CardInPlay
// ---------------------------------------------------------------------------

/// One physical card inside a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInPlay {
    pub instance_id: CardInstanceId,
    pub definition: CardDefinition,
}

impl CardInPlay {
    pub fn new(instance_id: CardInstanceId, definition: CardDefinition) -> Self {
        Self {
            instance_id,
            definition,
        }
    }

    pub fn power(&self) -> u32 {
        self.definition.power
    }

    pub fn part(&self) -> PartType {
        self.definition.part
    }

    pub fn element(&self) -> Option<Element> {
        self.definition.element
    }

    pub fn joints(&self) -> Joints {
        self.definition.joints
    }

    pub fn is_arch(&self) -> bool {
        self.definition.is_arch()
    }

    pub fn is_supreme_boss(&self) -> bool {
        self.definition.supreme_boss
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_index_matches_all_order() {
        for (i, element) in Element::ALL.iter().enumerate() {
            assert_eq!(element.index(), i);
        }
    }

    #[test]
    fn test_part_type_is_attachable() {
        assert!(!PartType::Head.is_attachable());
        assert!(PartType::Torso.is_attachable());
        assert!(PartType::Legs.is_attachable());
        assert!(PartType::Arms.is_attachable());
        assert!(!PartType::Arch.is_attachable());
    }

    #[test]
    fn test_arch_constructor_has_no_joints() {
        let card = CardDefinition::arch(40, 3, Element::Water);
        assert!(card.is_arch());
        assert_eq!(card.joints, Joints::NONE);
        assert!(!card.supreme_boss);
    }

    #[test]
    fn test_supreme_boss_is_arch() {
        let boss = CardDefinition::supreme_boss(60, 8, Element::Sand);
        assert!(boss.is_arch());
        assert!(boss.supreme_boss);
    }

    #[test]
    fn test_card_instance_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&CardInstanceId(28)).unwrap();
        assert_eq!(json, "28");
    }

    #[test]
    fn test_element_serializes_as_pascal_case() {
        let json = serde_json::to_string(&Element::Wind).unwrap();
        assert_eq!(json, "\"Wind\"");
    }
}
