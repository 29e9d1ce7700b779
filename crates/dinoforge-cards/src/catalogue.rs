//! The card catalogue and deck sources.
//!
//! A [`DeckSource`] decides the order in which catalogue cards enter a
//! match. Production uses [`ShuffledDeck`]; tests use [`FixedDeck`] to lay
//! out piles and hands exactly.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::{CardDefinition, Element, Joints, PartType};

/// Joint layouts handed out to the three heads of each element. The last
/// one is a lone head that can never grow a body.
const HEAD_JOINTS: [Joints; 3] = [
    Joints::new(false, true, false, false),
    Joints::new(false, true, true, true),
    Joints::new(false, false, false, false),
];

/// The set of all card definitions available to a match.
#[derive(Debug, Clone)]
pub struct Catalogue {
    cards: Vec<CardDefinition>,
}

impl Catalogue {
    pub fn new(cards: Vec<CardDefinition>) -> Self {
        Self { cards }
    }

    /// The standard catalogue.
    ///
    /// Per element: three heads and five army units. Shared: nine
    /// torsos, nine legs, twelve arms and one supreme boss.
    pub fn standard() -> Self {
        let mut cards = Vec::new();
        let mut next_id = 0u32;
        let mut next = || {
            next_id += 1;
            next_id
        };

        for (rank, element) in Element::ALL.into_iter().enumerate() {
            let rank = rank as u32;
            for (i, joints) in HEAD_JOINTS.into_iter().enumerate() {
                let power = 2 + i as u32 + rank;
                cards.push(CardDefinition::head(next(), power, element, joints));
            }
            for i in 0..5u32 {
                cards.push(CardDefinition::arch(next(), 1 + i + rank, element));
            }
        }

        for i in 0..9u32 {
            // Every third torso is missing its legs joint.
            let joints = Joints::new(true, i % 3 != 2, true, true);
            cards.push(CardDefinition::body(next(), 2 + i % 3, PartType::Torso, joints));
        }
        for i in 0..9u32 {
            let joints = Joints::new(true, false, false, false);
            cards.push(CardDefinition::body(next(), 1 + i % 3, PartType::Legs, joints));
        }
        for i in 0..12u32 {
            // Alternate arms that fit the left side, the right side, or both.
            let joints = match i % 3 {
                0 => Joints::new(false, false, false, true),
                1 => Joints::new(false, false, true, false),
                _ => Joints::new(false, false, true, true),
            };
            cards.push(CardDefinition::body(next(), 1 + i % 2, PartType::Arms, joints));
        }
        cards.push(CardDefinition::supreme_boss(next(), 6, Element::Wind));

        Self { cards }
    }

    pub fn cards(&self) -> &[CardDefinition] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl Default for Catalogue {
    fn default() -> Self {
        Self::standard()
    }
}

/// Produces the ordered deck for a new match. Index 0 is dealt first.
pub trait DeckSource: Send + Sync + 'static {
    fn build_deck(&self) -> Vec<CardDefinition>;
}

impl<D: DeckSource + ?Sized> DeckSource for Arc<D> {
    fn build_deck(&self) -> Vec<CardDefinition> {
        (**self).build_deck()
    }
}

/// Shuffles a catalogue for every match.
#[derive(Debug, Clone)]
pub struct ShuffledDeck {
    catalogue: Catalogue,
    seed: Option<u64>,
}

impl ShuffledDeck {
    pub fn new(catalogue: Catalogue) -> Self {
        Self {
            catalogue,
            seed: None,
        }
    }

    /// Uses a fixed seed so every deck comes out in the same order.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for ShuffledDeck {
    fn default() -> Self {
        Self::new(Catalogue::standard())
    }
}

impl DeckSource for ShuffledDeck {
    fn build_deck(&self) -> Vec<CardDefinition> {
        let mut deck = self.catalogue.cards().to_vec();
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        deck.shuffle(&mut rng);
        deck
    }
}

/// Returns the same deck, unshuffled, every time.
#[derive(Debug, Clone)]
pub struct FixedDeck(pub Vec<CardDefinition>);

impl DeckSource for FixedDeck {
    fn build_deck(&self) -> Vec<CardDefinition> {
        self.0.clone()
    }
}
