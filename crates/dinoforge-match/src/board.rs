//! The central board: one army pile per element plus the supreme boss slot.

use dinoforge_cards::{CardInPlay, Element};
use dinoforge_protocol::{ArmyView, BoardView};

/// Where an arch card landed when placed on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Added to this element's army pile.
    Army(Element),
    /// Took the empty boss slot.
    Boss(Element),
    /// Couldn't be placed (boss slot taken, or no element); the caller
    /// discards it.
    Rejected(CardInPlay),
}

/// An army that was provoked and removed from the board.
#[derive(Debug, Clone, Default)]
pub struct ClearedArmy {
    pub cards: Vec<CardInPlay>,
    pub boss: Option<CardInPlay>,
}

impl ClearedArmy {
    pub fn into_cards(self) -> Vec<CardInPlay> {
        let mut cards = self.cards;
        cards.extend(self.boss);
        cards
    }
}

#[derive(Debug, Clone, Default)]
pub struct CentralBoard {
    armies: [Vec<CardInPlay>; 3],
    supreme_boss: Option<CardInPlay>,
}

impl CentralBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places an arch card. Non-arch cards are rejected.
    pub fn place(&mut self, card: CardInPlay) -> Placement {
        let Some(element) = card.element().filter(|_| card.is_arch()) else {
            return Placement::Rejected(card);
        };
        if card.is_supreme_boss() {
            if self.supreme_boss.is_some() {
                return Placement::Rejected(card);
            }
            self.supreme_boss = Some(card);
            return Placement::Boss(element);
        }
        self.armies[element.index()].push(card);
        Placement::Army(element)
    }

    pub fn army(&self, element: Element) -> &[CardInPlay] {
        &self.armies[element.index()]
    }

    pub fn supreme_boss(&self) -> Option<&CardInPlay> {
        self.supreme_boss.as_ref()
    }

    /// Returns `true` if the boss on the board belongs to `element`.
    pub fn boss_matches(&self, element: Element) -> bool {
        self.supreme_boss
            .as_ref()
            .is_some_and(|boss| boss.element() == Some(element))
    }

    /// Power an army brings to a provoke: its pile plus a matching boss.
    pub fn army_power(&self, element: Element) -> u32 {
        let pile: u32 = self.army(element).iter().map(CardInPlay::power).sum();
        let boss = if self.boss_matches(element) {
            self.supreme_boss.as_ref().map_or(0, CardInPlay::power)
        } else {
            0
        };
        pile + boss
    }

    /// Removes an army (and a matching boss) from the board.
    pub fn clear_army(&mut self, element: Element) -> ClearedArmy {
        let boss = if self.boss_matches(element) {
            self.supreme_boss.take()
        } else {
            None
        };
        ClearedArmy {
            cards: std::mem::take(&mut self.armies[element.index()]),
            boss,
        }
    }

    pub fn card_count(&self) -> usize {
        self.armies.iter().map(Vec::len).sum::<usize>() + usize::from(self.supreme_boss.is_some())
    }

    pub fn view(&self) -> BoardView {
        BoardView {
            armies: Element::ALL
                .into_iter()
                .map(|element| ArmyView {
                    element,
                    cards: self.army(element).to_vec(),
                    power: self.army_power(element),
                })
                .collect(),
            supreme_boss: self.supreme_boss,
        }
    }
}
