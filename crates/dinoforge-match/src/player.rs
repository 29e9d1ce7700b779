//! One player's state inside a match.

use dinoforge_cards::{AssemblyError, CardInPlay, CardInstanceId, Dino, DinoId};
use dinoforge_protocol::{PlayerId, PlayerView, ScoreEntry};

/// A player's hand, dinos, score and seat.
///
/// Owned by its [`MatchSession`](crate::MatchSession); never shared.
#[derive(Debug, Clone)]
pub struct PlayerSession {
    pub player_id: PlayerId,
    pub nickname: String,
    /// Stable seat used to decide who plays next.
    pub turn_order: usize,
    hand: Vec<CardInPlay>,
    dinos: Vec<Dino>,
    score: u32,
    next_dino_id: u32,
}

impl PlayerSession {
    pub fn new(player_id: PlayerId, nickname: impl Into<String>, turn_order: usize) -> Self {
        Self {
            player_id,
            nickname: nickname.into(),
            turn_order,
            hand: Vec::new(),
            dinos: Vec::new(),
            score: 0,
            next_dino_id: 1,
        }
    }

    // -- Hand ------------------------------------------------------------

    pub fn hand(&self) -> &[CardInPlay] {
        &self.hand
    }

    pub fn hand_size(&self) -> usize {
        self.hand.len()
    }

    pub fn card_in_hand(&self, card: CardInstanceId) -> Option<&CardInPlay> {
        self.hand.iter().find(|c| c.instance_id == card)
    }

    pub fn add_to_hand(&mut self, card: CardInPlay) {
        self.hand.push(card);
    }

    /// Removes a card from the hand. Hand order carries no meaning.
    pub fn take_from_hand(&mut self, card: CardInstanceId) -> Option<CardInPlay> {
        let pos = self.hand.iter().position(|c| c.instance_id == card)?;
        Some(self.hand.swap_remove(pos))
    }

    // -- Dinos -----------------------------------------------------------

    pub fn dinos(&self) -> &[Dino] {
        &self.dinos
    }

    pub fn dino(&self, id: DinoId) -> Option<&Dino> {
        self.dinos.iter().find(|d| d.id == id)
    }

    pub fn dino_mut(&mut self, id: DinoId) -> Option<&mut Dino> {
        self.dinos.iter_mut().find(|d| d.id == id)
    }

    /// Returns `true` if the card is built into one of this player's dinos.
    pub fn has_card_in_dino(&self, card: CardInstanceId) -> bool {
        self.dinos.iter().any(|d| d.contains(card))
    }

    /// Starts a new dino from a head card. Ids are sequential per player.
    pub fn add_dino(&mut self, head: CardInPlay) -> Result<DinoId, AssemblyError> {
        let id = DinoId(self.next_dino_id);
        let dino = Dino::from_head(id, head)?;
        self.dinos.push(dino);
        self.next_dino_id += 1;
        Ok(id)
    }

    /// Combined power of every dino.
    pub fn total_dino_power(&self) -> u32 {
        self.dinos.iter().map(Dino::total_power).sum()
    }

    /// Removes all dinos, returning their cards.
    pub fn take_all_dino_cards(&mut self) -> Vec<CardInPlay> {
        self.dinos.drain(..).flat_map(Dino::into_cards).collect()
    }

    // -- Score -----------------------------------------------------------

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn add_score(&mut self, points: u32) {
        self.score += points;
    }

    // -- Teardown / views ------------------------------------------------

    /// Every card this player holds, hand and dinos alike.
    pub fn into_cards(mut self) -> Vec<CardInPlay> {
        let mut cards = self.take_all_dino_cards();
        cards.append(&mut self.hand);
        cards
    }

    /// Number of cards held in hand and dinos.
    pub fn card_count(&self) -> usize {
        self.hand.len() + self.dinos.iter().map(|d| d.cards().count()).sum::<usize>()
    }

    pub fn score_entry(&self) -> ScoreEntry {
        ScoreEntry {
            player_id: self.player_id,
            nickname: self.nickname.clone(),
            score: self.score,
        }
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            player_id: self.player_id,
            nickname: self.nickname.clone(),
            turn_order: self.turn_order,
            hand_size: self.hand.len(),
            dinos: self.dinos.clone(),
            score: self.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dinoforge_cards::{CardDefinition, Element, Joints, PartType};

    fn head(id: u32) -> CardInPlay {
        CardInPlay::new(
            CardInstanceId(id),
            CardDefinition::head(1, 4, Element::Water, Joints::ALL),
        )
    }

    #[test]
    fn test_take_from_hand_removes_card() {
        let mut player = PlayerSession::new(PlayerId(1), "a", 0);
        player.add_to_hand(head(1));
        player.add_to_hand(head(2));

        let taken = player.take_from_hand(CardInstanceId(1)).unwrap();

        assert_eq!(taken.instance_id, CardInstanceId(1));
        assert_eq!(player.hand_size(), 1);
        assert!(player.take_from_hand(CardInstanceId(1)).is_none());
    }

    #[test]
    fn test_add_dino_ids_are_sequential() {
        let mut player = PlayerSession::new(PlayerId(1), "a", 0);
        assert_eq!(player.add_dino(head(1)).unwrap(), DinoId(1));
        assert_eq!(player.add_dino(head(2)).unwrap(), DinoId(2));
        assert_eq!(player.total_dino_power(), 8);
    }

    #[test]
    fn test_add_dino_rejected_does_not_burn_id() {
        let mut player = PlayerSession::new(PlayerId(1), "a", 0);
        let torso = CardInPlay::new(
            CardInstanceId(5),
            CardDefinition::body(2, 1, PartType::Torso, Joints::ALL),
        );
        assert!(player.add_dino(torso).is_err());
        assert_eq!(player.add_dino(head(1)).unwrap(), DinoId(1));
    }

    #[test]
    fn test_into_cards_collects_hand_and_dinos() {
        let mut player = PlayerSession::new(PlayerId(1), "a", 0);
        player.add_dino(head(1)).unwrap();
        player.add_to_hand(head(2));
        assert_eq!(player.card_count(), 2);
        assert_eq!(player.into_cards().len(), 2);
    }
}
