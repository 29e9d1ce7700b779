//! The match aggregate and its turn/move state machine.
//!
//! A [`MatchSession`] is always accessed through the lock held by the
//! registry, so every method here takes `&mut self` and runs to
//! completion without suspending. Actions return the events they produced
//! as `(Recipient, MatchEvent)` pairs; the orchestrator delivers them once
//! the lock is released.

use std::collections::VecDeque;

use dinoforge_cards::{CardDefinition, CardInPlay, CardInstanceId, DinoId, Element};
use dinoforge_protocol::{
    CardDestination, EndType, MatchEvent, MatchSnapshot, PlayerId, Recipient, RosterEntry,
    ScoreEntry,
};

use crate::board::{CentralBoard, Placement};
use crate::player::PlayerSession;
use crate::rules::RulesValidator;
use crate::{MatchConfig, MatchError, MatchState};

/// Events produced by one session mutation, paired with their audience.
pub type Outbound = Vec<(Recipient, MatchEvent)>;

/// How much of the turn budget an action uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveCost {
    One,
    /// Turn-ending actions (provoke, discard take).
    All,
}

/// Offer one of your cards for one of the same part type from another hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeRequest {
    pub offered: CardInstanceId,
    pub target: PlayerId,
    pub requested: CardInstanceId,
}

/// Full state of one match.
#[derive(Debug)]
pub struct MatchSession {
    match_code: String,
    state: MatchState,
    max_moves: u32,
    supreme_boss_bonus: u32,
    players: Vec<PlayerSession>,
    draw_piles: Vec<VecDeque<CardInPlay>>,
    discard_pile: Vec<CardInPlay>,
    board: CentralBoard,
    first_player: Option<PlayerId>,
    current_turn: Option<PlayerId>,
    turn_number: u32,
    remaining_moves: u32,
    end_type: Option<EndType>,
    end_reason: Option<String>,
}

impl MatchSession {
    /// Creates an empty session seated in roster order.
    pub fn new(
        match_code: impl Into<String>,
        roster: &[RosterEntry],
        config: &MatchConfig,
    ) -> Result<Self, MatchError> {
        RulesValidator::check_roster(roster, config)?;
        if config.draw_pile_count == 0 {
            return Err(MatchError::Initialization("draw_pile_count must be at least 1".into()));
        }
        if config.max_moves == 0 {
            return Err(MatchError::Initialization("max_moves must be at least 1".into()));
        }

        Ok(Self {
            match_code: match_code.into(),
            state: MatchState::NotStarted,
            max_moves: config.max_moves,
            supreme_boss_bonus: config.supreme_boss_bonus,
            players: roster
                .iter()
                .enumerate()
                .map(|(order, entry)| {
                    PlayerSession::new(entry.user_id, entry.nickname.clone(), order)
                })
                .collect(),
            draw_piles: vec![VecDeque::new(); config.draw_pile_count],
            discard_pile: Vec::new(),
            board: CentralBoard::new(),
            first_player: None,
            current_turn: None,
            turn_number: 0,
            remaining_moves: 0,
            end_type: None,
            end_reason: None,
        })
    }

    // -- Setup -----------------------------------------------------------

    /// Deals `hand_size` body-part cards to every player and splits the
    /// rest of the deck round-robin into the draw piles.
    ///
    /// Instance ids are assigned in deck order starting at 1.
    pub fn deal(&mut self, deck: Vec<CardDefinition>, hand_size: usize) -> Result<(), MatchError> {
        if self.state != MatchState::NotStarted {
            return Err(MatchError::Initialization(format!(
                "cannot deal a match in state {}",
                self.state
            )));
        }

        let seats = self.players.len();
        let to_deal = seats * hand_size;
        let mut dealt = 0;
        let mut rest = Vec::with_capacity(deck.len());

        for (i, definition) in deck.into_iter().enumerate() {
            let card = CardInPlay::new(CardInstanceId(i as u32 + 1), definition);
            if dealt < to_deal && !card.is_arch() {
                self.players[dealt % seats].add_to_hand(card);
                dealt += 1;
            } else {
                rest.push(card);
            }
        }

        if dealt < to_deal {
            return Err(MatchError::Initialization(format!(
                "deck has {dealt} body-part cards, {to_deal} needed for the opening hands"
            )));
        }

        let piles = self.draw_piles.len();
        for (i, card) in rest.into_iter().enumerate() {
            self.draw_piles[i % piles].push_back(card);
        }
        Ok(())
    }

    /// Moves the match into play and opens the first seat's turn.
    pub fn start(&mut self) -> Result<PlayerId, MatchError> {
        if !self.state.can_transition_to(MatchState::InProgress) {
            return Err(MatchError::Initialization(format!(
                "cannot start a match in state {}",
                self.state
            )));
        }
        let first = self
            .players
            .first()
            .map(|p| p.player_id)
            .ok_or_else(|| MatchError::Initialization("no players seated".into()))?;

        self.state = MatchState::InProgress;
        self.first_player = Some(first);
        self.start_turn(first);
        Ok(first)
    }

    /// The `Started` event of this match, or `None` before [`start`](Self::start).
    pub fn started_event(&self) -> Option<MatchEvent> {
        self.first_player.map(|first_player| MatchEvent::Started {
            first_player,
            turn_number: 1,
        })
    }

    // -- Turn state machine ---------------------------------------------

    /// The only place the turn holder, turn counter and move budget are set.
    fn start_turn(&mut self, player: PlayerId) {
        self.current_turn = Some(player);
        self.turn_number += 1;
        self.remaining_moves = self.max_moves;
    }

    /// Next seat after `order`, wrapping to the first.
    fn next_player_after(&self, order: usize) -> Option<PlayerId> {
        self.players
            .iter()
            .find(|p| p.turn_order > order)
            .or_else(|| self.players.first())
            .map(|p| p.player_id)
    }

    /// Ends the current turn and starts the next player's.
    pub fn end_turn(&mut self) -> Outbound {
        let Some(order) = self
            .current_turn
            .and_then(|id| self.player(id))
            .map(|p| p.turn_order)
        else {
            return Vec::new();
        };
        let Some(next) = self.next_player_after(order) else {
            return Vec::new();
        };
        self.start_turn(next);
        vec![(Recipient::All, self.turn_changed_event(next))]
    }

    fn turn_changed_event(&self, next_player: PlayerId) -> MatchEvent {
        MatchEvent::TurnChanged {
            next_player,
            turn_number: self.turn_number,
            scoreboard: self.scoreboard(),
        }
    }

    /// Spends one move of `player`'s turn.
    pub fn consume_move(&mut self, player: PlayerId) -> Result<(), MatchError> {
        RulesValidator::ensure_turn(self, player)?;
        if self.remaining_moves == 0 {
            return Err(MatchError::NoMovesRemaining(player));
        }
        self.remaining_moves -= 1;
        Ok(())
    }

    /// Gives back a move spent on an action that failed.
    pub fn restore_move(&mut self) {
        if self.remaining_moves < self.max_moves {
            self.remaining_moves += 1;
        }
    }

    pub fn consume_all_moves(&mut self) {
        self.remaining_moves = 0;
    }

    /// Runs one turn action for `player`.
    ///
    /// Checks the match is active and the caller holds the turn, spends a
    /// move, runs `action`, and restores the move if it fails. When the
    /// budget reaches zero the turn ends and a `TurnChanged` event is
    /// appended.
    pub fn perform<F>(
        &mut self,
        player: PlayerId,
        cost: MoveCost,
        action: F,
    ) -> Result<Outbound, MatchError>
    where
        F: FnOnce(&mut Self) -> Result<Outbound, MatchError>,
    {
        RulesValidator::ensure_active(self)?;
        RulesValidator::ensure_participant(self, player)?;
        self.consume_move(player)?;

        let mut events = match action(self) {
            Ok(events) => events,
            Err(e) => {
                self.restore_move();
                return Err(e);
            }
        };

        if cost == MoveCost::All {
            self.consume_all_moves();
        }
        if self.remaining_moves == 0 {
            events.extend(self.end_turn());
        }
        Ok(events)
    }

    // -- Actions ---------------------------------------------------------

    /// Takes the top card of a pile. Arch cards go to the board.
    pub fn draw_card(
        &mut self,
        player: PlayerId,
        pile_index: usize,
    ) -> Result<Outbound, MatchError> {
        RulesValidator::check_draw(self, pile_index)?;
        let card = self.draw_piles[pile_index]
            .pop_front()
            .ok_or(MatchError::PileEmpty(pile_index))?;

        if card.is_arch() {
            let (destination, mut events) = self.place_on_board(card);
            events.insert(
                0,
                (
                    Recipient::All,
                    MatchEvent::CardDrawn {
                        player,
                        pile_index,
                        card,
                        destination,
                    },
                ),
            );
            return Ok(events);
        }

        self.player_mut(player)?.add_to_hand(card);
        Ok(vec![(
            Recipient::All,
            MatchEvent::CardDrawn {
                player,
                pile_index,
                card,
                destination: CardDestination::Hand,
            },
        )])
    }

    /// Places an arch card, discarding it if the board refuses it.
    fn place_on_board(&mut self, card: CardInPlay) -> (CardDestination, Outbound) {
        match self.board.place(card) {
            Placement::Army(element) | Placement::Boss(element) => {
                let event = MatchEvent::ArchAdded {
                    card,
                    element,
                    army_power: self.board.army_power(element),
                };
                (CardDestination::Board, vec![(Recipient::All, event)])
            }
            Placement::Rejected(card) => {
                self.discard_pile.push(card);
                (CardDestination::Discard, Vec::new())
            }
        }
    }

    /// Swaps two same-type cards between hands. Nothing moves on error.
    pub fn exchange_card(
        &mut self,
        player: PlayerId,
        request: ExchangeRequest,
    ) -> Result<Outbound, MatchError> {
        RulesValidator::check_exchange(self, player, &request)?;

        let given = self
            .player_mut(player)?
            .take_from_hand(request.offered)
            .ok_or(MatchError::CardNotFound(request.offered))?;
        let received = match self.player_mut(request.target)?.take_from_hand(request.requested) {
            Some(card) => card,
            None => {
                self.player_mut(player)?.add_to_hand(given);
                return Err(MatchError::CardNotFound(request.requested));
            }
        };
        self.player_mut(request.target)?.add_to_hand(given);
        self.player_mut(player)?.add_to_hand(received);

        Ok(vec![(
            Recipient::All,
            MatchEvent::CardExchanged {
                player,
                target: request.target,
                given: request.offered,
                received: request.requested,
            },
        )])
    }

    /// Moves a card from the hand onto one of the player's dinos.
    pub fn attach_body_part(
        &mut self,
        player: PlayerId,
        dino_id: DinoId,
        card_id: CardInstanceId,
    ) -> Result<Outbound, MatchError> {
        RulesValidator::check_attach(self, player, dino_id, card_id)?;

        let me = self.player_mut(player)?;
        let card = me.take_from_hand(card_id).ok_or(MatchError::CardNotFound(card_id))?;
        let Some(dino) = me.dino_mut(dino_id) else {
            me.add_to_hand(card);
            return Err(MatchError::DinoNotFound(dino_id));
        };
        let slot = match dino.attach(card) {
            Ok(slot) => slot,
            Err(e) => {
                me.add_to_hand(card);
                return Err(e.into());
            }
        };
        let power = dino.total_power();

        Ok(vec![(
            Recipient::All,
            MatchEvent::BodyPartAttached {
                player,
                dino_id,
                card,
                slot,
                power,
            },
        )])
    }

    /// Starts a new dino from a head card in the hand.
    pub fn play_dino_head(
        &mut self,
        player: PlayerId,
        card_id: CardInstanceId,
    ) -> Result<Outbound, MatchError> {
        RulesValidator::check_play_head(self, player, card_id)?;

        let me = self.player_mut(player)?;
        let head = me.take_from_hand(card_id).ok_or(MatchError::CardNotFound(card_id))?;
        let dino_id = match me.add_dino(head) {
            Ok(id) => id,
            Err(e) => {
                me.add_to_hand(head);
                return Err(e.into());
            }
        };

        Ok(vec![(
            Recipient::All,
            MatchEvent::DinoPlayed {
                player,
                dino_id,
                head,
                power: head.power(),
            },
        )])
    }

    /// Pits the player's dinos against an army.
    ///
    /// Points are awarded when the dinos' power is at least the army's.
    /// Win or lose, the player's dinos and the army are discarded.
    pub fn provoke(&mut self, player: PlayerId, army: Element) -> Result<Outbound, MatchError> {
        RulesValidator::check_provoke(self, player)?;

        let army_power = self.board.army_power(army);
        let boss_bonus = if self.board.boss_matches(army) {
            self.supreme_boss_bonus
        } else {
            0
        };
        let bonus_points = army_power + boss_bonus;

        let me = self.player_mut(player)?;
        let dino_power = me.total_dino_power();
        let victory = dino_power >= army_power;
        let points = if victory { bonus_points } else { 0 };
        me.add_score(points);
        let score = me.score();
        let dino_cards = me.take_all_dino_cards();

        self.discard_pile.extend(dino_cards);
        let cleared = self.board.clear_army(army);
        self.discard_pile.extend(cleared.into_cards());

        Ok(vec![(
            Recipient::All,
            MatchEvent::ProvokeResolved {
                player,
                army,
                dino_power,
                army_power,
                victory,
                points,
                score,
            },
        )])
    }

    /// Moves a named card out of the discard pile.
    pub fn take_from_discard(
        &mut self,
        player: PlayerId,
        card_id: CardInstanceId,
    ) -> Result<Outbound, MatchError> {
        RulesValidator::check_take_from_discard(self, card_id)?;
        RulesValidator::ensure_participant(self, player)?;

        let pos = self
            .discard_pile
            .iter()
            .position(|c| c.instance_id == card_id)
            .ok_or(MatchError::CardNotFound(card_id))?;
        let card = self.discard_pile.remove(pos);

        let (destination, board_events) = if card.is_arch() {
            self.place_on_board(card)
        } else {
            self.player_mut(player)?.add_to_hand(card);
            (CardDestination::Hand, Vec::new())
        };

        let mut events = vec![(
            Recipient::All,
            MatchEvent::CardTakenFromDiscard {
                player,
                card,
                destination,
            },
        )];
        events.extend(board_events);
        Ok(events)
    }

    /// Drops a player, discarding everything they held.
    ///
    /// If they held the turn it passes to the next seat.
    pub fn remove_player(&mut self, player: PlayerId) -> Result<Outbound, MatchError> {
        let index = self
            .players
            .iter()
            .position(|p| p.player_id == player)
            .ok_or(MatchError::PlayerNotFound(player))?;
        let leaver = self.players.remove(index);
        let held_turn = self.current_turn == Some(player);
        let order = leaver.turn_order;
        self.discard_pile.extend(leaver.into_cards());

        let mut events = vec![(
            Recipient::All,
            MatchEvent::PlayerLeft {
                player,
                remaining: self.players.iter().map(|p| p.player_id).collect(),
            },
        )];

        if held_turn {
            match self.next_player_after(order) {
                Some(next) if self.state.is_active() => {
                    self.start_turn(next);
                    events.push((Recipient::All, self.turn_changed_event(next)));
                }
                _ => self.current_turn = None,
            }
        }
        Ok(events)
    }

    /// Marks the match finished. Returns `false` if it already was.
    pub fn finish(&mut self, end_type: EndType, reason: impl Into<String>) -> bool {
        if self.state == MatchState::Finished {
            return false;
        }
        self.state = MatchState::Finished;
        self.remaining_moves = 0;
        self.end_type = Some(end_type);
        self.end_reason = Some(reason.into());
        true
    }

    // -- Queries ---------------------------------------------------------

    pub fn match_code(&self) -> &str {
        &self.match_code
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn first_player(&self) -> Option<PlayerId> {
        self.first_player
    }

    pub fn current_turn(&self) -> Option<PlayerId> {
        self.current_turn
    }

    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    pub fn remaining_moves(&self) -> u32 {
        self.remaining_moves
    }

    pub fn max_moves(&self) -> u32 {
        self.max_moves
    }

    pub fn end_type(&self) -> Option<EndType> {
        self.end_type
    }

    pub fn end_reason(&self) -> Option<&str> {
        self.end_reason.as_deref()
    }

    pub fn players(&self) -> &[PlayerSession] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerSession> {
        self.players.iter().find(|p| p.player_id == id)
    }

    fn player_mut(&mut self, id: PlayerId) -> Result<&mut PlayerSession, MatchError> {
        self.players
            .iter_mut()
            .find(|p| p.player_id == id)
            .ok_or(MatchError::PlayerNotFound(id))
    }

    pub fn draw_pile_sizes(&self) -> Vec<usize> {
        self.draw_piles.iter().map(VecDeque::len).collect()
    }

    /// Returns `true` once no pile has a card left.
    pub fn piles_exhausted(&self) -> bool {
        self.draw_piles.iter().all(VecDeque::is_empty)
    }

    pub fn discard_pile(&self) -> &[CardInPlay] {
        &self.discard_pile
    }

    pub fn board(&self) -> &CentralBoard {
        &self.board
    }

    /// Scores in seat order.
    pub fn scoreboard(&self) -> Vec<ScoreEntry> {
        self.players.iter().map(PlayerSession::score_entry).collect()
    }

    /// `(id, nickname)` of every seated player.
    pub fn roster(&self) -> Vec<(PlayerId, String)> {
        self.players
            .iter()
            .map(|p| (p.player_id, p.nickname.clone()))
            .collect()
    }

    /// Every card the match owns, wherever it is.
    pub fn total_card_count(&self) -> usize {
        self.players.iter().map(PlayerSession::card_count).sum::<usize>()
            + self.draw_piles.iter().map(VecDeque::len).sum::<usize>()
            + self.discard_pile.len()
            + self.board.card_count()
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            match_code: self.match_code.clone(),
            players: self.players.iter().map(PlayerSession::view).collect(),
            current_turn: self.current_turn,
            turn_number: self.turn_number,
            remaining_moves: self.remaining_moves,
            draw_pile_sizes: self.draw_pile_sizes(),
            discard_pile: self.discard_pile.clone(),
            board: self.board.view(),
        }
    }
}
