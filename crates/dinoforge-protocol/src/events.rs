//! Push events delivered to connected clients.
//!
//! `#[serde(tag = "type")]` keeps the JSON flat:
//! `{ "type": "TurnChanged", "next_player": 2, ... }`.

use dinoforge_cards::{CardInPlay, CardInstanceId, DinoId, DinoSlot, Element};
use serde::{Deserialize, Serialize};

use crate::{CardDestination, LobbyView, MatchResult, MatchSnapshot, PlayerId, ScoreEntry};

/// Events emitted by a running match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MatchEvent {
    /// Sent to each player individually when the match is created. Carries
    /// the public snapshot plus that player's own hand.
    Initialized {
        snapshot: MatchSnapshot,
        hand: Vec<CardInPlay>,
    },

    /// The first turn has begun.
    Started {
        first_player: PlayerId,
        turn_number: u32,
    },

    TurnChanged {
        next_player: PlayerId,
        turn_number: u32,
        scoreboard: Vec<ScoreEntry>,
    },

    CardDrawn {
        player: PlayerId,
        pile_index: usize,
        card: CardInPlay,
        destination: CardDestination,
    },

    DinoPlayed {
        player: PlayerId,
        dino_id: DinoId,
        head: CardInPlay,
        power: u32,
    },

    BodyPartAttached {
        player: PlayerId,
        dino_id: DinoId,
        card: CardInPlay,
        slot: DinoSlot,
        power: u32,
    },

    /// An army unit joined the central board.
    ArchAdded {
        card: CardInPlay,
        element: Element,
        army_power: u32,
    },

    CardExchanged {
        player: PlayerId,
        target: PlayerId,
        given: CardInstanceId,
        received: CardInstanceId,
    },

    CardTakenFromDiscard {
        player: PlayerId,
        card: CardInPlay,
        destination: CardDestination,
    },

    ProvokeResolved {
        player: PlayerId,
        army: Element,
        dino_power: u32,
        army_power: u32,
        victory: bool,
        points: u32,
        score: u32,
    },

    GameEnded {
        result: MatchResult,
    },

    /// A player left or was dropped from the match.
    PlayerLeft {
        player: PlayerId,
        remaining: Vec<PlayerId>,
    },
}

/// Events emitted by a lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LobbyEvent {
    /// Someone joined, left, readied up or became host.
    RosterUpdated { lobby: LobbyView },

    /// Sent to the expelled player before their subscription is dropped.
    PlayerKicked { player: PlayerId, reason: String },

    /// The match is initialized; clients should switch over.
    GameStarting { match_code: String },
}
