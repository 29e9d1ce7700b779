//! Identity types and the snapshots that travel inside events.
//!
//! Everything here is plain serializable data. None of it knows about
//! locks or registries; the match and lobby layers build these views from
//! their own state when they need to tell clients something.

use std::fmt;

use dinoforge_cards::{CardInPlay, Dino, Element};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// Registered accounts have positive ids. Guests get a synthetic
/// negative id when they join a lobby, and `0` means "no account". Both
/// count as guests: [`PlayerId::is_guest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub i64);

impl PlayerId {
    /// Returns `true` for ids that don't belong to a registered account.
    pub fn is_guest(self) -> bool {
        self.0 <= 0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who should receive an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Every subscriber of the match or lobby.
    All,

    /// One specific player.
    Player(PlayerId),

    /// Everyone except the given player.
    AllExcept(PlayerId),
}

impl Recipient {
    /// Returns `true` if `player` is addressed by this recipient.
    pub fn includes(self, player: PlayerId) -> bool {
        match self {
            Self::All => true,
            Self::Player(p) => p == player,
            Self::AllExcept(p) => p != player,
        }
    }
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// One seat handed from a lobby to a new match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub user_id: PlayerId,
    pub nickname: String,
}

impl RosterEntry {
    pub fn new(user_id: PlayerId, nickname: impl Into<String>) -> Self {
        Self {
            user_id,
            nickname: nickname.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Match views
// ---------------------------------------------------------------------------

/// Where a drawn or retrieved card ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum CardDestination {
    Hand,
    Board,
    Discard,
}

/// One line of the scoreboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub player_id: PlayerId,
    pub nickname: String,
    pub score: u32,
}

/// One element's army pile on the central board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmyView {
    pub element: Element,
    pub cards: Vec<CardInPlay>,
    pub power: u32,
}

/// The central board: three armies plus the boss slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardView {
    pub armies: Vec<ArmyView>,
    pub supreme_boss: Option<CardInPlay>,
}

/// Public information about one player. Hands are only counted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub player_id: PlayerId,
    pub nickname: String,
    pub turn_order: usize,
    pub hand_size: usize,
    pub dinos: Vec<Dino>,
    pub score: u32,
}

/// Public state of a match at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub match_code: String,
    pub players: Vec<PlayerView>,
    pub current_turn: Option<PlayerId>,
    pub turn_number: u32,
    pub remaining_moves: u32,
    pub draw_pile_sizes: Vec<usize>,
    pub discard_pile: Vec<CardInPlay>,
    pub board: BoardView,
}

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum EndType {
    /// A terminal condition was reached through play.
    Completed,
    /// Stopped early (players left, administrative abort).
    Aborted,
}

impl fmt::Display for EndType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "Completed"),
            Self::Aborted => write!(f, "Aborted"),
        }
    }
}

/// The outcome of a finished match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_code: String,
    pub end_type: EndType,
    pub winner: Option<PlayerId>,
    pub scores: Vec<ScoreEntry>,
    pub reason: String,
}

impl MatchResult {
    /// A no-winner, zero-point result for an aborted match.
    pub fn aborted(
        match_code: impl Into<String>,
        players: &[(PlayerId, String)],
        reason: impl Into<String>,
    ) -> Self {
        Self {
            match_code: match_code.into(),
            end_type: EndType::Aborted,
            winner: None,
            scores: players
                .iter()
                .map(|(player_id, nickname)| ScoreEntry {
                    player_id: *player_id,
                    nickname: nickname.clone(),
                    score: 0,
                })
                .collect(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if at least one participant has a registered account.
    pub fn has_registered_player(&self) -> bool {
        self.scores.iter().any(|s| !s.player_id.is_guest())
    }
}

// ---------------------------------------------------------------------------
// Lobby views
// ---------------------------------------------------------------------------

/// One seat in a lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyPlayerView {
    pub player_id: PlayerId,
    pub nickname: String,
    pub ready: bool,
    pub is_host: bool,
}

/// Public state of a lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyView {
    pub code: String,
    pub host: PlayerId,
    pub max_players: usize,
    pub is_private: bool,
    pub players: Vec<LobbyPlayerView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&PlayerId(-42)).unwrap();
        assert_eq!(json, "-42");
    }

    #[test]
    fn test_player_id_display() {
        assert_eq!(PlayerId(7).to_string(), "P-7");
    }

    #[test]
    fn test_player_id_is_guest_boundary() {
        assert!(PlayerId(-3).is_guest());
        assert!(PlayerId(0).is_guest());
        assert!(!PlayerId(1).is_guest());
    }

    #[test]
    fn test_recipient_includes() {
        let p1 = PlayerId(1);
        let p2 = PlayerId(2);
        assert!(Recipient::All.includes(p1));
        assert!(Recipient::Player(p1).includes(p1));
        assert!(!Recipient::Player(p1).includes(p2));
        assert!(!Recipient::AllExcept(p1).includes(p1));
        assert!(Recipient::AllExcept(p1).includes(p2));
    }

    #[test]
    fn test_aborted_result_has_no_winner_and_zero_points() {
        let players = vec![(PlayerId(1), "a".to_string()), (PlayerId(2), "b".to_string())];
        let result = MatchResult::aborted("M1", &players, "host left");
        assert_eq!(result.end_type, EndType::Aborted);
        assert_eq!(result.winner, None);
        assert!(result.scores.iter().all(|s| s.score == 0));
    }

    #[test]
    fn test_has_registered_player_ignores_guests() {
        let guests = vec![(PlayerId(-5), "g".to_string()), (PlayerId(0), "h".to_string())];
        assert!(!MatchResult::aborted("M", &guests, "").has_registered_player());

        let mixed = vec![(PlayerId(-5), "g".to_string()), (PlayerId(9), "r".to_string())];
        assert!(MatchResult::aborted("M", &mixed, "").has_registered_player());
    }

    #[test]
    fn test_end_type_serializes_as_pascal_case() {
        let json = serde_json::to_string(&EndType::Aborted).unwrap();
        assert_eq!(json, "\"Aborted\"");
    }
}
