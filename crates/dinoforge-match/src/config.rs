//! Match configuration and lifecycle state machine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MatchConfig
// ---------------------------------------------------------------------------

/// Rules knobs for every match created by one [`GameLogic`](crate::GameLogic).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Actions a player may take per turn.
    pub max_moves: u32,

    /// Number of shared draw piles the deck is split into.
    pub draw_pile_count: usize,

    /// Body-part cards dealt to each player at the start.
    pub initial_hand_size: usize,

    /// Extra points for beating an army whose element matches the
    /// supreme boss on the board.
    pub supreme_boss_bonus: u32,

    /// Smallest roster a match accepts.
    pub min_players: usize,

    /// Largest roster a match accepts.
    pub max_players: usize,

    /// First score that ends the match. `None` means the match only ends
    /// when the draw piles run out.
    pub winning_score: Option<u32>,

    /// Seed for deck shuffles. `None` draws from the OS.
    pub rng_seed: Option<u64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_moves: 3,
            draw_pile_count: 3,
            initial_hand_size: 5,
            supreme_boss_bonus: 3,
            min_players: 2,
            max_players: 4,
            winning_score: None,
            rng_seed: None,
        }
    }
}

// ---------------------------------------------------------------------------
// MatchState
// ---------------------------------------------------------------------------

/// The lifecycle state of a match.
///
/// ```text
/// NotStarted → InProgress → Finished
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchState {
    NotStarted,
    InProgress,
    Finished,
}

impl MatchState {
    /// Returns `true` while players can act.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress)
    }

    pub fn next(self) -> Option<Self> {
        match self {
            Self::NotStarted => Some(Self::InProgress),
            Self::InProgress => Some(Self::Finished),
            Self::Finished => None,
        }
    }

    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }
}

impl std::fmt::Display for MatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "NotStarted"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_state_next_follows_strict_order() {
        assert_eq!(MatchState::NotStarted.next(), Some(MatchState::InProgress));
        assert_eq!(MatchState::InProgress.next(), Some(MatchState::Finished));
        assert_eq!(MatchState::Finished.next(), None);
    }

    #[test]
    fn test_match_state_can_transition_to() {
        assert!(MatchState::NotStarted.can_transition_to(MatchState::InProgress));
        assert!(!MatchState::NotStarted.can_transition_to(MatchState::Finished));
        assert!(!MatchState::Finished.can_transition_to(MatchState::InProgress));
    }

    #[test]
    fn test_match_state_is_active() {
        assert!(!MatchState::NotStarted.is_active());
        assert!(MatchState::InProgress.is_active());
        assert!(!MatchState::Finished.is_active());
    }

    #[test]
    fn test_match_config_default() {
        let config = MatchConfig::default();
        assert_eq!(config.max_moves, 3);
        assert_eq!(config.min_players, 2);
        assert_eq!(config.max_players, 4);
        assert_eq!(config.winning_score, None);
    }
}
