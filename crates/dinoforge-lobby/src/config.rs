//! Lobby configuration and state machine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LobbyConfig
// ---------------------------------------------------------------------------

/// Settings shared by every lobby of one [`LobbyLogic`](crate::LobbyLogic).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LobbyConfig {
    /// Wait between a start request and the match actually starting.
    /// Players may still leave during it.
    pub settle_delay: Duration,

    /// Characters in a generated lobby code.
    pub code_length: usize,

    /// Attempts at finding a free code before giving up.
    pub max_code_attempts: usize,

    /// Seated players required to start.
    pub min_players: usize,

    /// Upper bound a host may choose for `max_players`.
    pub max_players: usize,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(3),
            code_length: 5,
            max_code_attempts: 32,
            min_players: 2,
            max_players: 4,
        }
    }
}

// ---------------------------------------------------------------------------
// LobbyState
// ---------------------------------------------------------------------------

/// The lifecycle state of a lobby.
///
/// ```text
/// Open ⇄ Starting → Closed
///   └──────────────────┘ (emptied)
/// ```
///
/// A lobby returns to `Open` if its start fails. `Closed` is set under
/// the lock just before the lobby leaves the registry, so a caller still
/// holding the old handle sees it as gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LobbyState {
    /// Accepting joins, ready toggles and kicks.
    Open,
    /// Inside the settle delay. Joins and a second start are refused.
    Starting,
    /// Promoted into a match or emptied.
    Closed,
}

impl LobbyState {
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Open)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Open, Self::Starting)
                | (Self::Starting, Self::Open)
                | (Self::Open | Self::Starting, Self::Closed)
        )
    }
}

impl std::fmt::Display for LobbyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "Open"),
            Self::Starting => write!(f, "Starting"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}
