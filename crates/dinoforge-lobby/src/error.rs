//! Error types for the lobby layer.

use dinoforge_match::MatchError;
use dinoforge_protocol::PlayerId;

/// Errors surfaced by [`LobbyLogic`](crate::LobbyLogic) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LobbyError {
    /// A required argument was missing, blank or out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("lobby {0} not found")]
    NotFound(String),

    #[error("lobby {0} is full")]
    Full(String),

    /// The player isn't seated in this lobby.
    #[error("player {0} not in lobby")]
    PlayerNotFound(PlayerId),

    #[error("player {0} is already in the lobby")]
    AlreadyInLobby(PlayerId),

    /// Only the host may do this. Distinct from `PlayerNotFound` so
    /// clients can tell "who?" from "not allowed".
    #[error("player {0} is not the host")]
    NotAuthorized(PlayerId),

    #[error("the host cannot be kicked")]
    CannotKickHost,

    #[error("need at least {needed} players to start, have {present}")]
    NotEnoughPlayers { needed: usize, present: usize },

    /// A start is already counting down.
    #[error("lobby {0} is already starting")]
    AlreadyStarting(String),

    #[error("could not find a free lobby code after {0} attempts")]
    CodeGenerationFailed(usize),

    /// The match layer refused the roster.
    #[error(transparent)]
    MatchStart(#[from] MatchError),
}
