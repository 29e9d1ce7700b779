//! Error types for the match layer.

use dinoforge_cards::{AssemblyError, CardInstanceId, DinoId, PartType};
use dinoforge_protocol::PlayerId;

use crate::MatchState;

/// Errors surfaced by [`GameLogic`](crate::GameLogic) operations.
///
/// Each state error has its own variant so callers can render specific
/// feedback without parsing messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// A required argument was missing or blank.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No live match has this code.
    #[error("match {0} not found")]
    SessionNotFound(String),

    /// The match exists but isn't accepting actions.
    #[error("match {code} is not active (state {state})")]
    NotActive { code: String, state: MatchState },

    /// The player isn't part of this match.
    #[error("player {0} not found in match")]
    PlayerNotFound(PlayerId),

    #[error("it is not player {0}'s turn")]
    NotYourTurn(PlayerId),

    #[error("player {0} has no moves remaining this turn")]
    NoMovesRemaining(PlayerId),

    #[error("card {0} not found")]
    CardNotFound(CardInstanceId),

    #[error("dino {0} not found")]
    DinoNotFound(DinoId),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    /// Exchanged cards must share a part type.
    #[error("cannot exchange a {offered} for a {requested}")]
    CardTypeMismatch {
        offered: PartType,
        requested: PartType,
    },

    #[error("draw pile {0} does not exist")]
    InvalidPile(usize),

    #[error("draw pile {0} is empty")]
    PileEmpty(usize),

    /// Provoking needs at least one dino.
    #[error("player {0} has no dinos to provoke with")]
    NoDinos(PlayerId),

    /// Roster size outside the accepted range.
    #[error("a match needs {min}-{max} players, got {got}")]
    InvalidRoster { got: usize, min: usize, max: usize },

    #[error("player {0} appears twice in the roster")]
    DuplicatePlayer(PlayerId),

    #[error("match {0} already exists")]
    DuplicateMatch(String),

    /// The operation is not valid in the current situation (e.g. ending a
    /// match whose end conditions aren't met).
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// The session could not be built; nothing was left registered.
    #[error("match initialization failed: {0}")]
    Initialization(String),
}
