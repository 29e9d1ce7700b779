//! Shared vocabulary for Dinoforge.
//!
//! This crate defines what the match and lobby layers tell the outside
//! world:
//!
//! - **Identity** ([`PlayerId`]) and addressing ([`Recipient`])
//! - **Views** ([`MatchSnapshot`], [`LobbyView`], [`MatchResult`], ...)
//! - **Events** ([`MatchEvent`], [`LobbyEvent`]) pushed to subscribers
//!
//! It has no opinion on transport. The hosting layer decides how events
//! are framed and sent.

mod events;
mod types;

pub use events::{LobbyEvent, MatchEvent};
pub use types::{
    ArmyView, BoardView, CardDestination, EndType, LobbyPlayerView, LobbyView, MatchResult,
    MatchSnapshot, PlayerId, PlayerView, Recipient, RosterEntry, ScoreEntry,
};
