//! Lobbies for Dinoforge.
//!
//! A lobby gathers players before a match. The host opens it, others
//! join with the generated code, and the host starts the game. After a
//! short settle delay the roster is handed to the match layer through
//! [`MatchStarter`] and the lobby disappears.
//!
//! ```text
//! create ──► join / ready / kick / disconnect ──► start ──(settle)──► InitializeMatch
//!                    ▲                               │
//!                    └──────── reopen on failure ────┘
//! ```

mod code;
mod config;
mod error;
mod lobby;
mod logic;

pub use code::{CODE_ALPHABET, generate_code, guest_id};
pub use config::{LobbyConfig, LobbyState};
pub use error::LobbyError;
pub use lobby::{Departure, Lobby, LobbySeat};
pub use logic::{LobbyLogic, LobbySettings, MatchStarter};
