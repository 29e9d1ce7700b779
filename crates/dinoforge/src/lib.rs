//! # Dinoforge
//!
//! Lobby and match orchestration for a multiplayer dino card game.
//!
//! Players gather in a lobby under a short code. When the host starts the
//! game the lobby hands its roster to the match layer, which deals the
//! deck, runs the turn machine and reports the result to a statistics
//! sink. Clients observe both layers through subscribers registered per
//! session.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dinoforge::prelude::*;
//!
//! # async fn run() -> Result<(), DinoforgeError> {
//! dinoforge::telemetry::init();
//! let server = DinoServer::builder().build()?;
//! let lobby = server
//!     .lobbies()
//!     .create_lobby(LobbySettings {
//!         host_id: Some(PlayerId(1)),
//!         host_nickname: "rex".into(),
//!         max_players: 4,
//!         is_private: false,
//!     })
//!     .await?;
//! server.lobbies().join_lobby(&lobby.code, Some(PlayerId(2)), "spike").await?;
//! server.lobbies().evaluate_game_start(&lobby.code, PlayerId(1)).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod server;
pub mod telemetry;

pub use dinoforge_cards as cards;
pub use dinoforge_lobby as lobby;
pub use dinoforge_match as game;
pub use dinoforge_protocol as protocol;
pub use dinoforge_session as session;

pub use error::DinoforgeError;
pub use server::{DinoServer, DinoServerBuilder, SHUTDOWN_REASON};

/// Everything a server embedding Dinoforge usually needs.
pub mod prelude {
    pub use crate::{DinoServer, DinoServerBuilder, DinoforgeError};
    pub use dinoforge_cards::{
        CardInstanceId, Catalogue, DeckSource, DinoId, Element, FixedDeck, ShuffledDeck,
    };
    pub use dinoforge_lobby::{LobbyConfig, LobbyError, LobbyLogic, LobbySettings};
    pub use dinoforge_match::{
        ExchangeRequest, GameLogic, MatchConfig, MatchError, NoStatistics, SaveResultCode,
        StatisticsError, StatisticsSink,
    };
    pub use dinoforge_protocol::{
        CardDestination, EndType, LobbyEvent, LobbyView, MatchEvent, MatchResult, MatchSnapshot,
        PlayerId, Recipient, RosterEntry,
    };
    pub use dinoforge_session::{SubscriberHandle, channel_subscriber};
}
