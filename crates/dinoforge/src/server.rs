//! `DinoServer` builder and shutdown.
//!
//! Wires one [`LobbyLogic`] to one [`GameLogic`] so that a lobby start
//! hands its roster straight to the match layer.

use std::sync::Arc;

use dinoforge_cards::DeckSource;
use dinoforge_lobby::{LobbyConfig, LobbyLogic};
use dinoforge_match::{GameLogic, MatchConfig, NoStatistics, StatisticsSink};
use dinoforge_protocol::EndType;

use crate::DinoforgeError;

/// Reason recorded on matches aborted by [`DinoServer::shutdown`].
pub const SHUTDOWN_REASON: &str = "server shutting down";

/// Builder for configuring a Dinoforge server.
///
/// # Example
///
/// ```rust,ignore
/// use dinoforge::prelude::*;
///
/// let server = DinoServer::builder()
///     .match_config(MatchConfig { max_moves: 2, ..Default::default() })
///     .statistics(my_sink)
///     .build()?;
/// let lobby = server.lobbies().create_lobby(settings).await?;
/// ```
pub struct DinoServerBuilder<S = NoStatistics> {
    match_config: MatchConfig,
    lobby_config: LobbyConfig,
    statistics: S,
    decks: Option<Arc<dyn DeckSource>>,
}

impl DinoServerBuilder<NoStatistics> {
    /// Creates a new builder with default settings and no statistics.
    pub fn new() -> Self {
        Self {
            match_config: MatchConfig::default(),
            lobby_config: LobbyConfig::default(),
            statistics: NoStatistics,
            decks: None,
        }
    }
}

impl<S: StatisticsSink> DinoServerBuilder<S> {
    pub fn match_config(mut self, config: MatchConfig) -> Self {
        self.match_config = config;
        self
    }

    pub fn lobby_config(mut self, config: LobbyConfig) -> Self {
        self.lobby_config = config;
        self
    }

    /// Replaces the shuffled standard deck.
    pub fn deck_source(mut self, decks: impl DeckSource) -> Self {
        self.decks = Some(Arc::new(decks));
        self
    }

    /// Sets where finished match results are persisted.
    pub fn statistics<T: StatisticsSink>(self, statistics: T) -> DinoServerBuilder<T> {
        DinoServerBuilder {
            match_config: self.match_config,
            lobby_config: self.lobby_config,
            statistics,
            decks: self.decks,
        }
    }

    /// Validates the configuration and wires the two layers together.
    ///
    /// Every lobby size the lobby layer can start must be a roster the
    /// match layer accepts.
    pub fn build(self) -> Result<DinoServer<S>, DinoforgeError> {
        let (lobby, matches) = (&self.lobby_config, &self.match_config);
        if lobby.min_players > lobby.max_players {
            return Err(DinoforgeError::Config(format!(
                "lobby min_players {} exceeds max_players {}",
                lobby.min_players, lobby.max_players
            )));
        }
        if lobby.min_players < matches.min_players || lobby.max_players > matches.max_players {
            return Err(DinoforgeError::Config(format!(
                "lobby sizes {}-{} fall outside match sizes {}-{}",
                lobby.min_players, lobby.max_players, matches.min_players, matches.max_players
            )));
        }
        if lobby.code_length == 0 {
            return Err(DinoforgeError::Config("lobby code_length must be positive".into()));
        }

        let mut games = GameLogic::with_statistics(self.match_config, self.statistics);
        if let Some(decks) = self.decks {
            games = games.with_deck_source(decks);
        }
        let games = Arc::new(games);
        let lobbies = Arc::new(LobbyLogic::new(self.lobby_config, Arc::clone(&games)));

        tracing::info!("dinoforge server ready");
        Ok(DinoServer { games, lobbies })
    }
}

impl Default for DinoServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The lobby and match layers of one process.
pub struct DinoServer<S = NoStatistics> {
    games: Arc<GameLogic<S>>,
    lobbies: Arc<LobbyLogic<GameLogic<S>>>,
}

impl DinoServer<NoStatistics> {
    /// Creates a new builder.
    pub fn builder() -> DinoServerBuilder {
        DinoServerBuilder::new()
    }
}

impl<S: StatisticsSink> DinoServer<S> {
    pub fn games(&self) -> &Arc<GameLogic<S>> {
        &self.games
    }

    pub fn lobbies(&self) -> &Arc<LobbyLogic<GameLogic<S>>> {
        &self.lobbies
    }

    /// Aborts every live match and drops every open lobby.
    ///
    /// Returns the number of matches aborted. A match that finishes on its
    /// own while this runs is skipped.
    pub async fn shutdown(&self) -> usize {
        let mut aborted = 0;
        for code in self.games.sessions().codes() {
            match self.games.end_game(&code, EndType::Aborted, SHUTDOWN_REASON).await {
                Ok(_) => aborted += 1,
                Err(e) => {
                    tracing::debug!(
                        match_code = %code,
                        error = %e,
                        "match already gone at shutdown"
                    );
                }
            }
        }

        for code in self.lobbies.lobbies().codes() {
            if let Some(lobby) = self.lobbies.lobbies().remove(&code) {
                lobby.lock().await.close();
            }
            self.lobbies.callbacks().clear(&code);
        }

        tracing::info!(aborted, "dinoforge server shut down");
        aborted
    }
}
