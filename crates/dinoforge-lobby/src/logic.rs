//! `LobbyLogic`: room lifecycle up to the moment a match starts.

use std::future::Future;
use std::sync::Arc;

use dinoforge_match::{GameLogic, MatchError, StatisticsSink};
use dinoforge_protocol::{LobbyEvent, LobbyView, PlayerId, Recipient, RosterEntry};
use dinoforge_session::{CallbackRegistry, SessionRegistry, SharedSession, SubscriberHandle};

use crate::code::{generate_code, guest_id, needs_guest_id};
use crate::{Lobby, LobbyConfig, LobbyError};

/// Seam between lobbies and the match layer.
///
/// [`GameLogic`] implements it; tests substitute a recorder.
pub trait MatchStarter: Send + Sync + 'static {
    fn initialize_match(
        &self,
        match_code: &str,
        roster: Vec<RosterEntry>,
    ) -> impl Future<Output = Result<(), MatchError>> + Send;
}

impl<S: StatisticsSink> MatchStarter for GameLogic<S> {
    async fn initialize_match(
        &self,
        match_code: &str,
        roster: Vec<RosterEntry>,
    ) -> Result<(), MatchError> {
        GameLogic::initialize_match(self, match_code, roster).await
    }
}

/// What a host asks for when opening a lobby.
#[derive(Debug, Clone)]
pub struct LobbySettings {
    /// `None` or `PlayerId(0)` seats the host as a guest.
    pub host_id: Option<PlayerId>,
    pub host_nickname: String,
    pub max_players: usize,
    pub is_private: bool,
}

/// Runs every open lobby in the process.
pub struct LobbyLogic<M> {
    config: LobbyConfig,
    lobbies: Arc<SessionRegistry<Lobby>>,
    callbacks: Arc<CallbackRegistry<LobbyEvent>>,
    matches: Arc<M>,
}

impl<M: MatchStarter> LobbyLogic<M> {
    pub fn new(config: LobbyConfig, matches: Arc<M>) -> Self {
        Self {
            config,
            lobbies: Arc::new(SessionRegistry::new()),
            callbacks: Arc::new(CallbackRegistry::new()),
            matches,
        }
    }

    pub fn config(&self) -> &LobbyConfig {
        &self.config
    }

    pub fn matches(&self) -> &Arc<M> {
        &self.matches
    }

    pub fn lobbies(&self) -> &Arc<SessionRegistry<Lobby>> {
        &self.lobbies
    }

    pub fn callbacks(&self) -> &Arc<CallbackRegistry<LobbyEvent>> {
        &self.callbacks
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Opens a lobby under a fresh code with the host seated.
    pub async fn create_lobby(&self, settings: LobbySettings) -> Result<LobbyView, LobbyError> {
        require("host nickname", &settings.host_nickname)?;
        if settings.max_players < self.config.min_players
            || settings.max_players > self.config.max_players
        {
            return Err(LobbyError::InvalidArgument(format!(
                "max_players must be between {} and {}",
                self.config.min_players, self.config.max_players
            )));
        }
        let host = match settings.host_id {
            Some(id) if !needs_guest_id(Some(id)) => id,
            _ => guest_id(&settings.host_nickname),
        };

        for _ in 0..self.config.max_code_attempts {
            let code = generate_code(self.config.code_length);
            let lobby = Lobby::new(
                code.clone(),
                host,
                settings.host_nickname.clone(),
                settings.max_players,
                settings.is_private,
            );
            let view = lobby.view();
            if self.lobbies.create(&code, lobby).is_ok() {
                tracing::info!(lobby_code = %code, %host, "lobby created");
                return Ok(view);
            }
            tracing::debug!(lobby_code = %code, "lobby code collision, retrying");
        }
        Err(LobbyError::CodeGenerationFailed(self.config.max_code_attempts))
    }

    /// Seats a player and returns the id they were seated under.
    ///
    /// Players without an account get a negative guest id.
    pub async fn join_lobby(
        &self,
        lobby_code: &str,
        user_id: Option<PlayerId>,
        nickname: &str,
    ) -> Result<PlayerId, LobbyError> {
        require("lobby code", lobby_code)?;
        require("nickname", nickname)?;
        let max_attempts = self.config.max_code_attempts;

        let (player, view) = self
            .with_lobby(lobby_code, |lobby| {
                let player = match user_id {
                    Some(id) if !needs_guest_id(user_id) => id,
                    _ => (0..max_attempts)
                        .map(|_| guest_id(nickname))
                        .find(|id| !lobby.contains(*id))
                        .ok_or_else(|| {
                            LobbyError::InvalidArgument("could not derive a unique guest id".into())
                        })?,
                };
                lobby.seat(player, nickname)?;
                Ok((player, lobby.view()))
            })
            .await?;

        self.roster_updated(lobby_code, view);
        tracing::info!(%lobby_code, %player, "player joined lobby");
        Ok(player)
    }

    /// Subscribes a seated player and sends them the current roster.
    pub async fn connect_player(
        &self,
        lobby_code: &str,
        player: PlayerId,
        subscriber: SubscriberHandle<LobbyEvent>,
    ) -> Result<LobbyView, LobbyError> {
        require("lobby code", lobby_code)?;
        let view = self
            .with_lobby(lobby_code, |lobby| {
                if !lobby.contains(player) {
                    return Err(LobbyError::PlayerNotFound(player));
                }
                Ok(lobby.view())
            })
            .await?;

        self.callbacks.register(lobby_code, player, subscriber);
        self.callbacks
            .send_to(lobby_code, player, LobbyEvent::RosterUpdated { lobby: view.clone() });
        Ok(view)
    }

    /// Unseats a player. Migrates the host seat if needed and removes the
    /// lobby once nobody is left.
    pub async fn disconnect_player(
        &self,
        lobby_code: &str,
        player: PlayerId,
    ) -> Result<(), LobbyError> {
        require("lobby code", lobby_code)?;
        let shared = self.lobby(lobby_code)?;
        let (departure, view, emptied) = {
            let mut lobby = shared.lock().await;
            if lobby.state().is_closed() {
                return Err(LobbyError::NotFound(lobby_code.to_string()));
            }
            let departure = lobby.remove(player)?;
            let emptied = lobby.is_empty();
            if emptied {
                lobby.close();
            }
            (departure, lobby.view(), emptied)
        };

        self.callbacks.unregister(lobby_code, player);
        if emptied {
            self.lobbies.remove_if_same(lobby_code, &shared);
            self.callbacks.clear(lobby_code);
            tracing::info!(%lobby_code, "lobby emptied and removed");
            return Ok(());
        }

        if let Some(new_host) = departure.new_host {
            tracing::info!(%lobby_code, from = %player, to = %new_host, "host migrated");
        }
        self.roster_updated(lobby_code, view);
        Ok(())
    }

    pub async fn update_player_ready_status(
        &self,
        lobby_code: &str,
        player: PlayerId,
        ready: bool,
    ) -> Result<(), LobbyError> {
        require("lobby code", lobby_code)?;
        let view = self
            .with_lobby(lobby_code, |lobby| {
                lobby.set_ready(player, ready)?;
                Ok(lobby.view())
            })
            .await?;
        self.roster_updated(lobby_code, view);
        Ok(())
    }

    /// Removes `target` on the host's behalf. The target is told why
    /// before their subscription is dropped.
    pub async fn kick_player(
        &self,
        lobby_code: &str,
        host: PlayerId,
        target: PlayerId,
        reason: &str,
    ) -> Result<(), LobbyError> {
        require("lobby code", lobby_code)?;
        let view = self
            .with_lobby(lobby_code, |lobby| {
                lobby.kick(host, target)?;
                Ok(lobby.view())
            })
            .await?;

        self.callbacks.send_to(
            lobby_code,
            target,
            LobbyEvent::PlayerKicked {
                player: target,
                reason: reason.to_string(),
            },
        );
        self.callbacks.unregister(lobby_code, target);
        self.roster_updated(lobby_code, view);
        tracing::info!(%lobby_code, %target, "player kicked");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Start
    // -----------------------------------------------------------------------

    /// Starts a match from this lobby after the settle delay.
    ///
    /// The host's request moves the lobby into `Starting`; the delay runs
    /// without holding the lock and the player count is checked again
    /// afterwards. On success the lobby is handed over to the match layer
    /// under the same code and removed. On failure it reopens.
    pub async fn evaluate_game_start(
        &self,
        lobby_code: &str,
        requester: PlayerId,
    ) -> Result<(), LobbyError> {
        require("lobby code", lobby_code)?;
        let min_players = self.config.min_players;
        let shared = self.lobby(lobby_code)?;
        {
            let mut lobby = shared.lock().await;
            if lobby.state().is_closed() {
                return Err(LobbyError::NotFound(lobby_code.to_string()));
            }
            lobby.begin_start(requester, min_players)?;
        }
        tracing::info!(
            %lobby_code,
            delay = ?self.config.settle_delay,
            "lobby settling before start"
        );

        tokio::time::sleep(self.config.settle_delay).await;

        let roster = {
            let mut lobby = shared.lock().await;
            if lobby.state().is_closed() {
                return Err(LobbyError::NotFound(lobby_code.to_string()));
            }
            if lobby.len() < min_players {
                lobby.reopen();
                let view = lobby.view();
                let present = lobby.len();
                drop(lobby);
                self.roster_updated(lobby_code, view);
                tracing::info!(%lobby_code, present, "start cancelled, players left during settle");
                return Err(LobbyError::NotEnoughPlayers {
                    needed: min_players,
                    present,
                });
            }
            lobby.roster()
        };

        if let Err(e) = self.matches.initialize_match(lobby_code, roster).await {
            let view = {
                let mut lobby = shared.lock().await;
                lobby.reopen();
                lobby.view()
            };
            self.roster_updated(lobby_code, view);
            tracing::warn!(%lobby_code, error = %e, "match start failed, lobby reopened");
            return Err(e.into());
        }

        shared.lock().await.close();
        self.callbacks.broadcast(
            lobby_code,
            vec![(
                Recipient::All,
                LobbyEvent::GameStarting {
                    match_code: lobby_code.to_string(),
                },
            )],
        );
        self.lobbies.remove_if_same(lobby_code, &shared);
        self.callbacks.clear(lobby_code);
        tracing::info!(%lobby_code, "lobby promoted to match");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub async fn get_lobby_snapshot(&self, lobby_code: &str) -> Result<LobbyView, LobbyError> {
        require("lobby code", lobby_code)?;
        self.with_lobby(lobby_code, |lobby| Ok(lobby.view())).await
    }

    /// Open, non-private lobbies with a free seat.
    pub async fn public_lobbies(&self) -> Vec<LobbyView> {
        let mut views = Vec::new();
        for code in self.lobbies.codes() {
            let Some(shared) = self.lobbies.get(&code) else {
                continue;
            };
            let lobby = shared.lock().await;
            if !lobby.is_private() && lobby.state().is_joinable() && !lobby.is_full() {
                views.push(lobby.view());
            }
        }
        views
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn lobby(&self, lobby_code: &str) -> Result<SharedSession<Lobby>, LobbyError> {
        self.lobbies
            .get(lobby_code)
            .ok_or_else(|| LobbyError::NotFound(lobby_code.to_string()))
    }

    /// Locks a live lobby and runs `f` on it.
    async fn with_lobby<R, F>(&self, lobby_code: &str, f: F) -> Result<R, LobbyError>
    where
        F: FnOnce(&mut Lobby) -> Result<R, LobbyError> + Send,
    {
        let shared = self.lobby(lobby_code)?;
        let mut lobby = shared.lock().await;
        if lobby.state().is_closed() {
            return Err(LobbyError::NotFound(lobby_code.to_string()));
        }
        f(&mut lobby)
    }

    fn roster_updated(&self, lobby_code: &str, lobby: LobbyView) {
        self.callbacks
            .broadcast(lobby_code, vec![(Recipient::All, LobbyEvent::RosterUpdated { lobby })]);
    }
}

fn require(what: &str, value: &str) -> Result<(), LobbyError> {
    if value.trim().is_empty() {
        Err(LobbyError::InvalidArgument(format!("{what} must not be blank")))
    } else {
        Ok(())
    }
}
