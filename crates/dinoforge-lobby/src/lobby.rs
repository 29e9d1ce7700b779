//! The lobby aggregate.

use dinoforge_protocol::{LobbyPlayerView, LobbyView, PlayerId, RosterEntry};

use crate::{LobbyError, LobbyState};

/// One seated player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbySeat {
    pub player_id: PlayerId,
    pub nickname: String,
    pub ready: bool,
}

/// A player leaving, and who holds the host seat afterwards if it moved.
#[derive(Debug, Clone)]
pub struct Departure {
    pub seat: LobbySeat,
    pub new_host: Option<PlayerId>,
}

/// A pre-match room. Seats are kept in join order; the host is always
/// one of them.
#[derive(Debug)]
pub struct Lobby {
    code: String,
    host: PlayerId,
    seats: Vec<LobbySeat>,
    max_players: usize,
    is_private: bool,
    state: LobbyState,
}

impl Lobby {
    /// Creates an open lobby with the host already seated.
    pub fn new(
        code: impl Into<String>,
        host: PlayerId,
        host_nickname: impl Into<String>,
        max_players: usize,
        is_private: bool,
    ) -> Self {
        Self {
            code: code.into(),
            host,
            seats: vec![LobbySeat {
                player_id: host,
                nickname: host_nickname.into(),
                ready: false,
            }],
            max_players,
            is_private,
            state: LobbyState::Open,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn host(&self) -> PlayerId {
        self.host
    }

    pub fn state(&self) -> LobbyState {
        self.state
    }

    pub fn is_private(&self) -> bool {
        self.is_private
    }

    pub fn seats(&self) -> &[LobbySeat] {
        &self.seats
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.seats.len() >= self.max_players
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.seats.iter().any(|s| s.player_id == player)
    }

    /// Seats a new player.
    pub fn seat(
        &mut self,
        player: PlayerId,
        nickname: impl Into<String>,
    ) -> Result<(), LobbyError> {
        if !self.state.is_joinable() {
            return Err(LobbyError::AlreadyStarting(self.code.clone()));
        }
        if self.contains(player) {
            return Err(LobbyError::AlreadyInLobby(player));
        }
        if self.is_full() {
            return Err(LobbyError::Full(self.code.clone()));
        }
        self.seats.push(LobbySeat {
            player_id: player,
            nickname: nickname.into(),
            ready: false,
        });
        Ok(())
    }

    /// Unseats a player. If the host leaves and anyone remains, the next
    /// seat in join order becomes host.
    pub fn remove(&mut self, player: PlayerId) -> Result<Departure, LobbyError> {
        let index = self
            .seats
            .iter()
            .position(|s| s.player_id == player)
            .ok_or(LobbyError::PlayerNotFound(player))?;
        let seat = self.seats.remove(index);

        let new_host = if player == self.host {
            self.seats.first().map(|next| next.player_id)
        } else {
            None
        };
        if let Some(next) = new_host {
            self.host = next;
        }
        Ok(Departure { seat, new_host })
    }

    pub fn set_ready(&mut self, player: PlayerId, ready: bool) -> Result<(), LobbyError> {
        let seat = self
            .seats
            .iter_mut()
            .find(|s| s.player_id == player)
            .ok_or(LobbyError::PlayerNotFound(player))?;
        seat.ready = ready;
        Ok(())
    }

    /// Fails unless `player` is seated and holds the host seat.
    pub fn ensure_host(&self, player: PlayerId) -> Result<(), LobbyError> {
        if !self.contains(player) {
            return Err(LobbyError::PlayerNotFound(player));
        }
        if player != self.host {
            return Err(LobbyError::NotAuthorized(player));
        }
        Ok(())
    }

    /// Removes `target` on behalf of the host.
    pub fn kick(&mut self, requester: PlayerId, target: PlayerId) -> Result<LobbySeat, LobbyError> {
        self.ensure_host(requester)?;
        if target == self.host {
            return Err(LobbyError::CannotKickHost);
        }
        Ok(self.remove(target)?.seat)
    }

    /// Enters the settle phase.
    pub fn begin_start(
        &mut self,
        requester: PlayerId,
        min_players: usize,
    ) -> Result<(), LobbyError> {
        self.ensure_host(requester)?;
        if self.state == LobbyState::Starting {
            return Err(LobbyError::AlreadyStarting(self.code.clone()));
        }
        if self.seats.len() < min_players {
            return Err(LobbyError::NotEnoughPlayers {
                needed: min_players,
                present: self.seats.len(),
            });
        }
        self.state = LobbyState::Starting;
        Ok(())
    }

    /// Back to `Open` after an aborted start.
    pub fn reopen(&mut self) {
        if self.state.can_transition_to(LobbyState::Open) {
            self.state = LobbyState::Open;
        }
    }

    pub fn close(&mut self) {
        self.state = LobbyState::Closed;
    }

    /// Seated players in join order, as handed to the match layer.
    pub fn roster(&self) -> Vec<RosterEntry> {
        self.seats
            .iter()
            .map(|s| RosterEntry::new(s.player_id, s.nickname.clone()))
            .collect()
    }

    pub fn view(&self) -> LobbyView {
        LobbyView {
            code: self.code.clone(),
            host: self.host,
            max_players: self.max_players,
            is_private: self.is_private,
            players: self
                .seats
                .iter()
                .map(|s| LobbyPlayerView {
                    player_id: s.player_id,
                    nickname: s.nickname.clone(),
                    ready: s.ready,
                    is_host: s.player_id == self.host,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lobby() -> Lobby {
        Lobby::new("ABC12", PlayerId(100), "host", 3, false)
    }

    #[test]
    fn test_seat_rejects_duplicate_and_full() {
        let mut lobby = lobby();
        lobby.seat(PlayerId(2), "b").unwrap();
        assert_eq!(lobby.seat(PlayerId(2), "b"), Err(LobbyError::AlreadyInLobby(PlayerId(2))));
        lobby.seat(PlayerId(3), "c").unwrap();
        assert_eq!(lobby.seat(PlayerId(4), "d"), Err(LobbyError::Full("ABC12".into())));
    }

    #[test]
    fn test_remove_host_migrates_to_next_seat() {
        let mut lobby = lobby();
        lobby.seat(PlayerId(2), "b").unwrap();
        lobby.seat(PlayerId(3), "c").unwrap();

        let departure = lobby.remove(PlayerId(100)).unwrap();

        assert_eq!(departure.new_host, Some(PlayerId(2)));
        assert_eq!(lobby.host(), PlayerId(2));
        assert!(!lobby.contains(PlayerId(100)));
    }

    #[test]
    fn test_kick_requires_host() {
        let mut lobby = lobby();
        lobby.seat(PlayerId(2), "b").unwrap();
        lobby.seat(PlayerId(3), "c").unwrap();

        assert_eq!(
            lobby.kick(PlayerId(2), PlayerId(3)),
            Err(LobbyError::NotAuthorized(PlayerId(2)))
        );
        assert_eq!(lobby.kick(PlayerId(100), PlayerId(100)), Err(LobbyError::CannotKickHost));
        assert_eq!(
            lobby.kick(PlayerId(100), PlayerId(9)),
            Err(LobbyError::PlayerNotFound(PlayerId(9)))
        );
        assert!(lobby.kick(PlayerId(100), PlayerId(3)).is_ok());
    }

    #[test]
    fn test_begin_start_debounces() {
        let mut lobby = lobby();
        assert_eq!(
            lobby.begin_start(PlayerId(100), 2),
            Err(LobbyError::NotEnoughPlayers { needed: 2, present: 1 })
        );
        lobby.seat(PlayerId(2), "b").unwrap();
        lobby.begin_start(PlayerId(100), 2).unwrap();

        assert_eq!(
            lobby.begin_start(PlayerId(100), 2),
            Err(LobbyError::AlreadyStarting("ABC12".into()))
        );
        assert!(lobby.seat(PlayerId(3), "c").is_err());

        lobby.reopen();
        assert_eq!(lobby.state(), LobbyState::Open);
    }
}
