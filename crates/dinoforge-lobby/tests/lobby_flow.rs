//! Integration tests for `LobbyLogic` with a recording match starter.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use dinoforge_lobby::{
    CODE_ALPHABET, Lobby, LobbyConfig, LobbyError, LobbyLogic, LobbySettings, LobbyState,
    MatchStarter,
};
use dinoforge_match::{GameLogic, MatchConfig, MatchError};
use dinoforge_protocol::{LobbyEvent, PlayerId, RosterEntry};
use dinoforge_session::channel_subscriber;
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

/// Records every roster it is handed.
#[derive(Default)]
struct RecordingStarter {
    calls: Mutex<Vec<(String, Vec<RosterEntry>)>>,
    fail: bool,
}

impl RecordingStarter {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<(String, Vec<RosterEntry>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl MatchStarter for RecordingStarter {
    async fn initialize_match(
        &self,
        match_code: &str,
        roster: Vec<RosterEntry>,
    ) -> Result<(), MatchError> {
        self.calls.lock().unwrap().push((match_code.to_string(), roster));
        if self.fail {
            Err(MatchError::InvalidOperation("match layer unavailable".into()))
        } else {
            Ok(())
        }
    }
}

fn pid(id: i64) -> PlayerId {
    PlayerId(id)
}

fn logic_with(starter: RecordingStarter) -> Arc<LobbyLogic<RecordingStarter>> {
    Arc::new(LobbyLogic::new(LobbyConfig::default(), Arc::new(starter)))
}

/// Registers a lobby under a known code with the host seated.
fn seed_lobby<M: MatchStarter>(logic: &LobbyLogic<M>, code: &str, host: i64) {
    logic
        .lobbies()
        .create(code, Lobby::new(code, pid(host), "host", 4, false))
        .expect("code should be free");
}

async fn connect<M: MatchStarter>(
    logic: &LobbyLogic<M>,
    code: &str,
    player: PlayerId,
) -> mpsc::UnboundedReceiver<LobbyEvent> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    logic
        .connect_player(code, player, channel_subscriber(tx))
        .await
        .expect("connect should succeed");
    drain(&mut rx);
    rx
}

fn drain(rx: &mut mpsc::UnboundedReceiver<LobbyEvent>) -> Vec<LobbyEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

async fn state_of<M: MatchStarter>(logic: &LobbyLogic<M>, code: &str) -> LobbyState {
    let shared = logic.lobbies().get(code).expect("lobby should exist");
    let lobby = shared.lock().await;
    lobby.state()
}

async fn wait_until_starting<M: MatchStarter>(logic: &LobbyLogic<M>, code: &str) {
    while state_of(logic, code).await != LobbyState::Starting {
        tokio::task::yield_now().await;
    }
}

// =========================================================================
// Create / join
// =========================================================================

#[tokio::test]
async fn test_create_lobby_generates_code_and_seats_host() {
    let logic = logic_with(RecordingStarter::default());

    let view = logic
        .create_lobby(LobbySettings {
            host_id: Some(pid(100)),
            host_nickname: "rex".into(),
            max_players: 4,
            is_private: false,
        })
        .await
        .unwrap();

    assert_eq!(view.code.len(), 5);
    assert!(view.code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    assert_eq!(view.host, pid(100));
    assert_eq!(view.players.len(), 1);
    assert!(view.players[0].is_host);
    assert!(logic.lobbies().contains(&view.code));
}

#[tokio::test]
async fn test_create_lobby_guest_host_gets_negative_id() {
    let logic = logic_with(RecordingStarter::default());

    let view = logic
        .create_lobby(LobbySettings {
            host_id: None,
            host_nickname: "visitor".into(),
            max_players: 2,
            is_private: true,
        })
        .await
        .unwrap();

    assert!(view.host.is_guest());
    assert!(view.is_private);
}

#[tokio::test]
async fn test_create_lobby_invalid_settings_rejected() {
    let logic = logic_with(RecordingStarter::default());
    let settings = LobbySettings {
        host_id: Some(pid(1)),
        host_nickname: "   ".into(),
        max_players: 4,
        is_private: false,
    };

    assert!(matches!(
        logic.create_lobby(settings.clone()).await,
        Err(LobbyError::InvalidArgument(_))
    ));
    assert!(matches!(
        logic
            .create_lobby(LobbySettings {
                host_nickname: "rex".into(),
                max_players: 9,
                ..settings
            })
            .await,
        Err(LobbyError::InvalidArgument(_))
    ));
    assert!(logic.lobbies().is_empty());
}

#[tokio::test]
async fn test_join_lobby_guest_and_errors() {
    let logic = logic_with(RecordingStarter::default());
    seed_lobby(&logic, "ABC12", 100);

    let guest = logic.join_lobby("ABC12", None, "guest").await.unwrap();
    let zero = logic.join_lobby("ABC12", Some(pid(0)), "zero").await.unwrap();

    assert!(guest.0 < 0);
    assert!(zero.0 < 0);
    assert_ne!(guest, zero);
    assert_eq!(
        logic.join_lobby("ABC12", Some(pid(100)), "again").await,
        Err(LobbyError::AlreadyInLobby(pid(100)))
    );
    assert_eq!(
        logic.join_lobby("NOPE1", Some(pid(5)), "x").await,
        Err(LobbyError::NotFound("NOPE1".into()))
    );
    assert!(matches!(
        logic.join_lobby("", Some(pid(5)), "x").await,
        Err(LobbyError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn test_join_lobby_full_rejected() {
    let logic = logic_with(RecordingStarter::default());
    logic
        .lobbies()
        .create("SMALL", Lobby::new("SMALL", pid(1), "host", 2, false))
        .unwrap();
    logic.join_lobby("SMALL", Some(pid(2)), "b").await.unwrap();

    assert_eq!(
        logic.join_lobby("SMALL", Some(pid(3)), "c").await,
        Err(LobbyError::Full("SMALL".into()))
    );
}

// =========================================================================
// Roster changes
// =========================================================================

#[tokio::test]
async fn test_host_disconnect_migrates_host_in_three_player_lobby() {
    let logic = logic_with(RecordingStarter::default());
    seed_lobby(&logic, "ABC12", 100);
    logic.join_lobby("ABC12", Some(pid(2)), "b").await.unwrap();
    logic.join_lobby("ABC12", Some(pid(3)), "c").await.unwrap();
    let _rx_host = connect(&logic, "ABC12", pid(100)).await;
    let mut rx_b = connect(&logic, "ABC12", pid(2)).await;
    let mut rx_c = connect(&logic, "ABC12", pid(3)).await;

    logic.disconnect_player("ABC12", pid(100)).await.unwrap();

    let view = logic.get_lobby_snapshot("ABC12").await.unwrap();
    assert_eq!(view.host, pid(2));
    assert_eq!(view.players.len(), 2);
    assert!(view.players.iter().all(|p| p.player_id != pid(100)));
    for rx in [&mut rx_b, &mut rx_c] {
        match drain(rx).as_slice() {
            [LobbyEvent::RosterUpdated { lobby }] => {
                assert_eq!(lobby.host, pid(2));
                assert_eq!(lobby.players.len(), 2);
            }
            other => panic!("expected one RosterUpdated, got {other:?}"),
        }
    }
    assert_eq!(logic.callbacks().count("ABC12"), 2);
}

#[tokio::test]
async fn test_last_player_leaving_removes_lobby() {
    let logic = logic_with(RecordingStarter::default());
    seed_lobby(&logic, "ABC12", 100);

    logic.disconnect_player("ABC12", pid(100)).await.unwrap();

    assert!(!logic.lobbies().contains("ABC12"));
    assert_eq!(
        logic.get_lobby_snapshot("ABC12").await,
        Err(LobbyError::NotFound("ABC12".into()))
    );
}

#[tokio::test]
async fn test_update_ready_status_broadcasts_roster() {
    let logic = logic_with(RecordingStarter::default());
    seed_lobby(&logic, "ABC12", 100);
    logic.join_lobby("ABC12", Some(pid(2)), "b").await.unwrap();
    let mut rx_host = connect(&logic, "ABC12", pid(100)).await;

    logic.update_player_ready_status("ABC12", pid(2), true).await.unwrap();

    match drain(&mut rx_host).as_slice() {
        [LobbyEvent::RosterUpdated { lobby }] => {
            let b = lobby.players.iter().find(|p| p.player_id == pid(2)).unwrap();
            assert!(b.ready);
        }
        other => panic!("expected RosterUpdated, got {other:?}"),
    }
    assert_eq!(
        logic.update_player_ready_status("ABC12", pid(9), true).await,
        Err(LobbyError::PlayerNotFound(pid(9)))
    );
}

#[tokio::test]
async fn test_kick_player_rules_and_notification() {
    let logic = logic_with(RecordingStarter::default());
    seed_lobby(&logic, "ABC12", 100);
    logic.join_lobby("ABC12", Some(pid(2)), "b").await.unwrap();
    logic.join_lobby("ABC12", Some(pid(3)), "c").await.unwrap();
    let mut rx_b = connect(&logic, "ABC12", pid(2)).await;

    assert_eq!(
        logic.kick_player("ABC12", pid(3), pid(2), "nope").await,
        Err(LobbyError::NotAuthorized(pid(3)))
    );
    assert_eq!(
        logic.kick_player("ABC12", pid(100), pid(100), "self").await,
        Err(LobbyError::CannotKickHost)
    );

    logic.kick_player("ABC12", pid(100), pid(2), "afk").await.unwrap();

    let events = drain(&mut rx_b);
    assert_eq!(
        events,
        vec![LobbyEvent::PlayerKicked {
            player: pid(2),
            reason: "afk".into(),
        }]
    );
    assert!(!logic.callbacks().is_registered("ABC12", pid(2)));
    let view = logic.get_lobby_snapshot("ABC12").await.unwrap();
    assert_eq!(view.players.len(), 2);
}

// =========================================================================
// Start
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_evaluate_game_start_initializes_match_once_after_delay() {
    let logic = logic_with(RecordingStarter::default());
    seed_lobby(&logic, "ABC12", 100);
    let guest = logic.join_lobby("ABC12", None, "guest").await.unwrap();
    let mut rx_guest = connect(&logic, "ABC12", guest).await;
    let started_at = tokio::time::Instant::now();

    logic.evaluate_game_start("ABC12", pid(100)).await.unwrap();

    assert!(started_at.elapsed() >= Duration::from_secs(3));
    let calls = logic.matches().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "ABC12");
    assert_eq!(calls[0].1.len(), 2);
    assert_eq!(calls[0].1[0].user_id, pid(100));
    assert_eq!(calls[0].1[1].user_id, guest);
    assert_eq!(
        drain(&mut rx_guest),
        vec![LobbyEvent::GameStarting {
            match_code: "ABC12".into()
        }]
    );
    assert!(!logic.lobbies().contains("ABC12"));
    assert_eq!(logic.callbacks().count("ABC12"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_evaluate_game_start_requires_host_and_two_players() {
    let logic = logic_with(RecordingStarter::default());
    seed_lobby(&logic, "ABC12", 100);

    assert_eq!(
        logic.evaluate_game_start("ABC12", pid(100)).await,
        Err(LobbyError::NotEnoughPlayers { needed: 2, present: 1 })
    );

    logic.join_lobby("ABC12", Some(pid(2)), "b").await.unwrap();
    assert_eq!(
        logic.evaluate_game_start("ABC12", pid(2)).await,
        Err(LobbyError::NotAuthorized(pid(2)))
    );
    assert!(logic.matches().calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_evaluate_game_start_player_leaves_during_settle() {
    let logic = logic_with(RecordingStarter::default());
    seed_lobby(&logic, "ABC12", 100);
    logic.join_lobby("ABC12", Some(pid(2)), "b").await.unwrap();

    let starting = {
        let logic = Arc::clone(&logic);
        tokio::spawn(async move { logic.evaluate_game_start("ABC12", pid(100)).await })
    };
    wait_until_starting(&logic, "ABC12").await;
    logic.disconnect_player("ABC12", pid(2)).await.unwrap();

    let result = starting.await.unwrap();

    assert_eq!(result, Err(LobbyError::NotEnoughPlayers { needed: 2, present: 1 }));
    assert!(logic.matches().calls().is_empty());
    assert_eq!(state_of(&logic, "ABC12").await, LobbyState::Open);
}

#[tokio::test(start_paused = true)]
async fn test_evaluate_game_start_twice_is_debounced() {
    let logic = logic_with(RecordingStarter::default());
    seed_lobby(&logic, "ABC12", 100);
    logic.join_lobby("ABC12", Some(pid(2)), "b").await.unwrap();

    let first = {
        let logic = Arc::clone(&logic);
        tokio::spawn(async move { logic.evaluate_game_start("ABC12", pid(100)).await })
    };
    wait_until_starting(&logic, "ABC12").await;

    assert_eq!(
        logic.evaluate_game_start("ABC12", pid(100)).await,
        Err(LobbyError::AlreadyStarting("ABC12".into()))
    );
    assert!(matches!(
        logic.join_lobby("ABC12", Some(pid(3)), "late").await,
        Err(LobbyError::AlreadyStarting(_))
    ));

    first.await.unwrap().unwrap();
    assert_eq!(logic.matches().calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_evaluate_game_start_match_failure_reopens_lobby() {
    let logic = logic_with(RecordingStarter::failing());
    seed_lobby(&logic, "ABC12", 100);
    logic.join_lobby("ABC12", Some(pid(2)), "b").await.unwrap();
    let mut rx_b = connect(&logic, "ABC12", pid(2)).await;

    let result = logic.evaluate_game_start("ABC12", pid(100)).await;

    assert!(matches!(result, Err(LobbyError::MatchStart(_))));
    assert_eq!(state_of(&logic, "ABC12").await, LobbyState::Open);
    assert!(
        drain(&mut rx_b)
            .iter()
            .all(|e| !matches!(e, LobbyEvent::GameStarting { .. }))
    );
}

#[tokio::test(start_paused = true)]
async fn test_evaluate_game_start_hands_roster_to_game_logic() {
    let games = Arc::new(GameLogic::new(MatchConfig::default()));
    let logic = LobbyLogic::new(LobbyConfig::default(), Arc::clone(&games));
    seed_lobby(&logic, "ABC12", 100);
    logic.join_lobby("ABC12", Some(pid(7)), "b").await.unwrap();

    logic.evaluate_game_start("ABC12", pid(100)).await.unwrap();

    assert!(games.has_match("ABC12"));
    let snapshot = games.get_match_snapshot("ABC12").await.unwrap();
    assert_eq!(snapshot.players.len(), 2);
    assert_eq!(snapshot.current_turn, Some(pid(100)));
}
