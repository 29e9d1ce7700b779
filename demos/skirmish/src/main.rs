//! Two bots meet in a lobby, start a match and play it to the end.
//! Every match event is printed as one JSON line.
//!
//! ```text
//! RUST_LOG=dinoforge_match=debug cargo run -p skirmish -- 7
//! ```

use std::time::Duration;

use dinoforge::cards::PartType;
use dinoforge::game::MatchSession;
use dinoforge::prelude::*;
use tokio::sync::mpsc;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Safety valve for a bot that stops making progress.
const MAX_ACTIONS: usize = 2_000;

// ---------------------------------------------------------------------------
// Bot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Provoke(Element),
    PlayHead(CardInstanceId),
    Attach(DinoId, CardInstanceId),
    Draw(usize),
    Pass,
}

/// Greedy policy: fight a beatable army, then build, then draw.
fn choose(session: &MatchSession, player: PlayerId) -> Action {
    let Some(me) = session.player(player) else {
        return Action::Pass;
    };

    if !me.dinos().is_empty() {
        let power = me.total_dino_power();
        let target = Element::ALL
            .into_iter()
            .map(|e| (e, session.board().army_power(e)))
            .filter(|&(_, army)| army > 0 && army <= power)
            .max_by_key(|&(_, army)| army);
        if let Some((element, _)) = target {
            return Action::Provoke(element);
        }
    }

    if let Some(head) = me.hand().iter().find(|c| c.definition.part == PartType::Head) {
        return Action::PlayHead(head.instance_id);
    }

    for dino in me.dinos() {
        if let Some(card) = me.hand().iter().find(|c| dino.check_attachment(c).is_ok()) {
            return Action::Attach(dino.id, card.instance_id);
        }
    }

    match session.draw_pile_sizes().iter().position(|&n| n > 0) {
        Some(pile) => Action::Draw(pile),
        None => Action::Pass,
    }
}

/// Drives the match until it leaves the registry. Returns the number of
/// actions taken.
async fn play_out<S: StatisticsSink>(
    server: &DinoServer<S>,
    code: &str,
) -> Result<usize, DinoforgeError> {
    let games = server.games();
    for step in 0..MAX_ACTIONS {
        let Some(shared) = games.sessions().get(code) else {
            return Ok(step);
        };
        let (player, action) = {
            let session = shared.lock().await;
            let Some(player) = session.current_turn() else {
                return Ok(step);
            };
            (player, choose(&session, player))
        };

        let outcome = match action {
            Action::Provoke(army) => games.provoke(code, player, army).await,
            Action::PlayHead(card) => games.play_dino_head(code, player, card).await,
            Action::Attach(dino, card) => games.attach_body_part(code, player, dino, card).await,
            Action::Draw(pile) => games.draw_card(code, player, pile).await,
            Action::Pass => games.end_turn(code, player).await,
        };
        if let Err(e) = outcome {
            tracing::debug!(%player, ?action, error = %e, "bot action rejected, passing");
            games.end_turn(code, player).await?;
        }
    }

    games
        .end_game(code, EndType::Aborted, "bot action limit reached")
        .await?;
    Ok(MAX_ACTIONS)
}

// ---------------------------------------------------------------------------
// Skirmish
// ---------------------------------------------------------------------------

/// Runs one seeded skirmish and returns the final result.
async fn run_skirmish(seed: u64) -> Result<Option<MatchResult>, BoxError> {
    let server = DinoServer::builder()
        .match_config(MatchConfig {
            rng_seed: Some(seed),
            ..MatchConfig::default()
        })
        .lobby_config(LobbyConfig {
            settle_delay: Duration::from_millis(100),
            ..LobbyConfig::default()
        })
        .build()?;
    let lobbies = server.lobbies();

    let lobby = lobbies
        .create_lobby(LobbySettings {
            host_id: Some(PlayerId(1)),
            host_nickname: "rex".into(),
            max_players: 2,
            is_private: true,
        })
        .await?;
    let guest = lobbies.join_lobby(&lobby.code, None, "spike").await?;
    lobbies.update_player_ready_status(&lobby.code, guest, true).await?;
    lobbies.evaluate_game_start(&lobby.code, PlayerId(1)).await?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    server
        .games()
        .connect_to_game(&lobby.code, PlayerId(1), channel_subscriber(tx))
        .await?;

    // The channel closes once the match clears its subscribers.
    let printer = tokio::spawn(async move {
        let mut result = None;
        while let Some(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!(error = %e, "unprintable event"),
            }
            if let MatchEvent::GameEnded { result: r } = event {
                result = Some(r);
            }
        }
        result
    });

    let actions = play_out(&server, &lobby.code).await?;
    let result = printer.await?;
    tracing::info!(actions, match_code = %lobby.code, "skirmish finished");
    Ok(result)
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    dinoforge::telemetry::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);

    match run_skirmish(seed).await? {
        Some(result) => eprintln!(
            "{} ({}), winner: {}",
            result.end_type,
            result.reason,
            result.winner.map_or_else(|| "none".to_string(), |w| w.to_string())
        ),
        None => eprintln!("match ended without a result"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_skirmish_runs_to_completion() {
        let result = run_skirmish(7).await.unwrap().expect("GameEnded should be delivered");

        assert_eq!(result.end_type, EndType::Completed);
        assert_eq!(result.scores.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_skirmish_same_seed_same_result() {
        let first = run_skirmish(11).await.unwrap().unwrap();
        let second = run_skirmish(11).await.unwrap().unwrap();

        // The guest id differs between runs; seats and points do not.
        let points = |r: &MatchResult| r.scores.iter().map(|s| s.score).collect::<Vec<_>>();
        assert_eq!(points(&first), points(&second));
        assert_eq!(first.winner == Some(PlayerId(1)), second.winner == Some(PlayerId(1)));
    }
}
