//! `GameLogic`: the public operation surface for running matches.
//!
//! Every operation follows the same shape:
//!
//! 1. Resolve the session by code and clone its `Arc` out of the registry.
//! 2. Lock it, validate, mutate, and collect the resulting events.
//! 3. Release the lock, then deliver the events.
//!
//! Nothing is ever delivered while a session lock is held, and a slow or
//! dead subscriber can't fail the operation that produced the event.

use std::sync::Arc;

use dinoforge_cards::{CardInPlay, CardInstanceId, DeckSource, DinoId, Element, ShuffledDeck};
use dinoforge_protocol::{
    EndType, MatchEvent, MatchResult, MatchSnapshot, PlayerId, Recipient, RosterEntry,
};
use dinoforge_session::{CallbackRegistry, SessionRegistry, SharedSession, SubscriberHandle};

use crate::outcome::{EndConditionEvaluator, StandardEndConditions};
use crate::rules::RulesValidator;
use crate::session::{ExchangeRequest, MatchSession, MoveCost, Outbound};
use crate::statistics::{NoStatistics, SaveResultCode, StatisticsSink, annotate_reason};
use crate::{MatchConfig, MatchError, MatchState};

/// Reason recorded when a match is aborted because players left.
pub const NOT_ENOUGH_PLAYERS: &str = "not enough players";

/// Runs every live match in the process.
///
/// Cheap to share behind an `Arc`; each match has its own lock, so
/// operations on different matches never wait on each other.
pub struct GameLogic<S = NoStatistics> {
    config: MatchConfig,
    sessions: Arc<SessionRegistry<MatchSession>>,
    callbacks: Arc<CallbackRegistry<MatchEvent>>,
    decks: Arc<dyn DeckSource>,
    evaluator: Arc<dyn EndConditionEvaluator>,
    statistics: S,
}

impl GameLogic<NoStatistics> {
    /// Creates a `GameLogic` that doesn't persist statistics.
    pub fn new(config: MatchConfig) -> Self {
        Self::with_statistics(config, NoStatistics)
    }
}

impl<S: StatisticsSink> GameLogic<S> {
    pub fn with_statistics(config: MatchConfig, statistics: S) -> Self {
        let decks = match config.rng_seed {
            Some(seed) => ShuffledDeck::default().with_seed(seed),
            None => ShuffledDeck::default(),
        };
        Self {
            evaluator: Arc::new(StandardEndConditions::new(config.winning_score)),
            decks: Arc::new(decks),
            sessions: Arc::new(SessionRegistry::new()),
            callbacks: Arc::new(CallbackRegistry::new()),
            config,
            statistics,
        }
    }

    /// Replaces the deck source used for new matches.
    pub fn with_deck_source(mut self, decks: impl DeckSource) -> Self {
        self.decks = Arc::new(decks);
        self
    }

    /// Replaces the end-condition evaluator.
    pub fn with_evaluator(mut self, evaluator: impl EndConditionEvaluator) -> Self {
        self.evaluator = Arc::new(evaluator);
        self
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry<MatchSession>> {
        &self.sessions
    }

    pub fn callbacks(&self) -> &Arc<CallbackRegistry<MatchEvent>> {
        &self.callbacks
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Creates, deals and starts a match for `roster`.
    ///
    /// If any step after registration fails, the session is removed again
    /// so nothing half-built stays visible.
    ///
    /// `Initialized` and `Started` reach subscribers already registered
    /// under `match_code` in [`callbacks`](Self::callbacks). Players who
    /// attach later get both from [`connect_to_game`](Self::connect_to_game).
    pub async fn initialize_match(
        &self,
        match_code: &str,
        roster: Vec<RosterEntry>,
    ) -> Result<(), MatchError> {
        require_code(match_code)?;
        let session = MatchSession::new(match_code, &roster, &self.config)?;
        let shared = self
            .sessions
            .create(match_code, session)
            .map_err(|_| MatchError::DuplicateMatch(match_code.to_string()))?;

        let setup = {
            let mut session = shared.lock().await;
            let deck = self.decks.build_deck();
            session
                .deal(deck, self.config.initial_hand_size)
                .and_then(|()| session.start())
                .map(|first| {
                    let snapshot = session.snapshot();
                    let hands: Vec<(PlayerId, Vec<CardInPlay>)> = session
                        .players()
                        .iter()
                        .map(|p| (p.player_id, p.hand().to_vec()))
                        .collect();
                    (first, session.started_event(), snapshot, hands)
                })
        };

        let (first_player, started, snapshot, hands) = match setup {
            Ok(setup) => setup,
            Err(e) => {
                self.sessions.remove_if_same(match_code, &shared);
                self.callbacks.clear(match_code);
                tracing::warn!(%match_code, error = %e, "match initialization rolled back");
                return Err(e);
            }
        };

        let mut events: Outbound = hands
            .into_iter()
            .map(|(player, hand)| {
                (
                    Recipient::Player(player),
                    MatchEvent::Initialized {
                        snapshot: snapshot.clone(),
                        hand,
                    },
                )
            })
            .collect();
        events.extend(started.map(|event| (Recipient::All, event)));
        self.callbacks.broadcast(match_code, events);

        tracing::info!(%match_code, players = roster.len(), %first_player, "match initialized");
        Ok(())
    }

    /// Ends a match and tears it down.
    ///
    /// `Aborted` produces a no-winner, zero-point result without asking the
    /// evaluator and never saves statistics. `Completed` requires the
    /// evaluator to agree the match is over. A blank `reason` keeps the
    /// evaluator's.
    ///
    /// Statistics failures never stop the teardown; they are appended to
    /// the result's reason as a coded suffix.
    pub async fn end_game(
        &self,
        match_code: &str,
        end_type: EndType,
        reason: &str,
    ) -> Result<MatchResult, MatchError> {
        require_code(match_code)?;
        let shared = self
            .sessions
            .get(match_code)
            .ok_or_else(|| {
                MatchError::InvalidOperation(format!("match {match_code} does not exist"))
            })?;

        let mut result = {
            let mut session = shared.lock().await;
            if session.state() == MatchState::Finished {
                return Err(MatchError::InvalidOperation(format!(
                    "match {match_code} has already ended"
                )));
            }
            let result = match end_type {
                EndType::Aborted => MatchResult::aborted(match_code, &session.roster(), reason),
                EndType::Completed => {
                    if !self.evaluator.is_over(&session) {
                        return Err(MatchError::InvalidOperation(format!(
                            "match {match_code} has not reached an end condition"
                        )));
                    }
                    let mut result = self.evaluator.evaluate(&session).ok_or_else(|| {
                        MatchError::InvalidOperation(format!(
                            "no result available for match {match_code}"
                        ))
                    })?;
                    if !reason.trim().is_empty() {
                        result.reason = reason.to_string();
                    }
                    result
                }
            };
            session.finish(end_type, result.reason.clone());
            result
        };

        if end_type == EndType::Completed && result.has_registered_player() {
            let outcome = self.statistics.save_match_statistics(&result).await;
            match &outcome {
                Ok(SaveResultCode::Success) => {}
                Ok(code) => {
                    tracing::warn!(%match_code, ?code, "statistics save reported a failure");
                }
                Err(e) => tracing::warn!(%match_code, error = %e, "statistics save failed"),
            }
            annotate_reason(&mut result.reason, &outcome);
        }

        self.sessions.remove_if_same(match_code, &shared);
        self.callbacks.broadcast(
            match_code,
            vec![(
                Recipient::All,
                MatchEvent::GameEnded {
                    result: result.clone(),
                },
            )],
        );
        self.callbacks.clear(match_code);

        tracing::info!(
            %match_code,
            %end_type,
            winner = ?result.winner,
            reason = %result.reason,
            "match ended"
        );
        Ok(result)
    }

    /// Subscribes a participant and sends them the current state: their
    /// `Initialized` view, then the match's `Started` event.
    pub async fn connect_to_game(
        &self,
        match_code: &str,
        player: PlayerId,
        subscriber: SubscriberHandle<MatchEvent>,
    ) -> Result<(), MatchError> {
        require_code(match_code)?;
        let shared = self.session(match_code)?;
        let initial = {
            let session = shared.lock().await;
            if session.state() == MatchState::Finished {
                return Err(not_active(&session));
            }
            let me = session.player(player).ok_or(MatchError::PlayerNotFound(player))?;
            // Registered before the snapshot is taken: any action queued
            // behind this lock broadcasts to the new subscriber too.
            self.callbacks.register(match_code, player, subscriber);
            let mut initial = vec![MatchEvent::Initialized {
                snapshot: session.snapshot(),
                hand: me.hand().to_vec(),
            }];
            initial.extend(session.started_event());
            initial
        };

        for event in initial {
            self.callbacks.send_to(match_code, player, event);
        }
        tracing::debug!(%match_code, %player, "player connected to match");
        Ok(())
    }

    /// Removes a participant. Ends the match as aborted if fewer than two
    /// players remain.
    pub async fn leave_game(&self, match_code: &str, player: PlayerId) -> Result<(), MatchError> {
        require_code(match_code)?;
        let shared = self.session(match_code)?;
        let (events, remaining) = {
            let mut session = shared.lock().await;
            if session.state() == MatchState::Finished {
                return Err(not_active(&session));
            }
            let events = session.remove_player(player)?;
            (events, session.players().len())
        };

        self.callbacks.unregister(match_code, player);
        self.callbacks.broadcast(match_code, events);
        tracing::info!(%match_code, %player, remaining, "player left match");

        if remaining < 2 {
            if let Err(e) = self.end_game(match_code, EndType::Aborted, NOT_ENOUGH_PLAYERS).await {
                tracing::debug!(%match_code, error = %e, "match already ending");
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Turn actions
    // -----------------------------------------------------------------------

    pub async fn draw_card(
        &self,
        match_code: &str,
        player: PlayerId,
        pile_index: usize,
    ) -> Result<(), MatchError> {
        self.act(match_code, player, MoveCost::One, |s| s.draw_card(player, pile_index))
            .await
    }

    pub async fn exchange_card(
        &self,
        match_code: &str,
        player: PlayerId,
        request: ExchangeRequest,
    ) -> Result<(), MatchError> {
        self.act(match_code, player, MoveCost::One, |s| s.exchange_card(player, request))
            .await
    }

    pub async fn attach_body_part(
        &self,
        match_code: &str,
        player: PlayerId,
        dino: DinoId,
        card: CardInstanceId,
    ) -> Result<(), MatchError> {
        self.act(match_code, player, MoveCost::One, |s| s.attach_body_part(player, dino, card))
            .await
    }

    pub async fn play_dino_head(
        &self,
        match_code: &str,
        player: PlayerId,
        card: CardInstanceId,
    ) -> Result<(), MatchError> {
        self.act(match_code, player, MoveCost::One, |s| s.play_dino_head(player, card))
            .await
    }

    /// Attacks an army with every dino the player owns. Ends the turn.
    pub async fn provoke(
        &self,
        match_code: &str,
        player: PlayerId,
        army: Element,
    ) -> Result<(), MatchError> {
        self.act(match_code, player, MoveCost::All, |s| s.provoke(player, army))
            .await
    }

    /// Takes a named card out of the discard pile. Ends the turn.
    pub async fn take_card_from_discard_pile(
        &self,
        match_code: &str,
        player: PlayerId,
        card: CardInstanceId,
    ) -> Result<(), MatchError> {
        self.act(match_code, player, MoveCost::All, |s| s.take_from_discard(player, card))
            .await
    }

    pub async fn end_turn(&self, match_code: &str, player: PlayerId) -> Result<(), MatchError> {
        require_code(match_code)?;
        let shared = self.session(match_code)?;
        let (events, over) = {
            let mut session = shared.lock().await;
            RulesValidator::ensure_active(&session)?;
            RulesValidator::ensure_participant(&session, player)?;
            RulesValidator::ensure_turn(&session, player)?;
            let events = session.end_turn();
            (events, self.evaluator.is_over(&session))
        };
        self.callbacks.broadcast(match_code, events);
        if over {
            self.finish_naturally(match_code).await;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub async fn get_match_snapshot(&self, match_code: &str) -> Result<MatchSnapshot, MatchError> {
        require_code(match_code)?;
        let shared = self.session(match_code)?;
        let session = shared.lock().await;
        Ok(session.snapshot())
    }

    /// Returns `true` if a match with this code is live.
    pub fn has_match(&self, match_code: &str) -> bool {
        self.sessions.contains(match_code)
    }

    pub fn active_match_count(&self) -> usize {
        self.sessions.len()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn session(&self, match_code: &str) -> Result<SharedSession<MatchSession>, MatchError> {
        self.sessions
            .get(match_code)
            .ok_or_else(|| MatchError::SessionNotFound(match_code.to_string()))
    }

    /// Runs one turn action under the session lock, then delivers its
    /// events. If the action closed a turn and the match is over, the
    /// match is ended as completed.
    async fn act<F>(
        &self,
        match_code: &str,
        player: PlayerId,
        cost: MoveCost,
        action: F,
    ) -> Result<(), MatchError>
    where
        F: FnOnce(&mut MatchSession) -> Result<Outbound, MatchError> + Send,
    {
        require_code(match_code)?;
        let shared = self.session(match_code)?;

        let (events, over) = {
            let mut session = shared.lock().await;
            let turn_before = session.turn_number();
            let events = session.perform(player, cost, action).inspect_err(|e| {
                tracing::debug!(%match_code, %player, error = %e, "action rejected");
            })?;
            let turn_advanced = session.turn_number() != turn_before;
            (events, turn_advanced && self.evaluator.is_over(&session))
        };

        self.callbacks.broadcast(match_code, events);
        if over {
            self.finish_naturally(match_code).await;
        }
        Ok(())
    }

    async fn finish_naturally(&self, match_code: &str) {
        if let Err(e) = self.end_game(match_code, EndType::Completed, "").await {
            tracing::debug!(%match_code, error = %e, "natural end skipped");
        }
    }
}

fn require_code(match_code: &str) -> Result<(), MatchError> {
    if match_code.trim().is_empty() {
        Err(MatchError::InvalidArgument("match code must not be blank".into()))
    } else {
        Ok(())
    }
}

fn not_active(session: &MatchSession) -> MatchError {
    MatchError::NotActive {
        code: session.match_code().to_string(),
        state: session.state(),
    }
}
