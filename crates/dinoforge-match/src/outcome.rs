//! Terminal-state detection and result computation.

use dinoforge_protocol::{EndType, MatchResult};

use crate::MatchSession;

/// Decides when a match has ended naturally and what the result is.
///
/// Consulted under the session lock after every turn transition and by
/// `EndGame(Completed)`.
pub trait EndConditionEvaluator: Send + Sync + 'static {
    fn is_over(&self, session: &MatchSession) -> bool;

    /// The completed result, or `None` if the match isn't over.
    fn evaluate(&self, session: &MatchSession) -> Option<MatchResult>;
}

/// Ends when every draw pile is empty or someone reaches the winning score.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEndConditions {
    pub winning_score: Option<u32>,
}

impl StandardEndConditions {
    pub fn new(winning_score: Option<u32>) -> Self {
        Self { winning_score }
    }

    fn reason(&self, session: &MatchSession) -> String {
        if session.piles_exhausted() {
            "draw piles exhausted".to_string()
        } else {
            match self.winning_score {
                Some(target) => format!("winning score {target} reached"),
                None => "match over".to_string(),
            }
        }
    }
}

impl EndConditionEvaluator for StandardEndConditions {
    fn is_over(&self, session: &MatchSession) -> bool {
        if session.piles_exhausted() {
            return true;
        }
        self.winning_score
            .is_some_and(|target| session.players().iter().any(|p| p.score() >= target))
    }

    fn evaluate(&self, session: &MatchSession) -> Option<MatchResult> {
        if !self.is_over(session) {
            return None;
        }

        let scores = session.scoreboard();
        let best = scores.iter().map(|s| s.score).max()?;
        let mut leaders = scores.iter().filter(|s| s.score == best);
        let winner = match (leaders.next(), leaders.next()) {
            (Some(leader), None) => Some(leader.player_id),
            _ => None,
        };

        Some(MatchResult {
            match_code: session.match_code().to_string(),
            end_type: EndType::Completed,
            winner,
            scores,
            reason: self.reason(session),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatchConfig;
    use dinoforge_cards::{CardDefinition, Element, Joints};
    use dinoforge_protocol::{PlayerId, RosterEntry};

    fn session(deck: Vec<CardDefinition>) -> MatchSession {
        let roster = vec![
            RosterEntry::new(PlayerId(1), "a"),
            RosterEntry::new(PlayerId(2), "b"),
        ];
        let config = MatchConfig {
            initial_hand_size: 0,
            ..MatchConfig::default()
        };
        let mut session = MatchSession::new("E1", &roster, &config).unwrap();
        session.deal(deck, 0).unwrap();
        session.start().unwrap();
        session
    }

    #[test]
    fn test_is_over_with_cards_left_false() {
        let head = CardDefinition::head(1, 2, Element::Water, Joints::ALL);
        let session = session(vec![head]);
        assert!(!StandardEndConditions::default().is_over(&session));
        assert!(StandardEndConditions::default().evaluate(&session).is_none());
    }

    #[test]
    fn test_evaluate_tie_has_no_winner() {
        let session = session(Vec::new());
        let result = StandardEndConditions::default().evaluate(&session).unwrap();

        assert_eq!(result.end_type, EndType::Completed);
        assert_eq!(result.winner, None);
        assert_eq!(result.scores.len(), 2);
    }

    #[test]
    fn test_winning_score_ends_match() {
        let head = CardDefinition::head(1, 2, Element::Water, Joints::ALL);
        let session = session(vec![head]);
        assert!(StandardEndConditions::new(Some(0)).is_over(&session));
    }
}
