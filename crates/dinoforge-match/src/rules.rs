//! Stateless legality checks.
//!
//! [`RulesValidator`] only reads a session. Every action on
//! [`MatchSession`] runs its check first and mutates only after the check
//! passes, so a rejected action leaves the session untouched.

use dinoforge_cards::{AssemblyError, CardInstanceId, DinoId, DinoSlot, PartType};
use dinoforge_protocol::{PlayerId, RosterEntry};

use crate::{ExchangeRequest, MatchConfig, MatchError, MatchSession};

/// Checks actions against the current state of a match.
pub struct RulesValidator;

impl RulesValidator {
    /// The roster must have an accepted size and no repeated player.
    pub fn check_roster(roster: &[RosterEntry], config: &MatchConfig) -> Result<(), MatchError> {
        if roster.len() < config.min_players || roster.len() > config.max_players {
            return Err(MatchError::InvalidRoster {
                got: roster.len(),
                min: config.min_players,
                max: config.max_players,
            });
        }
        for (i, entry) in roster.iter().enumerate() {
            if roster[..i].iter().any(|e| e.user_id == entry.user_id) {
                return Err(MatchError::DuplicatePlayer(entry.user_id));
            }
        }
        Ok(())
    }

    pub fn ensure_active(session: &MatchSession) -> Result<(), MatchError> {
        if session.state().is_active() {
            Ok(())
        } else {
            Err(MatchError::NotActive {
                code: session.match_code().to_string(),
                state: session.state(),
            })
        }
    }

    pub fn ensure_participant(session: &MatchSession, player: PlayerId) -> Result<(), MatchError> {
        session
            .player(player)
            .map(|_| ())
            .ok_or(MatchError::PlayerNotFound(player))
    }

    pub fn ensure_turn(session: &MatchSession, player: PlayerId) -> Result<(), MatchError> {
        if session.current_turn() == Some(player) {
            Ok(())
        } else {
            Err(MatchError::NotYourTurn(player))
        }
    }

    pub fn check_draw(session: &MatchSession, pile_index: usize) -> Result<(), MatchError> {
        let pile_size = session
            .draw_pile_sizes()
            .get(pile_index)
            .copied()
            .ok_or(MatchError::InvalidPile(pile_index))?;
        if pile_size == 0 {
            return Err(MatchError::PileEmpty(pile_index));
        }
        Ok(())
    }

    /// Both cards must exist in the right hands and share a part type.
    pub fn check_exchange(
        session: &MatchSession,
        player: PlayerId,
        request: &ExchangeRequest,
    ) -> Result<(), MatchError> {
        if request.target == player {
            return Err(MatchError::InvalidOperation(
                "cannot exchange cards with yourself".into(),
            ));
        }
        let me = session.player(player).ok_or(MatchError::PlayerNotFound(player))?;
        let them = session
            .player(request.target)
            .ok_or(MatchError::PlayerNotFound(request.target))?;

        let offered = me
            .card_in_hand(request.offered)
            .ok_or(MatchError::CardNotFound(request.offered))?;
        let requested = them
            .card_in_hand(request.requested)
            .ok_or(MatchError::CardNotFound(request.requested))?;

        if offered.part() != requested.part() {
            return Err(MatchError::CardTypeMismatch {
                offered: offered.part(),
                requested: requested.part(),
            });
        }
        Ok(())
    }

    /// Returns the slot the card would fill.
    pub fn check_attach(
        session: &MatchSession,
        player: PlayerId,
        dino: DinoId,
        card: CardInstanceId,
    ) -> Result<DinoSlot, MatchError> {
        let me = session.player(player).ok_or(MatchError::PlayerNotFound(player))?;
        let in_hand = match me.card_in_hand(card) {
            Some(c) => c,
            None if me.has_card_in_dino(card) => {
                return Err(AssemblyError::AlreadyUsed(card).into());
            }
            None => return Err(MatchError::CardNotFound(card)),
        };
        let target = me.dino(dino).ok_or(MatchError::DinoNotFound(dino))?;
        Ok(target.check_attachment(in_hand)?)
    }

    pub fn check_play_head(
        session: &MatchSession,
        player: PlayerId,
        card: CardInstanceId,
    ) -> Result<(), MatchError> {
        let me = session.player(player).ok_or(MatchError::PlayerNotFound(player))?;
        let in_hand = me.card_in_hand(card).ok_or(MatchError::CardNotFound(card))?;
        if in_hand.part() != PartType::Head {
            return Err(AssemblyError::NotABodyPart {
                card,
                part: in_hand.part(),
            }
            .into());
        }
        Ok(())
    }

    pub fn check_provoke(session: &MatchSession, player: PlayerId) -> Result<(), MatchError> {
        let me = session.player(player).ok_or(MatchError::PlayerNotFound(player))?;
        if me.dinos().is_empty() {
            return Err(MatchError::NoDinos(player));
        }
        Ok(())
    }

    pub fn check_take_from_discard(
        session: &MatchSession,
        card: CardInstanceId,
    ) -> Result<(), MatchError> {
        if session.discard_pile().iter().any(|c| c.instance_id == card) {
            Ok(())
        } else {
            Err(MatchError::CardNotFound(card))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(ids: &[i64]) -> Vec<RosterEntry> {
        ids.iter()
            .map(|id| RosterEntry::new(PlayerId(*id), format!("p{id}")))
            .collect()
    }

    #[test]
    fn test_check_roster_size_bounds() {
        let config = MatchConfig::default();
        assert!(matches!(
            RulesValidator::check_roster(&roster(&[1]), &config),
            Err(MatchError::InvalidRoster { got: 1, .. })
        ));
        assert!(RulesValidator::check_roster(&roster(&[1, 2]), &config).is_ok());
        assert!(RulesValidator::check_roster(&roster(&[1, 2, 3, 4]), &config).is_ok());
        assert!(matches!(
            RulesValidator::check_roster(&roster(&[1, 2, 3, 4, 5]), &config),
            Err(MatchError::InvalidRoster { got: 5, .. })
        ));
    }

    #[test]
    fn test_check_roster_rejects_duplicates() {
        let config = MatchConfig::default();
        assert_eq!(
            RulesValidator::check_roster(&roster(&[1, 2, 1]), &config),
            Err(MatchError::DuplicatePlayer(PlayerId(1)))
        );
    }
}
