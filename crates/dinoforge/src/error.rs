//! Unified error type for the Dinoforge crates.

use dinoforge_cards::AssemblyError;
use dinoforge_lobby::LobbyError;
use dinoforge_match::MatchError;
use dinoforge_session::SessionError;

/// Top-level error that wraps every crate-specific error.
///
/// The `#[from]` attributes let `?` convert sub-crate errors, so callers
/// of the `dinoforge` meta-crate only handle this one type.
#[derive(Debug, thiserror::Error)]
pub enum DinoforgeError {
    /// A dino assembly rule was broken.
    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    /// A session registry error (duplicate or missing code).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A match operation was rejected.
    #[error(transparent)]
    Match(#[from] MatchError),

    /// A lobby operation was rejected.
    #[error(transparent)]
    Lobby(#[from] LobbyError),

    /// The server was configured with settings that cannot work together.
    #[error("invalid configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use dinoforge_cards::{CardInstanceId, PartType};
    use dinoforge_protocol::PlayerId;

    use super::*;

    #[test]
    fn test_from_assembly_error() {
        let err = AssemblyError::SlotOccupied(PartType::Torso);
        let dino_err: DinoforgeError = err.into();
        assert!(matches!(dino_err, DinoforgeError::Assembly(_)));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::NotFound("ABC12".into());
        let dino_err: DinoforgeError = err.into();
        assert!(matches!(dino_err, DinoforgeError::Session(_)));
        assert!(dino_err.to_string().contains("ABC12"));
    }

    #[test]
    fn test_from_match_error() {
        let err = MatchError::CardNotFound(CardInstanceId(9));
        let dino_err: DinoforgeError = err.into();
        assert!(matches!(dino_err, DinoforgeError::Match(_)));
    }

    #[test]
    fn test_from_lobby_error() {
        let err = LobbyError::NotAuthorized(PlayerId(4));
        let dino_err: DinoforgeError = err.into();
        assert!(matches!(dino_err, DinoforgeError::Lobby(_)));
        assert!(dino_err.to_string().contains("not the host"));
    }
}
