//! Match engine for Dinoforge.
//!
//! This crate owns everything that happens once a roster has been handed
//! over by a lobby:
//!
//! - [`MatchSession`]: one match's state and its turn/move state machine.
//! - [`RulesValidator`]: stateless legality checks.
//! - [`EndConditionEvaluator`]: decides when a match is over and who won.
//! - [`StatisticsSink`]: where completed results are persisted.
//! - [`GameLogic`]: the async operation surface that ties them together.
//!
//! # Turn model
//!
//! ```text
//! StartTurn(p) ─ moves = max ─► action ─ moves - 1 ─► ... ─ moves == 0 ─► StartTurn(next)
//!                                 │                                         ▲
//!                                 └─ provoke / discard take: moves = 0 ─────┘
//! ```

mod board;
mod config;
mod error;
mod logic;
mod outcome;
mod player;
mod rules;
mod session;
mod statistics;

pub use board::{CentralBoard, ClearedArmy, Placement};
pub use config::{MatchConfig, MatchState};
pub use error::MatchError;
pub use logic::{GameLogic, NOT_ENOUGH_PLAYERS};
pub use outcome::{EndConditionEvaluator, StandardEndConditions};
pub use player::PlayerSession;
pub use rules::RulesValidator;
pub use session::{ExchangeRequest, MatchSession, MoveCost, Outbound};
pub use statistics::{NoStatistics, SaveResultCode, StatisticsError, StatisticsSink};
