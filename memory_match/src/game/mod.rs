//! Memory game core: cards, sessions, scoring and the state machine.
//!
//! Everything here is synchronous and deterministic given an RNG seed. The
//! async [`crate::engine`] wraps [`MatchState`] with timers, persistence and
//! event delivery.

pub mod constants;
pub mod entities;
pub mod errors;
pub mod events;
pub mod records;
pub mod session;
pub mod state_machine;

pub use entities::{Card, CardId, Deck, Difficulty, GameState, UnknownDifficulty};
pub use errors::{GameError, GameResult};
pub use events::GameEvent;
pub use records::{BestResult, BestResults};
pub use session::{GameSnapshot, GameStats, SavedGame, Session};
pub use state_machine::{
    GameRules, IgnoreReason, MatchState, PendingResolution, RevealOutcome, Resolution,
};
