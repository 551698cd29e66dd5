//! Async game engine built around a single actor.
//!
//! [`GameActor`] owns the [`crate::game::MatchState`], the card catalog and
//! the storage port. Callers use a cloneable [`GameHandle`]; events reach
//! them through channels returned by [`GameHandle::subscribe`].

pub mod actor;
pub mod config;
pub mod messages;
pub mod persistence;

pub use actor::{GameActor, GameHandle};
pub use config::{ConfigError, EngineConfig};
pub use messages::GameMessage;
pub use persistence::GameRepository;
