//! # Memory Match
//!
//! A single-player memory (card pairs) game engine.
//!
//! A deck holds `deck_size / 2` card templates drawn at random from a
//! catalog, each dealt twice and shuffled face down. The player reveals two
//! cards at a time; matching pairs stay face up, mismatches flip back after
//! a delay. The game is won when every pair is found, and the fewest attempts
//! per deck size are kept as best results.
//!
//! ## Core Modules
//!
//! - [`catalog`]: Card templates, catalog sources and the caching loader
//! - [`game`]: Cards, sessions, scoring and the synchronous state machine
//! - [`engine`]: Async actor adding timers, persistence and event delivery
//! - [`storage`]: Key-value persistence port with memory and file backends
//!
//! ## Example
//!
//! ```
//! use memory_match::{
//!     EngineConfig, GameActor, GameState, MemoryStore, StaticSource, game::Difficulty,
//! };
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let handle = GameActor::spawn(
//!     EngineConfig::default(),
//!     Arc::new(StaticSource::builtin()?),
//!     Arc::new(MemoryStore::new()),
//! );
//!
//! let snapshot = handle.new_game(4, Difficulty::Easy).await?;
//! assert_eq!(snapshot.state, GameState::Playing);
//! assert_eq!(snapshot.cards.len(), 4);
//! # Ok(())
//! # }
//! ```

/// Card catalog loading and caching.
pub mod catalog;

/// Async game engine actor.
pub mod engine;

/// Core game logic, entities, and state machine.
pub mod game;

/// Persistence port and backends.
pub mod storage;

pub use catalog::{CardTemplate, CatalogLoader, JsonFileSource, StaticSource};
pub use engine::{ConfigError, EngineConfig, GameActor, GameHandle};
pub use game::{
    Card, CardId, Difficulty, GameError, GameEvent, GameResult, GameSnapshot, GameState,
    MatchState,
    constants::{self, DECK_SIZE_OPTIONS},
};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
