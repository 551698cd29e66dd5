//! Events published to observers.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::entities::Card;
use super::session::GameStats;

/// Something observers may want to render. Events carry copies; nothing sent
/// through them feeds back into the engine.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum GameEvent {
    CardFlipped { card: Card, position: usize },
    MatchFound { cards: [Card; 2], attempts: u32 },
    GameWon { stats: GameStats, new_best: bool },
    SessionReset,
    StorageWarning { message: String },
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::CardFlipped { card, position } => {
                format!("flipped {} at position {position}", card.name)
            }
            Self::MatchFound { cards, attempts } => {
                format!("matched {} after {attempts} attempt(s)", cards[0].name)
            }
            Self::GameWon { stats, new_best } => {
                let record = if *new_best { " (new best!)" } else { "" };
                format!(
                    "won a {}-card game in {} attempts{record}",
                    stats.deck_size, stats.attempts
                )
            }
            Self::SessionReset => "game reset".to_string(),
            Self::StorageWarning { message } => format!("warning: {message}"),
        };
        write!(f, "{repr}")
    }
}
