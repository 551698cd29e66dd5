//! Engine error types.

use crate::storage::StorageError;
use thiserror::Error;

/// Errors returned by game operations
#[derive(Debug, Error)]
pub enum GameError {
    /// Deck size is odd or outside the allowed range
    #[error("Invalid deck size {size}: must be an even number between {min} and {max}")]
    InvalidDeckSize { size: usize, min: usize, max: usize },

    /// Catalog has fewer distinct templates than the deck needs pairs
    #[error(
        "Not enough card types for a deck of {requested}: {available_pairs} available (max deck size {})",
        max_deck_size(.available_pairs)
    )]
    InsufficientCards {
        requested: usize,
        available_pairs: usize,
    },

    /// Card catalog could not be loaded
    #[error("Card catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// Persistence backend failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Operation not allowed in the current state
    #[error("Invalid session state: {0}")]
    InvalidSessionState(String),

    /// Engine actor has stopped
    #[error("Game engine is closed")]
    EngineClosed,
}

fn max_deck_size(available_pairs: &usize) -> usize {
    available_pairs * 2
}

impl GameError {
    /// Message suitable for showing to the player
    ///
    /// Validation errors already say what was wrong and what is allowed.
    /// Backend details are kept out of the message.
    pub fn client_message(&self) -> String {
        match self {
            GameError::CatalogUnavailable(_) => {
                "Card data could not be loaded. Please try again later.".to_string()
            }
            GameError::Storage(_) => {
                "Progress could not be saved; the game continues without saving.".to_string()
            }
            GameError::EngineClosed => "The game has stopped.".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for game operations
pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_deck_size_message_has_range() {
        let msg = GameError::InvalidDeckSize {
            size: 3,
            min: 4,
            max: 20,
        }
        .client_message();
        assert!(msg.contains('3'));
        assert!(msg.contains("between 4 and 20"));
    }

    #[test]
    fn test_insufficient_cards_message_has_maximum() {
        let msg = GameError::InsufficientCards {
            requested: 20,
            available_pairs: 6,
        }
        .to_string();
        assert!(msg.contains("6 available"));
        assert!(msg.contains("max deck size 12"));
    }

    #[test]
    fn test_storage_message_is_sanitized() {
        let err = GameError::Storage(StorageError::Unavailable("disk /dev/sda1 gone".into()));
        assert!(!err.client_message().contains("sda1"));
    }
}
