//! Game actor message types.

use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::catalog::{CardTemplate, CatalogResult};
use crate::game::{
    BestResult, BestResults, CardId, Difficulty, GameEvent, GameResult, GameSnapshot,
    RevealOutcome,
};
use std::sync::Arc;

/// Messages that can be sent to a [`super::GameActor`]
#[derive(Debug)]
pub enum GameMessage {
    /// Start a new game
    NewGame {
        deck_size: usize,
        difficulty: Difficulty,
        response: oneshot::Sender<GameResult<GameSnapshot>>,
    },

    /// Catalog fetch for a pending `NewGame` or `RestartGame` finished
    CatalogLoaded {
        deck_size: usize,
        difficulty: Difficulty,
        catalog: CatalogResult<Arc<[CardTemplate]>>,
        response: oneshot::Sender<GameResult<GameSnapshot>>,
    },

    /// Turn a card face up
    RevealCard {
        card_id: CardId,
        response: oneshot::Sender<RevealOutcome>,
    },

    /// Start over with the previous deck size and difficulty
    RestartGame {
        response: oneshot::Sender<GameResult<GameSnapshot>>,
    },

    /// Pause or resume
    TogglePause {
        response: oneshot::Sender<GameResult<bool>>,
    },

    /// Drop the session
    ResetGame { response: oneshot::Sender<()> },

    /// Read best results from storage
    LoadBestResults {
        response: oneshot::Sender<BestResults>,
    },

    /// Resume the persisted session
    LoadSavedGame { response: oneshot::Sender<bool> },

    /// Current state
    GetSnapshot {
        response: oneshot::Sender<GameSnapshot>,
    },

    /// Record for one deck size
    GetBestResult {
        deck_size: usize,
        response: oneshot::Sender<Option<BestResult>>,
    },

    /// Loaded card templates
    GetCatalog {
        response: oneshot::Sender<Arc<[CardTemplate]>>,
    },

    /// Settle a revealed pair; posted by the resolution timer
    Resolve { generation: u64 },

    /// Subscribe to game events
    Subscribe {
        id: Uuid,
        sender: mpsc::Sender<GameEvent>,
    },

    /// Unsubscribe from game events
    Unsubscribe { id: Uuid },

    /// Stop the actor
    Shutdown,
}
