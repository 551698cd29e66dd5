//! Game actor implementation with async message handling.

use super::{config::EngineConfig, messages::GameMessage, persistence::GameRepository};
use crate::{
    catalog::{CardTemplate, CatalogLoader, CatalogSource},
    game::{
        BestResult, BestResults, CardId, Difficulty, GameError, GameEvent, GameResult,
        GameSnapshot, MatchState, PendingResolution, Resolution, RevealOutcome,
        session::GameStats,
    },
    storage::{KeyValueStore, StorageError},
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

/// Capacity of the actor inbox
const INBOX_CAPACITY: usize = 100;

/// Cloneable handle for talking to a running [`GameActor`]
///
/// Every method fails with [`GameError::EngineClosed`] once the actor has
/// stopped.
#[derive(Clone, Debug)]
pub struct GameHandle {
    sender: mpsc::Sender<GameMessage>,
    event_buffer: usize,
}

impl GameHandle {
    fn new(sender: mpsc::Sender<GameMessage>, event_buffer: usize) -> Self {
        Self {
            sender,
            event_buffer,
        }
    }

    /// Send a message and wait for its response
    async fn request<T>(
        &self,
        message: impl FnOnce(oneshot::Sender<T>) -> GameMessage,
    ) -> GameResult<T> {
        let (response, receiver) = oneshot::channel();
        self.sender
            .send(message(response))
            .await
            .map_err(|_| GameError::EngineClosed)?;
        receiver.await.map_err(|_| GameError::EngineClosed)
    }

    /// Deal a new deck of `deck_size` cards
    ///
    /// Waits for the catalog if it is still loading.
    ///
    /// # Errors
    ///
    /// * `InvalidDeckSize` - Odd or out of range
    /// * `InsufficientCards` - Catalog too small for the deck
    /// * `CatalogUnavailable` - Catalog failed to load
    pub async fn new_game(
        &self,
        deck_size: usize,
        difficulty: Difficulty,
    ) -> GameResult<GameSnapshot> {
        self.request(|response| GameMessage::NewGame {
            deck_size,
            difficulty,
            response,
        })
        .await?
    }

    /// Turn a card face up; disallowed reveals come back as `Ignored`
    pub async fn reveal_card(&self, card_id: CardId) -> GameResult<RevealOutcome> {
        self.request(|response| GameMessage::RevealCard { card_id, response })
            .await
    }

    /// Start over with the last deck size and difficulty
    pub async fn restart_game(&self) -> GameResult<GameSnapshot> {
        self.request(|response| GameMessage::RestartGame { response })
            .await?
    }

    /// Returns whether the game is now paused
    pub async fn toggle_pause(&self) -> GameResult<bool> {
        self.request(|response| GameMessage::TogglePause { response })
            .await?
    }

    pub async fn reset_game(&self) -> GameResult<()> {
        self.request(|response| GameMessage::ResetGame { response })
            .await
    }

    pub async fn load_best_results(&self) -> GameResult<BestResults> {
        self.request(|response| GameMessage::LoadBestResults { response })
            .await
    }

    /// Resume the persisted session; returns whether one was restored
    pub async fn load_saved_game(&self) -> GameResult<bool> {
        self.request(|response| GameMessage::LoadSavedGame { response })
            .await
    }

    pub async fn snapshot(&self) -> GameResult<GameSnapshot> {
        self.request(|response| GameMessage::GetSnapshot { response })
            .await
    }

    pub async fn best_result(&self, deck_size: usize) -> GameResult<Option<BestResult>> {
        self.request(|response| GameMessage::GetBestResult {
            deck_size,
            response,
        })
        .await
    }

    /// Loaded card templates, empty until the catalog is loaded
    pub async fn available_cards(&self) -> GameResult<Arc<[CardTemplate]>> {
        self.request(|response| GameMessage::GetCatalog { response })
            .await
    }

    /// Subscribe to game events
    ///
    /// Events are delivered through a bounded channel. When it is full the
    /// event is dropped for this subscriber only.
    pub async fn subscribe(&self) -> GameResult<(Uuid, mpsc::Receiver<GameEvent>)> {
        let id = Uuid::new_v4();
        let (sender, receiver) = mpsc::channel(self.event_buffer);
        self.sender
            .send(GameMessage::Subscribe { id, sender })
            .await
            .map_err(|_| GameError::EngineClosed)?;
        Ok((id, receiver))
    }

    pub async fn unsubscribe(&self, id: Uuid) -> GameResult<()> {
        self.sender
            .send(GameMessage::Unsubscribe { id })
            .await
            .map_err(|_| GameError::EngineClosed)
    }

    /// Stop the actor after the messages already queued
    pub async fn shutdown(&self) -> GameResult<()> {
        self.sender
            .send(GameMessage::Shutdown)
            .await
            .map_err(|_| GameError::EngineClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Actor owning the game state
///
/// All operations run one at a time on the actor's task. Pair resolutions
/// are scheduled on separate timer tasks that post back into the inbox.
pub struct GameActor {
    /// Engine configuration
    config: EngineConfig,

    /// Game state (FSM)
    state: MatchState,

    /// Card catalog, loaded once
    catalog: Arc<CatalogLoader>,

    /// Persisted sessions and best results
    repository: GameRepository,

    /// Message inbox
    inbox: mpsc::Receiver<GameMessage>,

    /// Inbox sender for timer tasks; weak so dropped handles stop the actor
    timer_sender: mpsc::WeakSender<GameMessage>,

    /// Best results, read from storage on first use
    best_results: Option<BestResults>,

    /// Deck size and difficulty of the last game, for restarts
    last_setup: Option<(usize, Difficulty)>,

    /// Event subscribers
    subscribers: HashMap<Uuid, mpsc::Sender<GameEvent>>,

    /// Is actor closed
    is_closed: bool,
}

impl GameActor {
    /// Create a new game actor
    ///
    /// # Arguments
    ///
    /// * `config` - Engine configuration
    /// * `source` - Where the card catalog comes from
    /// * `store` - Storage backend for sessions and best results
    ///
    /// # Returns
    ///
    /// * `(GameActor, GameHandle)` - Actor and handle for sending messages
    pub fn new(
        config: EngineConfig,
        source: Arc<dyn CatalogSource>,
        store: Arc<dyn KeyValueStore>,
    ) -> (Self, GameHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);

        let catalog = CatalogLoader::new(source)
            .with_retry(config.catalog_retries, config.catalog_retry_delay());
        let repository = GameRepository::new(
            store,
            config.session_key.clone(),
            config.best_results_key.clone(),
        );

        let actor = Self {
            state: MatchState::new(config.rules(), config.rng_seed),
            catalog: Arc::new(catalog),
            repository,
            inbox,
            timer_sender: sender.downgrade(),
            best_results: None,
            last_setup: None,
            subscribers: HashMap::new(),
            is_closed: false,
            config,
        };
        let handle = GameHandle::new(sender, actor.config.event_buffer);

        (actor, handle)
    }

    /// Create an actor and run it on a new task
    pub fn spawn(
        config: EngineConfig,
        source: Arc<dyn CatalogSource>,
        store: Arc<dyn KeyValueStore>,
    ) -> GameHandle {
        let (actor, handle) = Self::new(config, source, store);
        tokio::spawn(actor.run());
        handle
    }

    /// Run the actor event loop
    ///
    /// Returns after `Shutdown` or once every handle has been dropped.
    pub async fn run(mut self) {
        log::info!("Game engine starting");

        // Preload so the first game does not wait on the catalog
        let catalog = Arc::clone(&self.catalog);
        tokio::spawn(async move {
            if let Err(e) = catalog.load().await {
                log::warn!("Catalog preload failed: {}", e);
            }
        });

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message).await;

            if self.is_closed {
                break;
            }
        }

        log::info!("Game engine stopped");
    }

    /// Handle a game message
    async fn handle_message(&mut self, message: GameMessage) {
        match message {
            GameMessage::NewGame {
                deck_size,
                difficulty,
                response,
            } => self.request_game(deck_size, difficulty, response).await,

            GameMessage::CatalogLoaded {
                deck_size,
                difficulty,
                catalog,
                response,
            } => {
                let result = match catalog {
                    Ok(templates) => self.start_game(&templates, deck_size, difficulty).await,
                    Err(e) => Err(GameError::CatalogUnavailable(e.to_string())),
                };
                let _ = response.send(result);
            }

            GameMessage::RevealCard { card_id, response } => {
                let outcome = self.state.reveal_card(card_id);
                match outcome {
                    RevealOutcome::PairPending(pending) => {
                        self.schedule_resolution(pending);
                        self.persist_session().await;
                    }
                    RevealOutcome::Flipped { .. } => self.persist_session().await,
                    RevealOutcome::Ignored(reason) => {
                        log::debug!("Ignored reveal of card {}: {}", card_id, reason);
                    }
                }
                self.flush_events();
                let _ = response.send(outcome);
            }

            GameMessage::Resolve { generation } => {
                let resolution = self.state.resolve(generation);
                self.flush_events();
                match resolution {
                    Resolution::Matched | Resolution::Mismatched => {
                        self.persist_session().await;
                    }
                    Resolution::Won(stats) => self.record_win(stats).await,
                    Resolution::Stale => {}
                }
            }

            GameMessage::RestartGame { response } => {
                match self.last_setup {
                    Some((deck_size, difficulty)) => {
                        self.request_game(deck_size, difficulty, response).await;
                    }
                    None => {
                        let _ = response.send(Err(GameError::InvalidSessionState(
                            "no previous game to restart".to_string(),
                        )));
                    }
                }
            }

            GameMessage::TogglePause { response } => {
                let result = self.state.toggle_pause();
                if let Ok(paused) = result {
                    log::debug!("Game {}", if paused { "paused" } else { "resumed" });
                    self.persist_session().await;
                }
                let _ = response.send(result);
            }

            GameMessage::ResetGame { response } => {
                self.state.reset();
                if let Err(e) = self.repository.clear_session().await {
                    self.storage_warning("Failed to clear saved game", e);
                }
                self.flush_events();
                let _ = response.send(());
            }

            GameMessage::LoadBestResults { response } => {
                let best = self.best_results().await.unwrap_or_default();
                let _ = response.send(best);
            }

            GameMessage::LoadSavedGame { response } => {
                let restored = self.restore_saved_game().await;
                let _ = response.send(restored);
            }

            GameMessage::GetSnapshot { response } => {
                let _ = response.send(self.state.snapshot());
            }

            GameMessage::GetBestResult {
                deck_size,
                response,
            } => {
                let best = self.best_results().await.unwrap_or_default();
                let _ = response.send(best.get(deck_size).cloned());
            }

            GameMessage::GetCatalog { response } => {
                let _ = response.send(self.catalog.templates());
            }

            GameMessage::Subscribe { id, sender } => {
                self.subscribers.insert(id, sender);
                log::debug!("Subscriber {} added", id);
            }

            GameMessage::Unsubscribe { id } => {
                self.subscribers.remove(&id);
                log::debug!("Subscriber {} removed", id);
            }

            GameMessage::Shutdown => {
                self.is_closed = true;
            }
        }
    }

    /// Start a game once the catalog is available
    ///
    /// A catalog that is not cached yet is fetched on its own task, which
    /// posts `CatalogLoaded` back when the fetch settles.
    async fn request_game(
        &mut self,
        deck_size: usize,
        difficulty: Difficulty,
        response: oneshot::Sender<GameResult<GameSnapshot>>,
    ) {
        if self.catalog.is_loaded() {
            let templates = self.catalog.templates();
            let result = self.start_game(&templates, deck_size, difficulty).await;
            let _ = response.send(result);
            return;
        }

        let catalog = Arc::clone(&self.catalog);
        let sender = self.timer_sender.clone();
        tokio::spawn(async move {
            let catalog = catalog.load().await;
            if let Some(sender) = sender.upgrade() {
                let _ = sender
                    .send(GameMessage::CatalogLoaded {
                        deck_size,
                        difficulty,
                        catalog,
                        response,
                    })
                    .await;
            }
        });
    }

    async fn start_game(
        &mut self,
        templates: &[CardTemplate],
        deck_size: usize,
        difficulty: Difficulty,
    ) -> GameResult<GameSnapshot> {
        self.state.new_game(templates, deck_size, difficulty)?;
        self.last_setup = Some((deck_size, difficulty));

        if let Err(e) = self.repository.clear_session().await {
            self.storage_warning("Failed to clear previous saved game", e);
        }
        self.persist_session().await;
        self.flush_events();

        Ok(self.state.snapshot())
    }

    async fn restore_saved_game(&mut self) -> bool {
        let saved = match self.repository.load_session().await {
            Ok(Some(saved)) => saved,
            Ok(None) => return false,
            Err(e) => {
                self.storage_warning("Failed to read saved game", e);
                return false;
            }
        };

        let setup = (saved.session.deck_size, saved.session.difficulty);
        match self.state.restore(saved) {
            Ok(pending) => {
                self.last_setup = Some(setup);
                if let Some(pending) = pending {
                    self.schedule_resolution(pending);
                }
                true
            }
            Err(e) => {
                log::warn!("Discarding saved game: {}", e);
                false
            }
        }
    }

    /// Update best results and storage after the last pair matched
    async fn record_win(&mut self, stats: GameStats) {
        // Writing without knowing the stored table could replace better records
        let new_best = match self.best_results().await {
            Some(mut best) => {
                let new_best =
                    best.consider(stats.deck_size, BestResult::from_stats(&stats, Utc::now()));
                if new_best {
                    log::info!(
                        "New best for {} cards: {} attempts",
                        stats.deck_size,
                        stats.attempts
                    );
                    if let Err(e) = self.repository.save_best_results(&best).await {
                        self.storage_warning("Failed to save best results", e);
                    }
                }
                self.best_results = Some(best);
                new_best
            }
            None => {
                log::warn!(
                    "Best results unreadable, {}-card result not recorded",
                    stats.deck_size
                );
                false
            }
        };

        if let Err(e) = self.repository.clear_session().await {
            self.storage_warning("Failed to clear finished game", e);
        }
        self.notify(GameEvent::GameWon { stats, new_best });
    }

    /// Best results, read from storage the first time
    ///
    /// `None` when storage could not be read. Nothing is cached then, so the
    /// next call reads again.
    async fn best_results(&mut self) -> Option<BestResults> {
        if let Some(best) = &self.best_results {
            return Some(best.clone());
        }
        match self.repository.load_best_results().await {
            Ok(best) => {
                self.best_results = Some(best.clone());
                Some(best)
            }
            Err(e) => {
                self.storage_warning("Failed to read best results", e);
                None
            }
        }
    }

    fn schedule_resolution(&self, pending: PendingResolution) {
        log::debug!(
            "Resolving {} pair in {:?}",
            if pending.is_match { "matching" } else { "mismatched" },
            pending.delay
        );
        let sender = self.timer_sender.clone();
        tokio::spawn(async move {
            tokio::time::sleep(pending.delay).await;
            if let Some(sender) = sender.upgrade() {
                let _ = sender
                    .send(GameMessage::Resolve {
                        generation: pending.generation,
                    })
                    .await;
            }
        });
    }

    /// Write the current session when autosave is on
    async fn persist_session(&mut self) {
        if !self.config.autosave {
            return;
        }
        let result = match self.state.saved_game() {
            Some(saved) => self.repository.save_session(&saved).await,
            None => self.repository.clear_session().await,
        };
        if let Err(e) = result {
            self.storage_warning("Failed to save game", e);
        }
    }

    fn storage_warning(&mut self, context: &str, error: StorageError) {
        log::warn!("{}: {}", context, error);
        self.notify(GameEvent::StorageWarning {
            message: format!("{context}: {error}"),
        });
    }

    fn flush_events(&mut self) {
        for event in self.state.drain_events() {
            self.notify(event);
        }
    }

    /// Broadcast an event to all subscribers
    fn notify(&mut self, event: GameEvent) {
        self.subscribers
            .retain(|id, sender| match sender.try_send(event.clone()) {
                Ok(_) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!("Subscriber {} channel full, dropping event", id);
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("Subscriber {} disconnected, removing", id);
                    false
                }
            });
    }
}
