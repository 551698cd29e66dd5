//! Session data, persisted snapshot and read-only views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use super::constants::MAX_UNRESOLVED;
use super::entities::{Card, CardId, Difficulty, GameState, validate_deck};

/// The active game
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub deck_size: usize,
    pub difficulty: Difficulty,
    pub cards: Vec<Card>,
    pub attempts: u32,
    pub matched_pairs: u32,
    pub state: GameState,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    /// Time spent paused before the current pause, in milliseconds
    #[serde(default)]
    pub paused_ms: i64,
    /// Start of the current pause
    #[serde(default)]
    pub paused_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(
        deck_size: usize,
        difficulty: Difficulty,
        cards: Vec<Card>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            deck_size,
            difficulty,
            cards,
            attempts: 0,
            matched_pairs: 0,
            state: GameState::Playing,
            started_at: now,
            ended_at: None,
            paused_ms: 0,
            paused_at: None,
        }
    }

    pub fn position_of(&self, card_id: CardId) -> Option<usize> {
        self.cards.iter().position(|c| c.id == card_id)
    }

    pub fn card(&self, card_id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == card_id)
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// All pairs found
    pub fn is_complete(&self) -> bool {
        self.matched_pairs as usize * 2 == self.deck_size
    }

    /// Play time excluding pauses
    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> i64 {
        let end = self.ended_at.unwrap_or(now);
        let current_pause = self
            .paused_at
            .map_or(0, |p| (end - p).num_milliseconds().max(0));
        let total = (end - self.started_at).num_milliseconds();
        (total - self.paused_ms - current_pause).max(0)
    }

    pub fn completion_percentage(&self) -> f64 {
        if self.cards.is_empty() {
            return 0.0;
        }
        let matched = self.cards.iter().filter(|c| c.matched).count();
        matched as f64 / self.cards.len() as f64 * 100.0
    }

    pub fn stats(&self, now: DateTime<Utc>) -> GameStats {
        GameStats {
            session_id: self.id,
            deck_size: self.deck_size,
            difficulty: self.difficulty,
            attempts: self.attempts,
            matched_pairs: self.matched_pairs,
            elapsed_ms: self.elapsed_ms(now),
            started_at: self.started_at,
            ended_at: self.ended_at,
            completion_percentage: self.completion_percentage(),
        }
    }
}

/// Score summary of a session
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GameStats {
    pub session_id: Uuid,
    pub deck_size: usize,
    pub difficulty: Difficulty,
    pub attempts: u32,
    pub matched_pairs: u32,
    pub elapsed_ms: i64,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub completion_percentage: f64,
}

/// What autosave writes: the session plus the cards awaiting resolution
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SavedGame {
    pub session: Session,
    #[serde(default)]
    pub unresolved: Vec<CardId>,
}

impl SavedGame {
    /// Check that a persisted game is internally consistent
    pub fn validate(&self) -> Result<(), String> {
        let session = &self.session;

        if session.state != GameState::Playing {
            return Err(format!("session is {}, not in progress", session.state));
        }
        if session.deck_size % 2 != 0 || session.cards.len() != session.deck_size {
            return Err(format!(
                "deck size {} does not match {} cards",
                session.deck_size,
                session.cards.len()
            ));
        }
        validate_deck(&session.cards)?;

        let matched = session.cards.iter().filter(|c| c.matched).count();
        if matched != session.matched_pairs as usize * 2 {
            return Err(format!(
                "{matched} matched cards but {} matched pairs",
                session.matched_pairs
            ));
        }
        if session.cards.iter().any(|c| c.matched && !c.flipped) {
            return Err("matched card is face down".to_string());
        }
        if session.attempts < session.matched_pairs {
            return Err("fewer attempts than matched pairs".to_string());
        }

        if self.unresolved.len() > MAX_UNRESOLVED {
            return Err(format!("{} unresolved cards", self.unresolved.len()));
        }
        let unique: HashSet<_> = self.unresolved.iter().collect();
        if unique.len() != self.unresolved.len() {
            return Err("duplicate unresolved card".to_string());
        }
        for id in &self.unresolved {
            match session.card(*id) {
                Some(card) if card.flipped && !card.matched => {}
                _ => return Err(format!("card {id} is not an unresolved face-up card")),
            }
        }
        let face_up = session
            .cards
            .iter()
            .filter(|c| c.flipped && !c.matched)
            .count();
        if face_up != self.unresolved.len() {
            return Err(format!(
                "{face_up} face-up cards but {} unresolved",
                self.unresolved.len()
            ));
        }

        Ok(())
    }
}

/// Read-only view of the engine handed to the UI
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub state: GameState,
    pub paused: bool,
    pub processing: bool,
    pub can_flip: bool,
    pub deck_size: usize,
    pub difficulty: Option<Difficulty>,
    pub cards: Vec<Card>,
    pub attempts: u32,
    pub matched_pairs: u32,
    pub elapsed_ms: i64,
    pub completion_percentage: f64,
}

impl GameSnapshot {
    /// Snapshot with no active session
    pub fn idle() -> Self {
        Self {
            state: GameState::Idle,
            paused: false,
            processing: false,
            can_flip: false,
            deck_size: 0,
            difficulty: None,
            cards: Vec::new(),
            attempts: 0,
            matched_pairs: 0,
            elapsed_ms: 0,
            completion_percentage: 0.0,
        }
    }
}
