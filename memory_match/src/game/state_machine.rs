//! Memory game state machine.
//!
//! [`MatchState`] owns the active session and applies every rule of the
//! game: deck validation, reveals, pair resolution, pause and win detection.
//! It is synchronous and does no I/O. Delays are handed back to the caller as
//! [`PendingResolution`]s tagged with the session generation, and the caller
//! feeds them back through [`MatchState::resolve`] once the delay elapsed.

use chrono::Utc;
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt, mem, time::Duration};

use super::constants::{
    DEFAULT_MATCH_DELAY_MS, DEFAULT_MAX_DECK_SIZE, DEFAULT_MIN_DECK_SIZE, MAX_UNRESOLVED,
};
use super::entities::{CardId, Deck, Difficulty, GameState};
use super::errors::{GameError, GameResult};
use super::events::GameEvent;
use super::session::{GameSnapshot, GameStats, SavedGame, Session};
use crate::catalog::CardTemplate;

/// Deck limits and timing
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct GameRules {
    pub min_deck_size: usize,
    pub max_deck_size: usize,
    /// Delay before any revealed pair is settled
    pub match_delay: Duration,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            min_deck_size: DEFAULT_MIN_DECK_SIZE,
            max_deck_size: DEFAULT_MAX_DECK_SIZE,
            match_delay: Duration::from_millis(DEFAULT_MATCH_DELAY_MS),
        }
    }
}

impl GameRules {
    /// Even and within `[min_deck_size, max_deck_size]`
    pub fn validate_deck_size(&self, deck_size: usize) -> GameResult<()> {
        if deck_size % 2 != 0 || deck_size < self.min_deck_size || deck_size > self.max_deck_size
        {
            return Err(GameError::InvalidDeckSize {
                size: deck_size,
                min: self.min_deck_size,
                max: self.max_deck_size,
            });
        }
        Ok(())
    }

    /// Matches settle after `match_delay`; mismatches stay visible for the
    /// difficulty's reveal timeout on top of it
    pub fn resolution_delay(&self, is_match: bool, difficulty: Difficulty) -> Duration {
        if is_match {
            self.match_delay
        } else {
            self.match_delay + difficulty.reveal_timeout()
        }
    }
}

/// Why a reveal did nothing
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IgnoreReason {
    NotPlaying,
    Paused,
    Processing,
    UnknownCard,
    NotClickable,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::NotPlaying => "no game in progress",
            Self::Paused => "game is paused",
            Self::Processing => "waiting for the current pair",
            Self::UnknownCard => "no such card",
            Self::NotClickable => "card is already face up",
        };
        write!(f, "{repr}")
    }
}

/// A pair waiting to be settled
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PendingResolution {
    /// Session generation the pair belongs to
    pub generation: u64,
    pub delay: Duration,
    pub is_match: bool,
}

/// Result of [`MatchState::reveal_card`]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RevealOutcome {
    /// First card of a pair is face up
    Flipped { position: usize },
    /// Second card is face up; schedule the resolution
    PairPending(PendingResolution),
    /// Reveal was not allowed and changed nothing
    Ignored(IgnoreReason),
}

/// Result of [`MatchState::resolve`]
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    Matched,
    Mismatched,
    /// Last pair matched
    Won(GameStats),
    /// Generation changed or nothing was pending
    Stale,
}

/// Memory game state machine
#[derive(Debug)]
pub struct MatchState {
    rules: GameRules,
    rng: StdRng,
    session: Option<Session>,
    /// Face-up cards not yet settled, in reveal order
    unresolved: Vec<CardId>,
    /// Bumped whenever the session is replaced or dropped
    generation: u64,
    events: Vec<GameEvent>,
}

impl MatchState {
    /// Create an idle state machine
    ///
    /// # Arguments
    ///
    /// * `rules` - Deck limits and timing
    /// * `seed` - Fixed RNG seed for reproducible decks, OS entropy when `None`
    pub fn new(rules: GameRules, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rules,
            rng,
            session: None,
            unresolved: Vec::with_capacity(MAX_UNRESOLVED),
            generation: 0,
            events: Vec::new(),
        }
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn state(&self) -> GameState {
        self.session.as_ref().map_or(GameState::Idle, |s| s.state)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_paused(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_paused)
    }

    /// Two cards face up and awaiting resolution
    pub fn is_processing(&self) -> bool {
        self.unresolved.len() == MAX_UNRESOLVED
    }

    pub fn can_flip(&self) -> bool {
        self.state() == GameState::Playing && !self.is_paused() && !self.is_processing()
    }

    pub fn attempts(&self) -> u32 {
        self.session.as_ref().map_or(0, |s| s.attempts)
    }

    /// Deal a new deck and start playing
    ///
    /// On error nothing changes.
    ///
    /// # Errors
    ///
    /// * `InvalidDeckSize` - Odd or out of range
    /// * `InsufficientCards` - Fewer distinct names than pairs needed
    pub fn new_game(
        &mut self,
        templates: &[CardTemplate],
        deck_size: usize,
        difficulty: Difficulty,
    ) -> GameResult<&Session> {
        self.rules.validate_deck_size(deck_size)?;

        // Pairing goes by name, so a repeated name would make a third card
        let mut names = HashSet::new();
        let distinct: Vec<CardTemplate> = templates
            .iter()
            .filter(|t| names.insert(t.name.as_str()))
            .cloned()
            .collect();
        if deck_size / 2 > distinct.len() {
            return Err(GameError::InsufficientCards {
                requested: deck_size,
                available_pairs: distinct.len(),
            });
        }

        let deck = Deck::build(&distinct, deck_size, &mut self.rng);
        let session = Session::new(deck_size, difficulty, deck.into_cards(), Utc::now());

        self.generation += 1;
        self.unresolved.clear();
        log::info!(
            "Started {} game {} with {} cards",
            difficulty,
            session.id,
            deck_size
        );

        Ok(self.session.insert(session))
    }

    /// Turn a card face up
    ///
    /// Reveals that are not allowed right now (paused, processing, unknown or
    /// already face-up card) are ignored rather than treated as errors.
    pub fn reveal_card(&mut self, card_id: CardId) -> RevealOutcome {
        let Some(session) = self.session.as_mut() else {
            return RevealOutcome::Ignored(IgnoreReason::NotPlaying);
        };
        if session.state != GameState::Playing {
            return RevealOutcome::Ignored(IgnoreReason::NotPlaying);
        }
        if session.is_paused() {
            return RevealOutcome::Ignored(IgnoreReason::Paused);
        }
        if self.unresolved.len() >= MAX_UNRESOLVED {
            return RevealOutcome::Ignored(IgnoreReason::Processing);
        }
        let Some(position) = session.position_of(card_id) else {
            return RevealOutcome::Ignored(IgnoreReason::UnknownCard);
        };

        let card = &mut session.cards[position];
        if !card.is_clickable() {
            return RevealOutcome::Ignored(IgnoreReason::NotClickable);
        }
        card.flipped = true;
        log::debug!("Revealed card {} ({}) at {}", card.id, card.name, position);
        self.events.push(GameEvent::CardFlipped {
            card: card.clone(),
            position,
        });
        self.unresolved.push(card_id);

        if self.unresolved.len() < MAX_UNRESOLVED {
            return RevealOutcome::Flipped { position };
        }

        session.attempts += 1;
        let is_match = match (
            session.card(self.unresolved[0]),
            session.card(self.unresolved[1]),
        ) {
            (Some(a), Some(b)) => a.pairs_with(b),
            _ => false,
        };
        RevealOutcome::PairPending(PendingResolution {
            generation: self.generation,
            delay: self.rules.resolution_delay(is_match, session.difficulty),
            is_match,
        })
    }

    /// Settle the pending pair
    ///
    /// A resolution from an older generation, or one arriving when no pair is
    /// pending, is stale and changes nothing.
    pub fn resolve(&mut self, generation: u64) -> Resolution {
        if generation != self.generation || self.unresolved.len() != MAX_UNRESOLVED {
            log::debug!(
                "Ignoring stale resolution (generation {}, current {})",
                generation,
                self.generation
            );
            return Resolution::Stale;
        }
        let Some(session) = self.session.as_mut() else {
            return Resolution::Stale;
        };
        if session.state != GameState::Playing {
            return Resolution::Stale;
        }

        let pair = mem::take(&mut self.unresolved);
        let (Some(pos_a), Some(pos_b)) = (session.position_of(pair[0]), session.position_of(pair[1]))
        else {
            return Resolution::Stale;
        };

        if !session.cards[pos_a].pairs_with(&session.cards[pos_b]) {
            for pos in [pos_a, pos_b] {
                let card = &mut session.cards[pos];
                if !card.matched {
                    card.flipped = false;
                }
            }
            log::debug!("Pair mismatched (attempt {})", session.attempts);
            return Resolution::Mismatched;
        }

        for pos in [pos_a, pos_b] {
            session.cards[pos].matched = true;
            session.cards[pos].flipped = true;
        }
        session.matched_pairs += 1;
        self.events.push(GameEvent::MatchFound {
            cards: [session.cards[pos_a].clone(), session.cards[pos_b].clone()],
            attempts: session.attempts,
        });

        if !session.is_complete() {
            log::debug!(
                "Pair matched ({}/{})",
                session.matched_pairs,
                session.deck_size / 2
            );
            return Resolution::Matched;
        }

        let now = Utc::now();
        if let Some(paused_at) = session.paused_at.take() {
            session.paused_ms += (now - paused_at).num_milliseconds().max(0);
        }
        session.ended_at = Some(now);
        session.state = GameState::Won;
        log::info!(
            "Won game {} with {} attempts",
            session.id,
            session.attempts
        );
        Resolution::Won(session.stats(now))
    }

    /// Pause or resume the current game
    ///
    /// # Returns
    ///
    /// * `bool` - Whether the game is now paused
    ///
    /// # Errors
    ///
    /// `InvalidSessionState` unless a game is in progress.
    pub fn toggle_pause(&mut self) -> GameResult<bool> {
        let session = self
            .session
            .as_mut()
            .filter(|s| s.state == GameState::Playing)
            .ok_or_else(|| {
                GameError::InvalidSessionState("can only pause a game in progress".to_string())
            })?;

        let now = Utc::now();
        match session.paused_at.take() {
            Some(paused_at) => {
                session.paused_ms += (now - paused_at).num_milliseconds().max(0);
                Ok(false)
            }
            None => {
                session.paused_at = Some(now);
                Ok(true)
            }
        }
    }

    /// Drop the session and go back to idle
    pub fn reset(&mut self) {
        self.generation += 1;
        self.session = None;
        self.unresolved.clear();
        self.events.push(GameEvent::SessionReset);
    }

    /// Persistable copy of a game in progress
    pub fn saved_game(&self) -> Option<SavedGame> {
        self.session
            .as_ref()
            .filter(|s| s.state == GameState::Playing)
            .map(|session| SavedGame {
                session: session.clone(),
                unresolved: self.unresolved.clone(),
            })
    }

    /// Resume a persisted game
    ///
    /// If the saved game had a pair face up, the pair is settled again under
    /// the new generation and returned for scheduling.
    ///
    /// # Errors
    ///
    /// `InvalidSessionState` if the saved game is inconsistent; the current
    /// state is left untouched.
    pub fn restore(&mut self, saved: SavedGame) -> GameResult<Option<PendingResolution>> {
        saved
            .validate()
            .map_err(|e| GameError::InvalidSessionState(format!("saved game rejected: {e}")))?;

        let SavedGame {
            session,
            unresolved,
        } = saved;

        self.generation += 1;
        self.unresolved = unresolved;
        log::info!(
            "Restored game {} ({} attempts, {}/{} pairs)",
            session.id,
            session.attempts,
            session.matched_pairs,
            session.deck_size / 2
        );
        let session = self.session.insert(session);

        if self.unresolved.len() < MAX_UNRESOLVED {
            return Ok(None);
        }
        let is_match = match (
            session.card(self.unresolved[0]),
            session.card(self.unresolved[1]),
        ) {
            (Some(a), Some(b)) => a.pairs_with(b),
            _ => false,
        };
        Ok(Some(PendingResolution {
            generation: self.generation,
            delay: self.rules.resolution_delay(is_match, session.difficulty),
            is_match,
        }))
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let Some(session) = self.session.as_ref() else {
            return GameSnapshot::idle();
        };
        let now = Utc::now();
        GameSnapshot {
            state: session.state,
            paused: session.is_paused(),
            processing: self.is_processing(),
            can_flip: self.can_flip(),
            deck_size: session.deck_size,
            difficulty: Some(session.difficulty),
            cards: session.cards.clone(),
            attempts: session.attempts,
            matched_pairs: session.matched_pairs,
            elapsed_ms: session.elapsed_ms(now),
            completion_percentage: session.completion_percentage(),
        }
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::Card;

    fn templates(n: usize) -> Vec<CardTemplate> {
        (0..n)
            .map(|i| CardTemplate::new(i.to_string(), format!("card-{i}"), format!("{i}.png")))
            .collect()
    }

    fn playing(deck_size: usize) -> MatchState {
        let mut state = MatchState::new(GameRules::default(), Some(42));
        state
            .new_game(&templates(10), deck_size, Difficulty::Easy)
            .unwrap();
        state.drain_events();
        state
    }

    fn cards(state: &MatchState) -> Vec<Card> {
        state.session().unwrap().cards.clone()
    }

    /// Ids of one matching pair and one card that matches neither
    fn pair_and_other(state: &MatchState) -> (CardId, CardId, CardId) {
        let cards = cards(state);
        let a = &cards[0];
        let b = cards.iter().find(|c| a.pairs_with(c)).unwrap();
        let other = cards.iter().find(|c| c.name != a.name).unwrap();
        (a.id, b.id, other.id)
    }

    fn face_up_unmatched(state: &MatchState) -> usize {
        cards(state)
            .iter()
            .filter(|c| c.flipped && !c.matched)
            .count()
    }

    fn expect_pending(outcome: RevealOutcome) -> PendingResolution {
        match outcome {
            RevealOutcome::PairPending(pending) => pending,
            other => panic!("expected a pending pair, got {other:?}"),
        }
    }

    // === New Game Tests ===

    #[test]
    fn test_new_state_is_idle() {
        let state = MatchState::new(GameRules::default(), Some(1));
        assert_eq!(state.state(), GameState::Idle);
        assert!(!state.can_flip());
        assert_eq!(state.snapshot(), GameSnapshot::idle());
    }

    #[test]
    fn test_new_game_four_cards_two_names() {
        let state = playing(4);
        let cards = cards(&state);

        assert_eq!(cards.len(), 4);
        let mut names: Vec<_> = cards.iter().map(|c| c.name.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 2);
        assert_eq!(state.state(), GameState::Playing);
        assert_eq!(state.attempts(), 0);
        assert!(cards.iter().all(Card::is_clickable));
    }

    #[test]
    fn test_new_game_rejects_odd_size_without_changes() {
        let mut state = playing(4);
        let before = state.snapshot();
        let generation = state.generation();

        let result = state.new_game(&templates(10), 3, Difficulty::Easy);
        assert!(matches!(
            result,
            Err(GameError::InvalidDeckSize { size: 3, min: 4, max: 20 })
        ));
        assert_eq!(state.snapshot().cards, before.cards);
        assert_eq!(state.generation(), generation);
    }

    #[test]
    fn test_new_game_rejects_out_of_range() {
        let mut state = MatchState::new(GameRules::default(), Some(1));
        assert!(state.new_game(&templates(20), 2, Difficulty::Easy).is_err());
        assert!(state.new_game(&templates(20), 22, Difficulty::Easy).is_err());
        assert_eq!(state.state(), GameState::Idle);
    }

    #[test]
    fn test_new_game_rejects_small_catalog() {
        let mut state = MatchState::new(GameRules::default(), Some(1));
        let result = state.new_game(&templates(3), 8, Difficulty::Easy);
        assert!(matches!(
            result,
            Err(GameError::InsufficientCards {
                requested: 8,
                available_pairs: 3
            })
        ));
        assert_eq!(state.state(), GameState::Idle);
    }

    #[test]
    fn test_new_game_counts_distinct_names_only() {
        // Five templates but only three names
        let mut duplicated = templates(3);
        duplicated.push(CardTemplate::new("x", "card-0", "x.png"));
        duplicated.push(CardTemplate::new("y", "card-1", "y.png"));

        let mut state = MatchState::new(GameRules::default(), Some(5));
        let result = state.new_game(&duplicated, 8, Difficulty::Easy);
        assert!(matches!(
            result,
            Err(GameError::InsufficientCards {
                requested: 8,
                available_pairs: 3
            })
        ));

        state.new_game(&duplicated, 6, Difficulty::Easy).unwrap();
        let cards = cards(&state);
        assert!(crate::game::entities::validate_deck(&cards).is_ok());
        for card in &cards {
            assert_eq!(cards.iter().filter(|c| c.name == card.name).count(), 2);
        }
    }

    // === Reveal Tests ===

    #[test]
    fn test_first_reveal_flips_and_emits() {
        let mut state = playing(4);
        let id = cards(&state)[2].id;

        assert_eq!(
            state.reveal_card(id),
            RevealOutcome::Flipped { position: 2 }
        );
        let events = state.drain_events();
        assert!(matches!(
            events.as_slice(),
            [GameEvent::CardFlipped { position: 2, .. }]
        ));
        assert_eq!(state.attempts(), 0);
    }

    #[test]
    fn test_reveal_same_card_twice_is_ignored() {
        let mut state = playing(4);
        let id = cards(&state)[0].id;
        state.reveal_card(id);
        assert_eq!(
            state.reveal_card(id),
            RevealOutcome::Ignored(IgnoreReason::NotClickable)
        );
        assert_eq!(state.attempts(), 0);
    }

    #[test]
    fn test_reveal_unknown_card_is_ignored() {
        let mut state = playing(4);
        assert_eq!(
            state.reveal_card(CardId(999)),
            RevealOutcome::Ignored(IgnoreReason::UnknownCard)
        );
    }

    #[test]
    fn test_reveal_while_idle_is_ignored() {
        let mut state = MatchState::new(GameRules::default(), Some(1));
        assert_eq!(
            state.reveal_card(CardId(0)),
            RevealOutcome::Ignored(IgnoreReason::NotPlaying)
        );
    }

    #[test]
    fn test_third_reveal_blocked_while_processing() {
        let mut state = playing(8);
        let (a, _, other) = pair_and_other(&state);
        state.reveal_card(a);
        expect_pending(state.reveal_card(other));
        assert!(state.is_processing());

        let third = cards(&state)
            .into_iter()
            .find(|c| c.is_clickable())
            .unwrap();
        assert_eq!(
            state.reveal_card(third.id),
            RevealOutcome::Ignored(IgnoreReason::Processing)
        );
        assert_eq!(face_up_unmatched(&state), 2);
    }

    // === Resolution Tests ===

    #[test]
    fn test_matching_pair() {
        let mut state = playing(8);
        let (a, b, _) = pair_and_other(&state);
        state.reveal_card(a);
        let pending = expect_pending(state.reveal_card(b));

        assert!(pending.is_match);
        assert_eq!(pending.delay, Duration::from_millis(500));
        assert_eq!(state.attempts(), 1);

        assert_eq!(state.resolve(pending.generation), Resolution::Matched);
        let session = state.session().unwrap();
        assert_eq!(session.matched_pairs, 1);
        for id in [a, b] {
            let card = session.card(id).unwrap();
            assert!(card.matched && card.flipped);
        }
        assert!(!state.is_processing());
        assert!(
            state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::MatchFound { attempts: 1, .. }))
        );
    }

    #[test]
    fn test_mismatching_pair_flips_back() {
        let mut state = playing(8);
        let (a, _, other) = pair_and_other(&state);
        state.reveal_card(a);
        let pending = expect_pending(state.reveal_card(other));

        assert!(!pending.is_match);
        assert_eq!(pending.delay, Duration::from_millis(500 + 2500));

        assert_eq!(state.resolve(pending.generation), Resolution::Mismatched);
        assert_eq!(state.attempts(), 1);
        assert!(cards(&state).iter().all(Card::is_clickable));
        assert!(state.can_flip());
    }

    #[test]
    fn test_resolution_is_one_shot() {
        let mut state = playing(8);
        let (a, _, other) = pair_and_other(&state);
        state.reveal_card(a);
        let pending = expect_pending(state.reveal_card(other));

        assert_eq!(state.resolve(pending.generation), Resolution::Mismatched);
        assert_eq!(state.resolve(pending.generation), Resolution::Stale);
    }

    #[test]
    fn test_stale_generation_after_new_game() {
        let mut state = playing(8);
        let (a, _, other) = pair_and_other(&state);
        state.reveal_card(a);
        let pending = expect_pending(state.reveal_card(other));

        state.new_game(&templates(10), 8, Difficulty::Easy).unwrap();
        let (x, _, y) = pair_and_other(&state);
        state.reveal_card(x);
        state.reveal_card(y);
        let before = cards(&state);

        assert_eq!(state.resolve(pending.generation), Resolution::Stale);
        assert_eq!(cards(&state), before);
        assert!(state.is_processing());
    }

    #[test]
    fn test_complete_four_card_game() {
        let mut state = playing(4);
        let (a, b, other) = pair_and_other(&state);
        let deck = cards(&state);
        let other_card = deck.iter().find(|c| c.id == other).unwrap();
        let d = deck
            .iter()
            .find(|c| c.id != other && c.pairs_with(other_card))
            .unwrap()
            .id;

        state.reveal_card(a);
        let p = expect_pending(state.reveal_card(b));
        assert_eq!(state.resolve(p.generation), Resolution::Matched);

        state.reveal_card(other);
        let p = expect_pending(state.reveal_card(d));
        match state.resolve(p.generation) {
            Resolution::Won(stats) => {
                assert_eq!(stats.attempts, 2);
                assert_eq!(stats.deck_size, 4);
                assert_eq!(stats.completion_percentage, 100.0);
                assert!(stats.ended_at.is_some());
            }
            other => panic!("expected win, got {other:?}"),
        }
        assert_eq!(state.state(), GameState::Won);
        assert!(!state.can_flip());
        assert!(state.saved_game().is_none());
    }

    #[test]
    fn test_attempts_grow_by_one_per_pair() {
        let mut state = playing(8);
        let (a, _, other) = pair_and_other(&state);
        for expected in 1..=3 {
            state.reveal_card(a);
            let p = expect_pending(state.reveal_card(other));
            assert_eq!(state.attempts(), expected);
            state.resolve(p.generation);
            assert_eq!(state.attempts(), expected);
        }
    }

    // === Pause Tests ===

    #[test]
    fn test_pause_blocks_reveals() {
        let mut state = playing(4);
        assert!(state.toggle_pause().unwrap());
        let id = cards(&state)[0].id;
        assert_eq!(
            state.reveal_card(id),
            RevealOutcome::Ignored(IgnoreReason::Paused)
        );
        assert!(!state.toggle_pause().unwrap());
        assert_eq!(
            state.reveal_card(id),
            RevealOutcome::Flipped { position: 0 }
        );
    }

    #[test]
    fn test_pause_requires_game_in_progress() {
        let mut state = MatchState::new(GameRules::default(), Some(1));
        assert!(matches!(
            state.toggle_pause(),
            Err(GameError::InvalidSessionState(_))
        ));
    }

    #[test]
    fn test_pending_pair_settles_while_paused() {
        let mut state = playing(8);
        let (a, _, other) = pair_and_other(&state);
        state.reveal_card(a);
        let pending = expect_pending(state.reveal_card(other));
        state.toggle_pause().unwrap();

        assert_eq!(state.resolve(pending.generation), Resolution::Mismatched);
        assert!(state.is_paused());
        assert_eq!(face_up_unmatched(&state), 0);
    }

    // === Reset Tests ===

    #[test]
    fn test_reset_goes_idle_and_invalidates_pending() {
        let mut state = playing(8);
        let (a, _, other) = pair_and_other(&state);
        state.reveal_card(a);
        let pending = expect_pending(state.reveal_card(other));

        state.reset();
        assert_eq!(state.state(), GameState::Idle);
        assert_eq!(state.resolve(pending.generation), Resolution::Stale);
        assert!(state.drain_events().contains(&GameEvent::SessionReset));
    }

    // === Save/Restore Tests ===

    #[test]
    fn test_saved_game_round_trip() {
        let mut state = playing(8);
        let (a, b, other) = pair_and_other(&state);
        state.reveal_card(a);
        let p = expect_pending(state.reveal_card(b));
        state.resolve(p.generation);
        state.reveal_card(other);

        let saved = state.saved_game().unwrap();
        let json = serde_json::to_string(&saved).unwrap();
        let parsed: SavedGame = serde_json::from_str(&json).unwrap();

        let mut restored = MatchState::new(GameRules::default(), None);
        assert_eq!(restored.restore(parsed).unwrap(), None);

        let original = state.session().unwrap();
        let copy = restored.session().unwrap();
        assert_eq!(copy.attempts, original.attempts);
        assert_eq!(copy.deck_size, original.deck_size);
        for card in &original.cards {
            let twin = copy.card(card.id).unwrap();
            assert_eq!(twin.matched, card.matched);
            assert_eq!(twin.flipped, card.flipped);
        }

        // The half-revealed pair continues where it left off
        let partner = copy
            .cards
            .iter()
            .find(|c| c.is_clickable() && c.id != other)
            .unwrap()
            .id;
        expect_pending(restored.reveal_card(partner));
    }

    #[test]
    fn test_restore_reschedules_pending_pair() {
        let mut state = playing(8);
        let (a, _, other) = pair_and_other(&state);
        state.reveal_card(a);
        let old = expect_pending(state.reveal_card(other));
        let saved = state.saved_game().unwrap();

        let pending = state.restore(saved).unwrap().unwrap();
        assert_ne!(pending.generation, old.generation);
        assert_eq!(state.resolve(old.generation), Resolution::Stale);
        assert_eq!(state.resolve(pending.generation), Resolution::Mismatched);
    }

    #[test]
    fn test_restore_rejects_corrupt_game() {
        let mut state = playing(4);
        let mut saved = state.saved_game().unwrap();
        saved.session.cards.pop();

        let generation = state.generation();
        assert!(state.restore(saved).is_err());
        assert_eq!(state.generation(), generation);
    }
}
