//! Best results per deck size.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::entities::Difficulty;
use super::session::GameStats;

/// Record for one deck size
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct BestResult {
    pub attempts: u32,
    pub time_ms: i64,
    pub date: DateTime<Utc>,
    pub difficulty: Difficulty,
}

impl BestResult {
    pub fn from_stats(stats: &GameStats, now: DateTime<Utc>) -> Self {
        Self {
            attempts: stats.attempts,
            time_ms: stats.elapsed_ms,
            date: stats.ended_at.unwrap_or(now),
            difficulty: stats.difficulty,
        }
    }
}

/// Fewest attempts ever needed, keyed by deck size
///
/// A missing entry means no game of that size was ever finished. It is not
/// zero attempts.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BestResults(BTreeMap<usize, BestResult>);

impl BestResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, deck_size: usize) -> Option<&BestResult> {
        self.0.get(&deck_size)
    }

    /// Best attempt count, `None` when unset
    pub fn attempts(&self, deck_size: usize) -> Option<u32> {
        self.get(deck_size).map(|r| r.attempts)
    }

    /// Attempts for display; unset renders as `-`
    pub fn display_attempts(&self, deck_size: usize) -> String {
        self.attempts(deck_size)
            .map_or_else(|| "-".to_string(), |a| a.to_string())
    }

    /// Store `candidate` if it beats the current record
    ///
    /// Only strictly fewer attempts replace an existing record.
    ///
    /// # Returns
    ///
    /// * `bool` - Whether a new record was set
    pub fn consider(&mut self, deck_size: usize, candidate: BestResult) -> bool {
        match self.0.get(&deck_size) {
            Some(existing) if existing.attempts <= candidate.attempts => false,
            _ => {
                self.0.insert(deck_size, candidate);
                true
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&usize, &BestResult)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
