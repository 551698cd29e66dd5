//! Game-wide defaults.

/// Smallest deck a game can be played with
pub const DEFAULT_MIN_DECK_SIZE: usize = 4;

/// Largest deck a game can be played with
pub const DEFAULT_MAX_DECK_SIZE: usize = 20;

/// Deck sizes offered to players
pub const DECK_SIZE_OPTIONS: [usize; 9] = [4, 6, 8, 10, 12, 14, 16, 18, 20];

/// Pause before a revealed pair is settled, so both faces can be seen
pub const DEFAULT_MATCH_DELAY_MS: u64 = 500;

/// Extra retries after a failed catalog fetch
pub const DEFAULT_CATALOG_RETRIES: u32 = 3;

/// Backoff before the first catalog retry, doubled for each one after
pub const DEFAULT_CATALOG_RETRY_DELAY_MS: u64 = 1000;

/// Storage key of the in-progress session
pub const DEFAULT_SESSION_KEY: &str = "memory_match.session";

/// Storage key of the best results table
pub const DEFAULT_BEST_RESULTS_KEY: &str = "memory_match.best_results";

/// Cards that can be face up without being matched
pub const MAX_UNRESOLVED: usize = 2;
