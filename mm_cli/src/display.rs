//! Plain-text rendering of engine state.

use memory_match::{
    DECK_SIZE_OPTIONS, GameSnapshot, GameState,
    game::{BestResults, IgnoreReason, RevealOutcome},
};
use std::fmt::Write;

/// Cards per board row
const ROW_WIDTH: usize = 4;

/// Render the board with 1-based positions
///
/// Face-down cards show `??`, matched cards are bracketed.
pub fn render_board(snapshot: &GameSnapshot) -> String {
    if snapshot.state == GameState::Idle {
        return "No game in progress. Type 'new 8' to start one.".to_string();
    }

    let mut out = String::new();
    let status = match (snapshot.state, snapshot.paused) {
        (GameState::Won, _) => "won",
        (_, true) => "paused",
        _ => "playing",
    };
    let difficulty = snapshot
        .difficulty
        .map_or_else(String::new, |d| format!(", {d}"));
    let _ = writeln!(
        out,
        "{} cards{} | {} | attempts {} | pairs {}/{} | {:.0}% | {}s",
        snapshot.deck_size,
        difficulty,
        status,
        snapshot.attempts,
        snapshot.matched_pairs,
        snapshot.deck_size / 2,
        snapshot.completion_percentage,
        snapshot.elapsed_ms / 1000
    );

    for (row, cards) in snapshot.cards.chunks(ROW_WIDTH).enumerate() {
        let line: Vec<String> = cards
            .iter()
            .enumerate()
            .map(|(col, card)| {
                let position = row * ROW_WIDTH + col + 1;
                let face = if card.flipped {
                    card.to_string()
                } else {
                    "??".to_string()
                };
                format!("{position:>2}: {face:<14}")
            })
            .collect();
        let _ = writeln!(out, "{}", line.join(" ").trim_end());
    }
    out
}

/// Render best attempts for every selectable deck size
pub fn render_best(best: &BestResults) -> String {
    let mut out = String::from("Best results (fewest attempts)\n");
    for deck_size in DECK_SIZE_OPTIONS {
        let _ = write!(out, "{deck_size:>4} cards: {}", best.display_attempts(deck_size));
        if let Some(result) = best.get(deck_size) {
            let _ = write!(
                out,
                " ({}, {}s, {})",
                result.difficulty,
                result.time_ms / 1000,
                result.date.format("%Y-%m-%d")
            );
        }
        out.push('\n');
    }
    out
}

/// Describe a reveal that did not flip anything
pub fn describe_outcome(outcome: &RevealOutcome) -> Option<String> {
    match outcome {
        RevealOutcome::Ignored(IgnoreReason::Processing) => {
            Some("Wait for the current pair to settle.".to_string())
        }
        RevealOutcome::Ignored(reason) => Some(format!("Nothing to flip: {reason}.")),
        _ => None,
    }
}
