/// Property-based tests for deck construction and the game state machine
///
/// These tests check the pairing invariant over every deck size and the
/// reveal rules over arbitrary click sequences.
use memory_match::{
    CardTemplate,
    game::{
        Deck, Difficulty, GameRules, GameState, IgnoreReason, MatchState, PendingResolution,
        Resolution, RevealOutcome,
        entities::validate_deck,
    },
};
use proptest::prelude::*;
use rand::{SeedableRng, rngs::StdRng};
use std::collections::HashSet;

fn templates(n: usize) -> Vec<CardTemplate> {
    (0..n)
        .map(|i| CardTemplate::new(format!("t{i}"), format!("Card {i}"), format!("{i}.png")))
        .collect()
}

// Strategy to generate a valid deck size (even, 4..=20)
fn deck_size_strategy() -> impl Strategy<Value = usize> {
    (2usize..=10).prop_map(|pairs| pairs * 2)
}

proptest! {
    #[test]
    fn test_deck_pairs_every_name(deck_size in deck_size_strategy(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let deck = Deck::build(&templates(12), deck_size, &mut rng);

        prop_assert_eq!(deck.len(), deck_size);
        prop_assert!(validate_deck(deck.cards()).is_ok());
        prop_assert!(deck.cards().iter().all(|c| !c.flipped && !c.matched));
    }

    #[test]
    fn test_deck_templates_are_distinct(deck_size in deck_size_strategy(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let deck = Deck::build(&templates(10), deck_size, &mut rng);

        let template_ids: HashSet<_> = deck.cards().iter().map(|c| c.template_id.clone()).collect();
        prop_assert_eq!(template_ids.len(), deck_size / 2);
    }

    #[test]
    fn test_reveal_sequences_keep_invariants(
        deck_size in deck_size_strategy(),
        seed in any::<u64>(),
        clicks in prop::collection::vec((0usize..20, any::<bool>()), 0..80),
    ) {
        let mut state = MatchState::new(GameRules::default(), Some(seed));
        state.new_game(&templates(10), deck_size, Difficulty::Easy).unwrap();

        let mut last_attempts = 0;
        let mut pending: Option<PendingResolution> = None;
        for (index, settle) in clicks {
            if settle && let Some(p) = pending.take() {
                prop_assert_ne!(state.resolve(p.generation), Resolution::Stale);
            }

            let ids: Vec<_> = state.session().unwrap().cards.iter().map(|c| c.id).collect();
            match state.reveal_card(ids[index % ids.len()]) {
                RevealOutcome::PairPending(p) => {
                    prop_assert_eq!(state.attempts(), last_attempts + 1);
                    pending = Some(p);
                }
                RevealOutcome::Ignored(reason) => {
                    if pending.is_some() {
                        prop_assert_eq!(reason, IgnoreReason::Processing);
                    }
                }
                RevealOutcome::Flipped { .. } => {}
            }

            let session = state.session().unwrap();
            let face_up = session.cards.iter().filter(|c| c.flipped && !c.matched).count();
            prop_assert!(face_up <= 2);
            prop_assert!(session.attempts >= last_attempts);
            prop_assert!(session.attempts >= session.matched_pairs);
            prop_assert!(validate_deck(&session.cards).is_ok());
            last_attempts = session.attempts;

            if state.state() == GameState::Won {
                prop_assert!(session.cards.iter().all(|c| c.matched));
                break;
            }
        }
    }
}
