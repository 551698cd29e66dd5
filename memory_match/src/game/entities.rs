use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, HashSet},
    fmt,
    str::FromStr,
    time::Duration,
};
use thiserror::Error;

use crate::catalog::CardTemplate;

/// Per-deck instance id of an in-play card. Unrelated to the template id.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct CardId(pub u32);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Difficulty presets
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// How long a mismatched pair stays face up
    pub fn reveal_timeout(&self) -> Duration {
        match self {
            Difficulty::Easy => Duration::from_millis(2500),
            Difficulty::Medium => Duration::from_millis(1500),
            Difficulty::Hard => Duration::from_millis(800),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown difficulty '{0}' (expected easy, medium or hard)")]
pub struct UnknownDifficulty(pub String);

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(UnknownDifficulty(s.to_string())),
        }
    }
}

/// Lifecycle of a session. Pause and pair processing are flags on top of
/// `Playing`, not states of their own.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameState {
    #[default]
    Idle,
    Playing,
    Won,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameState::Idle => write!(f, "idle"),
            GameState::Playing => write!(f, "playing"),
            GameState::Won => write!(f, "won"),
        }
    }
}

/// A card in play
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Card {
    pub id: CardId,
    pub template_id: String,
    pub name: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub flipped: bool,
    pub matched: bool,
    pub back_color: String,
}

impl Card {
    pub fn from_template(id: CardId, template: &CardTemplate, back_color: &str) -> Self {
        Self {
            id,
            template_id: template.id.clone(),
            name: template.name.clone(),
            icon: template.icon.clone(),
            category: template.category.clone(),
            flipped: false,
            matched: false,
            back_color: back_color.to_string(),
        }
    }

    /// Face down and not yet part of a completed pair
    pub fn is_clickable(&self) -> bool {
        !self.flipped && !self.matched
    }

    /// Same name, different instance
    pub fn pairs_with(&self, other: &Card) -> bool {
        self.name == other.name && self.id != other.id
    }

    pub fn reset(&mut self) {
        self.flipped = false;
        self.matched = false;
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.matched {
            write!(f, "[{}]", self.name)
        } else if self.flipped {
            write!(f, "<{}>", self.name)
        } else {
            write!(f, "#{}", self.id)
        }
    }
}

/// A freshly dealt set of cards
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Deal a shuffled deck of `deck_size` cards
    ///
    /// Picks `deck_size / 2` templates without replacement, copies each one
    /// twice under distinct instance ids and shuffles the result. The caller
    /// validates the size; a size beyond the catalog deals as many pairs as
    /// there are templates.
    pub fn build<R: Rng + ?Sized>(
        templates: &[CardTemplate],
        deck_size: usize,
        rng: &mut R,
    ) -> Self {
        let pairs = (deck_size / 2).min(templates.len());
        let back_color = random_back_color(rng);

        let mut cards = Vec::with_capacity(pairs * 2);
        let mut next_id = 0u32;
        for idx in rand::seq::index::sample(rng, templates.len(), pairs) {
            let template = &templates[idx];
            for _ in 0..2 {
                cards.push(Card::from_template(CardId(next_id), template, &back_color));
                next_id += 1;
            }
        }

        let mut deck = Self { cards };
        deck.shuffle(rng);
        deck
    }

    /// Shuffle in place and turn every card face down
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        fisher_yates(&mut self.cards, rng);
        self.cards.iter_mut().for_each(Card::reset);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn into_cards(self) -> Vec<Card> {
        self.cards
    }
}

/// Unbiased in-place shuffle: walk from the last index down to 1 and swap
/// each slot with a uniformly chosen slot in `[0, i]`.
pub fn fisher_yates<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Random saturated HSL colour for card backs
pub fn random_back_color<R: Rng + ?Sized>(rng: &mut R) -> String {
    let hue = rng.random_range(0..360);
    let saturation = rng.random_range(60..100);
    let lightness = rng.random_range(45..65);
    format!("hsl({hue}, {saturation}%, {lightness}%)")
}

/// Check the pairing invariant: every name exactly twice, ids unique
pub fn validate_deck(cards: &[Card]) -> Result<(), String> {
    let mut ids = HashSet::with_capacity(cards.len());
    let mut names: HashMap<&str, usize> = HashMap::new();

    for card in cards {
        if !ids.insert(card.id) {
            return Err(format!("duplicate card id {}", card.id));
        }
        *names.entry(card.name.as_str()).or_default() += 1;
    }

    if let Some((name, count)) = names.iter().find(|(_, count)| **count != 2) {
        return Err(format!("card '{name}' appears {count} time(s)"));
    }
    Ok(())
}
