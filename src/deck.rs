//! The flashcard deck: a fixed, ordered, read-only table of cards.
//!
//! Built once at startup (either the built-in reference deck or a JSON
//! file) and shared immutably afterwards. Indexing is cyclic: the deck
//! never runs out, it wraps back to the first card.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::types::{Difficulty, FlashCard};

// ============================================================================
// ERRORS
// ============================================================================

/// Error while building or loading a deck.
#[derive(Debug, Error)]
pub enum DeckError {
    #[error("cannot read deck file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid deck file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("deck contains no cards")]
    Empty,

    #[error("duplicate card id: {0}")]
    DuplicateId(String),

    #[error("card #{index} has a blank {field}")]
    BlankField { index: usize, field: &'static str },
}

// ============================================================================
// DECK
// ============================================================================

/// Ordered, validated, non-empty collection of cards.
///
/// Cloning is cheap (shared `Arc`). There is no mutation API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Arc<[FlashCard]>,
}

impl Deck {
    /// Validate and wrap a list of cards.
    ///
    /// # Errors
    /// Empty list, blank id/word, or duplicate ids.
    pub fn from_cards(cards: Vec<FlashCard>) -> Result<Self, DeckError> {
        if cards.is_empty() {
            return Err(DeckError::Empty);
        }

        let mut seen = HashSet::with_capacity(cards.len());
        for (index, card) in cards.iter().enumerate() {
            if card.id.trim().is_empty() {
                return Err(DeckError::BlankField { index, field: "id" });
            }
            if card.word.trim().is_empty() {
                return Err(DeckError::BlankField { index, field: "word" });
            }
            if !seen.insert(card.id.as_str()) {
                return Err(DeckError::DuplicateId(card.id.clone()));
            }
        }

        Ok(Deck {
            cards: cards.into(),
        })
    }

    /// Parse a JSON array of cards.
    pub fn from_json(json: &str, origin: &Path) -> Result<Self, DeckError> {
        let cards: Vec<FlashCard> = serde_json::from_str(json).map_err(|source| DeckError::Json {
            path: origin.to_path_buf(),
            source,
        })?;
        Self::from_cards(cards)
    }

    /// Load a deck from a JSON file.
    pub fn load(path: &Path) -> Result<Self, DeckError> {
        let contents = fs::read_to_string(path).map_err(|source| DeckError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let deck = Self::from_json(&contents, path)?;
        tracing::debug!(path = %path.display(), cards = deck.len(), "loaded deck");
        Ok(deck)
    }

    /// The five-card reference deck.
    pub fn builtin() -> Self {
        Deck {
            cards: builtin_cards().into(),
        }
    }

    /// Number of cards. Never zero.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FlashCard> {
        self.cards.get(index)
    }

    /// Card at `index`, wrapping modulo the deck size.
    pub fn card(&self, index: usize) -> &FlashCard {
        &self.cards[index % self.cards.len()]
    }

    /// The index after `index`, wrapping to 0 after the last card.
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.cards.len()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.cards.iter().position(|c| c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlashCard> {
        self.cards.iter()
    }
}

impl Default for Deck {
    fn default() -> Self {
        Deck::builtin()
    }
}

// ============================================================================
// BUILT-IN DATA
// ============================================================================

fn card(
    id: &str,
    word: &str,
    definition: &str,
    example: &str,
    category: &str,
    difficulty: Difficulty,
) -> FlashCard {
    FlashCard {
        id: id.to_string(),
        word: word.to_string(),
        definition: definition.to_string(),
        example: example.to_string(),
        category: category.to_string(),
        difficulty,
    }
}

fn builtin_cards() -> Vec<FlashCard> {
    vec![
        card(
            "catalyst",
            "Catalyst",
            "Something that speeds up a process or causes change without being used up.",
            "The new coach served as a catalyst for the team’s turnaround.",
            "Science",
            Difficulty::Intermediate,
        ),
        card(
            "resilient",
            "Resilient",
            "Able to recover quickly after something difficult happens.",
            "Children are remarkably resilient after routine setbacks.",
            "Mindset",
            Difficulty::Beginner,
        ),
        card(
            "feedback",
            "Feedback",
            "When an outcome affects the process that caused it (can increase or decrease the change).",
            "Positive feedback between ice melt and warming accelerates climate change.",
            "Systems",
            Difficulty::Intermediate,
        ),
        card(
            "sequester",
            "Sequester",
            "To capture and store something, especially carbon, for a long time.",
            "Healthy forests sequester large amounts of carbon each year.",
            "Environment",
            Difficulty::Advanced,
        ),
        card(
            "symbiosis",
            "Symbiosis",
            "A close relationship between two different organisms where at least one benefits.",
            "Bees and flowering plants share a classic symbiosis.",
            "Biology",
            Difficulty::Beginner,
        ),
    ]
}

// ============================================================================
// TESTS
// ============================================================================
