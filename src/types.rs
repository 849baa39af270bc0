//! Domain types for vocab-retention.
//!
//! Plain data shared by the deck, the review state machine, the identity
//! layer and the TUI. No I/O here.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Correct answers needed before a card counts as learned.
pub const DEFAULT_LEARNED_THRESHOLD: u32 = 3;

/// How long the "Word Learned!" banner stays up before auto-advancing.
pub const DEFAULT_CELEBRATION: Duration = Duration::from_millis(1200);

// ============================================================================
// ENUMS
// ============================================================================

/// Difficulty tier of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        };
        f.write_str(label)
    }
}

/// Learning status of a single card, derived from its correct count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Learning,
    Learned,
}

impl Status {
    /// Status implied by `correct_count` against `threshold`.
    pub fn for_count(correct_count: u32, threshold: u32) -> Self {
        if correct_count >= threshold {
            Status::Learned
        } else {
            Status::Learning
        }
    }
}

/// Output format for non-interactive commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

// ============================================================================
// STRUCTS
// ============================================================================

/// One vocabulary item. Immutable once a deck is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlashCard {
    /// Unique within a deck.
    pub id: String,
    pub word: String,
    pub definition: String,
    pub example: String,
    /// Free-text label, e.g. "Science".
    pub category: String,
    pub difficulty: Difficulty,
}

/// Per-card progress within one review session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardProgress {
    pub correct_count: u32,
    pub status: Status,
}

/// An authenticated user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    pub email: String,
}

impl User {
    /// Name shown on the dashboard: the local part of the email.
    pub fn display_name(&self) -> &str {
        match self.email.split_once('@') {
            Some((local, _)) if !local.is_empty() => local,
            _ => &self.email,
        }
    }
}

/// Tunables for the review loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewConfig {
    /// Correct answers needed for `Status::Learned`. Always >= 1.
    pub learned_threshold: u32,
    /// Duration of the celebration banner.
    pub celebration: Duration,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        ReviewConfig {
            learned_threshold: DEFAULT_LEARNED_THRESHOLD,
            celebration: DEFAULT_CELEBRATION,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str) -> User {
        User {
            uid: "u1".into(),
            email: email.into(),
        }
    }

    #[test]
    fn display_name_is_email_local_part() {
        assert_eq!(user("ada@example.com").display_name(), "ada");
    }

    #[test]
    fn display_name_falls_back_to_full_email() {
        assert_eq!(user("no-at-sign").display_name(), "no-at-sign");
        assert_eq!(user("@example.com").display_name(), "@example.com");
    }

    #[test]
    fn status_flips_exactly_at_threshold() {
        assert_eq!(Status::for_count(0, 3), Status::Learning);
        assert_eq!(Status::for_count(2, 3), Status::Learning);
        assert_eq!(Status::for_count(3, 3), Status::Learned);
        assert_eq!(Status::for_count(7, 3), Status::Learned);
    }

    #[test]
    fn difficulty_serializes_lowercase() {
        let json = serde_json::to_string(&Difficulty::Intermediate).unwrap();
        assert_eq!(json, "\"intermediate\"");
        assert_eq!(Difficulty::Advanced.to_string(), "advanced");
    }

    #[test]
    fn flashcard_rejects_unknown_fields() {
        let json = r#"{"id":"a","word":"A","definition":"d","example":"e",
            "category":"c","difficulty":"beginner","extra":1}"#;
        assert!(serde_json::from_str::<FlashCard>(json).is_err());
    }

    #[test]
    fn default_review_config_matches_reference() {
        let config = ReviewConfig::default();
        assert_eq!(config.learned_threshold, 3);
        assert_eq!(config.celebration, Duration::from_millis(1200));
    }
}
