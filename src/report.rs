//! Text formatting for decks and session summaries.
//!
//! Pure functions: (data, OutputFormat) → String.
//! No I/O, no side effects.

use serde::Serialize;

use crate::deck::Deck;
use crate::stats::SessionStats;
use crate::types::OutputFormat;

/// Format a deck listing.
pub fn format_deck(deck: &Deck, format: OutputFormat) -> String {
    match format {
        OutputFormat::Human => format_deck_human(deck),
        OutputFormat::Json => to_json(&deck.iter().collect::<Vec<_>>()),
    }
}

/// Format a session summary.
pub fn format_stats(stats: &SessionStats, format: OutputFormat) -> String {
    match format {
        OutputFormat::Human => format_stats_human(stats),
        OutputFormat::Json => to_json(stats),
    }
}

// ============================================================================
// HUMAN FORMAT
// ============================================================================

fn format_deck_human(deck: &Deck) -> String {
    let word_width = deck.iter().map(|c| c.word.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    out.push_str(&format!("=== Deck ({} cards) ===\n", deck.len()));
    for (i, card) in deck.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}. {:<width$}  {:<12}  {}\n",
            i + 1,
            card.word,
            card.difficulty.to_string(),
            card.category,
            width = word_width,
        ));
    }
    out
}

fn format_stats_human(stats: &SessionStats) -> String {
    let mut out = String::new();
    out.push_str("=== Session ===\n");
    out.push_str(&format!(
        "Learned:        {} / {} ({:.0}%)\n",
        stats.learned,
        stats.deck_size,
        stats.completion * 100.0
    ));
    out.push_str(&format!("Learning:       {}\n", stats.learning));
    out.push_str(&format!("Total correct:  {}\n", stats.total_correct));
    out.push_str(&format!(
        "Streak:         {} (best {})\n",
        stats.current_streak, stats.best_streak
    ));
    out
}

// ============================================================================
// JSON FORMAT
// ============================================================================

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    // Our types only hold strings and numbers; serialization cannot fail.
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| panic!("Failed to serialize to JSON: {}", e))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::ReviewProgress;
    use crate::stats::Streak;
    use crate::types::FlashCard;

    #[test]
    fn human_deck_lists_every_word_in_order() {
        let out = format_deck(&Deck::builtin(), OutputFormat::Human);
        assert!(out.starts_with("=== Deck (5 cards) ==="));
        let catalyst = out.find("Catalyst").unwrap();
        let symbiosis = out.find("Symbiosis").unwrap();
        assert!(catalyst < symbiosis);
        assert!(out.contains("advanced"));
        assert!(out.contains("Environment"));
    }

    #[test]
    fn json_deck_parses_back_to_cards() {
        let out = format_deck(&Deck::builtin(), OutputFormat::Json);
        let cards: Vec<FlashCard> = serde_json::from_str(&out).unwrap();
        assert_eq!(cards.len(), 5);
        assert_eq!(cards[2].id, "feedback");
    }

    #[test]
    fn human_stats_show_learned_fraction() {
        let mut progress = ReviewProgress::new();
        for _ in 0..3 {
            progress.record_correct("catalyst", 3);
        }
        let stats = SessionStats::from_progress(&progress, 5, Streak { current: 3, best: 3 });
        let out = format_stats(&stats, OutputFormat::Human);
        assert!(out.contains("Learned:        1 / 5 (20%)"));
        assert!(out.contains("Total correct:  3"));
        assert!(out.contains("Streak:         3 (best 3)"));
    }

    #[test]
    fn json_stats_has_expected_keys() {
        let stats = SessionStats::from_progress(&ReviewProgress::new(), 5, Streak::default());
        let value: serde_json::Value =
            serde_json::from_str(&format_stats(&stats, OutputFormat::Json)).unwrap();
        assert_eq!(value["deck_size"], 5);
        assert_eq!(value["learned"], 0);
        assert!(value.get("best_streak").is_some());
    }
}
