//! Review state machine: present a card, reveal it, or mark it known.
//!
//! States:
//! - `Presenting`: word shown, definition hidden
//! - `Revealed`: definition and example shown
//! - `Celebrating`: a learned card was answered; a timer is pending
//!
//! The session owns its celebration timer as plain data. Nothing fires
//! on its own: the event loop asks for `pending_deadline()` and calls
//! `tick(now)` when it passes. Dropping the session drops the timer, so
//! a torn-down session can never be advanced by a stale callback.
//!
//! Time is always passed in (`now: Instant`) so every transition is
//! deterministic under test.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::deck::Deck;
use crate::stats::{SessionStats, Streak};
use crate::types::{CardProgress, FlashCard, ReviewConfig, Status};

// ============================================================================
// PROGRESS
// ============================================================================

/// Card id → progress for the current session.
///
/// Starts empty. Counts only ever go up; the only mutator is
/// [`ReviewProgress::record_correct`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewProgress {
    entries: BTreeMap<String, CardProgress>,
}

impl ReviewProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&CardProgress> {
        self.entries.get(id)
    }

    /// Correct count for `id`; absent cards count as zero.
    pub fn correct_count(&self, id: &str) -> u32 {
        self.entries.get(id).map_or(0, |p| p.correct_count)
    }

    /// Record one correct answer and return the updated entry.
    pub fn record_correct(&mut self, id: &str, threshold: u32) -> CardProgress {
        let entry = self
            .entries
            .entry(id.to_string())
            .or_insert(CardProgress {
                correct_count: 0,
                status: Status::Learning,
            });
        entry.correct_count = entry.correct_count.saturating_add(1);
        entry.status = Status::for_count(entry.correct_count, threshold);
        *entry
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CardProgress)> {
        self.entries.iter().map(|(id, p)| (id.as_str(), p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// PHASE / TIMER / CURSOR
// ============================================================================

/// Pending celebration-to-advance transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CelebrationTimer {
    /// Card that just became learned.
    pub card_id: String,
    pub deadline: Instant,
}

impl CelebrationTimer {
    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    /// Time left before the timer fires; zero once due.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }
}

/// Where the session is in the present / reveal / celebrate cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Presenting,
    Revealed,
    Celebrating(CelebrationTimer),
}

/// Read-only snapshot of the session position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewCursor {
    /// Always in `[0, deck.len())`.
    pub current_index: usize,
    pub revealed: bool,
    pub celebrating: bool,
}

/// What a single operation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Moved to the next card, back in `Presenting`.
    Advanced { from: usize, to: usize },
    /// Definition is now shown.
    Revealed,
    /// Card reached the threshold; banner is up until `until`.
    Celebrating { card_id: String, until: Instant },
    /// Not valid in the current phase; nothing changed.
    Ignored,
}

// ============================================================================
// SESSION
// ============================================================================

/// One learner's pass through the deck.
///
/// Created when the learn screen opens and dropped when it closes,
/// taking its progress and any pending timer with it.
#[derive(Debug, PartialEq, Eq)]
pub struct ReviewSession {
    deck: Deck,
    config: ReviewConfig,
    index: usize,
    phase: Phase,
    progress: ReviewProgress,
    streak: Streak,
}

impl ReviewSession {
    /// Fresh session at the first card with empty progress.
    pub fn new(deck: Deck, config: ReviewConfig) -> Self {
        let config = ReviewConfig {
            learned_threshold: config.learned_threshold.max(1),
            ..config
        };
        ReviewSession {
            deck,
            config,
            index: 0,
            phase: Phase::Presenting,
            progress: ReviewProgress::new(),
            streak: Streak::default(),
        }
    }

    // -- accessors --

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn progress(&self) -> &ReviewProgress {
        &self.progress
    }

    pub fn current_card(&self) -> &FlashCard {
        self.deck.card(self.index)
    }

    pub fn cursor(&self) -> ReviewCursor {
        ReviewCursor {
            current_index: self.index,
            revealed: self.phase == Phase::Revealed,
            celebrating: matches!(self.phase, Phase::Celebrating(_)),
        }
    }

    /// Progress of the card on screen (zero count if never answered).
    pub fn current_progress(&self) -> CardProgress {
        self.progress
            .get(&self.current_card().id)
            .copied()
            .unwrap_or(CardProgress {
                correct_count: 0,
                status: Status::Learning,
            })
    }

    /// Correct count of the card on screen.
    pub fn current_correct_count(&self) -> u32 {
        self.current_progress().correct_count
    }

    /// Fraction of the way to "learned" for the card on screen, in `0..=1`.
    pub fn current_fraction(&self) -> f64 {
        let count = self.current_correct_count().min(self.config.learned_threshold);
        f64::from(count) / f64::from(self.config.learned_threshold)
    }

    /// Deadline of the pending celebration, if any.
    pub fn pending_deadline(&self) -> Option<Instant> {
        match &self.phase {
            Phase::Celebrating(timer) => Some(timer.deadline),
            _ => None,
        }
    }

    pub fn streak(&self) -> Streak {
        self.streak
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats::from_progress(&self.progress, self.deck.len(), self.streak)
    }

    // -- operations --

    /// "I know this word".
    ///
    /// Only valid while presenting. A count at or above the threshold
    /// starts a celebration; below it the session advances at once.
    pub fn know_it(&mut self, now: Instant) -> Outcome {
        if self.phase != Phase::Presenting {
            return Outcome::Ignored;
        }

        let threshold = self.config.learned_threshold;
        let card_id = self.current_card().id.clone();
        let updated = self.progress.record_correct(&card_id, threshold);
        self.streak.hit();

        tracing::debug!(
            card = %card_id,
            correct = updated.correct_count,
            status = ?updated.status,
            "know it"
        );

        if updated.correct_count >= threshold {
            if updated.correct_count == threshold {
                tracing::info!(card = %card_id, "card learned");
            }
            let until = now + self.config.celebration;
            self.phase = Phase::Celebrating(CelebrationTimer {
                card_id: card_id.clone(),
                deadline: until,
            });
            Outcome::Celebrating { card_id, until }
        } else {
            self.advance()
        }
    }

    /// "Show definition". Repeating it while revealed is a no-op.
    pub fn dont_know_it(&mut self) -> Outcome {
        match self.phase {
            Phase::Presenting => {
                self.streak.miss();
                self.phase = Phase::Revealed;
                tracing::debug!(card = %self.current_card().id, "revealed");
                Outcome::Revealed
            }
            Phase::Revealed => Outcome::Revealed,
            Phase::Celebrating(_) => Outcome::Ignored,
        }
    }

    /// Leave the revealed card and move on.
    pub fn continue_after_reveal(&mut self) -> Outcome {
        match self.phase {
            Phase::Revealed => self.advance(),
            _ => Outcome::Ignored,
        }
    }

    /// Move on without answering. Not allowed mid-celebration.
    pub fn skip(&mut self) -> Outcome {
        match self.phase {
            Phase::Presenting | Phase::Revealed => {
                tracing::debug!(card = %self.current_card().id, "skipped");
                self.advance()
            }
            Phase::Celebrating(_) => Outcome::Ignored,
        }
    }

    /// Fire the celebration timer if it is due.
    pub fn tick(&mut self, now: Instant) -> Outcome {
        match &self.phase {
            Phase::Celebrating(timer) if timer.is_due(now) => self.advance(),
            _ => Outcome::Ignored,
        }
    }

    /// Drop a pending celebration without advancing.
    ///
    /// Returns true if a timer was cancelled. The card stays on screen
    /// in `Presenting`; its learned status is kept.
    pub fn cancel_pending(&mut self) -> bool {
        if let Phase::Celebrating(timer) = &self.phase {
            tracing::debug!(card = %timer.card_id, "celebration cancelled");
            self.phase = Phase::Presenting;
            true
        } else {
            false
        }
    }

    fn advance(&mut self) -> Outcome {
        let from = self.index;
        let to = self.deck.next_index(from);
        self.index = to;
        self.phase = Phase::Presenting;
        tracing::debug!(from, to, "advanced");
        Outcome::Advanced { from, to }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> ReviewSession {
        ReviewSession::new(Deck::builtin(), ReviewConfig::default())
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// "Know it", then let any celebration run out.
    fn know_card(s: &mut ReviewSession, now: Instant) -> Outcome {
        let outcome = s.know_it(now);
        if let Outcome::Celebrating { until, .. } = outcome {
            s.tick(until);
        }
        outcome
    }

    // -- progress map --

    #[test]
    fn progress_starts_empty() {
        let s = session();
        assert!(s.progress().is_empty());
        assert_eq!(s.progress().correct_count("catalyst"), 0);
    }

    #[test]
    fn record_correct_tracks_status() {
        let mut progress = ReviewProgress::new();
        assert_eq!(progress.record_correct("a", 3).status, Status::Learning);
        assert_eq!(progress.record_correct("a", 3).status, Status::Learning);
        let third = progress.record_correct("a", 3);
        assert_eq!(third.correct_count, 3);
        assert_eq!(third.status, Status::Learned);
        assert_eq!(progress.record_correct("a", 3).correct_count, 4);
    }

    // -- know it --

    #[test]
    fn know_it_below_threshold_advances_immediately() {
        let mut s = session();
        let outcome = s.know_it(Instant::now());
        assert_eq!(outcome, Outcome::Advanced { from: 0, to: 1 });
        assert_eq!(s.progress().correct_count("catalyst"), 1);
        assert_eq!(
            s.progress().get("catalyst").map(|p| p.status),
            Some(Status::Learning)
        );
        assert_eq!(*s.phase(), Phase::Presenting);
    }

    #[test]
    fn third_correct_answer_celebrates_then_advances_one() {
        let deck = Deck::builtin();
        let t0 = Instant::now();
        let mut s = ReviewSession::new(deck.clone(), ReviewConfig::default());

        // Two passes around the deck to get catalyst to 2.
        for _ in 0..2 {
            know_card(&mut s, t0);
            for _ in 1..deck.len() {
                s.skip();
            }
        }
        assert_eq!(s.cursor().current_index, 0);
        assert_eq!(s.progress().correct_count("catalyst"), 2);

        let outcome = s.know_it(t0);
        assert_eq!(
            outcome,
            Outcome::Celebrating {
                card_id: "catalyst".into(),
                until: t0 + ms(1200),
            }
        );
        assert_eq!(
            s.progress().get("catalyst").map(|p| p.status),
            Some(Status::Learned)
        );
        assert!(s.cursor().celebrating);
        assert_eq!(s.cursor().current_index, 0);

        // Not yet due
        assert_eq!(s.tick(t0 + ms(1199)), Outcome::Ignored);
        assert!(s.cursor().celebrating);

        assert_eq!(s.tick(t0 + ms(1200)), Outcome::Advanced { from: 0, to: 1 });
        let cursor = s.cursor();
        assert_eq!(cursor.current_index, 1);
        assert!(!cursor.revealed);
        assert!(!cursor.celebrating);
    }

    #[test]
    fn learned_card_celebrates_on_every_further_know_it() {
        let single = Deck::from_cards(vec![Deck::builtin().card(0).clone()]).unwrap();
        let t0 = Instant::now();
        let mut s = ReviewSession::new(single, ReviewConfig::default());

        know_card(&mut s, t0);
        know_card(&mut s, t0);
        assert!(matches!(know_card(&mut s, t0), Outcome::Celebrating { .. }));
        assert!(matches!(
            s.know_it(t0),
            Outcome::Celebrating { ref card_id, .. } if card_id == "catalyst"
        ));
        assert_eq!(s.progress().correct_count("catalyst"), 4);
        assert_eq!(
            s.progress().get("catalyst").map(|p| p.status),
            Some(Status::Learned)
        );

        assert_eq!(s.tick(t0 + ms(1200)), Outcome::Advanced { from: 0, to: 0 });
    }

    #[test]
    fn current_progress_defaults_to_zero_learning() {
        let t0 = Instant::now();
        let mut s = ReviewSession::new(Deck::builtin(), ReviewConfig::default());
        assert_eq!(s.current_progress().correct_count, 0);
        assert_eq!(s.current_progress().status, Status::Learning);

        let single = Deck::from_cards(vec![Deck::builtin().card(0).clone()]).unwrap();
        s = ReviewSession::new(single, ReviewConfig::default());
        know_card(&mut s, t0);
        assert_eq!(s.current_progress().correct_count, 1);
    }

    #[test]
    fn actions_are_ignored_while_celebrating() {
        let config = ReviewConfig {
            learned_threshold: 1,
            ..ReviewConfig::default()
        };
        let t0 = Instant::now();
        let mut s = ReviewSession::new(Deck::builtin(), config);
        assert!(matches!(s.know_it(t0), Outcome::Celebrating { .. }));

        assert_eq!(s.skip(), Outcome::Ignored);
        assert_eq!(s.dont_know_it(), Outcome::Ignored);
        assert_eq!(s.continue_after_reveal(), Outcome::Ignored);
        assert_eq!(s.know_it(t0), Outcome::Ignored);
        assert_eq!(s.progress().correct_count("catalyst"), 1);
        assert_eq!(s.cursor().current_index, 0);
    }

    // -- reveal / continue / skip --

    #[test]
    fn reveal_then_continue_advances_without_progress() {
        let mut s = session();
        assert_eq!(s.dont_know_it(), Outcome::Revealed);
        assert!(s.cursor().revealed);

        assert_eq!(s.continue_after_reveal(), Outcome::Advanced { from: 0, to: 1 });
        assert!(!s.cursor().revealed);
        assert!(s.progress().is_empty());
    }

    #[test]
    fn dont_know_it_is_idempotent() {
        let mut s = session();
        for _ in 0..4 {
            assert_eq!(s.dont_know_it(), Outcome::Revealed);
        }
        assert_eq!(s.progress().correct_count("catalyst"), 0);
        assert_eq!(s.cursor().current_index, 0);
    }

    #[test]
    fn know_it_is_ignored_while_revealed() {
        let mut s = session();
        s.dont_know_it();
        assert_eq!(s.know_it(Instant::now()), Outcome::Ignored);
        assert!(s.progress().is_empty());
    }

    #[test]
    fn continue_is_ignored_while_presenting() {
        let mut s = session();
        assert_eq!(s.continue_after_reveal(), Outcome::Ignored);
        assert_eq!(s.cursor().current_index, 0);
    }

    #[test]
    fn skip_from_revealed_hides_definition() {
        let mut s = session();
        s.dont_know_it();
        assert_eq!(s.skip(), Outcome::Advanced { from: 0, to: 1 });
        assert!(!s.cursor().revealed);
        assert!(s.progress().is_empty());
    }

    #[test]
    fn five_advances_return_to_start() {
        let mut s = session();
        for expected in [1, 2, 3, 4, 0] {
            s.skip();
            assert_eq!(s.cursor().current_index, expected);
        }
    }

    // -- timer lifecycle --

    #[test]
    fn pending_deadline_only_while_celebrating() {
        let config = ReviewConfig {
            learned_threshold: 1,
            celebration: ms(500),
        };
        let t0 = Instant::now();
        let mut s = ReviewSession::new(Deck::builtin(), config);
        assert_eq!(s.pending_deadline(), None);

        s.know_it(t0);
        assert_eq!(s.pending_deadline(), Some(t0 + ms(500)));

        s.tick(t0 + ms(500));
        assert_eq!(s.pending_deadline(), None);
    }

    #[test]
    fn cancel_pending_keeps_card_and_status() {
        let config = ReviewConfig {
            learned_threshold: 1,
            ..ReviewConfig::default()
        };
        let t0 = Instant::now();
        let mut s = ReviewSession::new(Deck::builtin(), config);
        s.know_it(t0);

        assert!(s.cancel_pending());
        assert_eq!(*s.phase(), Phase::Presenting);
        assert_eq!(s.cursor().current_index, 0);
        assert_eq!(
            s.progress().get("catalyst").map(|p| p.status),
            Some(Status::Learned)
        );
        // Timer is gone: a late tick does nothing
        assert_eq!(s.tick(t0 + ms(5000)), Outcome::Ignored);
        assert!(!s.cancel_pending());
    }

    #[test]
    fn timer_remaining_saturates() {
        let t0 = Instant::now();
        let timer = CelebrationTimer {
            card_id: "x".into(),
            deadline: t0 + ms(100),
        };
        assert_eq!(timer.remaining(t0), ms(100));
        assert_eq!(timer.remaining(t0 + ms(300)), Duration::ZERO);
        assert!(timer.is_due(t0 + ms(100)));
    }

    // -- derived values --

    #[test]
    fn current_fraction_caps_at_one() {
        let single = Deck::from_cards(vec![Deck::builtin().card(1).clone()]).unwrap();
        let t0 = Instant::now();
        let mut s = ReviewSession::new(single, ReviewConfig::default());
        assert_eq!(s.current_fraction(), 0.0);
        for _ in 0..5 {
            know_card(&mut s, t0);
        }
        assert_eq!(s.current_correct_count(), 5);
        assert_eq!(s.current_fraction(), 1.0);
    }

    #[test]
    fn zero_threshold_is_clamped_to_one() {
        let config = ReviewConfig {
            learned_threshold: 0,
            ..ReviewConfig::default()
        };
        let s = ReviewSession::new(Deck::builtin(), config);
        assert_eq!(s.config().learned_threshold, 1);
    }

    #[test]
    fn streak_breaks_on_reveal_but_not_on_skip() {
        let mut s = session();
        let t0 = Instant::now();
        s.know_it(t0);
        s.skip();
        s.know_it(t0);
        assert_eq!(s.streak().current, 2);

        s.dont_know_it();
        assert_eq!(s.streak().current, 0);
        assert_eq!(s.streak().best, 2);
    }
}
