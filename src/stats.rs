//! Dashboard aggregates derived from review progress.
//!
//! Nothing here is stored: every number is recomputed from a
//! `ReviewProgress` map plus the session's answer streak.

use serde::Serialize;

use crate::review::ReviewProgress;
use crate::types::Status;

/// Run of consecutive "know it" answers.
///
/// "Show definition" breaks the run; skipping does not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Streak {
    pub current: u32,
    pub best: u32,
}

impl Streak {
    pub fn hit(&mut self) {
        self.current = self.current.saturating_add(1);
        self.best = self.best.max(self.current);
    }

    pub fn miss(&mut self) {
        self.current = 0;
    }
}

/// Summary of one review session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SessionStats {
    pub deck_size: usize,
    /// Cards answered correctly at least once.
    pub cards_seen: usize,
    pub learning: usize,
    pub learned: usize,
    pub total_correct: u64,
    pub current_streak: u32,
    pub best_streak: u32,
    /// learned / deck_size, in `0..=1`.
    pub completion: f64,
}

impl SessionStats {
    pub fn from_progress(progress: &ReviewProgress, deck_size: usize, streak: Streak) -> Self {
        let mut stats = SessionStats {
            deck_size,
            current_streak: streak.current,
            best_streak: streak.best,
            ..SessionStats::default()
        };

        for (_, entry) in progress.iter() {
            stats.cards_seen += 1;
            stats.total_correct += u64::from(entry.correct_count);
            match entry.status {
                Status::Learning => stats.learning += 1,
                Status::Learned => stats.learned += 1,
            }
        }

        stats.completion = if deck_size == 0 {
            0.0
        } else {
            (stats.learned as f64 / deck_size as f64).min(1.0)
        };
        stats
    }
}

// ============================================================================
// TESTS
// ============================================================================
