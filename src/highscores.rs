//! Persisted high score
//!
//! Read once when the game loop is created and written at most once per
//! game, when a run ends above the stored best. Storage failures never stop
//! play: a failed load counts as 0 and a failed save is skipped.

use crate::persistence::ScoreStore;

/// Best score seen so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighScore {
    best: u64,
}

impl HighScore {
    pub fn new(best: u64) -> Self {
        Self { best }
    }

    /// Read the stored best, falling back to 0
    pub fn load(store: &dyn ScoreStore) -> Self {
        match store.load() {
            Ok(best) => {
                log::info!("Loaded high score {}", best);
                Self { best }
            }
            Err(e) => {
                log::warn!("Could not load high score, starting from 0: {}", e);
                Self::default()
            }
        }
    }

    pub fn best(&self) -> u64 {
        self.best
    }

    /// Whether `score` would set a new record
    pub fn qualifies(&self, score: u64) -> bool {
        score > self.best
    }

    /// Record a finished run; saves and returns true if it beat the best
    pub fn submit(&mut self, score: u64, store: &mut dyn ScoreStore) -> bool {
        if !self.qualifies(score) {
            return false;
        }
        self.best = score;
        if let Err(e) = store.save(score) {
            log::warn!("Could not save high score {}: {}", score, e);
        }
        true
    }
}
